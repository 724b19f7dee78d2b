//! Capture pipeline: turns a trigger into one composited JPEG artifact.
//!
//! A capture runs as a single async task with three suspension points, in
//! this order:
//!
//! 1. `settle_delay` after the flash and chrome hide, so the style change
//!    paints before anything is read;
//! 2. one display refresh after the forced render, so the readback sees the
//!    freshly drawn frame;
//! 3. the JPEG encode.
//!
//! The Idle/Capturing guard keeps two captures from interleaving: a trigger
//! that arrives mid-capture returns [`CaptureError::AlreadyCapturing`]
//! without touching anything. Chrome is hidden only across render and
//! readback and is visible again before the encode starts.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

use crate::capture::clock::RefreshClock;
use crate::capture::compositor::{composite, CompositedImage};
use crate::capture::dummy::{MarkerOverlayRenderer, TestPatternVideo};
use crate::capture::encode::{FrameEncoder, JpegFrameEncoder};
use crate::capture::error::{CaptureError, Result};
use crate::capture::renderer::SceneRenderer;
use crate::capture::source::VideoSource;
use crate::capture::state::{CaptureState, CaptureStateCell, ChromeGuard};
use crate::capture::types::Viewport;
use crate::capture::ui::CaptureUi;
use crate::detection::signal::DetectionFlag;
use crate::diagnostics::stats::{CaptureSnapshot, CaptureStats};
use crate::preview::artifact::{ArtifactManager, PreviewSurface};
use crate::preview::resource::{BlobRegistry, ResourceHandle};
use crate::settings::types::CaptureSettings;

/// Video and renderer the host has attached so far.
#[derive(Clone, Default)]
pub struct FrameSources {
    pub video: Option<Arc<dyn VideoSource>>,
    pub renderer: Option<Arc<dyn SceneRenderer>>,
}

impl FrameSources {
    pub fn new(video: Arc<dyn VideoSource>, renderer: Arc<dyn SceneRenderer>) -> Self {
        Self {
            video: Some(video),
            renderer: Some(renderer),
        }
    }

    /// Test-pattern video plus a marker overlay sized for `viewport`.
    pub fn dummy(viewport: &Viewport, max_pixel_ratio: f64) -> Self {
        Self::new(
            Arc::new(TestPatternVideo::default()),
            Arc::new(MarkerOverlayRenderer::for_viewport(viewport, max_pixel_ratio)),
        )
    }

    /// Dummy sources when `DUMMY_SCENE` is set, otherwise nothing attached.
    pub fn from_env(viewport: &Viewport, max_pixel_ratio: f64) -> Self {
        Self::dummy_if(TestPatternVideo::is_enabled(), viewport, max_pixel_ratio)
    }

    fn dummy_if(enabled: bool, viewport: &Viewport, max_pixel_ratio: f64) -> Self {
        if enabled {
            tracing::info!("DUMMY_SCENE set, using test-pattern sources");
            return Self::dummy(viewport, max_pixel_ratio);
        }
        Self::default()
    }

    fn resolve(&self) -> Result<(Arc<dyn VideoSource>, Arc<dyn SceneRenderer>)> {
        let video = self
            .video
            .clone()
            .ok_or_else(|| CaptureError::ResourceUnavailable("no video source".to_string()))?;
        let renderer = self
            .renderer
            .clone()
            .ok_or_else(|| CaptureError::ResourceUnavailable("no scene renderer".to_string()))?;
        Ok((video, renderer))
    }
}

/// Collaborators the pipeline drives.
pub struct PipelineParts {
    pub detection: DetectionFlag,
    pub ui: Arc<dyn CaptureUi>,
    pub preview: Arc<dyn PreviewSurface>,
    pub clock: Arc<RefreshClock>,
}

/// Owns capture state, the frame sources and the live artifact.
pub struct CapturePipeline {
    settings: CaptureSettings,
    state: CaptureStateCell,
    detection: DetectionFlag,
    ui: Arc<dyn CaptureUi>,
    clock: Arc<RefreshClock>,
    sources: Mutex<FrameSources>,
    viewport: Mutex<Viewport>,
    artifacts: ArtifactManager,
    stats: Mutex<CaptureStats>,
    encoder: Arc<dyn FrameEncoder>,
}

impl CapturePipeline {
    pub fn new(settings: CaptureSettings, viewport: Viewport, parts: PipelineParts) -> Self {
        let settings = settings.validated();
        let artifacts =
            ArtifactManager::new(Arc::new(BlobRegistry::new()), parts.preview, &settings);
        Self {
            settings,
            state: CaptureStateCell::new(),
            detection: parts.detection,
            ui: parts.ui,
            clock: parts.clock,
            sources: Mutex::new(FrameSources::default()),
            viewport: Mutex::new(viewport),
            artifacts,
            stats: Mutex::new(CaptureStats::new()),
            encoder: Arc::new(JpegFrameEncoder),
        }
    }

    /// Replace the JPEG encoder.
    pub fn with_encoder(mut self, encoder: Arc<dyn FrameEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    pub fn state(&self) -> CaptureState {
        self.state.state()
    }

    pub fn artifacts(&self) -> &ArtifactManager {
        &self.artifacts
    }

    pub fn set_sources(&self, sources: FrameSources) {
        *self.sources.lock() = sources;
    }

    /// Track window resizes and pixel-ratio changes.
    pub fn set_viewport(&self, viewport: Viewport) {
        *self.viewport.lock() = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        *self.viewport.lock()
    }

    pub fn diagnostics(&self) -> CaptureSnapshot {
        self.stats.lock().snapshot()
    }

    /// Handle a user activation of the capture trigger.
    ///
    /// Returns the handle of the new live artifact. Triggers while a capture
    /// is running or without a tracked target are ignored and reported as
    /// [`CaptureError::AlreadyCapturing`] / [`CaptureError::NoTarget`]. Other
    /// failures that are [user visible](CaptureError::is_user_visible) are
    /// also shown through [`CaptureUi::alert`].
    pub async fn trigger(&self) -> Result<ResourceHandle> {
        if self.state.state() == CaptureState::Capturing {
            self.stats.lock().record_ignored();
            return Err(CaptureError::AlreadyCapturing);
        }
        if !self.detection.is_tracked() {
            tracing::debug!("capture ignored: no target tracked");
            self.stats.lock().record_ignored();
            return Err(CaptureError::NoTarget);
        }
        let Some(_capture) = self.state.try_begin(self.ui.as_ref()) else {
            self.stats.lock().record_ignored();
            return Err(CaptureError::AlreadyCapturing);
        };

        tracing::info!("capture started");
        let started = Instant::now();
        let result = self.run_capture().await;
        let elapsed = started.elapsed();

        match &result {
            Ok(handle) => {
                let bytes = self
                    .artifacts
                    .registry()
                    .fetch(handle)
                    .map_or(0, |b| b.len());
                tracing::info!("capture finished: {handle} ({bytes} bytes, {elapsed:?})");
                self.stats.lock().record_success(bytes, elapsed);
            }
            Err(e) => {
                tracing::error!("capture failed: {e}");
                self.stats.lock().record_failure(&e.to_string(), elapsed);
                if e.is_user_visible() {
                    self.ui.alert(&format!("Capture failed: {e}"));
                }
            }
        }
        result
    }

    /// Close the preview and release the live artifact.
    pub async fn dismiss_preview(&self) -> bool {
        self.artifacts.dismiss().await
    }

    async fn run_capture(&self) -> Result<ResourceHandle> {
        let (video, renderer) = self.sources.lock().resolve()?;

        self.fire_flash();
        let mut chrome = ChromeGuard::hide(self.ui.as_ref());
        tokio::time::sleep(self.settings.settle_delay()).await;

        renderer.force_render()?;
        if self.clock.next_frame().await {
            tracing::debug!("refresh tick {} reached, reading back", self.clock.ticks());
        } else {
            tracing::warn!("no display refresh observed, reading back anyway");
        }

        let composited = self.compose(video.as_ref(), renderer.as_ref())?;
        chrome.restore();

        let jpeg = self.encode(composited).await?;
        Ok(self.artifacts.install(jpeg))
    }

    /// Flash on, and off again after `flash_duration` without waiting for it.
    fn fire_flash(&self) {
        self.ui.set_flash(true);
        let ui = Arc::clone(&self.ui);
        let duration = self.settings.flash_duration();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            ui.set_flash(false);
        });
    }

    fn compose(
        &self,
        video: &dyn VideoSource,
        renderer: &dyn SceneRenderer,
    ) -> Result<CompositedImage> {
        let surface = renderer.surface().ok_or_else(|| {
            CaptureError::ResourceUnavailable("renderer surface missing".to_string())
        })?;
        let viewport = self.viewport();
        composite(&viewport, self.settings.max_pixel_ratio, video, &surface)
    }

    async fn encode(&self, composited: CompositedImage) -> Result<Vec<u8>> {
        let quality = self.settings.jpeg_quality;
        let encoder = Arc::clone(&self.encoder);
        tokio::task::spawn_blocking(move || encoder.encode(&composited.pixels, quality))
            .await
            .map_err(|e| CaptureError::Unhandled(format!("encoder task: {e}")))?
    }
}
