pub mod capture;
pub mod detection;
pub mod diagnostics;
pub mod preview;
pub mod settings;

use std::sync::Arc;

pub use capture::error::{CaptureError, Result};
pub use capture::pipeline::{CapturePipeline, FrameSources, PipelineParts};
pub use capture::types::Viewport;
pub use detection::signal::{DetectionEvent, DetectionFlag, DetectionSignal};
pub use preview::resource::ResourceHandle;
pub use settings::types::CaptureSettings;

use capture::clock::RefreshClock;
use capture::ui::CaptureUi;
use detection::bridge::{start_detection_bridge, MarkerTracker, TransitionCallback};
use preview::artifact::PreviewSurface;
use settings::store::SettingsStore;

/// Install the global `tracing` subscriber at `info`.
///
/// `RUST_LOG` overrides the level. Safe to call more than once.
pub fn init_logging() {
    init_logging_at(log::LevelFilter::Info);
}

/// Install the global `tracing` subscriber with `level` as the default filter.
pub fn init_logging_at(level: log::LevelFilter) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.as_str().to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

/// Host-side collaborators for [`start`].
pub struct Host {
    pub tracker: Arc<dyn MarkerTracker>,
    pub ui: Arc<dyn CaptureUi>,
    pub preview: Arc<dyn PreviewSurface>,
    /// Called with the tracked flag on every detection transition, e.g. to
    /// show or hide the capture trigger.
    pub on_detection_change: Option<TransitionCallback>,
}

/// A running capture setup.
///
/// The refresh ticker lives as long as the clock does, so a pipeline cloned
/// out of the `App` keeps capturing after the `App` itself is dropped.
pub struct App {
    pub pipeline: Arc<CapturePipeline>,
    pub detection: Arc<DetectionSignal>,
    pub clock: Arc<RefreshClock>,
}

/// Wire settings, detection and the capture pipeline together.
///
/// Must be called inside a tokio runtime. Settings come from
/// `ARSNAP_SETTINGS` when set; `DUMMY_SCENE=1` attaches test-pattern
/// sources so the pipeline runs without a camera or renderer.
pub fn start(host: Host, viewport: Viewport) -> App {
    let settings = SettingsStore::from_env()
        .map(|store| store.load_or_default())
        .unwrap_or_default();
    tracing::info!(
        "capture settings: quality {} max ratio {}",
        settings.jpeg_quality,
        settings.max_pixel_ratio
    );

    let detection = Arc::new(DetectionSignal::new());
    start_detection_bridge(
        host.tracker.as_ref(),
        Arc::clone(&detection),
        host.on_detection_change,
    );

    let clock = Arc::new(RefreshClock::with_rate(settings.refresh_hz));
    // Detached: exits once the last clock reference is gone.
    drop(clock.spawn_ticker(settings.refresh_hz));

    let max_ratio = settings.max_pixel_ratio;
    let pipeline = Arc::new(CapturePipeline::new(
        settings,
        viewport,
        PipelineParts {
            detection: detection.subscribe(),
            ui: host.ui,
            preview: host.preview,
            clock: Arc::clone(&clock),
        },
    ));
    pipeline.set_sources(FrameSources::from_env(&viewport, max_ratio));

    App {
        pipeline,
        detection,
        clock,
    }
}
