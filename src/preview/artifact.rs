//! Lifecycle of the single live capture artifact.
//!
//! `install` releases any predecessor, registers the new image and shows it;
//! `dismiss` plays the exit animation and then releases it. Release happens
//! exactly once per artifact no matter how many dismissals race.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::preview::resource::{BlobRegistry, ResourceHandle};
use crate::settings::types::CaptureSettings;

/// Host-side preview overlay.
pub trait PreviewSurface: Send + Sync {
    /// Display the image behind `handle`.
    fn show(&self, handle: &ResourceHandle);

    /// Start the enter animation.
    fn animate_in(&self);

    /// Start the exit animation.
    fn animate_out(&self);

    /// Remove the overlay.
    fn hide(&self);
}

/// Owns the live-artifact slot.
pub struct ArtifactManager {
    registry: Arc<BlobRegistry>,
    preview: Arc<dyn PreviewSurface>,
    live: Arc<Mutex<Option<ResourceHandle>>>,
    enter_delay: Duration,
    exit_duration: Duration,
}

impl ArtifactManager {
    pub fn new(
        registry: Arc<BlobRegistry>,
        preview: Arc<dyn PreviewSurface>,
        settings: &CaptureSettings,
    ) -> Self {
        Self {
            registry,
            preview,
            live: Arc::new(Mutex::new(None)),
            enter_delay: settings.preview_enter_delay(),
            exit_duration: settings.preview_exit(),
        }
    }

    pub fn registry(&self) -> &Arc<BlobRegistry> {
        &self.registry
    }

    /// Handle of the artifact currently on display.
    pub fn live(&self) -> Option<ResourceHandle> {
        self.live.lock().clone()
    }

    /// Bytes of the live artifact, for save/share.
    pub fn live_bytes(&self) -> Option<Arc<[u8]>> {
        let handle = self.live()?;
        self.registry.fetch(&handle)
    }

    /// Make `bytes` the live artifact and show it.
    ///
    /// Must be called inside a tokio runtime; the enter animation is
    /// scheduled on it.
    pub fn install(&self, bytes: Vec<u8>) -> ResourceHandle {
        let previous = self.live.lock().take();
        if let Some(previous) = previous {
            self.release(&previous);
        }

        let handle = self.registry.register(bytes);
        *self.live.lock() = Some(handle.clone());
        tracing::debug!("showing capture {handle}");
        self.preview.show(&handle);

        let preview = Arc::clone(&self.preview);
        let live = Arc::clone(&self.live);
        let enter_delay = self.enter_delay;
        let shown = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(enter_delay).await;
            if live.lock().as_ref() == Some(&shown) {
                preview.animate_in();
            }
        });

        handle
    }

    /// Close the preview and release its artifact once the exit animation
    /// has finished.
    ///
    /// Returns `true` if this call released the artifact. Later or
    /// overlapping dismissals, or a dismissal whose artifact was replaced by
    /// a newer capture meanwhile, return `false` and release nothing.
    pub async fn dismiss(&self) -> bool {
        let Some(target) = self.live() else {
            return false;
        };

        self.preview.animate_out();
        tokio::time::sleep(self.exit_duration).await;

        let released = {
            let mut live = self.live.lock();
            if live.as_ref() == Some(&target) {
                live.take()
            } else {
                None
            }
        };
        match released {
            Some(handle) => {
                self.preview.hide();
                self.release(&handle);
                true
            }
            None => false,
        }
    }

    fn release(&self, handle: &ResourceHandle) {
        if self.registry.revoke(handle) {
            tracing::debug!("released capture {handle}");
        } else {
            tracing::warn!("capture {handle} was already released");
        }
    }
}
