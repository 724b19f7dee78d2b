use std::sync::Arc;

use crate::detection::error::Result;
use crate::detection::signal::{DetectionEvent, DetectionSignal};

/// AR tracking library that reports marker acquisition and loss.
pub trait MarkerTracker: Send + Sync {
    /// Register for target notifications.
    ///
    /// The callback may fire on the tracker's own thread.
    fn watch_targets(&self, callback: Box<dyn Fn(DetectionEvent) + Send>) -> Result<()>;
}

/// Called with the new flag value on every real transition.
pub type TransitionCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// Forward tracker notifications into `signal`.
///
/// `on_change` fires only when the tracked flag actually flips, so the host
/// can show or hide the capture trigger without debouncing repeats.
pub fn start_detection_bridge(
    tracker: &dyn MarkerTracker,
    signal: Arc<DetectionSignal>,
    on_change: Option<TransitionCallback>,
) {
    let result = tracker.watch_targets(Box::new(move |event: DetectionEvent| {
        if !signal.apply(event) {
            return;
        }
        tracing::info!("marker {}", if event.is_tracked() { "acquired" } else { "lost" });
        if let Some(cb) = &on_change {
            cb(event.is_tracked());
        }
    }));

    if let Err(e) = result {
        tracing::warn!("Failed to start detection bridge: {e}");
    }
}
