use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::capture::types::ReadyState;

/// A single decoded video frame.
pub struct Frame {
    /// Raw pixel data (RGB).
    pub data: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Capture timestamp in microseconds.
    pub timestamp_us: u64,
}

/// Live camera feed as seen by the capture pipeline.
///
/// Implemented by the host around its video element or camera stream. The
/// pipeline only reads it for the duration of one capture.
pub trait VideoSource: Send + Sync {
    /// Current playback readiness.
    fn ready_state(&self) -> ReadyState;

    /// Intrinsic stream size in pixels, `(0, 0)` before metadata arrives.
    fn intrinsic_size(&self) -> (u32, u32);

    /// The frame currently on screen, if one is readable.
    fn current_frame(&self) -> Option<Arc<Frame>>;
}

/// Latest decoded frame of a camera stream.
///
/// The decoder thread replaces the frame; the pipeline reads whichever frame
/// is current when it composites. Older frames are dropped as soon as no
/// reader holds them.
pub struct FrameSlot {
    current: Mutex<Option<Arc<Frame>>>,
    /// Frames published so far.
    published: AtomicU64,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
            published: AtomicU64::new(0),
        }
    }

    pub fn publish(&self, frame: Frame) {
        *self.current.lock() = Some(Arc::new(frame));
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    pub fn current(&self) -> Option<Arc<Frame>> {
        self.current.lock().clone()
    }
}

impl Default for FrameSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// [`VideoSource`] fed by a camera stream publishing into a [`FrameSlot`].
///
/// Reports `HaveMetadata` once the stream size is known and
/// `HaveEnoughData` once a frame has arrived.
pub struct LiveVideo {
    slot: Arc<FrameSlot>,
    metadata: Mutex<Option<(u32, u32)>>,
}

impl LiveVideo {
    pub fn new(slot: Arc<FrameSlot>) -> Self {
        Self {
            slot,
            metadata: Mutex::new(None),
        }
    }

    /// Record the negotiated stream size before the first frame is decoded.
    pub fn set_metadata(&self, width: u32, height: u32) {
        *self.metadata.lock() = Some((width, height));
    }

    pub fn slot(&self) -> &Arc<FrameSlot> {
        &self.slot
    }
}

impl VideoSource for LiveVideo {
    fn ready_state(&self) -> ReadyState {
        if self.slot.published() > 0 {
            ReadyState::HaveEnoughData
        } else if self.metadata.lock().is_some() {
            ReadyState::HaveMetadata
        } else {
            ReadyState::HaveNothing
        }
    }

    fn intrinsic_size(&self) -> (u32, u32) {
        match self.slot.current() {
            Some(frame) => (frame.width, frame.height),
            None => self.metadata.lock().unwrap_or((0, 0)),
        }
    }

    fn current_frame(&self) -> Option<Arc<Frame>> {
        self.slot.current()
    }
}
