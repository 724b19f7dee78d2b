use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::capture::error::Result;
use crate::capture::renderer::{SceneRenderer, Surface};
use crate::capture::source::{Frame, VideoSource};
use crate::capture::types::{ReadyState, Viewport};

const DUMMY_VIDEO_WIDTH: u32 = 1280;
const DUMMY_VIDEO_HEIGHT: u32 = 720;
/// Overlay colour (straight-alpha RGBA).
const MARKER_COLOUR: [u8; 4] = [0x2E, 0xCC, 0x71, 0xFF];

/// Synthetic camera feed with a gradient test pattern.
///
/// Enable via the `DUMMY_SCENE=1` environment variable.
pub struct TestPatternVideo {
    frame: Arc<Frame>,
}

impl TestPatternVideo {
    pub fn new(width: u32, height: u32) -> Self {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                data.push((x % 256) as u8);
                data.push((y % 256) as u8);
                data.push(128);
            }
        }
        Self {
            frame: Arc::new(Frame {
                data,
                width,
                height,
                timestamp_us: 0,
            }),
        }
    }

    /// Whether the dummy scene is enabled via environment variable.
    pub fn is_enabled() -> bool {
        Self::flag_enabled(std::env::var("DUMMY_SCENE").ok().as_deref())
    }

    fn flag_enabled(value: Option<&str>) -> bool {
        matches!(value, Some("1" | "true"))
    }
}

impl Default for TestPatternVideo {
    fn default() -> Self {
        Self::new(DUMMY_VIDEO_WIDTH, DUMMY_VIDEO_HEIGHT)
    }
}

impl VideoSource for TestPatternVideo {
    fn ready_state(&self) -> ReadyState {
        ReadyState::HaveEnoughData
    }

    fn intrinsic_size(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }

    fn current_frame(&self) -> Option<Arc<Frame>> {
        Some(Arc::clone(&self.frame))
    }
}

/// Renderer that draws an opaque square in the middle of a transparent
/// viewport-sized surface.
pub struct MarkerOverlayRenderer {
    width: u32,
    height: u32,
    renders: AtomicU64,
}

impl MarkerOverlayRenderer {
    /// Surface sized like a renderer running at `viewport` with its own
    /// pixel ratio capped at `max_ratio`.
    pub fn for_viewport(viewport: &Viewport, max_ratio: f64) -> Self {
        let (width, height) = viewport.output_size(max_ratio);
        Self {
            width,
            height,
            renders: AtomicU64::new(0),
        }
    }

    /// How many frames have been rendered.
    pub fn render_count(&self) -> u64 {
        self.renders.load(Ordering::Relaxed)
    }
}

impl SceneRenderer for MarkerOverlayRenderer {
    fn force_render(&self) -> Result<()> {
        self.renders.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn surface(&self) -> Option<Surface> {
        if self.render_count() == 0 {
            return Some(Surface::transparent(self.width, self.height));
        }
        let side = self.width.min(self.height) / 2;
        let (x0, y0) = ((self.width - side) / 2, (self.height - side) / 2);
        let mut data = vec![0u8; (self.width * self.height * 4) as usize];
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                let i = ((y * self.width + x) * 4) as usize;
                data[i..i + 4].copy_from_slice(&MARKER_COLOUR);
            }
        }
        Some(Surface::new(data, self.width, self.height))
    }
}
