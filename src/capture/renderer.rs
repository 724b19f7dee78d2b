use crate::capture::error::Result;

/// Readback of the 3D renderer's draw buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    /// Raw pixel data (straight-alpha RGBA).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Surface {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    /// A fully transparent surface.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::new(vec![0; (width * height * 4) as usize], width, height)
    }
}

/// The 3D engine drawing the AR overlay.
///
/// `force_render` draws the current scene state synchronously; `surface`
/// reads back whatever the draw buffer currently holds.
pub trait SceneRenderer: Send + Sync {
    /// Draw the current frame now.
    fn force_render(&self) -> Result<()>;

    /// Read the draw buffer. `None` when no surface exists yet.
    fn surface(&self) -> Option<Surface>;
}
