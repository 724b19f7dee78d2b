use image::codecs::jpeg::JpegEncoder;
use image::{RgbImage, RgbaImage};

use crate::capture::error::{CaptureError, Result};

/// Flatten RGBA onto black, the way a canvas exports to an opaque format.
pub fn flatten_to_rgb(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let scale = |c: u8| ((u16::from(c) * u16::from(a) + 127) / 255) as u8;
        image::Rgb([scale(r), scale(g), scale(b)])
    })
}

/// Compress a composited frame to JPEG at the given quality (1-100).
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    if image.width() == 0 || image.height() == 0 {
        return Err(CaptureError::EncodeFailed("image has no pixels".to_string()));
    }
    let rgb = flatten_to_rgb(image);

    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .map_err(|e| CaptureError::EncodeFailed(e.to_string()))?;
    if buf.is_empty() {
        return Err(CaptureError::EncodeFailed("encoder produced no data".to_string()));
    }
    Ok(buf)
}

/// Turns the composited raster into the artifact bytes.
///
/// Runs on the blocking pool; implementations may take as long as they need.
pub trait FrameEncoder: Send + Sync {
    fn encode(&self, image: &RgbaImage, quality: u8) -> Result<Vec<u8>>;
}

/// Baseline JPEG via the `image` crate.
pub struct JpegFrameEncoder;

impl FrameEncoder for JpegFrameEncoder {
    fn encode(&self, image: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
        encode_jpeg(image, quality)
    }
}
