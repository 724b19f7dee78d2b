//! Freeze-frame compositor. Camera frame underneath, 3D overlay on top.
//!
//! All layout math happens in CSS pixels; a [`DeviceTransform`] maps it onto
//! an output raster of `viewport × pixel ratio` device pixels. The camera
//! frame is fitted to cover the viewport (cropping whatever overflows) and
//! resampled straight into the output with `fast_image_resize`. The renderer
//! surface is stretched over the full viewport and alpha-blended on top.

use fast_image_resize as fr;
use fr::images::{Image, ImageRef};
use image::{imageops, RgbaImage};

use crate::capture::error::{CaptureError, Result};
use crate::capture::renderer::Surface;
use crate::capture::source::{Frame, VideoSource};
use crate::capture::types::{DeviceTransform, Viewport};

/// Where the video lands in viewport coordinates (CSS pixels).
///
/// The rectangle always covers the viewport; negative offsets mean the
/// frame is cropped on that side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRect {
    pub draw_width: f64,
    pub draw_height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl FitRect {
    /// The same rectangle in device pixels.
    pub fn scaled(&self, transform: DeviceTransform) -> Self {
        Self {
            draw_width: transform.apply(self.draw_width),
            draw_height: transform.apply(self.draw_height),
            offset_x: transform.apply(self.offset_x),
            offset_y: transform.apply(self.offset_y),
        }
    }

    /// Region of a `src_width × src_height` source that ends up inside the
    /// viewport, as `(left, top, width, height)` in source pixels.
    pub fn source_crop(
        &self,
        viewport_width: f64,
        viewport_height: f64,
        src_width: u32,
        src_height: u32,
    ) -> (f64, f64, f64, f64) {
        let src_w = f64::from(src_width);
        let src_h = f64::from(src_height);

        let left = (-self.offset_x / self.draw_width * src_w).clamp(0.0, src_w);
        let top = (-self.offset_y / self.draw_height * src_h).clamp(0.0, src_h);
        let width = (viewport_width / self.draw_width * src_w).min(src_w - left);
        let height = (viewport_height / self.draw_height * src_h).min(src_h - top);
        (left, top, width, height)
    }
}

/// Fit a `video_width × video_height` frame so it covers the viewport
/// without distortion, centred on the overflowing axis.
///
/// A relatively wider video is fitted by height and cropped left and right;
/// otherwise it is fitted by width and cropped top and bottom.
pub fn fit_cover(
    video_width: u32,
    video_height: u32,
    viewport_width: f64,
    viewport_height: f64,
) -> FitRect {
    let video_aspect = f64::from(video_width) / f64::from(video_height);
    let viewport_aspect = viewport_width / viewport_height;

    if video_aspect > viewport_aspect {
        let draw_height = viewport_height;
        let draw_width = draw_height * video_aspect;
        FitRect {
            draw_width,
            draw_height,
            offset_x: (viewport_width - draw_width) / 2.0,
            offset_y: 0.0,
        }
    } else {
        let draw_width = viewport_width;
        let draw_height = draw_width / video_aspect;
        FitRect {
            draw_width,
            draw_height,
            offset_x: 0.0,
            offset_y: (viewport_height - draw_height) / 2.0,
        }
    }
}

/// Result of one composition.
pub struct CompositedImage {
    pub pixels: RgbaImage,
    pub transform: DeviceTransform,
    /// `None` when the video was not decodable and the background stayed blank.
    pub video_fit: Option<FitRect>,
}

impl CompositedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn background_drawn(&self) -> bool {
        self.video_fit.is_some()
    }
}

/// Composite the current video frame and the renderer surface.
///
/// The renderer must already have drawn the frame being captured. A video
/// that is not yet decodable leaves the background blank instead of failing.
pub fn composite(
    viewport: &Viewport,
    max_pixel_ratio: f64,
    video: &dyn VideoSource,
    surface: &Surface,
) -> Result<CompositedImage> {
    if viewport.is_empty() {
        return Err(CaptureError::ResourceUnavailable(
            "viewport has zero area".to_string(),
        ));
    }
    if surface.width == 0 || surface.height == 0 {
        return Err(CaptureError::ResourceUnavailable(
            "renderer surface is empty".to_string(),
        ));
    }

    let transform = DeviceTransform::new(viewport.effective_ratio(max_pixel_ratio));
    let (out_width, out_height) = viewport.output_size(max_pixel_ratio);

    let (mut canvas, video_fit) = match drawable_frame(video) {
        Some((frame, (video_w, video_h))) => {
            let fit = fit_cover(
                video_w,
                video_h,
                f64::from(viewport.width),
                f64::from(viewport.height),
            );
            tracing::debug!(
                "video {video_w}x{video_h} fitted at {:?} (device px)",
                fit.scaled(transform)
            );
            let background = draw_video(&frame, &fit, viewport, out_width, out_height)?;
            (background, Some(fit))
        }
        None => {
            tracing::warn!("video not ready, capturing with a blank background");
            (RgbaImage::new(out_width, out_height), None)
        }
    };

    let overlay = stretch_surface(surface, out_width, out_height)?;
    imageops::overlay(&mut canvas, &overlay, 0, 0);

    Ok(CompositedImage {
        pixels: canvas,
        transform,
        video_fit,
    })
}

/// The current frame plus the intrinsic size to fit, if the video can be drawn.
fn drawable_frame(video: &dyn VideoSource) -> Option<(std::sync::Arc<Frame>, (u32, u32))> {
    if !video.ready_state().can_draw() {
        return None;
    }
    let (width, height) = video.intrinsic_size();
    if width == 0 || height == 0 {
        return None;
    }
    let frame = video.current_frame()?;
    if frame.width == 0 || frame.height == 0 {
        return None;
    }
    Some((frame, (width, height)))
}

/// Resample the visible part of `frame` into an opaque output-sized layer.
fn draw_video(
    frame: &Frame,
    fit: &FitRect,
    viewport: &Viewport,
    out_width: u32,
    out_height: u32,
) -> Result<RgbaImage> {
    let src = ImageRef::new(frame.width, frame.height, &frame.data, fr::PixelType::U8x3)
        .map_err(|e| CaptureError::Composite(format!("video frame: {e}")))?;
    let mut dst = Image::new(out_width, out_height, fr::PixelType::U8x3);

    let (left, top, width, height) = fit.source_crop(
        f64::from(viewport.width),
        f64::from(viewport.height),
        frame.width,
        frame.height,
    );
    let options = fr::ResizeOptions::new().crop(left, top, width, height);

    let mut resizer = fr::Resizer::new();
    resizer
        .resize(&src, &mut dst, &options)
        .map_err(|e| CaptureError::Composite(format!("video resample: {e}")))?;

    let rgb = dst.into_vec();
    let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
    for px in rgb.chunks_exact(3) {
        rgba.extend_from_slice(&[px[0], px[1], px[2], 0xFF]);
    }
    RgbaImage::from_raw(out_width, out_height, rgba)
        .ok_or_else(|| CaptureError::Composite("video layer size mismatch".to_string()))
}

/// Scale the renderer surface to the output raster, if it is not already.
fn stretch_surface(surface: &Surface, out_width: u32, out_height: u32) -> Result<RgbaImage> {
    let data = if surface.width == out_width && surface.height == out_height {
        surface.data.clone()
    } else {
        let src = ImageRef::new(
            surface.width,
            surface.height,
            &surface.data,
            fr::PixelType::U8x4,
        )
        .map_err(|e| CaptureError::Composite(format!("renderer surface: {e}")))?;
        let mut dst = Image::new(out_width, out_height, fr::PixelType::U8x4);
        let mut resizer = fr::Resizer::new();
        resizer
            .resize(&src, &mut dst, None)
            .map_err(|e| CaptureError::Composite(format!("overlay resample: {e}")))?;
        dst.into_vec()
    };

    RgbaImage::from_raw(out_width, out_height, data)
        .ok_or_else(|| CaptureError::Composite("renderer surface size mismatch".to_string()))
}
