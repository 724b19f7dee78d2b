use serde::Serialize;

/// Pixel ratio used when the host reports a nonsensical device pixel ratio.
const FALLBACK_PIXEL_RATIO: f64 = 1.0;

/// Logical viewport in CSS pixels, plus the display's device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, device_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Device pixel ratio capped at `max_ratio`.
    ///
    /// Zero, negative and non-finite ratios fall back to 1.
    pub fn effective_ratio(&self, max_ratio: f64) -> f64 {
        let dpr = if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            FALLBACK_PIXEL_RATIO
        };
        dpr.min(max_ratio)
    }

    /// Output raster size in device pixels. Fractional sizes truncate, like a
    /// canvas backing store does.
    pub fn output_size(&self, max_ratio: f64) -> (u32, u32) {
        let ratio = self.effective_ratio(max_ratio);
        (
            (f64::from(self.width) * ratio) as u32,
            (f64::from(self.height) * ratio) as u32,
        )
    }
}

/// Maps CSS-pixel draw coordinates onto the device-pixel output raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceTransform {
    ratio: f64,
}

impl DeviceTransform {
    pub fn new(ratio: f64) -> Self {
        Self { ratio }
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    #[inline]
    pub fn apply(&self, css: f64) -> f64 {
        css * self.ratio
    }
}

/// Playback readiness of a video source. Ordered: a frame can only be read
/// from `HaveCurrentData` upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyState {
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

impl ReadyState {
    /// Whether the current frame is decodable.
    pub fn can_draw(self) -> bool {
        self >= ReadyState::HaveCurrentData
    }
}
