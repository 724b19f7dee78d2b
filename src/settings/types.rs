use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for the capture pipeline and preview.
///
/// Every field has a default, so a settings file only needs the keys it
/// overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CaptureSettings {
    /// Upper bound for the device pixel ratio used for output size.
    pub max_pixel_ratio: f64,
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
    pub flash_duration_ms: u64,
    /// Pause after hiding chrome so the style change paints before readback.
    pub settle_delay_ms: u64,
    pub preview_enter_delay_ms: u64,
    /// Length of the preview's exit animation; the artifact is released after it.
    pub preview_exit_ms: u64,
    /// Rate of the fallback refresh ticker when the host does not drive one.
    pub refresh_hz: u32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            max_pixel_ratio: 3.0,
            jpeg_quality: 90,
            flash_duration_ms: 100,
            settle_delay_ms: 50,
            preview_enter_delay_ms: 50,
            preview_exit_ms: 300,
            refresh_hz: 60,
        }
    }
}

impl CaptureSettings {
    /// Clamp out-of-range values into something the pipeline can use.
    pub fn validated(mut self) -> Self {
        if !self.max_pixel_ratio.is_finite() || self.max_pixel_ratio < 1.0 {
            self.max_pixel_ratio = 1.0;
        }
        self.jpeg_quality = self.jpeg_quality.clamp(1, 100);
        self.refresh_hz = self.refresh_hz.max(1);
        self
    }

    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_duration_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn preview_enter_delay(&self) -> Duration {
        Duration::from_millis(self.preview_enter_delay_ms)
    }

    pub fn preview_exit(&self) -> Duration {
        Duration::from_millis(self.preview_exit_ms)
    }
}
