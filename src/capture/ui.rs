/// Visual chrome the capture pipeline toggles around a capture.
///
/// Implemented by the host UI. Calls arrive on the pipeline's task and must
/// not block.
pub trait CaptureUi: Send + Sync {
    /// Mark the capture trigger busy (non-interactive) or ready.
    fn set_trigger_busy(&self, busy: bool);

    /// Show or clear the flash cue.
    fn set_flash(&self, on: bool);

    /// Hide interactive chrome so it stays out of the composited frame.
    fn set_chrome_hidden(&self, hidden: bool);

    /// Present a blocking notification naming a failure.
    fn alert(&self, message: &str);
}

/// UI that ignores every call. Useful for headless hosts.
pub struct NullUi;

impl CaptureUi for NullUi {
    fn set_trigger_busy(&self, _busy: bool) {}
    fn set_flash(&self, _on: bool) {}
    fn set_chrome_hidden(&self, _hidden: bool) {}
    fn alert(&self, message: &str) {
        tracing::warn!("capture alert (no UI attached): {message}");
    }
}
