use thiserror::Error;

/// Capture pipeline errors.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("a capture is already in progress")]
    AlreadyCapturing,

    #[error("no target is currently tracked")]
    NoTarget,

    #[error("capture resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("scene render failed: {0}")]
    Render(String),

    #[error("compositing failed: {0}")]
    Composite(String),

    #[error("image encoding failed: {0}")]
    EncodeFailed(String),

    #[error("unexpected capture failure: {0}")]
    Unhandled(String),
}

impl CaptureError {
    /// Whether the failure should be shown to the user.
    ///
    /// Re-entrant triggers and triggers without a tracked target are
    /// dropped silently.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, Self::AlreadyCapturing | Self::NoTarget)
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, CaptureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_rejections_are_silent() {
        assert!(!CaptureError::AlreadyCapturing.is_user_visible());
        assert!(!CaptureError::NoTarget.is_user_visible());
    }

    #[test]
    fn failures_are_user_visible() {
        assert!(CaptureError::ResourceUnavailable("video".into()).is_user_visible());
        assert!(CaptureError::EncodeFailed("jpeg".into()).is_user_visible());
        assert!(CaptureError::Unhandled("boom".into()).is_user_visible());
    }

    #[test]
    fn encode_failure_message_is_distinct() {
        let encode = CaptureError::EncodeFailed("buffer".into()).to_string();
        let other = CaptureError::Composite("buffer".into()).to_string();
        assert_ne!(encode, other);
        assert!(encode.contains("encoding"));
    }
}
