use thiserror::Error;

/// Marker tracker errors.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("target notification registration failed: {0}")]
    Registration(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, DetectionError>;
