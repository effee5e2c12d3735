//! Error types for tracking operations.

use thiserror::Error;

/// Result type for tracking operations.
pub type TrackingResult<T> = Result<T, TrackingError>;

/// Errors that can occur while producing or post-processing detections.
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("Unsupported tracking provider: {0}")]
    UnsupportedProvider(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Detector failed: {0}")]
    DetectorFailed(String),

    #[error("Frame source failed: {0}")]
    FrameSourceFailed(String),

    #[error("Cannot open video: {0}")]
    VideoUnreadable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackingError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn detector_failed(msg: impl Into<String>) -> Self {
        Self::DetectorFailed(msg.into())
    }

    pub fn frame_source_failed(msg: impl Into<String>) -> Self {
        Self::FrameSourceFailed(msg.into())
    }
}
