//! Worker error types.
//!
//! Every error raised while a job is running is converted into a `failed`
//! ledger transition at the job boundary; the variants here mirror that
//! taxonomy: bad input, external detector failure, persistence failure, and
//! configuration errors (which are rejected before any job runs).

use thiserror::Error;

use signtrack_store::StoreError;
use signtrack_tracking::TrackingError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Input error: {0}")]
    Input(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tracking error: {0}")]
    Tracking(#[from] TrackingError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
