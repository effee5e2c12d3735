//! Structured job logging utilities.

use tracing::{error, info, warn, Span};

use signtrack_models::JobId;

/// Job logger with consistent contextual fields.
///
/// Every lifecycle message carries the job ID and the video's
/// label/filename so batch logs stay greppable per job.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    video: String,
}

impl JobLogger {
    /// Create a logger for one job run.
    pub fn new(job_id: &JobId, label: &str, filename: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            video: format!("{label}/{filename}"),
        }
    }

    /// Log the start of a job run.
    pub fn log_start(&self, message: &str) {
        info!(job_id = %self.job_id, video = %self.video, "Job started: {}", message);
    }

    /// Log a progress update during the run.
    pub fn log_progress(&self, message: &str) {
        info!(job_id = %self.job_id, video = %self.video, "Job progress: {}", message);
    }

    /// Log a warning during the run.
    pub fn log_warning(&self, message: &str) {
        warn!(job_id = %self.job_id, video = %self.video, "Job warning: {}", message);
    }

    /// Log a job failure.
    pub fn log_error(&self, message: &str) {
        error!(job_id = %self.job_id, video = %self.video, "Job failed: {}", message);
    }

    /// Log successful completion.
    pub fn log_completion(&self, message: &str) {
        info!(job_id = %self.job_id, video = %self.video, "Job completed: {}", message);
    }

    /// Create a tracing span for this job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("job", job_id = %self.job_id, video = %self.video)
    }
}
