//! Sequential batch execution over queued jobs.

use std::path::Path;

use tracing::{info, warn};

use signtrack_models::{JobOutcome, NewVideo};
use signtrack_store::{sha256_file, JobFilter, JobListing};
use signtrack_tracking::{ProviderKind, ProviderRegistry, ProviderSettings};

use crate::error::{WorkerError, WorkerResult};
use crate::pipeline::Pipeline;

/// Success/failure counts for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Runs batches of jobs through the pipeline with a shared provider.
///
/// The provider is resolved from the registry once per batch — detector
/// instances are expensive — and released exactly once at batch end,
/// regardless of how individual jobs fared.
pub struct BatchExecutor {
    pipeline: Pipeline,
    registry: ProviderRegistry,
    provider_kind: ProviderKind,
    settings: ProviderSettings,
}

impl BatchExecutor {
    pub fn new(
        pipeline: Pipeline,
        registry: ProviderRegistry,
        provider_kind: ProviderKind,
        settings: ProviderSettings,
    ) -> Self {
        Self {
            pipeline,
            registry,
            provider_kind,
            settings,
        }
    }

    /// The pipeline this executor drives.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Process every job matching the filter, sequentially.
    ///
    /// A failing job is recorded and skipped; the batch never aborts on one
    /// job's failure.
    pub async fn run(&self, filter: &JobFilter) -> WorkerResult<BatchSummary> {
        let jobs = self.pipeline.ledger().list_jobs(filter).await?;
        if jobs.is_empty() {
            info!("No jobs matched the filter");
            return Ok(BatchSummary::default());
        }

        let mut provider = self.registry.resolve(self.provider_kind, &self.settings)?;
        info!(
            count = jobs.len(),
            provider = provider.name(),
            "Processing jobs"
        );

        let mut summary = BatchSummary::default();
        for listing in &jobs {
            match self.pipeline.run_job(provider.as_mut(), listing).await {
                Ok(_) => summary.succeeded += 1,
                Err(err) => {
                    warn!(
                        job_id = %listing.job.id,
                        error = %err,
                        "Job failed; continuing batch"
                    );
                    summary.failed += 1;
                }
            }
        }

        provider.close();
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Batch finished"
        );
        Ok(summary)
    }

    /// Register and process a single video file directly.
    ///
    /// Unlike [`Self::run`], the error of a failing job is re-raised after
    /// being recorded, so interactive callers see it.
    pub async fn run_single(&self, label: &str, video_path: &Path) -> WorkerResult<JobOutcome> {
        let filename = video_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                WorkerError::input(format!("Not a video file path: {}", video_path.display()))
            })?;

        let mut new_video =
            NewVideo::local(label, filename, video_path.to_string_lossy().into_owned());
        // Hashing is best-effort; an unreadable file still fails properly
        // inside the job run.
        if let Ok(hash) = sha256_file(video_path) {
            new_video = new_video.with_content_hash(hash);
        }

        let ensured = self
            .pipeline
            .ledger()
            .ensure_video_and_create_job(&new_video)
            .await?;
        let listing = JobListing {
            job: ensured.job,
            label: ensured.video.label,
            filename: ensured.video.filename,
            local_path: ensured.video.local_path,
        };

        let mut provider = self.registry.resolve(self.provider_kind, &self.settings)?;
        let result = self.pipeline.run_job(provider.as_mut(), &listing).await;
        provider.close();
        result
    }
}
