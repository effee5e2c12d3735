//! Per-job pipeline orchestration.
//!
//! Drives one job to completion: mark `processing`, collect detections from
//! the provider, smooth, score, persist artifacts, record issues, and mark
//! `done`. Any error raised along the way is caught at the job boundary and
//! converted into a `failed` transition carrying the error's message.

use std::path::Path;

use tracing::error;

use signtrack_models::{FrameDetection, FrameRecord, JobOutcome, RunMetadata, FORMAT_VERSION};
use signtrack_store::{JobListing, Ledger, TrackStore};
use signtrack_tracking::{
    score_sequence, FrameSource, SequenceSmoother, SmoothingConfig, TrackingProvider,
};

use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;

/// The per-job processing pipeline.
pub struct Pipeline {
    ledger: Ledger,
    store: TrackStore,
    frames: Box<dyn FrameSource>,
    smoothing: SmoothingConfig,
    target_fps: f64,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("smoothing", &self.smoothing)
            .field("target_fps", &self.target_fps)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Create a pipeline, rejecting invalid smoothing parameters before any
    /// job runs.
    pub fn new(
        ledger: Ledger,
        store: TrackStore,
        frames: Box<dyn FrameSource>,
        smoothing: SmoothingConfig,
        target_fps: f64,
    ) -> WorkerResult<Self> {
        smoothing
            .validate()
            .map_err(|e| WorkerError::config(e.to_string()))?;
        Ok(Self {
            ledger,
            store,
            frames,
            smoothing,
            target_fps,
        })
    }

    /// The ledger this pipeline writes to.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Run one job to completion.
    ///
    /// On failure the job is marked `failed` with the error's message and
    /// the error is returned to the caller: the batch loop logs and
    /// continues, single-job callers re-raise.
    pub async fn run_job(
        &self,
        provider: &mut dyn TrackingProvider,
        listing: &JobListing,
    ) -> WorkerResult<JobOutcome> {
        let logger = JobLogger::new(&listing.job.id, &listing.label, &listing.filename);

        self.ledger.mark_processing(&listing.job.id).await?;
        logger.log_start("Tracking frames");

        match self.process(provider, listing).await {
            Ok(outcome) => {
                logger.log_completion(&format!(
                    "quality {:.2} over {} frames",
                    outcome.quality_score, outcome.frame_count
                ));
                Ok(outcome)
            }
            Err(err) => {
                logger.log_error(&err.to_string());
                // Recording the failure must not mask the original error.
                if let Err(ledger_err) = self
                    .ledger
                    .mark_failed(&listing.job.id, &err.to_string())
                    .await
                {
                    error!(
                        job_id = %listing.job.id,
                        error = %ledger_err,
                        "Failed to record job failure"
                    );
                }
                Err(err)
            }
        }
    }

    async fn process(
        &self,
        provider: &mut dyn TrackingProvider,
        listing: &JobListing,
    ) -> WorkerResult<JobOutcome> {
        let video_path = Path::new(&listing.local_path);

        let mut detections = Vec::new();
        for frame in self.frames.open(video_path, self.target_fps)? {
            let frame = frame?;
            let detection = provider.detect(&frame.image, frame.frame_index, frame.time_s)?;
            detections.push(detection);
        }

        if detections.is_empty() {
            return Err(WorkerError::input(format!(
                "No frames extracted from {}",
                video_path.display()
            )));
        }

        // Smoothing state lives for exactly one run.
        let mut smoother = SequenceSmoother::new(self.smoothing.clone())?;
        let smoothed = smoother.smooth(&detections);

        let (quality_score, issues) = score_sequence(&smoothed);

        let records: Vec<FrameRecord> = smoothed.iter().map(FrameDetection::to_record).collect();
        let metadata = RunMetadata {
            label: listing.label.clone(),
            filename: listing.filename.clone(),
            video_path: listing.local_path.clone(),
            quality_score,
            issues: issues.clone(),
            frame_count: smoothed.len() as u32,
            provider_name: provider.name().to_string(),
            format_version: FORMAT_VERSION.to_string(),
        };
        self.store
            .write_run(&listing.job.video_id, &records, &metadata)?;

        for issue in &issues {
            self.ledger.add_issue(&listing.job.id, issue, None).await?;
        }

        let outcome = JobOutcome {
            quality_score,
            frame_count: smoothed.len() as u32,
            provider_name: provider.name().to_string(),
            output_format: self.store.output_format(),
        };
        self.ledger.mark_done(&listing.job.id, &outcome).await?;

        Ok(outcome)
    }
}
