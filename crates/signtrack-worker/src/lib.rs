//! Batch worker for the SignTrack tracking pipeline.
//!
//! Composes the tracking crates into per-job runs: obtain detections from a
//! provider, smooth, score, persist artifacts, and keep the job ledger
//! consistent. One job is processed fully before the next begins; a failing
//! job never aborts the batch.

pub mod config;
pub mod error;
pub mod executor;
pub mod ingest;
pub mod logging;
pub mod pipeline;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::{BatchExecutor, BatchSummary};
pub use ingest::{ingest_manifest, read_manifest, IngestSummary, ManifestRecord};
pub use logging::JobLogger;
pub use pipeline::Pipeline;
