//! Shared data models for the SignTrack backend.
//!
//! This crate provides Serde-serializable types for:
//! - Landmark points and per-frame detection results
//! - Videos, processing jobs, and the job status state machine
//! - Quality issues raised by the scoring engine
//! - Flat serialization records written by the artifact writers

pub mod frame;
pub mod issue;
pub mod job;
pub mod landmark;
pub mod record;
pub mod video;

// Re-export common types
pub use frame::{is_well_formed_sequence, FrameDetection};
pub use issue::{IssueId, IssueKind, IssueSeverity, QualityIssue, ScoredIssue};
pub use job::{Job, JobId, JobOutcome, JobStatus, UnknownStatus};
pub use landmark::{Landmark, TrackKind, HAND_LANDMARK_COUNT, POSE_LANDMARK_NAMES, WRIST};
pub use record::{
    ConfidenceRecord, ExportEntry, FrameRecord, ImageSizeRecord, PointRecord, RunMetadata,
    FORMAT_VERSION,
};
pub use video::{NewVideo, Video, VideoId};
