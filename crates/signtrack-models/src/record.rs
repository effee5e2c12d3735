//! Flat serialization records written by the artifact writers.
//!
//! These are the logical on-disk shapes; codec internals (columnar layout,
//! compression) belong to the writers that consume them.

use serde::{Deserialize, Serialize};

use crate::issue::ScoredIssue;
use crate::landmark::Landmark;

/// Version tag stamped into every run's metadata record.
pub const FORMAT_VERSION: &str = "v1";

/// A landmark point in wire form: `{x, y, c[, name]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
    pub c: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&Landmark> for PointRecord {
    fn from(lm: &Landmark) -> Self {
        Self {
            x: lm.x,
            y: lm.y,
            c: lm.confidence,
            name: lm.name.clone(),
        }
    }
}

/// Frame dimensions in wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSizeRecord {
    pub width: u32,
    pub height: u32,
}

/// Per-track confidence scalars grouped under one `confidence` map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceRecord {
    pub pose: f64,
    pub left_hand: f64,
    pub right_hand: f64,
    pub face: f64,
}

/// One frame of tracking output in its persisted shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub frame_index: u32,
    pub time_s: f64,
    pub image_size: ImageSizeRecord,
    pub pose_landmarks: Vec<PointRecord>,
    pub left_hand_landmarks: Vec<PointRecord>,
    pub right_hand_landmarks: Vec<PointRecord>,
    pub face_landmarks: Vec<PointRecord>,
    pub confidence: ConfidenceRecord,
}

/// Metadata record written next to a run's tracking artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub label: String,
    pub filename: String,
    pub video_path: String,
    pub quality_score: f64,
    pub issues: Vec<ScoredIssue>,
    pub frame_count: u32,
    pub provider_name: String,
    pub format_version: String,
}

/// One row of the export index over completed jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEntry {
    pub label: String,
    pub filename: String,
    pub video_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_count: Option<u32>,
    pub tracking_path: String,
}
