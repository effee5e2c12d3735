//! Per-frame detection results.

use serde::{Deserialize, Serialize};

use crate::landmark::{Landmark, TrackKind};
use crate::record::{ConfidenceRecord, FrameRecord, ImageSizeRecord, PointRecord};

/// Complete detection result for one processed frame.
///
/// `frame_index` is 0-based and contiguous in output order; it is not
/// necessarily contiguous in the source video when frames were skipped for
/// FPS downsampling. A detection is created once by the detector adapter
/// and never mutated in place — smoothing produces a new sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameDetection {
    pub frame_index: u32,
    pub time_s: f64,
    /// Frame dimensions as (width, height)
    pub image_size: (u32, u32),

    /// Body pose landmarks
    #[serde(default)]
    pub pose: Vec<Landmark>,
    /// Left hand landmarks (0 or 21 entries)
    #[serde(default)]
    pub left_hand: Vec<Landmark>,
    /// Right hand landmarks (0 or 21 entries)
    #[serde(default)]
    pub right_hand: Vec<Landmark>,
    /// Face landmarks (0 or N entries)
    #[serde(default)]
    pub face: Vec<Landmark>,

    /// Per-sequence confidence scalars, each the arithmetic mean of the
    /// sequence's per-point confidences (0.0 when the sequence is empty)
    #[serde(default)]
    pub pose_confidence: f64,
    #[serde(default)]
    pub left_hand_confidence: f64,
    #[serde(default)]
    pub right_hand_confidence: f64,
    #[serde(default)]
    pub face_confidence: f64,
}

impl FrameDetection {
    /// Create an empty detection for a frame.
    pub fn new(frame_index: u32, time_s: f64, image_size: (u32, u32)) -> Self {
        Self {
            frame_index,
            time_s,
            image_size,
            pose: Vec::new(),
            left_hand: Vec::new(),
            right_hand: Vec::new(),
            face: Vec::new(),
            pose_confidence: 0.0,
            left_hand_confidence: 0.0,
            right_hand_confidence: 0.0,
            face_confidence: 0.0,
        }
    }

    /// Mean per-point confidence of a landmark sequence (0.0 when empty).
    pub fn mean_confidence(points: &[Landmark]) -> f64 {
        if points.is_empty() {
            return 0.0;
        }
        points.iter().map(|lm| lm.confidence).sum::<f64>() / points.len() as f64
    }

    /// Assign a track's landmarks, recomputing its confidence scalar.
    pub fn assign(&mut self, kind: TrackKind, points: Vec<Landmark>) {
        let confidence = Self::mean_confidence(&points);
        match kind {
            TrackKind::Pose => {
                self.pose = points;
                self.pose_confidence = confidence;
            }
            TrackKind::LeftHand => {
                self.left_hand = points;
                self.left_hand_confidence = confidence;
            }
            TrackKind::RightHand => {
                self.right_hand = points;
                self.right_hand_confidence = confidence;
            }
            TrackKind::Face => {
                self.face = points;
                self.face_confidence = confidence;
            }
        }
    }

    /// Landmarks for a track kind.
    pub fn track(&self, kind: TrackKind) -> &[Landmark] {
        match kind {
            TrackKind::Pose => &self.pose,
            TrackKind::LeftHand => &self.left_hand,
            TrackKind::RightHand => &self.right_hand,
            TrackKind::Face => &self.face,
        }
    }

    /// Confidence scalar for a track kind.
    pub fn confidence(&self, kind: TrackKind) -> f64 {
        match kind {
            TrackKind::Pose => self.pose_confidence,
            TrackKind::LeftHand => self.left_hand_confidence,
            TrackKind::RightHand => self.right_hand_confidence,
            TrackKind::Face => self.face_confidence,
        }
    }

    /// Whether a track produced any landmarks for this frame.
    pub fn has_track(&self, kind: TrackKind) -> bool {
        !self.track(kind).is_empty()
    }

    /// Convert into the flat serialization record written to disk.
    pub fn to_record(&self) -> FrameRecord {
        FrameRecord {
            frame_index: self.frame_index,
            time_s: self.time_s,
            image_size: ImageSizeRecord {
                width: self.image_size.0,
                height: self.image_size.1,
            },
            pose_landmarks: self.pose.iter().map(PointRecord::from).collect(),
            left_hand_landmarks: self.left_hand.iter().map(PointRecord::from).collect(),
            right_hand_landmarks: self.right_hand.iter().map(PointRecord::from).collect(),
            face_landmarks: self.face.iter().map(PointRecord::from).collect(),
            confidence: ConfidenceRecord {
                pose: self.pose_confidence,
                left_hand: self.left_hand_confidence,
                right_hand: self.right_hand_confidence,
                face: self.face_confidence,
            },
        }
    }
}

/// Check the sequence invariants shared by all processed outputs: strictly
/// increasing frame indices and a single image size.
pub fn is_well_formed_sequence(frames: &[FrameDetection]) -> bool {
    let Some(first) = frames.first() else {
        return true;
    };
    frames.iter().all(|f| f.image_size == first.image_size)
        && frames.windows(2).all(|w| w[0].frame_index < w[1].frame_index)
}
