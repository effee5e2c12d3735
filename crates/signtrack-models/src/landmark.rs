//! Landmark point types and track conventions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of landmarks a hand detector reports per hand.
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Index of the wrist point within a hand landmark sequence.
pub const WRIST: usize = 0;

/// Body pose landmark names in detector output order (33-point skeleton).
pub const POSE_LANDMARK_NAMES: [&str; 33] = [
    "nose",
    "left_eye_inner",
    "left_eye",
    "left_eye_outer",
    "right_eye_inner",
    "right_eye",
    "right_eye_outer",
    "left_ear",
    "right_ear",
    "mouth_left",
    "mouth_right",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_pinky",
    "right_pinky",
    "left_index",
    "right_index",
    "left_thumb",
    "right_thumb",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
    "left_heel",
    "right_heel",
    "left_foot_index",
    "right_foot_index",
];

/// A single 2D landmark point.
///
/// Coordinates are normalized to `[0, 1]` relative to frame width/height.
/// Values are immutable once produced by a detector; smoothing copies
/// points, it never mutates them in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Normalized X coordinate (0..1)
    pub x: f64,
    /// Normalized Y coordinate (0..1)
    pub y: f64,
    /// Confidence score (0..1); see [`TrackKind`] for per-kind semantics
    #[serde(rename = "c")]
    pub confidence: f64,
    /// Optional point name (e.g., "left_wrist")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Landmark {
    /// Create an unnamed landmark.
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self {
            x,
            y,
            confidence,
            name: None,
        }
    }

    /// Create a named landmark.
    pub fn named(x: f64, y: f64, confidence: f64, name: impl Into<String>) -> Self {
        Self {
            x,
            y,
            confidence,
            name: Some(name.into()),
        }
    }

    /// Check whether the point clears a confidence threshold.
    pub fn is_visible(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }
}

/// The four landmark tracks a frame detection carries.
///
/// Confidence semantics differ by kind and by what the underlying detector
/// can measure. The asymmetry is intentional and must be tolerated by
/// consumers, not papered over:
///
/// | kind         | confidence source                                     |
/// |--------------|-------------------------------------------------------|
/// | `Pose`       | per-point visibility reported by the pose model       |
/// | `LeftHand`   | presence, forced to 1.0 (no per-point score available)|
/// | `RightHand`  | presence, forced to 1.0 (no per-point score available)|
/// | `Face`       | presence, forced to 1.0 (no per-point score available)|
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Pose,
    LeftHand,
    RightHand,
    Face,
}

impl TrackKind {
    /// All track kinds in canonical order.
    pub const ALL: [TrackKind; 4] = [
        TrackKind::Pose,
        TrackKind::LeftHand,
        TrackKind::RightHand,
        TrackKind::Face,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Pose => "pose",
            TrackKind::LeftHand => "left_hand",
            TrackKind::RightHand => "right_hand",
            TrackKind::Face => "face",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_visibility() {
        let lm = Landmark::new(0.5, 0.5, 0.8);
        assert!(lm.is_visible(0.6));
        assert!(!lm.is_visible(0.9));
    }

    #[test]
    fn test_landmark_serialization_shape() {
        let lm = Landmark::new(0.25, 0.75, 0.9);
        let json = serde_json::to_value(&lm).unwrap();
        assert_eq!(json["x"], 0.25);
        assert_eq!(json["c"], 0.9);
        assert!(json.get("name").is_none());

        let named = Landmark::named(0.1, 0.2, 1.0, "left_wrist");
        let json = serde_json::to_value(&named).unwrap();
        assert_eq!(json["name"], "left_wrist");
    }

    #[test]
    fn test_track_kind_names() {
        assert_eq!(TrackKind::LeftHand.as_str(), "left_hand");
        assert_eq!(TrackKind::ALL.len(), 4);
    }

    #[test]
    fn test_pose_name_table_covers_wrists() {
        assert_eq!(POSE_LANDMARK_NAMES[15], "left_wrist");
        assert_eq!(POSE_LANDMARK_NAMES[16], "right_wrist");
    }
}
