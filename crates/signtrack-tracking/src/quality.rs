//! Quality scoring for smoothed tracking sequences.
//!
//! Four independent metrics, each in [0, 1], combined with fixed weights
//! into a single scalar plus a structured issue list. The weights are
//! deliberately not configurable here; any tuning belongs to the
//! orchestrator layer.

use signtrack_models::{FrameDetection, IssueKind, IssueSeverity, ScoredIssue, TrackKind, WRIST};

/// Metric weights (must sum to 1.0).
const WEIGHT_HAND_VISIBILITY: f64 = 0.4;
const WEIGHT_STABILITY: f64 = 0.3;
const WEIGHT_FACE_COVERAGE: f64 = 0.2;
const WEIGHT_AVG_CONFIDENCE: f64 = 0.1;

/// Issue thresholds.
const HAND_VISIBILITY_WARN_BELOW: f64 = 0.7;
const STABILITY_WARN_BELOW: f64 = 0.7;
const FACE_COVERAGE_INFO_BELOW: f64 = 0.5;

/// Jitter scale factor in the stability metric: `1 / (1 + 10 * sigma)`.
const STABILITY_JITTER_SCALE: f64 = 10.0;

/// Score a smoothed sequence, returning `(score, issues)`.
///
/// An empty sequence is the one reported error case: score 0.0 with a
/// single `empty` issue of severity `error`.
pub fn score_sequence(frames: &[FrameDetection]) -> (f64, Vec<ScoredIssue>) {
    if frames.is_empty() {
        return (0.0, vec![ScoredIssue::empty_input()]);
    }

    let mut issues = Vec::new();

    let hand_visibility = hand_visibility(frames);
    if hand_visibility < HAND_VISIBILITY_WARN_BELOW {
        issues.push(ScoredIssue::new(
            IssueKind::LowHandVisibility,
            IssueSeverity::Warning,
            Some(hand_visibility),
        ));
    }

    let stability = stability(frames);
    if stability < STABILITY_WARN_BELOW {
        issues.push(ScoredIssue::new(
            IssueKind::UnstableTracking,
            IssueSeverity::Warning,
            Some(stability),
        ));
    }

    let face_coverage = face_coverage(frames);
    if face_coverage < FACE_COVERAGE_INFO_BELOW {
        issues.push(ScoredIssue::new(
            IssueKind::LowFaceCoverage,
            IssueSeverity::Info,
            Some(face_coverage),
        ));
    }

    let avg_confidence = average_confidence(frames);

    let score = WEIGHT_HAND_VISIBILITY * hand_visibility
        + WEIGHT_STABILITY * stability
        + WEIGHT_FACE_COVERAGE * face_coverage
        + WEIGHT_AVG_CONFIDENCE * avg_confidence;

    (score, issues)
}

/// Fraction of hand-frames with a detected hand, averaged over both hands.
fn hand_visibility(frames: &[FrameDetection]) -> f64 {
    let left = frames.iter().filter(|f| f.has_track(TrackKind::LeftHand)).count();
    let right = frames.iter().filter(|f| f.has_track(TrackKind::RightHand)).count();
    (left + right) as f64 / (2 * frames.len()) as f64
}

/// Inverse wrist jitter over consecutive frames where the same hand is
/// present in both.
///
/// Fewer than two frames is trivially stable (1.0). Two or more frames with
/// no valid consecutive-pair displacement cannot be assessed and score 0.0.
fn stability(frames: &[FrameDetection]) -> f64 {
    if frames.len() < 2 {
        return 1.0;
    }

    let mut movements = Vec::new();
    for pair in frames.windows(2) {
        for kind in [TrackKind::LeftHand, TrackKind::RightHand] {
            let prev = pair[0].track(kind);
            let curr = pair[1].track(kind);
            if prev.is_empty() || curr.is_empty() {
                continue;
            }
            let dx = curr[WRIST].x - prev[WRIST].x;
            let dy = curr[WRIST].y - prev[WRIST].y;
            movements.push((dx * dx + dy * dy).sqrt());
        }
    }

    if movements.is_empty() {
        return 0.0;
    }

    1.0 / (1.0 + STABILITY_JITTER_SCALE * std_deviation(&movements))
}

/// Fraction of frames with a detected face.
fn face_coverage(frames: &[FrameDetection]) -> f64 {
    let with_face = frames.iter().filter(|f| f.has_track(TrackKind::Face)).count();
    with_face as f64 / frames.len() as f64
}

/// Mean of all per-frame scalar confidences, excluding exact zeros.
///
/// A zero scalar means "track absent", not "measured and low", so it must
/// not drag the average down.
fn average_confidence(frames: &[FrameDetection]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for frame in frames {
        for kind in TrackKind::ALL {
            let confidence = frame.confidence(kind);
            if confidence > 0.0 {
                sum += confidence;
                count += 1;
            }
        }
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Population standard deviation.
fn std_deviation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use signtrack_models::Landmark;

    fn hand_at(x: f64, y: f64, confidence: f64) -> Vec<Landmark> {
        (0..21).map(|_| Landmark::new(x, y, confidence)).collect()
    }

    fn face(confidence: f64) -> Vec<Landmark> {
        (0..468).map(|_| Landmark::new(0.5, 0.3, confidence)).collect()
    }

    fn frame(index: u32) -> FrameDetection {
        FrameDetection::new(index, index as f64 / 25.0, (1280, 720))
    }

    #[test]
    fn test_empty_sequence_is_an_error_case() {
        let (score, issues) = score_sequence(&[]);
        assert_eq!(score, 0.0);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::Empty);
        assert_eq!(issues[0].severity, IssueSeverity::Error);
    }

    #[test]
    fn test_score_bounded_for_full_visibility() {
        let frames: Vec<_> = (0..10)
            .map(|i| {
                let mut f = frame(i);
                f.assign(TrackKind::LeftHand, hand_at(0.3, 0.5, 1.0));
                f.assign(TrackKind::RightHand, hand_at(0.7, 0.5, 1.0));
                f.assign(TrackKind::Face, face(1.0));
                f
            })
            .collect();
        let (score, issues) = score_sequence(&frames);

        // Both hands and face everywhere, constant positions, confidence 1:
        // every metric is 1.0 and the weights sum to the perfect score.
        assert!((score - 1.0).abs() < 1e-12);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_hand_visibility_extremes() {
        // Both hands in every frame -> 1.0
        let full: Vec<_> = (0..4)
            .map(|i| {
                let mut f = frame(i);
                f.assign(TrackKind::LeftHand, hand_at(0.3, 0.5, 1.0));
                f.assign(TrackKind::RightHand, hand_at(0.7, 0.5, 1.0));
                f
            })
            .collect();
        assert_eq!(hand_visibility(&full), 1.0);

        // No hands at all -> 0.0
        let none: Vec<_> = (0..4).map(frame).collect();
        assert_eq!(hand_visibility(&none), 0.0);
    }

    #[test]
    fn test_right_hand_only_scenario() {
        // Three frames, right hand at a constant position with confidence
        // 0.9, no face: hand visibility 0.5, face coverage 0.0.
        let frames: Vec<_> = (0..3)
            .map(|i| {
                let mut f = frame(i);
                f.assign(TrackKind::RightHand, hand_at(0.5, 0.5, 0.9));
                f
            })
            .collect();
        let (score, issues) = score_sequence(&frames);

        assert_eq!(hand_visibility(&frames), 0.5);
        assert_eq!(face_coverage(&frames), 0.0);
        // Constant wrist -> zero jitter -> trivially stable
        assert_eq!(stability(&frames), 1.0);
        // Only the right-hand scalar is non-zero
        assert!((average_confidence(&frames) - 0.9).abs() < 1e-9);

        let expected = 0.4 * 0.5 + 0.3 * 1.0 + 0.2 * 0.0 + 0.1 * 0.9;
        assert!((score - expected).abs() < 1e-12);

        let kinds: Vec<_> = issues.iter().map(|i| i.kind).collect();
        assert!(kinds.contains(&IssueKind::LowHandVisibility));
        assert!(kinds.contains(&IssueKind::LowFaceCoverage));
        assert!(!kinds.contains(&IssueKind::UnstableTracking));
    }

    #[test]
    fn test_stability_single_frame_is_trivial() {
        let mut f = frame(0);
        f.assign(TrackKind::LeftHand, hand_at(0.2, 0.2, 1.0));
        assert_eq!(stability(&[f]), 1.0);
    }

    #[test]
    fn test_stability_without_valid_pairs_is_worst_case() {
        // Hands alternate, so no consecutive pair has the same hand twice.
        let mut a = frame(0);
        a.assign(TrackKind::LeftHand, hand_at(0.2, 0.2, 1.0));
        let mut b = frame(1);
        b.assign(TrackKind::RightHand, hand_at(0.8, 0.2, 1.0));
        assert_eq!(stability(&[a, b]), 0.0);
    }

    #[test]
    fn test_stability_penalizes_jitter() {
        // Wrist alternates large jumps with near-stillness; the
        // displacement deviation is high.
        let positions = [0.1, 0.6, 0.61, 0.2, 0.21];
        let frames: Vec<_> = positions
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let mut f = frame(i as u32);
                f.assign(TrackKind::RightHand, hand_at(x, 0.5, 1.0));
                f
            })
            .collect();

        let jittery = stability(&frames);
        assert!(jittery < 0.7, "expected jittery sequence, got {}", jittery);

        let steady: Vec<_> = (0..5)
            .map(|i| {
                let mut f = frame(i);
                f.assign(TrackKind::RightHand, hand_at(0.1 + 0.01 * i as f64, 0.5, 1.0));
                f
            })
            .collect();
        // Uniform motion has zero displacement deviation
        assert_eq!(stability(&steady), 1.0);
    }

    #[test]
    fn test_average_confidence_ignores_zeros() {
        // Pose absent (0.0 scalar) must not dilute the average.
        let frames: Vec<_> = (0..2)
            .map(|i| {
                let mut f = frame(i);
                f.assign(TrackKind::RightHand, hand_at(0.5, 0.5, 0.8));
                f
            })
            .collect();
        assert!((average_confidence(&frames) - 0.8).abs() < 1e-9);

        // All tracks absent: nothing to average.
        let empty: Vec<_> = (0..2).map(frame).collect();
        assert_eq!(average_confidence(&empty), 0.0);
    }

    #[test]
    fn test_score_is_deterministic_and_bounded() {
        let frames: Vec<_> = (0..6)
            .map(|i| {
                let mut f = frame(i);
                if i % 2 == 0 {
                    f.assign(TrackKind::LeftHand, hand_at(0.3 + 0.05 * i as f64, 0.5, 1.0));
                }
                f.assign(TrackKind::Face, face(1.0));
                f
            })
            .collect();

        let (first, _) = score_sequence(&frames);
        let (second, _) = score_sequence(&frames);
        assert_eq!(first, second);
        assert!((0.0..=1.0).contains(&first));
    }
}
