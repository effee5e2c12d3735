//! Confidence-weighted temporal smoothing of landmark sequences.
//!
//! One exponential filter per (track kind, point index, axis) tuple, owned
//! by a [`SequenceSmoother`] that is constructed fresh for every pipeline
//! run. Only landmark geometry is altered; frame indices, timestamps, image
//! sizes, per-point confidences, and the per-track confidence scalars pass
//! through untouched.

use std::collections::HashMap;

use signtrack_models::{FrameDetection, Landmark, TrackKind};

use crate::error::{TrackingError, TrackingResult};

/// Coordinate axis of a landmark track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

/// Key of one scalar filter: (track kind, point index, axis).
type FilterKey = (TrackKind, usize, Axis);

/// Exponential moving average filter with confidence weighting.
///
/// The first observation initializes the state and passes through
/// unsmoothed. Subsequent updates blend with `eff_alpha = alpha *
/// confidence`, so a low- but accepted-confidence sample pulls less toward
/// the raw value than a high-confidence one.
#[derive(Debug, Clone)]
pub struct EmaFilter {
    alpha: f64,
    last: Option<f64>,
}

impl EmaFilter {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, last: None }
    }

    /// Update with a new measurement, returning the smoothed value.
    pub fn update(&mut self, value: f64, confidence: f64) -> f64 {
        let smoothed = match self.last {
            None => value,
            Some(prev) => {
                let eff_alpha = self.alpha * confidence;
                eff_alpha * value + (1.0 - eff_alpha) * prev
            }
        };
        self.last = Some(smoothed);
        smoothed
    }

    /// Last smoothed value, if any observation has been accepted.
    pub fn last(&self) -> Option<f64> {
        self.last
    }
}

/// Bounds the frame-to-frame delta of an already-smoothed value.
///
/// Independent second filter stage per axis; the first observation passes
/// through unclamped.
#[derive(Debug, Clone)]
pub struct VelocityClamp {
    max_change: f64,
    last: Option<f64>,
}

impl VelocityClamp {
    pub fn new(max_change: f64) -> Self {
        Self {
            max_change,
            last: None,
        }
    }

    /// Clamp the delta against the previous output and update state.
    pub fn update(&mut self, value: f64) -> f64 {
        let clamped = match self.last {
            None => value,
            Some(prev) => prev + (value - prev).clamp(-self.max_change, self.max_change),
        };
        self.last = Some(clamped);
        clamped
    }
}

/// Per-track-kind EMA smoothing factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackAlphas {
    pub pose: f64,
    pub left_hand: f64,
    pub right_hand: f64,
    pub face: f64,
}

impl TrackAlphas {
    pub fn alpha_for(&self, kind: TrackKind) -> f64 {
        match kind {
            TrackKind::Pose => self.pose,
            TrackKind::LeftHand => self.left_hand,
            TrackKind::RightHand => self.right_hand,
            TrackKind::Face => self.face,
        }
    }

    /// Same factor for every track kind.
    pub fn uniform(alpha: f64) -> Self {
        Self {
            pose: alpha,
            left_hand: alpha,
            right_hand: alpha,
            face: alpha,
        }
    }
}

impl Default for TrackAlphas {
    fn default() -> Self {
        Self {
            pose: 0.35,
            left_hand: 0.55,
            right_hand: 0.55,
            face: 0.40,
        }
    }
}

/// Smoothing parameters, validated before any job runs.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingConfig {
    pub alphas: TrackAlphas,
    /// Points below this confidence hold the last smoothed value instead of
    /// updating the filter
    pub min_confidence: f64,
    /// Max change per frame in normalized coordinates, when clamping is on
    pub velocity_clamp: Option<f64>,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            alphas: TrackAlphas::default(),
            min_confidence: 0.5,
            velocity_clamp: None,
        }
    }
}

impl SmoothingConfig {
    /// Reject parameters outside their valid ranges.
    pub fn validate(&self) -> TrackingResult<()> {
        for kind in TrackKind::ALL {
            let alpha = self.alphas.alpha_for(kind);
            if !(0.0..=1.0).contains(&alpha) {
                return Err(TrackingError::invalid_config(format!(
                    "EMA alpha for {} must be in [0, 1], got {}",
                    kind, alpha
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(TrackingError::invalid_config(format!(
                "min_confidence must be in [0, 1], got {}",
                self.min_confidence
            )));
        }
        if let Some(clamp) = self.velocity_clamp {
            if !clamp.is_finite() || clamp <= 0.0 {
                return Err(TrackingError::invalid_config(format!(
                    "velocity_clamp must be positive and finite, got {}",
                    clamp
                )));
            }
        }
        Ok(())
    }
}

/// Temporal smoother for one detection sequence.
///
/// Filter state is keyed by (track kind, point index, axis) and lives only
/// as long as the smoother: construct a fresh instance per pipeline run. A
/// track that disappears keeps its filters frozen across the gap, so on
/// reappearance smoothing resumes from the pre-gap value — the resulting
/// catch-up transient is accepted behavior.
#[derive(Debug)]
pub struct SequenceSmoother {
    config: SmoothingConfig,
    filters: HashMap<FilterKey, EmaFilter>,
    clamps: HashMap<FilterKey, VelocityClamp>,
}

impl SequenceSmoother {
    /// Create a smoother, rejecting invalid parameters up front.
    pub fn new(config: SmoothingConfig) -> TrackingResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            filters: HashMap::new(),
            clamps: HashMap::new(),
        })
    }

    /// Smooth an ordered detection sequence, producing a new sequence of
    /// equal length. An empty input yields an empty output.
    pub fn smooth(&mut self, frames: &[FrameDetection]) -> Vec<FrameDetection> {
        frames.iter().map(|frame| self.smooth_frame(frame)).collect()
    }

    fn smooth_frame(&mut self, frame: &FrameDetection) -> FrameDetection {
        let mut out = frame.clone();
        for kind in TrackKind::ALL {
            let alpha = self.config.alphas.alpha_for(kind);
            let points = frame.track(kind);
            if points.is_empty() {
                continue;
            }
            let smoothed: Vec<Landmark> = points
                .iter()
                .enumerate()
                .map(|(idx, lm)| Landmark {
                    x: self.smooth_axis(kind, idx, Axis::X, alpha, lm.x, lm.confidence),
                    y: self.smooth_axis(kind, idx, Axis::Y, alpha, lm.y, lm.confidence),
                    confidence: lm.confidence,
                    name: lm.name.clone(),
                })
                .collect();
            // Only geometry changes; confidence scalars are not recomputed.
            match kind {
                TrackKind::Pose => out.pose = smoothed,
                TrackKind::LeftHand => out.left_hand = smoothed,
                TrackKind::RightHand => out.right_hand = smoothed,
                TrackKind::Face => out.face = smoothed,
            }
        }
        out
    }

    fn smooth_axis(
        &mut self,
        kind: TrackKind,
        point: usize,
        axis: Axis,
        alpha: f64,
        raw: f64,
        confidence: f64,
    ) -> f64 {
        let key = (kind, point, axis);
        let filter = self
            .filters
            .entry(key)
            .or_insert_with(|| EmaFilter::new(alpha));

        let value = if confidence >= self.config.min_confidence {
            filter.update(raw, confidence)
        } else {
            // Hold: emit the last smoothed value without feeding the filter
            // the low-confidence sample. With no prior state, fall back to
            // the raw value for this frame only.
            filter.last().unwrap_or(raw)
        };

        match self.config.velocity_clamp {
            Some(max_change) => self
                .clamps
                .entry(key)
                .or_insert_with(|| VelocityClamp::new(max_change))
                .update(value),
            None => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signtrack_models::{is_well_formed_sequence, WRIST};

    fn hand_at(x: f64, y: f64, confidence: f64) -> Vec<Landmark> {
        (0..21)
            .map(|i| Landmark::new(x + 0.001 * i as f64, y, confidence))
            .collect()
    }

    fn frame_with_right_hand(index: u32, x: f64, y: f64, confidence: f64) -> FrameDetection {
        let mut frame = FrameDetection::new(index, index as f64 / 25.0, (1280, 720));
        frame.assign(TrackKind::RightHand, hand_at(x, y, confidence));
        frame
    }

    fn smoother(alpha: f64, min_confidence: f64) -> SequenceSmoother {
        SequenceSmoother::new(SmoothingConfig {
            alphas: TrackAlphas::uniform(alpha),
            min_confidence,
            velocity_clamp: None,
        })
        .unwrap()
    }

    #[test]
    fn test_empty_sequence() {
        let mut s = smoother(0.5, 0.6);
        assert!(s.smooth(&[]).is_empty());
    }

    #[test]
    fn test_structure_preserved() {
        let frames: Vec<_> = (0..5)
            .map(|i| frame_with_right_hand(i, 0.1 * i as f64, 0.5, 0.9))
            .collect();
        let mut s = smoother(0.5, 0.6);
        let out = s.smooth(&frames);

        assert_eq!(out.len(), frames.len());
        assert!(is_well_formed_sequence(&out));
        for (raw, smoothed) in frames.iter().zip(&out) {
            assert_eq!(smoothed.frame_index, raw.frame_index);
            assert_eq!(smoothed.time_s, raw.time_s);
            assert_eq!(smoothed.image_size, raw.image_size);
            assert_eq!(smoothed.right_hand_confidence, raw.right_hand_confidence);
            assert_eq!(smoothed.right_hand.len(), raw.right_hand.len());
            // Per-point confidence passes through unmodified
            for (a, b) in raw.right_hand.iter().zip(&smoothed.right_hand) {
                assert_eq!(a.confidence, b.confidence);
            }
        }
    }

    #[test]
    fn test_constant_input_smooths_to_constant() {
        let frames: Vec<_> = (0..3)
            .map(|i| frame_with_right_hand(i, 0.5, 0.5, 0.9))
            .collect();
        let mut s = smoother(0.5, 0.6);
        let out = s.smooth(&frames);

        for frame in &out {
            let wrist = &frame.right_hand[WRIST];
            assert!((wrist.x - 0.5).abs() < 1e-12);
            assert!((wrist.y - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_first_observation_passes_through() {
        let frames = vec![frame_with_right_hand(0, 0.3, 0.7, 0.9)];
        let mut s = smoother(0.5, 0.6);
        let out = s.smooth(&frames);
        assert_eq!(out[0].right_hand[WRIST].x, 0.3);
        assert_eq!(out[0].right_hand[WRIST].y, 0.7);
    }

    #[test]
    fn test_confidence_weighted_update() {
        // Second frame jumps; lower confidence should pull less toward the
        // raw sample.
        let mut high = smoother(0.5, 0.1);
        let out_high = high.smooth(&[
            frame_with_right_hand(0, 0.2, 0.5, 1.0),
            frame_with_right_hand(1, 0.8, 0.5, 1.0),
        ]);
        let mut low = smoother(0.5, 0.1);
        let out_low = low.smooth(&[
            frame_with_right_hand(0, 0.2, 0.5, 1.0),
            frame_with_right_hand(1, 0.8, 0.5, 0.4),
        ]);

        // eff_alpha 0.5: 0.5*0.8 + 0.5*0.2 = 0.5
        assert!((out_high[1].right_hand[WRIST].x - 0.5).abs() < 1e-12);
        // eff_alpha 0.2: 0.2*0.8 + 0.8*0.2 = 0.32
        assert!((out_low[1].right_hand[WRIST].x - 0.32).abs() < 1e-12);
    }

    #[test]
    fn test_hold_below_min_confidence() {
        let frames = vec![
            frame_with_right_hand(0, 0.2, 0.5, 0.9),
            frame_with_right_hand(1, 0.2, 0.5, 0.9),
            // Confidence drop: raw jumps but output must hold
            frame_with_right_hand(2, 0.9, 0.5, 0.3),
            frame_with_right_hand(3, 0.9, 0.5, 0.3),
            // Recovery: filter state was untouched by the held frames
            frame_with_right_hand(4, 0.2, 0.5, 0.9),
        ];
        let mut s = smoother(0.5, 0.6);
        let out = s.smooth(&frames);

        let held = out[1].right_hand[WRIST].x;
        assert_eq!(out[2].right_hand[WRIST].x, held);
        assert_eq!(out[3].right_hand[WRIST].x, held);
        // The low-confidence samples never entered the filter, so frame 4
        // smooths against the pre-drop value.
        assert!((out[4].right_hand[WRIST].x - held).abs() < 1e-9);
    }

    #[test]
    fn test_hold_without_state_falls_back_to_raw() {
        let frames = vec![frame_with_right_hand(0, 0.4, 0.6, 0.2)];
        let mut s = smoother(0.5, 0.6);
        let out = s.smooth(&frames);
        assert_eq!(out[0].right_hand[WRIST].x, 0.4);
    }

    #[test]
    fn test_gap_freezes_state_and_produces_catch_up() {
        let mut frames = vec![frame_with_right_hand(0, 0.2, 0.5, 0.9)];
        // Hand occluded for two frames: empty track, filters untouched
        frames.push(FrameDetection::new(1, 0.04, (1280, 720)));
        frames.push(FrameDetection::new(2, 0.08, (1280, 720)));
        // Reappears far away
        frames.push(frame_with_right_hand(3, 0.8, 0.5, 0.9));

        let mut s = smoother(0.5, 0.6);
        let out = s.smooth(&frames);

        assert!(out[1].right_hand.is_empty());
        // Catch-up transient: smoothing resumes from the pre-gap value, so
        // the reappearance lands between the old and new positions.
        let x = out[3].right_hand[WRIST].x;
        assert!(x > 0.2 && x < 0.8, "expected catch-up transient, got {}", x);
    }

    #[test]
    fn test_velocity_clamp_bounds_delta() {
        let config = SmoothingConfig {
            alphas: TrackAlphas::uniform(1.0),
            min_confidence: 0.0,
            velocity_clamp: Some(0.05),
        };
        let mut s = SequenceSmoother::new(config).unwrap();
        let out = s.smooth(&[
            frame_with_right_hand(0, 0.1, 0.5, 1.0),
            frame_with_right_hand(1, 0.9, 0.5, 1.0),
        ]);

        // First observation unclamped, second bounded to +0.05
        assert_eq!(out[0].right_hand[WRIST].x, 0.1);
        assert!((out[1].right_hand[WRIST].x - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad_alpha = SmoothingConfig {
            alphas: TrackAlphas::uniform(1.5),
            ..SmoothingConfig::default()
        };
        assert!(matches!(
            SequenceSmoother::new(bad_alpha).unwrap_err(),
            TrackingError::InvalidConfig(_)
        ));

        let bad_clamp = SmoothingConfig {
            velocity_clamp: Some(0.0),
            ..SmoothingConfig::default()
        };
        assert!(SequenceSmoother::new(bad_clamp).is_err());

        let bad_min = SmoothingConfig {
            min_confidence: -0.1,
            ..SmoothingConfig::default()
        };
        assert!(SequenceSmoother::new(bad_min).is_err());
    }

    #[test]
    fn test_point_names_pass_through() {
        let mut frame = FrameDetection::new(0, 0.0, (640, 480));
        frame.assign(
            TrackKind::Pose,
            vec![Landmark::named(0.5, 0.5, 0.9, "nose")],
        );
        let mut s = smoother(0.5, 0.6);
        let out = s.smooth(&[frame]);
        assert_eq!(out[0].pose[0].name.as_deref(), Some("nose"));
    }
}
