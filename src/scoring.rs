//! Posture scoring.
//!
//! `evaluate` turns one `KeypointFrame` into a `PostureVerdict`. It is pure and
//! total: no I/O, no state, no failure path. Every region check that cannot find
//! its landmarks (absent, or below the confidence threshold) counts as failed, so
//! a frame with no usable keypoints scores 0.0.
//!
//! # Geometry
//!
//! Image y grows downward. A body segment is measured from its upper landmark to
//! its lower landmark as `tilt = atan2(dx, dy)`, the signed deviation from the
//! image vertical. Segments are undirected: if the "lower" landmark is actually
//! above the "upper" one, the delta is flipped before measuring. The reported
//! inclination is `90 + tilt`, so an upright segment reads 90 degrees and a
//! horizontal one reads 0 or 180.
//!
//! # Sensitivity
//!
//! `sensitivity` scales every tolerance by `NOMINAL_SENSITIVITY / sensitivity`.
//! At the nominal value the configured tolerances apply unchanged; higher
//! sensitivity narrows them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::keypoint::{BodyPart, Keypoint, KeypointFrame};

/// Sensitivity at which configured tolerances apply unscaled.
pub const NOMINAL_SENSITIVITY: f32 = 0.5;
pub const MIN_SENSITIVITY: f32 = 0.1;
pub const MAX_SENSITIVITY: f32 = 1.0;

/// Check weights are kept in tenths so the score arithmetic is exact.
const WEIGHT_UNITS_TOTAL: u32 = 10;

/// Segments shorter than this (pixels) have no usable orientation.
const MIN_SEGMENT_LENGTH_PX: f32 = 1e-3;

/// Inclusive range of acceptable segment inclinations, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AngleRange {
    pub min_deg: f32,
    pub max_deg: f32,
}

impl AngleRange {
    pub const fn new(min_deg: f32, max_deg: f32) -> Self {
        Self { min_deg, max_deg }
    }

    pub fn contains(&self, angle_deg: f32) -> bool {
        angle_deg >= self.min_deg && angle_deg <= self.max_deg
    }

    /// Same centre, half-width multiplied by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        let centre = (self.min_deg + self.max_deg) / 2.0;
        let half = (self.max_deg - self.min_deg) / 2.0 * factor;
        Self::new(centre - half, centre + half)
    }
}

/// Tunable thresholds. Callers pass a consistent snapshot per evaluation;
/// the scorer does not re-validate it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Minimum confidence for a keypoint to be trusted.
    pub confidence_threshold: f32,
    /// Maximum vertical offset between the shoulders, in pixels.
    pub shoulder_level_tolerance_px: f32,
    pub neck_angle_range_deg: AngleRange,
    pub spine_angle_range_deg: AngleRange,
    /// 0.1 (lenient) ..= 1.0 (strict).
    pub sensitivity: f32,
    /// Inclusive lower bound on `score` for a good verdict.
    pub good_posture_score_threshold: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            shoulder_level_tolerance_px: 20.0,
            neck_angle_range_deg: AngleRange::new(80.0, 100.0),
            spine_angle_range_deg: AngleRange::new(80.0, 100.0),
            sensitivity: NOMINAL_SENSITIVITY,
            good_posture_score_threshold: 0.7,
        }
    }
}

impl ScoringConfig {
    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = clamp_sensitivity(sensitivity);
        self
    }

    fn tolerance_factor(&self) -> f32 {
        NOMINAL_SENSITIVITY / self.sensitivity
    }

    /// Shoulder tolerance after sensitivity scaling.
    pub fn effective_shoulder_tolerance_px(&self) -> f32 {
        self.shoulder_level_tolerance_px * self.tolerance_factor()
    }

    pub fn effective_neck_range(&self) -> AngleRange {
        self.neck_angle_range_deg.scaled(self.tolerance_factor())
    }

    pub fn effective_spine_range(&self) -> AngleRange {
        self.spine_angle_range_deg.scaled(self.tolerance_factor())
    }
}

pub fn clamp_sensitivity(sensitivity: f32) -> f32 {
    if sensitivity.is_nan() {
        return NOMINAL_SENSITIVITY;
    }
    sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY)
}

/// The region checks contributing to the score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PostureCheck {
    ShoulderAlignment,
    NeckAlignment,
    SpineAlignment,
}

impl PostureCheck {
    pub const ALL: [PostureCheck; 3] = [
        PostureCheck::ShoulderAlignment,
        PostureCheck::NeckAlignment,
        PostureCheck::SpineAlignment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PostureCheck::ShoulderAlignment => "shoulderAlignment",
            PostureCheck::NeckAlignment => "neckAlignment",
            PostureCheck::SpineAlignment => "spineAlignment",
        }
    }

    fn weight_units(self) -> u32 {
        match self {
            PostureCheck::ShoulderAlignment => 3,
            PostureCheck::NeckAlignment => 3,
            PostureCheck::SpineAlignment => 4,
        }
    }

    /// Amount subtracted from the score when this check fails.
    pub fn weight(self) -> f32 {
        self.weight_units() as f32 / WEIGHT_UNITS_TOTAL as f32
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Result of one evaluation. `is_good` is always derived from `score`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PostureVerdict {
    score: f32,
    is_good: bool,
    #[serde(serialize_with = "serialize_checks")]
    checks: [bool; 3],
    usable_keypoints: usize,
}

impl PostureVerdict {
    fn from_checks(checks: [bool; 3], usable_keypoints: usize, config: &ScoringConfig) -> Self {
        let failed_units: u32 = PostureCheck::ALL
            .iter()
            .filter(|check| !checks[check.slot()])
            .map(|check| check.weight_units())
            .sum();
        let remaining = WEIGHT_UNITS_TOTAL.saturating_sub(failed_units);
        let score = (remaining as f32 / WEIGHT_UNITS_TOTAL as f32).clamp(0.0, 1.0);
        Self {
            score,
            is_good: score >= config.good_posture_score_threshold,
            checks,
            usable_keypoints,
        }
    }

    /// Quality in `[0.0, 1.0]`, 1.0 being ideal.
    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn is_good(&self) -> bool {
        self.is_good
    }

    pub fn passed(&self, check: PostureCheck) -> bool {
        self.checks[check.slot()]
    }

    /// Check name to pass/fail, for diagnostics.
    pub fn checks(&self) -> BTreeMap<&'static str, bool> {
        PostureCheck::ALL
            .iter()
            .map(|check| (check.name(), self.passed(*check)))
            .collect()
    }

    pub fn failed_checks(&self) -> Vec<PostureCheck> {
        PostureCheck::ALL
            .iter()
            .copied()
            .filter(|check| !self.passed(*check))
            .collect()
    }

    /// Number of keypoints that met the confidence threshold.
    pub fn usable_keypoints(&self) -> usize {
        self.usable_keypoints
    }
}

fn serialize_checks<S: serde::Serializer>(checks: &[bool; 3], serializer: S) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;
    let mut map = serializer.serialize_map(Some(checks.len()))?;
    for check in PostureCheck::ALL {
        map.serialize_entry(check.name(), &checks[check.slot()])?;
    }
    map.end()
}

/// Object-style entry point for callers that hold a scorer.
#[derive(Clone, Copy, Debug, Default)]
pub struct PostureScorer;

impl PostureScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, frame: &KeypointFrame, config: &ScoringConfig) -> PostureVerdict {
        evaluate(frame, config)
    }
}

/// Score one frame.
pub fn evaluate(frame: &KeypointFrame, config: &ScoringConfig) -> PostureVerdict {
    let mut checks = [false; 3];
    checks[PostureCheck::ShoulderAlignment.slot()] = shoulders_level(frame, config);
    checks[PostureCheck::NeckAlignment.slot()] = segment_upright(
        frame,
        config,
        BodyPart::HEAD,
        BodyPart::Neck,
        config.effective_neck_range(),
    );
    checks[PostureCheck::SpineAlignment.slot()] = segment_upright(
        frame,
        config,
        BodyPart::Neck,
        BodyPart::MidHip,
        config.effective_spine_range(),
    );
    PostureVerdict::from_checks(
        checks,
        frame.usable_count(config.confidence_threshold),
        config,
    )
}

fn shoulders_level(frame: &KeypointFrame, config: &ScoringConfig) -> bool {
    let threshold = config.confidence_threshold;
    let (Some(left), Some(right)) = (
        frame.usable(BodyPart::LeftShoulder, threshold),
        frame.usable(BodyPart::RightShoulder, threshold),
    ) else {
        return false;
    };
    (left.y - right.y).abs() < config.effective_shoulder_tolerance_px()
}

fn segment_upright(
    frame: &KeypointFrame,
    config: &ScoringConfig,
    upper: BodyPart,
    lower: BodyPart,
    range: AngleRange,
) -> bool {
    let threshold = config.confidence_threshold;
    let (Some(upper), Some(lower)) = (
        frame.usable(upper, threshold),
        frame.usable(lower, threshold),
    ) else {
        return false;
    };
    segment_inclination_deg(upper, lower).is_some_and(|angle| range.contains(angle))
}

/// Inclination of the segment `upper -> lower`, 90 degrees meaning upright.
///
/// Returns `None` for degenerate (zero-length or non-finite) segments.
pub fn segment_inclination_deg(upper: &Keypoint, lower: &Keypoint) -> Option<f32> {
    let (mut dx, mut dy) = (lower.x - upper.x, lower.y - upper.y);
    if !dx.is_finite() || !dy.is_finite() || dx.hypot(dy) < MIN_SEGMENT_LENGTH_PX {
        return None;
    }
    if dy < 0.0 {
        dx = -dx;
        dy = -dy;
    }
    Some(90.0 + dx.atan2(dy).to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upright_frame() -> KeypointFrame {
        let mut frame = KeypointFrame::empty();
        frame.set(BodyPart::Nose, Keypoint::new(150.0, 40.0, 0.9));
        frame.set(BodyPart::Neck, Keypoint::new(150.0, 90.0, 0.9));
        frame.set(BodyPart::RightShoulder, Keypoint::new(110.0, 100.0, 0.9));
        frame.set(BodyPart::LeftShoulder, Keypoint::new(190.0, 100.0, 0.9));
        frame.set(BodyPart::MidHip, Keypoint::new(150.0, 300.0, 0.9));
        frame
    }

    #[test]
    fn upright_frame_scores_perfect() {
        let verdict = evaluate(&upright_frame(), &ScoringConfig::default());
        assert_eq!(verdict.score(), 1.0);
        assert!(verdict.is_good());
        assert!(verdict.checks().values().all(|passed| *passed));
        assert_eq!(verdict.usable_keypoints(), 5);
    }

    #[test]
    fn low_confidence_shoulder_fails_only_shoulder_check() {
        let mut frame = upright_frame();
        frame.set(BodyPart::RightShoulder, Keypoint::new(110.0, 100.0, 0.2));
        let verdict = evaluate(&frame, &ScoringConfig::default());
        assert_eq!(verdict.score(), 0.7);
        assert!(verdict.is_good(), "0.7 must meet the inclusive threshold");
        assert_eq!(verdict.failed_checks(), vec![PostureCheck::ShoulderAlignment]);
    }

    #[test]
    fn near_horizontal_neck_fails_neck_check() {
        let mut frame = upright_frame();
        frame.set(BodyPart::Nose, Keypoint::new(200.0, 85.0, 0.9));
        let verdict = evaluate(&frame, &ScoringConfig::default());
        assert_eq!(verdict.score(), 0.7);
        assert!(!verdict.passed(PostureCheck::NeckAlignment));
        assert!(verdict.passed(PostureCheck::ShoulderAlignment));
        assert!(verdict.passed(PostureCheck::SpineAlignment));
    }

    #[test]
    fn empty_frame_scores_zero() {
        let verdict = evaluate(&KeypointFrame::empty(), &ScoringConfig::default());
        assert_eq!(verdict.score(), 0.0);
        assert!(!verdict.is_good());
        assert_eq!(verdict.failed_checks().len(), 3);
        assert_eq!(verdict.usable_keypoints(), 0);
    }

    #[test]
    fn weights_sum_to_one() {
        let units: u32 = PostureCheck::ALL.iter().map(|c| c.weight_units()).sum();
        assert_eq!(units, WEIGHT_UNITS_TOTAL);
        let total: f32 = PostureCheck::ALL.iter().map(|c| c.weight()).sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert_eq!(PostureCheck::ShoulderAlignment.weight(), 0.3);
        assert_eq!(PostureCheck::NeckAlignment.weight(), 0.3);
        assert_eq!(PostureCheck::SpineAlignment.weight(), 0.4);
    }

    #[test]
    fn spine_failure_costs_point_four() {
        let mut frame = upright_frame();
        frame.clear(BodyPart::MidHip);
        let verdict = evaluate(&frame, &ScoringConfig::default());
        assert!((verdict.score() - 0.6).abs() < 1e-6);
        assert!(!verdict.is_good());
    }

    #[test]
    fn inclination_is_direction_independent() {
        let a = Keypoint::new(150.0, 90.0, 1.0);
        let b = Keypoint::new(150.0, 40.0, 1.0);
        assert_eq!(segment_inclination_deg(&a, &b), Some(90.0));
        assert_eq!(segment_inclination_deg(&b, &a), Some(90.0));

        let right = Keypoint::new(200.0, 90.0, 1.0);
        let horizontal = segment_inclination_deg(&a, &right).unwrap();
        assert!((horizontal - 180.0).abs() < 1e-4 || horizontal.abs() < 1e-4);
    }

    #[test]
    fn degenerate_segment_has_no_inclination() {
        let a = Keypoint::new(10.0, 10.0, 1.0);
        assert_eq!(segment_inclination_deg(&a, &a), None);
    }

    #[test]
    fn sensitivity_scales_shoulder_tolerance() {
        let mut frame = upright_frame();
        // 15px offset: inside the nominal 20px window.
        frame.set(BodyPart::LeftShoulder, Keypoint::new(190.0, 115.0, 0.9));

        let nominal = ScoringConfig::default();
        assert!(evaluate(&frame, &nominal).passed(PostureCheck::ShoulderAlignment));

        let strict = ScoringConfig::default().with_sensitivity(1.0);
        assert_eq!(strict.effective_shoulder_tolerance_px(), 10.0);
        assert!(!evaluate(&frame, &strict).passed(PostureCheck::ShoulderAlignment));
    }

    #[test]
    fn sensitivity_scales_angle_ranges_around_centre() {
        let lenient = ScoringConfig::default().with_sensitivity(0.25);
        assert_eq!(lenient.effective_neck_range(), AngleRange::new(70.0, 110.0));
        let strict = ScoringConfig::default().with_sensitivity(1.0);
        assert_eq!(strict.effective_spine_range(), AngleRange::new(85.0, 95.0));
    }

    #[test]
    fn with_sensitivity_clamps() {
        assert_eq!(ScoringConfig::default().with_sensitivity(5.0).sensitivity, 1.0);
        assert_eq!(ScoringConfig::default().with_sensitivity(0.0).sensitivity, 0.1);
        assert_eq!(
            ScoringConfig::default().with_sensitivity(f32::NAN).sensitivity,
            NOMINAL_SENSITIVITY
        );
    }

    #[test]
    fn verdict_serializes_named_checks() {
        let verdict = evaluate(&upright_frame(), &ScoringConfig::default());
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["checks"]["shoulderAlignment"], true);
        assert_eq!(json["checks"]["neckAlignment"], true);
        assert_eq!(json["checks"]["spineAlignment"], true);
        assert_eq!(json["is_good"], true);
    }
}
