//! Scoring engine: tracked landmarks → sub-metrics → bounded final score
//!
//! The pipeline is: geometric (or synthesized) sub-metrics, weighted base
//! score, level-calibrated band clamp, ±3 noise, global [5,79] clamp.
//! The global ceiling sits strictly below the passing threshold, so no
//! input, metric or level can ever produce a pass.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::tracker::TrackedFace;
use crate::types::{
    ChallengeAttempt, SubMetrics,
    MESH_BOTTOM_LIP, MESH_LEFT_EYE_INNER, MESH_LEFT_EYE_OUTER,
    MESH_LEFT_MOUTH_CORNER, MESH_NOSE_TIP, MESH_RIGHT_EYE_INNER,
    MESH_RIGHT_EYE_OUTER, MESH_RIGHT_MOUTH_CORNER, MESH_TOP_LIP,
};
use crate::{score_band, NOISE_AMPLITUDE, SCORE_MAX, SCORE_MIN};

// Synthesized sub-metric ranges, used when no full mesh is available
const SYNTH_MOUTH_CURVATURE: (f64, f64) = (40.0, 70.0);
const SYNTH_EYE_SYMMETRY: (f64, f64) = (60.0, 95.0);
const SYNTH_SMILE_INTENSITY: (f64, f64) = (30.0, 80.0);
const SYNTH_MOUTH_WIDTH: (f64, f64) = (40.0, 90.0);
/// Facial tension is always drawn from this range, even with a full mesh -
/// it is the one metric nobody can falsify.
const SYNTH_FACIAL_TENSION: (f64, f64) = (30.0, 70.0);

/// Scoring engine with its own noise source
#[derive(Debug)]
pub struct ScoringEngine {
    rng: StdRng,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringEngine {
    /// Create new engine with an entropy-seeded noise source
    pub fn new() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    /// Create engine with a fixed seed (reproducible runs and tests)
    pub fn with_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Score one analysis cycle from the tracker's current state
    pub fn score(&mut self, level: u32, face: Option<&TrackedFace>) -> ChallengeAttempt {
        let sub_metrics = match face {
            Some(face) if face.landmarks.is_full_mesh() => {
                self.geometric_metrics(face)
            }
            _ => self.synthetic_metrics(),
        };
        let score = self.finalize(level, &sub_metrics);
        ChallengeAttempt::new(level, score, sub_metrics)
    }

    /// Apply band clamp and noise to an already-derived metric set.
    /// Exposed separately so the clamp chain is testable without a tracker.
    pub fn finalize(&mut self, level: u32, sub_metrics: &SubMetrics) -> f64 {
        let base = sub_metrics.weighted_base();
        let (band_min, band_max) = score_band(level);
        let banded = base.clamp(band_min, band_max);
        let noise = self.rng.gen_range(-NOISE_AMPLITUDE..=NOISE_AMPLITUDE);
        (banded + noise).clamp(SCORE_MIN, SCORE_MAX)
    }

    /// Geometric sub-metrics from a full mesh with semantic indices
    fn geometric_metrics(&mut self, face: &TrackedFace) -> SubMetrics {
        let lm = &face.landmarks;
        // Index presence is guaranteed by the is_full_mesh check; a missing
        // point degrades to the frame origin rather than panicking.
        let point = |i: usize| lm.get(i).copied().unwrap_or_default();

        let top_lip = point(MESH_TOP_LIP);
        let bottom_lip = point(MESH_BOTTOM_LIP);
        let left_corner = point(MESH_LEFT_MOUTH_CORNER);
        let right_corner = point(MESH_RIGHT_MOUTH_CORNER);
        let nose = point(MESH_NOSE_TIP);

        let mouth_span = left_corner.distance(&right_corner).max(f64::EPSILON);
        let mouth_curvature =
            (top_lip.distance(&bottom_lip) / mouth_span * 50.0).clamp(0.0, 100.0);

        let left_eye_width =
            point(MESH_LEFT_EYE_OUTER).distance(&point(MESH_LEFT_EYE_INNER));
        let right_eye_width =
            point(MESH_RIGHT_EYE_INNER).distance(&point(MESH_RIGHT_EYE_OUTER));
        let wider = left_eye_width.max(right_eye_width).max(f64::EPSILON);
        let eye_symmetry =
            (100.0 - (left_eye_width - right_eye_width).abs() / wider * 100.0)
                .clamp(0.0, 100.0);

        let avg_corner_y = (left_corner.y + right_corner.y) / 2.0;
        let nose_y = nose.y.max(f64::EPSILON);
        let smile_intensity =
            ((nose_y - avg_corner_y) / nose_y * 100.0).max(0.0).min(100.0);

        let mouth_width = (mouth_span * 10.0).clamp(0.0, 100.0);

        let facial_tension = self.draw(SYNTH_FACIAL_TENSION);

        SubMetrics::new(
            mouth_curvature,
            eye_symmetry,
            smile_intensity,
            mouth_width,
            facial_tension,
        )
    }

    /// Synthesized sub-metrics for basic/fallback landmark sets
    fn synthetic_metrics(&mut self) -> SubMetrics {
        SubMetrics::new(
            self.draw(SYNTH_MOUTH_CURVATURE),
            self.draw(SYNTH_EYE_SYMMETRY),
            self.draw(SYNTH_SMILE_INTENSITY),
            self.draw(SYNTH_MOUTH_WIDTH),
            self.draw(SYNTH_FACIAL_TENSION),
        )
    }

    fn draw(&mut self, range: (f64, f64)) -> f64 {
        self.rng.gen_range(range.0..=range.1)
    }
}

// =============================================================================
// TESTS
// =============================================================================
