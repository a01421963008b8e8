//! Sub-metrics and challenge attempts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::{
    W_EYE_SYMMETRY, W_FACIAL_TENSION, W_MOUTH_CURVATURE, W_MOUTH_WIDTH,
    W_SMILE_INTENSITY,
};

/// The five sub-metrics derived per scoring call, each a percentage in
/// [0,100]. Facial tension is deliberately opaque - it is never derived
/// from geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubMetrics {
    pub mouth_curvature: f64,
    pub eye_symmetry: f64,
    pub smile_intensity: f64,
    pub mouth_width: f64,
    pub facial_tension: f64,
}

impl SubMetrics {
    pub fn new(
        mouth_curvature: f64,
        eye_symmetry: f64,
        smile_intensity: f64,
        mouth_width: f64,
        facial_tension: f64,
    ) -> Self {
        Self {
            mouth_curvature,
            eye_symmetry,
            smile_intensity,
            mouth_width,
            facial_tension,
        }
    }

    /// Weighted base score before band clamping and noise.
    /// Tension counts inverted: a relaxed face scores higher.
    pub fn weighted_base(&self) -> f64 {
        self.mouth_curvature * W_MOUTH_CURVATURE
            + self.eye_symmetry * W_EYE_SYMMETRY
            + self.smile_intensity * W_SMILE_INTENSITY
            + self.mouth_width * W_MOUTH_WIDTH
            + (100.0 - self.facial_tension) * W_FACIAL_TENSION
    }

    /// Clamp every metric into [0,100]
    pub fn clamped(&self) -> Self {
        Self {
            mouth_curvature: self.mouth_curvature.clamp(0.0, 100.0),
            eye_symmetry: self.eye_symmetry.clamp(0.0, 100.0),
            smile_intensity: self.smile_intensity.clamp(0.0, 100.0),
            mouth_width: self.mouth_width.clamp(0.0, 100.0),
            facial_tension: self.facial_tension.clamp(0.0, 100.0),
        }
    }
}

/// One scored analysis cycle. Only the most recent attempt is retained by
/// the controller; older ones are discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeAttempt {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Level the attempt was scored at
    pub level: u32,
    /// Final score after band clamp and noise
    pub score: f64,
    /// Sub-metric breakdown
    pub sub_metrics: SubMetrics,
}

impl ChallengeAttempt {
    pub fn new(level: u32, score: f64, sub_metrics: SubMetrics) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            score,
            sub_metrics,
        }
    }

    /// Points missing to the passing threshold (always positive)
    pub fn shortfall(&self) -> f64 {
        crate::PASSING_THRESHOLD - self.score
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_base_reference_scenario() {
        // 0.3*60 + 0.2*70 + 0.3*50 + 0.1*80 + 0.1*(100-40) = 61
        let m = SubMetrics::new(60.0, 70.0, 50.0, 80.0, 40.0);
        assert!((m.weighted_base() - 61.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_base_tension_inverted() {
        let relaxed = SubMetrics::new(50.0, 50.0, 50.0, 50.0, 0.0);
        let tense = SubMetrics::new(50.0, 50.0, 50.0, 50.0, 100.0);
        assert!(relaxed.weighted_base() > tense.weighted_base());
    }

    #[test]
    fn test_clamped() {
        let m = SubMetrics::new(120.0, -5.0, 50.0, 101.0, 70.0).clamped();
        assert_eq!(m.mouth_curvature, 100.0);
        assert_eq!(m.eye_symmetry, 0.0);
        assert_eq!(m.mouth_width, 100.0);
        assert_eq!(m.facial_tension, 70.0);
    }

    #[test]
    fn test_attempt_shortfall_positive_for_engine_scores() {
        let attempt = ChallengeAttempt::new(
            1,
            crate::SCORE_MAX,
            SubMetrics::new(100.0, 100.0, 100.0, 100.0, 0.0),
        );
        assert!(attempt.shortfall() > 0.0);
    }

    #[test]
    fn test_attempt_serializes() {
        let attempt = ChallengeAttempt::new(2, 47.5, SubMetrics::new(60.0, 70.0, 50.0, 80.0, 40.0));
        let json = serde_json::to_string(&attempt).unwrap();
        assert!(json.contains("\"sub_metrics\""));
        let back: ChallengeAttempt = serde_json::from_str(&json).unwrap();
        assert_eq!(back.level, 2);
    }
}
