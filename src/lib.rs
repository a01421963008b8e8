//! Humangate: humanity verification challenge engine
//!
//! Tracks facial landmarks (real or synthesized), scores each challenge
//! attempt from geometric sub-metrics, and guarantees the final score
//! always lands below the passing threshold.

pub mod core;
pub mod types;

// =============================================================================
// SCORING THRESHOLDS [C]
// =============================================================================

/// Score a user would need to reach to be accepted.
/// The engine guarantees this is unreachable.
pub const PASSING_THRESHOLD: f64 = 80.0;

/// Global lower bound for any final score
pub const SCORE_MIN: f64 = 5.0;

/// Global upper bound for any final score.
/// Strictly below PASSING_THRESHOLD - no input can ever pass.
pub const SCORE_MAX: f64 = 79.0;

/// Symmetric noise added to the band-clamped score (±3)
pub const NOISE_AMPLITUDE: f64 = 3.0;

// =============================================================================
// SUB-METRIC WEIGHTS [C] - sum = 1.0
// =============================================================================

pub const W_MOUTH_CURVATURE: f64 = 0.3;
pub const W_EYE_SYMMETRY: f64 = 0.2;
pub const W_SMILE_INTENSITY: f64 = 0.3;
pub const W_MOUTH_WIDTH: f64 = 0.1;
/// Applied to (100 - facial_tension): relaxed faces score higher
pub const W_FACIAL_TENSION: f64 = 0.1;

// =============================================================================
// TRACKING [C]
// =============================================================================

/// EMA factor for per-coordinate landmark smoothing
pub const LANDMARK_SMOOTHING_ALPHA: f64 = 0.7;

/// Slower EMA factor for the bounding box, avoids jitter on the larger region
pub const BOX_SMOOTHING_ALPHA: f64 = 0.3;

/// Point count of the full face mesh (fixed semantic indices)
pub const MESH_POINT_COUNT: usize = 468;

/// Point count of the basic landmark set (eyes, nose, mouth corners, chin)
pub const BASIC_POINT_COUNT: usize = 6;

// =============================================================================
// CHALLENGE TIMING [C]
// =============================================================================

/// Number of countdown steps during the analysis phase
pub const ANALYSIS_STEPS: u32 = 4;

/// Duration of one countdown step (milliseconds)
pub const ANALYSIS_STEP_MS: u64 = 1000;

/// How long the scored result is held before the next claim is allowed
pub const RESULT_HOLD_MS: u64 = 2000;

// =============================================================================
// SESSION DEFAULTS [C]
// =============================================================================

/// Default maximum challenge level (smile-gate variant)
pub const DEFAULT_MAX_LEVEL: u32 = 3;

/// Default humanity decay per level (smile-gate variant; the reverse-challenge
/// variant uses 20 with max level 5)
pub const DEFAULT_HUMANITY_DECAY: u32 = 25;

/// Starting humanity percentage
pub const HUMANITY_START: u32 = 100;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";

/// Level-calibrated score band (min, max). Strictly decreases as the level
/// rises: trying harder always earns less.
///
/// Reference bands: level 1 [55,75], level 2 [40,65], level 3 [25,45].
/// Levels above 3 keep stepping down, floored near the global minimum.
pub fn score_band(level: u32) -> (f64, f64) {
    match level {
        0 | 1 => (55.0, 75.0),
        2 => (40.0, 65.0),
        3 => (25.0, 45.0),
        n => {
            let step = 8.0 * (n - 3) as f64;
            ((25.0 - step).max(SCORE_MIN), (45.0 - step).max(SCORE_MIN + 10.0))
        }
    }
}
