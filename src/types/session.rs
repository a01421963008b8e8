//! Session-level state owned by the challenge controller

use serde::{Deserialize, Serialize};
use crate::types::ChallengePhase;
use crate::HUMANITY_START;

/// Tunable session constants. The two known deployments differ here:
/// smile-gate decays 25 per level over 3 levels, the reverse-challenge
/// variant 20 over 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeConfig {
    pub max_level: u32,
    pub humanity_decay_per_level: u32,
    /// Full analysis countdown duration (milliseconds)
    pub analysis_ms: u64,
    /// How long a scored result is held before auto-advancing (milliseconds)
    pub result_hold_ms: u64,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            max_level: crate::DEFAULT_MAX_LEVEL,
            humanity_decay_per_level: crate::DEFAULT_HUMANITY_DECAY,
            analysis_ms: crate::ANALYSIS_STEPS as u64 * crate::ANALYSIS_STEP_MS,
            result_hold_ms: crate::RESULT_HOLD_MS,
        }
    }
}

impl ChallengeConfig {
    /// The reverse-challenge deployment: 5 levels, 20% decay each
    pub fn reverse_challenge() -> Self {
        Self {
            max_level: 5,
            humanity_decay_per_level: 20,
            ..Self::default()
        }
    }

    /// Humanity percentage at a given level - recomputed, never mutated
    /// independently.
    pub fn humanity_at(&self, level: u32) -> u32 {
        HUMANITY_START.saturating_sub(level * self.humanity_decay_per_level)
    }
}

/// Serialized session snapshot for status displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub level: u32,
    pub humanity_percentage: u32,
    pub phase: ChallengePhase,
}

impl SessionState {
    pub fn initial() -> Self {
        Self {
            level: 0,
            humanity_percentage: HUMANITY_START,
            phase: ChallengePhase::Idle,
        }
    }
}
