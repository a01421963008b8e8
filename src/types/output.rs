//! Output structures for terminal display

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::types::{ChallengePhase, ReasonCode};

/// Output structure for each session status update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusOutput {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Current challenge level
    pub level: u32,
    /// Remaining humanity percentage
    pub humanity_percentage: u32,
    /// Current phase
    pub phase: ChallengePhase,
    /// Countdown steps left while analyzing (None otherwise)
    pub countdown_steps: Option<u32>,
    /// Most recent score, if any attempt has completed
    pub score: Option<f64>,
    /// Reason for the current phase
    pub reason: ReasonCode,
}

impl StatusOutput {
    /// Create new output
    pub fn new(
        level: u32,
        humanity_percentage: u32,
        phase: ChallengePhase,
        countdown_steps: Option<u32>,
        score: Option<f64>,
        reason: ReasonCode,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            humanity_percentage,
            phase,
            countdown_steps,
            score,
            reason,
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.phase.color_code();
        let reset = ChallengePhase::color_reset();
        let emoji = self.phase.emoji();
        let score = self
            .score
            .map(|s| format!("{:.1}", s))
            .unwrap_or_else(|| "-".to_string());

        format!(
            "{}{} level={} | humanity={}% | phase={} | score={} | {}{}",
            color,
            emoji,
            self.level,
            self.humanity_percentage,
            self.phase,
            score,
            self.reason.code(),
            reset
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        let score = self
            .score
            .map(|s| format!("{:.1}", s))
            .unwrap_or_else(|| "-".to_string());
        format!(
            "level={} | humanity={}% | phase={} | score={} | reason={}",
            self.level, self.humanity_percentage, self.phase, score,
            self.reason.code()
        )
    }
}
