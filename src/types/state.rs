//! Challenge phase definitions

use serde::{Deserialize, Serialize};

/// The phases of a verification session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengePhase {
    /// Session constructed, nothing started yet
    Idle,
    /// Waiting for the user to claim humanity
    AwaitingClaim,
    /// Countdown running, landmarks under analysis
    Analyzing,
    /// Result computed, held for display
    Scored,
    /// Max level reached: tutorial or final rejection
    Offer,
    /// Terminal: final rejection accepted
    Rejected,
    /// Terminal: humanity percentage exhausted
    Exhausted,
}

impl ChallengePhase {
    /// True for phases with no way forward except reset
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChallengePhase::Rejected | ChallengePhase::Exhausted)
    }

    /// True while a claim would be double-counted and must be ignored
    pub fn blocks_claims(&self) -> bool {
        !matches!(self, ChallengePhase::Idle | ChallengePhase::AwaitingClaim)
    }

    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            ChallengePhase::Idle => "\x1b[90m",          // Gray
            ChallengePhase::AwaitingClaim => "\x1b[36m", // Cyan
            ChallengePhase::Analyzing => "\x1b[33m",     // Yellow
            ChallengePhase::Scored => "\x1b[35m",        // Magenta
            ChallengePhase::Offer => "\x1b[34m",         // Blue
            ChallengePhase::Rejected => "\x1b[31m",      // Red
            ChallengePhase::Exhausted => "\x1b[31m",     // Red
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Get emoji for phase
    pub fn emoji(&self) -> &'static str {
        match self {
            ChallengePhase::Idle => "💤",
            ChallengePhase::AwaitingClaim => "🙋",
            ChallengePhase::Analyzing => "🔍",
            ChallengePhase::Scored => "📊",
            ChallengePhase::Offer => "🎓",
            ChallengePhase::Rejected => "⛔",
            ChallengePhase::Exhausted => "💀",
        }
    }
}

impl std::fmt::Display for ChallengePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChallengePhase::Idle => "IDLE",
            ChallengePhase::AwaitingClaim => "AWAITING_CLAIM",
            ChallengePhase::Analyzing => "ANALYZING",
            ChallengePhase::Scored => "SCORED",
            ChallengePhase::Offer => "OFFER",
            ChallengePhase::Rejected => "REJECTED",
            ChallengePhase::Exhausted => "EXHAUSTED",
        };
        write!(f, "{}", name)
    }
}
