//! Reason codes for claim decisions and phase changes

use serde::{Deserialize, Serialize};

/// Reason codes for all state changes and guard decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // H001: Claims
    // =========================================================================
    /// Claim accepted, level advanced
    H001_CLAIM_ACCEPTED,
    /// Claim accepted as post-tutorial replay, level unchanged
    H001_CLAIM_REPLAY,
    /// Claim ignored: analysis already running
    H001_CLAIM_IGNORED_BUSY,
    /// Claim ignored: session already terminal
    H001_CLAIM_IGNORED_TERMINAL,
    /// Claim ignored: max level already reached
    H001_CLAIM_IGNORED_MAX_LEVEL,

    // =========================================================================
    // H002: Phases
    // =========================================================================
    /// Session idle
    H002_PHASE_IDLE,
    /// Awaiting a humanity claim
    H002_PHASE_AWAITING,
    /// Analysis countdown running
    H002_PHASE_ANALYZING,
    /// Result scored, held for display
    H002_PHASE_SCORED,
    /// Offer presented (tutorial or final rejection)
    H002_PHASE_OFFER,

    // =========================================================================
    // H003: Transitions
    // =========================================================================
    /// Analysis countdown expired, attempt scored
    H003_ANALYSIS_COMPLETE,
    /// Result hold expired, retry allowed
    H003_RETRY_ALLOWED,
    /// Result hold expired at max level, offer presented
    H003_OFFER_PRESENTED,
    /// Tutorial chosen, looping back to retry
    H003_TUTORIAL_CHOSEN,
    /// Final rejection chosen
    H003_REJECTION_CHOSEN,
    /// Humanity percentage reached zero
    H003_HUMANITY_EXHAUSTED,
    /// Session reset to initial values
    H003_SESSION_RESET,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::H001_CLAIM_ACCEPTED => "H001_CLAIM_ACCEPTED",
            Self::H001_CLAIM_REPLAY => "H001_CLAIM_REPLAY",
            Self::H001_CLAIM_IGNORED_BUSY => "H001_CLAIM_IGNORED_BUSY",
            Self::H001_CLAIM_IGNORED_TERMINAL => "H001_CLAIM_IGNORED_TERMINAL",
            Self::H001_CLAIM_IGNORED_MAX_LEVEL => "H001_CLAIM_IGNORED_MAX_LEVEL",
            Self::H002_PHASE_IDLE => "H002_PHASE_IDLE",
            Self::H002_PHASE_AWAITING => "H002_PHASE_AWAITING",
            Self::H002_PHASE_ANALYZING => "H002_PHASE_ANALYZING",
            Self::H002_PHASE_SCORED => "H002_PHASE_SCORED",
            Self::H002_PHASE_OFFER => "H002_PHASE_OFFER",
            Self::H003_ANALYSIS_COMPLETE => "H003_ANALYSIS_COMPLETE",
            Self::H003_RETRY_ALLOWED => "H003_RETRY_ALLOWED",
            Self::H003_OFFER_PRESENTED => "H003_OFFER_PRESENTED",
            Self::H003_TUTORIAL_CHOSEN => "H003_TUTORIAL_CHOSEN",
            Self::H003_REJECTION_CHOSEN => "H003_REJECTION_CHOSEN",
            Self::H003_HUMANITY_EXHAUSTED => "H003_HUMANITY_EXHAUSTED",
            Self::H003_SESSION_RESET => "H003_SESSION_RESET",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::H001_CLAIM_ACCEPTED => "Claim accepted",
            Self::H001_CLAIM_REPLAY => "Claim accepted as tutorial replay",
            Self::H001_CLAIM_IGNORED_BUSY => "Claim ignored - analysis in progress",
            Self::H001_CLAIM_IGNORED_TERMINAL => "Claim ignored - session terminal",
            Self::H001_CLAIM_IGNORED_MAX_LEVEL => "Claim ignored - max level reached",
            Self::H002_PHASE_IDLE => "Idle",
            Self::H002_PHASE_AWAITING => "Awaiting humanity claim",
            Self::H002_PHASE_ANALYZING => "Analyzing facial landmarks",
            Self::H002_PHASE_SCORED => "Result scored",
            Self::H002_PHASE_OFFER => "Offer presented",
            Self::H003_ANALYSIS_COMPLETE => "Analysis complete",
            Self::H003_RETRY_ALLOWED => "Retry allowed",
            Self::H003_OFFER_PRESENTED => "Final offer presented",
            Self::H003_TUTORIAL_CHOSEN => "Tutorial chosen",
            Self::H003_REJECTION_CHOSEN => "Final rejection accepted",
            Self::H003_HUMANITY_EXHAUSTED => "Humanity percentage exhausted",
            Self::H003_SESSION_RESET => "Session reset",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
