//! Challenge controller: the leveled verification state machine
//!
//! Phase transitions:
//! - IDLE → AWAITING_CLAIM: session started
//! - AWAITING_CLAIM → ANALYZING: claim accepted (level +1, humanity decays)
//! - AWAITING_CLAIM → EXHAUSTED: humanity reaches zero on claim
//! - ANALYZING → SCORED: countdown expired, attempt scored
//! - SCORED → AWAITING_CLAIM: below max level, retry allowed
//! - SCORED → OFFER: max level reached
//! - OFFER → AWAITING_CLAIM: tutorial chosen (one replay, no level change)
//! - OFFER → REJECTED: final rejection accepted
//! - any → AWAITING_CLAIM: reset
//!
//! Claims submitted while ANALYZING/SCORED/OFFER or terminal are ignored,
//! never errors. Tracking runs independently of the phase; the controller
//! only consumes the tracked face at countdown expiry.

use std::time::Instant;

use crate::core::scoring::ScoringEngine;
use crate::core::tracker::TrackedFace;
use crate::types::{
    ChallengeAttempt, ChallengeConfig, ChallengePhase, ReasonCode,
    SessionState, StatusOutput,
};
use crate::ANALYSIS_STEP_MS;

/// Events the state machine reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    ClaimSubmitted,
    AnalysisExpired,
    HoldExpired,
    TutorialChosen,
    RejectionChosen,
}

/// The challenge state machine
#[derive(Debug)]
pub struct ChallengeController {
    config: ChallengeConfig,
    phase: ChallengePhase,
    /// Monotonically increasing until reset
    level: u32,
    last_attempt: Option<ChallengeAttempt>,
    last_reason: ReasonCode,
    scoring: ScoringEngine,
    /// End of the current analysis countdown
    analysis_deadline: Option<Instant>,
    /// End of the scored-result display hold
    hold_until: Option<Instant>,
    /// One post-tutorial replay at max level
    replay_allowed: bool,
}

impl Default for ChallengeController {
    fn default() -> Self {
        Self::new()
    }
}

impl ChallengeController {
    /// Create controller with default configuration
    pub fn new() -> Self {
        Self::with_config(ChallengeConfig::default())
    }

    /// Create controller with explicit configuration
    pub fn with_config(config: ChallengeConfig) -> Self {
        Self::with_parts(config, ScoringEngine::new())
    }

    /// Create controller with a pre-seeded scoring engine
    pub fn with_parts(config: ChallengeConfig, scoring: ScoringEngine) -> Self {
        Self {
            config,
            phase: ChallengePhase::Idle,
            level: 0,
            last_attempt: None,
            last_reason: ReasonCode::H002_PHASE_IDLE,
            scoring,
            analysis_deadline: None,
            hold_until: None,
            replay_allowed: false,
        }
    }

    /// Start accepting claims
    pub fn begin(&mut self) {
        if self.phase == ChallengePhase::Idle {
            self.phase = ChallengePhase::AwaitingClaim;
            self.last_reason = ReasonCode::H002_PHASE_AWAITING;
        }
    }

    /// Submit a humanity claim. Ignored (with a reason, never an error)
    /// while analysis, result hold, offer or a terminal phase is active.
    pub fn submit_claim(&mut self) -> StatusOutput {
        let reason = self.apply(Event::ClaimSubmitted);
        self.last_reason = reason;
        self.status()
    }

    /// Advance timers. Call once per frame; `face` is the tracker's current
    /// state, consumed only when the analysis countdown expires.
    /// Returns the fresh attempt when one was just scored.
    pub fn poll(&mut self, face: Option<&TrackedFace>) -> Option<ChallengeAttempt> {
        let now = Instant::now();

        if self.phase == ChallengePhase::Analyzing {
            if let Some(deadline) = self.analysis_deadline {
                if now >= deadline {
                    let attempt = self.scoring.score(self.level, face);
                    self.last_attempt = Some(attempt.clone());
                    self.analysis_deadline = None;
                    self.last_reason = self.apply(Event::AnalysisExpired);
                    return Some(attempt);
                }
            }
        }

        if self.phase == ChallengePhase::Scored {
            if let Some(hold) = self.hold_until {
                if now >= hold {
                    self.hold_until = None;
                    self.last_reason = self.apply(Event::HoldExpired);
                }
            }
        }

        None
    }

    /// Take the cosmetic tutorial offer. Only meaningful in OFFER.
    pub fn choose_tutorial(&mut self) -> StatusOutput {
        self.last_reason = self.apply(Event::TutorialChosen);
        self.status()
    }

    /// Accept the final rejection. Only meaningful in OFFER.
    pub fn choose_rejection(&mut self) -> StatusOutput {
        self.last_reason = self.apply(Event::RejectionChosen);
        self.status()
    }

    /// Reset to initial values. Safe from any phase; discards the last
    /// attempt and any in-flight countdown.
    pub fn reset(&mut self) {
        self.phase = ChallengePhase::AwaitingClaim;
        self.level = 0;
        self.last_attempt = None;
        self.last_reason = ReasonCode::H003_SESSION_RESET;
        self.analysis_deadline = None;
        self.hold_until = None;
        self.replay_allowed = false;
    }

    /// Exhaustive transition table: (phase, event) → next phase + reason.
    /// Every arm either moves the machine or names why it stayed put.
    fn apply(&mut self, event: Event) -> ReasonCode {
        use ChallengePhase::*;
        use Event::*;

        match (self.phase, event) {
            (Idle | AwaitingClaim, ClaimSubmitted) => self.accept_claim(),
            (Analyzing | Scored, ClaimSubmitted) => ReasonCode::H001_CLAIM_IGNORED_BUSY,
            (Offer, ClaimSubmitted) => ReasonCode::H001_CLAIM_IGNORED_BUSY,
            (Rejected | Exhausted, ClaimSubmitted) => ReasonCode::H001_CLAIM_IGNORED_TERMINAL,

            (Analyzing, AnalysisExpired) => {
                self.phase = Scored;
                self.hold_until =
                    Some(Instant::now() + ms(self.config.result_hold_ms));
                ReasonCode::H003_ANALYSIS_COMPLETE
            }

            (Scored, HoldExpired) => {
                if self.level < self.config.max_level {
                    self.phase = AwaitingClaim;
                    ReasonCode::H003_RETRY_ALLOWED
                } else {
                    self.phase = Offer;
                    ReasonCode::H003_OFFER_PRESENTED
                }
            }

            (Offer, TutorialChosen) => {
                self.phase = AwaitingClaim;
                self.replay_allowed = true;
                ReasonCode::H003_TUTORIAL_CHOSEN
            }
            (Offer, RejectionChosen) => {
                self.phase = Rejected;
                ReasonCode::H003_REJECTION_CHOSEN
            }

            // Timer and offer events outside their phase are stale; keep the
            // current phase's reason.
            (_, AnalysisExpired | HoldExpired | TutorialChosen | RejectionChosen) => {
                self.phase_reason()
            }
        }
    }

    /// Claim accepted from IDLE/AWAITING_CLAIM: level and humanity move here
    /// and nowhere else.
    fn accept_claim(&mut self) -> ReasonCode {
        if self.level >= self.config.max_level {
            if !self.replay_allowed {
                return ReasonCode::H001_CLAIM_IGNORED_MAX_LEVEL;
            }
            // Post-tutorial replay: same level, no further decay
            self.replay_allowed = false;
            self.start_analysis();
            return ReasonCode::H001_CLAIM_REPLAY;
        }

        self.level += 1;
        if self.config.humanity_at(self.level) == 0 {
            // Exhaustion overrides level progress
            self.phase = ChallengePhase::Exhausted;
            self.analysis_deadline = None;
            return ReasonCode::H003_HUMANITY_EXHAUSTED;
        }

        self.start_analysis();
        ReasonCode::H001_CLAIM_ACCEPTED
    }

    fn start_analysis(&mut self) {
        self.phase = ChallengePhase::Analyzing;
        self.analysis_deadline = Some(Instant::now() + ms(self.config.analysis_ms));
    }

    fn phase_reason(&self) -> ReasonCode {
        match self.phase {
            ChallengePhase::Idle => ReasonCode::H002_PHASE_IDLE,
            ChallengePhase::AwaitingClaim => ReasonCode::H002_PHASE_AWAITING,
            ChallengePhase::Analyzing => ReasonCode::H002_PHASE_ANALYZING,
            ChallengePhase::Scored => ReasonCode::H002_PHASE_SCORED,
            ChallengePhase::Offer => ReasonCode::H002_PHASE_OFFER,
            ChallengePhase::Rejected => ReasonCode::H003_REJECTION_CHOSEN,
            ChallengePhase::Exhausted => ReasonCode::H003_HUMANITY_EXHAUSTED,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn phase(&self) -> ChallengePhase {
        self.phase
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Humanity percentage - always recomputed from the level
    pub fn humanity_percentage(&self) -> u32 {
        self.config.humanity_at(self.level)
    }

    pub fn config(&self) -> &ChallengeConfig {
        &self.config
    }

    pub fn last_attempt(&self) -> Option<&ChallengeAttempt> {
        self.last_attempt.as_ref()
    }

    /// Countdown steps left while analyzing (ceil of remaining time)
    pub fn countdown_steps(&self) -> Option<u32> {
        if self.phase != ChallengePhase::Analyzing {
            return None;
        }
        let deadline = self.analysis_deadline?;
        let remaining_ms = deadline
            .saturating_duration_since(Instant::now())
            .as_millis() as u64;
        Some(remaining_ms.div_ceil(ANALYSIS_STEP_MS) as u32)
    }

    pub fn session_state(&self) -> SessionState {
        SessionState {
            level: self.level,
            humanity_percentage: self.humanity_percentage(),
            phase: self.phase,
        }
    }

    /// Current status snapshot
    pub fn status(&self) -> StatusOutput {
        StatusOutput::new(
            self.level,
            self.humanity_percentage(),
            self.phase,
            self.countdown_steps(),
            self.last_attempt.as_ref().map(|a| a.score),
            self.last_reason,
        )
    }
}

fn ms(millis: u64) -> std::time::Duration {
    std::time::Duration::from_millis(millis)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn fast_config() -> ChallengeConfig {
        ChallengeConfig {
            analysis_ms: 20,
            result_hold_ms: 20,
            ..ChallengeConfig::default()
        }
    }

    fn fast_controller() -> ChallengeController {
        ChallengeController::with_parts(fast_config(), ScoringEngine::with_seed(1))
    }

    /// Run until the pending attempt is scored
    fn run_analysis(c: &mut ChallengeController) -> ChallengeAttempt {
        sleep(Duration::from_millis(25));
        c.poll(None).expect("analysis should have expired")
    }

    /// Run through the scored hold back to a resting phase
    fn run_hold(c: &mut ChallengeController) {
        sleep(Duration::from_millis(25));
        c.poll(None);
    }

    #[test]
    fn test_initial_phase_is_idle() {
        let c = ChallengeController::new();
        assert_eq!(c.phase(), ChallengePhase::Idle);
        assert_eq!(c.level(), 0);
        assert_eq!(c.humanity_percentage(), 100);
    }

    #[test]
    fn test_claim_advances_level_and_decays_humanity() {
        let mut c = fast_controller();
        c.begin();
        let out = c.submit_claim();
        assert_eq!(out.level, 1);
        assert_eq!(out.humanity_percentage, 75);
        assert_eq!(out.phase, ChallengePhase::Analyzing);
        assert_eq!(out.reason, ReasonCode::H001_CLAIM_ACCEPTED);
    }

    #[test]
    fn test_claim_during_analysis_is_ignored() {
        let mut c = fast_controller();
        c.begin();
        c.submit_claim();

        let out = c.submit_claim();
        assert_eq!(out.reason, ReasonCode::H001_CLAIM_IGNORED_BUSY);
        assert_eq!(out.level, 1, "level must not move");
        assert_eq!(out.phase, ChallengePhase::Analyzing);
    }

    #[test]
    fn test_analysis_scores_and_holds() {
        let mut c = fast_controller();
        c.begin();
        c.submit_claim();

        let attempt = run_analysis(&mut c);
        assert_eq!(attempt.level, 1);
        assert!(attempt.score < crate::PASSING_THRESHOLD);
        assert_eq!(c.phase(), ChallengePhase::Scored);
    }

    #[test]
    fn test_claim_during_scored_hold_is_ignored() {
        let mut c = fast_controller();
        c.begin();
        c.submit_claim();
        run_analysis(&mut c);

        let out = c.submit_claim();
        assert_eq!(out.reason, ReasonCode::H001_CLAIM_IGNORED_BUSY);
        assert_eq!(c.level(), 1);
    }

    #[test]
    fn test_retry_below_max_level() {
        let mut c = fast_controller();
        c.begin();
        c.submit_claim();
        run_analysis(&mut c);
        run_hold(&mut c);
        assert_eq!(c.phase(), ChallengePhase::AwaitingClaim);
    }

    #[test]
    fn test_offer_at_max_level() {
        let mut c = fast_controller();
        c.begin();
        for _ in 0..3 {
            c.submit_claim();
            run_analysis(&mut c);
            run_hold(&mut c);
        }
        assert_eq!(c.level(), 3);
        assert_eq!(c.phase(), ChallengePhase::Offer);
        assert_eq!(c.humanity_percentage(), 25);
    }

    #[test]
    fn test_rejection_from_offer_is_terminal() {
        let mut c = fast_controller();
        c.begin();
        for _ in 0..3 {
            c.submit_claim();
            run_analysis(&mut c);
            run_hold(&mut c);
        }
        let out = c.choose_rejection();
        assert_eq!(out.phase, ChallengePhase::Rejected);

        let ignored = c.submit_claim();
        assert_eq!(ignored.reason, ReasonCode::H001_CLAIM_IGNORED_TERMINAL);
    }

    #[test]
    fn test_tutorial_allows_one_replay_without_level_change() {
        let mut c = fast_controller();
        c.begin();
        for _ in 0..3 {
            c.submit_claim();
            run_analysis(&mut c);
            run_hold(&mut c);
        }
        c.choose_tutorial();
        assert_eq!(c.phase(), ChallengePhase::AwaitingClaim);

        let out = c.submit_claim();
        assert_eq!(out.reason, ReasonCode::H001_CLAIM_REPLAY);
        assert_eq!(out.level, 3, "replay keeps the level");
        assert_eq!(out.humanity_percentage, 25, "no further decay");

        run_analysis(&mut c);
        run_hold(&mut c);
        assert_eq!(c.phase(), ChallengePhase::Offer, "replay ends back at the offer");

        // The replay allowance is one-shot
        c.choose_rejection();
        c.reset();
        let out = c.submit_claim();
        assert_eq!(out.reason, ReasonCode::H001_CLAIM_ACCEPTED);
    }

    #[test]
    fn test_humanity_exhaustion_overrides_level() {
        let config = ChallengeConfig {
            max_level: 5,
            humanity_decay_per_level: 50,
            analysis_ms: 20,
            result_hold_ms: 20,
        };
        let mut c = ChallengeController::with_parts(config, ScoringEngine::with_seed(2));
        c.begin();

        c.submit_claim();
        run_analysis(&mut c);
        run_hold(&mut c);
        assert_eq!(c.humanity_percentage(), 50);

        let out = c.submit_claim();
        assert_eq!(out.phase, ChallengePhase::Exhausted);
        assert_eq!(out.reason, ReasonCode::H003_HUMANITY_EXHAUSTED);
        assert_eq!(out.humanity_percentage, 0);
    }

    #[test]
    fn test_reset_from_terminal_restores_initial_values() {
        let mut c = fast_controller();
        c.begin();
        for _ in 0..3 {
            c.submit_claim();
            run_analysis(&mut c);
            run_hold(&mut c);
        }
        c.choose_rejection();
        assert!(c.phase().is_terminal());

        c.reset();
        assert_eq!(c.phase(), ChallengePhase::AwaitingClaim);
        assert_eq!(c.level(), 0);
        assert_eq!(c.humanity_percentage(), 100);
        assert!(c.last_attempt().is_none());
    }

    #[test]
    fn test_countdown_steps_only_while_analyzing() {
        let mut c = ChallengeController::with_parts(
            ChallengeConfig::default(),
            ScoringEngine::with_seed(3),
        );
        c.begin();
        assert_eq!(c.countdown_steps(), None);
        c.submit_claim();
        let steps = c.countdown_steps().unwrap();
        assert!(steps >= 1 && steps <= crate::ANALYSIS_STEPS);
    }

    #[test]
    fn test_tutorial_outside_offer_does_nothing() {
        let mut c = fast_controller();
        c.begin();
        let out = c.choose_tutorial();
        assert_eq!(out.phase, ChallengePhase::AwaitingClaim);
        assert_eq!(out.reason, ReasonCode::H002_PHASE_AWAITING);
    }

    #[test]
    fn test_poll_without_pending_work_is_noop() {
        let mut c = fast_controller();
        c.begin();
        assert!(c.poll(None).is_none());
        assert_eq!(c.phase(), ChallengePhase::AwaitingClaim);
    }
}
