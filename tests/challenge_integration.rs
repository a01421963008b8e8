//! Integration tests for the full challenge loop
//!
//! Drives a VerificationSession frame by frame through claims, scoring,
//! the offer and both terminal outcomes.

use humangate::core::{FrameInput, VerificationSession};
use humangate::types::{ChallengeConfig, ChallengePhase, ReasonCode};
use humangate::PASSING_THRESHOLD;
use std::thread::sleep;
use std::time::Duration;

fn fast_config() -> ChallengeConfig {
    ChallengeConfig {
        analysis_ms: 20,
        result_hold_ms: 20,
        ..ChallengeConfig::default()
    }
}

fn fast_session() -> VerificationSession {
    VerificationSession::with_seed(fast_config(), 21)
}

fn frame(elapsed: f64) -> FrameInput {
    FrameInput {
        width: 640.0,
        height: 480.0,
        elapsed: Some(elapsed),
        faces: vec![],
    }
}

/// Pump frames until the in-flight attempt scores, then through the hold
fn complete_cycle(session: &mut VerificationSession, t: &mut f64) -> f64 {
    sleep(Duration::from_millis(25));
    *t += 0.1;
    let attempt = session
        .ingest_frame(&frame(*t))
        .expect("analysis should complete");
    sleep(Duration::from_millis(25));
    *t += 0.1;
    session.ingest_frame(&frame(*t));
    attempt.score
}

/// One full claim → analysis → score → retry cycle
#[test]
fn test_single_challenge_cycle() {
    let mut session = fast_session();
    let mut t = 0.0;

    let out = session.submit_claim();
    assert_eq!(out.phase, ChallengePhase::Analyzing);
    assert_eq!(out.level, 1);
    assert_eq!(out.humanity_percentage, 75);

    let score = complete_cycle(&mut session, &mut t);
    assert!(score < PASSING_THRESHOLD);
    assert_eq!(session.status().phase, ChallengePhase::AwaitingClaim);
    assert_eq!(session.status().score, Some(score));
}

/// Three failures land on the offer with 25% humanity left
#[test]
fn test_three_failures_reach_offer() {
    let mut session = fast_session();
    let mut t = 0.0;

    for expected_level in 1..=3 {
        let out = session.submit_claim();
        assert_eq!(out.level, expected_level);
        complete_cycle(&mut session, &mut t);
    }

    let status = session.status();
    assert_eq!(status.phase, ChallengePhase::Offer);
    assert_eq!(status.humanity_percentage, 25);

    // Claims at the offer are ignored
    let ignored = session.submit_claim();
    assert_eq!(ignored.reason, ReasonCode::H001_CLAIM_IGNORED_BUSY);
    assert_eq!(ignored.level, 3);
}

/// The tutorial buys exactly one replay, which fails back to the offer
#[test]
fn test_tutorial_replay_fails_back_to_offer() {
    let mut session = fast_session();
    let mut t = 0.0;

    for _ in 0..3 {
        session.submit_claim();
        complete_cycle(&mut session, &mut t);
    }
    session.choose_tutorial();
    assert_eq!(session.status().phase, ChallengePhase::AwaitingClaim);

    let out = session.submit_claim();
    assert_eq!(out.reason, ReasonCode::H001_CLAIM_REPLAY);
    assert_eq!(out.level, 3);
    assert_eq!(out.humanity_percentage, 25);

    let score = complete_cycle(&mut session, &mut t);
    assert!(score < PASSING_THRESHOLD);
    assert_eq!(session.status().phase, ChallengePhase::Offer);

    // The allowance is spent; another claim without a new tutorial is ignored
    session.choose_rejection();
    assert_eq!(session.status().phase, ChallengePhase::Rejected);
}

/// Rejection is terminal until reset
#[test]
fn test_rejection_then_reset() {
    let mut session = fast_session();
    let mut t = 0.0;

    for _ in 0..3 {
        session.submit_claim();
        complete_cycle(&mut session, &mut t);
    }
    session.choose_rejection();

    let ignored = session.submit_claim();
    assert_eq!(ignored.reason, ReasonCode::H001_CLAIM_IGNORED_TERMINAL);

    session.reset();
    let state = session.session_state();
    assert_eq!(state.phase, ChallengePhase::AwaitingClaim);
    assert_eq!(state.level, 0);
    assert_eq!(state.humanity_percentage, 100);
    assert!(session.last_attempt().is_none());
}

/// The reverse calibration runs five levels and exhausts humanity
#[test]
fn test_reverse_challenge_exhausts_humanity() {
    let config = ChallengeConfig {
        analysis_ms: 20,
        result_hold_ms: 20,
        ..ChallengeConfig::reverse_challenge()
    };
    let mut session = VerificationSession::with_seed(config, 8);
    let mut t = 0.0;

    for expected_level in 1..=4 {
        let out = session.submit_claim();
        assert_eq!(out.level, expected_level);
        assert_eq!(out.humanity_percentage, 100 - expected_level * 20);
        complete_cycle(&mut session, &mut t);
    }

    // Level 5 would leave 0% humanity: the claim tips into exhaustion
    let out = session.submit_claim();
    assert_eq!(out.phase, ChallengePhase::Exhausted);
    assert_eq!(out.humanity_percentage, 0);
    assert_eq!(out.reason, ReasonCode::H003_HUMANITY_EXHAUSTED);
}

/// Overlay primitives follow the tracked face across the whole loop
#[test]
fn test_overlay_available_throughout() {
    let mut session = fast_session();
    let mut t = 0.0;

    assert!(session.overlay().is_none(), "no overlay before any frame");

    session.ingest_frame(&frame(t));
    let overlay = session.overlay().expect("overlay after first frame");
    assert!(overlay.bars.is_empty(), "no bars before the first score");
    assert!(!overlay.hull.is_empty());

    session.submit_claim();
    complete_cycle(&mut session, &mut t);

    let overlay = session.overlay().expect("overlay after scoring");
    assert_eq!(overlay.bars.len(), 5);
}

/// Scores across a whole session stay inside the engine's global range
#[test]
fn test_session_scores_never_pass() {
    for seed in 0..10 {
        let mut session = VerificationSession::with_seed(fast_config(), seed);
        let mut t = 0.0;
        for _ in 0..3 {
            session.submit_claim();
            let score = complete_cycle(&mut session, &mut t);
            assert!(score < PASSING_THRESHOLD, "seed {} scored {}", seed, score);
        }
    }
}
