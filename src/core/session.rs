//! Verification session: one owned engine instance with explicit teardown
//!
//! Wires normalizer → tracker → controller → projector. The host feeds
//! frames and trigger events; the session never performs I/O itself.

use std::time::Instant;

use serde::Deserialize;

use crate::core::controller::ChallengeController;
use crate::core::normalizer::LandmarkNormalizer;
use crate::core::projector::{OverlayFrame, OverlayProjector};
use crate::core::scoring::ScoringEngine;
use crate::core::tracker::{LandmarkTracker, TrackedFace};
use crate::types::{
    ChallengeAttempt, ChallengeConfig, LandmarkFrame, SessionState, StatusOutput,
};

/// One video frame's worth of input: dimensions plus whatever the detector
/// produced (zero or more opaque face records; absent detector sends none).
#[derive(Debug, Clone, Deserialize)]
pub struct FrameInput {
    pub width: f64,
    pub height: f64,
    /// Seconds since session start. Hosts that cannot supply a clock omit
    /// it and the session's own clock is used.
    #[serde(default)]
    pub elapsed: Option<f64>,
    #[serde(default)]
    pub faces: Vec<serde_json::Value>,
}

/// A single local, ephemeral verification session
#[derive(Debug)]
pub struct VerificationSession {
    normalizer: LandmarkNormalizer,
    tracker: LandmarkTracker,
    controller: ChallengeController,
    projector: OverlayProjector,
    started: Instant,
    last_frame_width: f64,
    active: bool,
}

impl Default for VerificationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl VerificationSession {
    /// Create session with default configuration
    pub fn new() -> Self {
        Self::with_config(ChallengeConfig::default())
    }

    /// Create session with explicit configuration
    pub fn with_config(config: ChallengeConfig) -> Self {
        Self::from_controller(ChallengeController::with_config(config))
    }

    /// Create session with a seeded scoring engine (reproducible runs)
    pub fn with_seed(config: ChallengeConfig, seed: u64) -> Self {
        Self::from_controller(ChallengeController::with_parts(
            config,
            ScoringEngine::with_seed(seed),
        ))
    }

    fn from_controller(mut controller: ChallengeController) -> Self {
        controller.begin();
        Self {
            normalizer: LandmarkNormalizer::new(),
            tracker: LandmarkTracker::new(),
            controller,
            projector: OverlayProjector::new(),
            started: Instant::now(),
            last_frame_width: 0.0,
            active: true,
        }
    }

    /// Ingest one frame: normalize the first usable face record, advance the
    /// tracker, then advance the controller's timers. Returns the fresh
    /// attempt when the analysis countdown expired on this frame.
    ///
    /// No-op after shutdown: a late frame must not mutate state.
    pub fn ingest_frame(&mut self, frame: &FrameInput) -> Option<ChallengeAttempt> {
        if !self.active {
            return None;
        }

        let elapsed = frame
            .elapsed
            .unwrap_or_else(|| self.started.elapsed().as_secs_f64());
        self.last_frame_width = frame.width;

        let detection: Option<LandmarkFrame> = frame
            .faces
            .iter()
            .find_map(|raw| self.normalizer.normalize(raw, frame.width, frame.height));

        self.tracker.track(elapsed, frame.width, frame.height, detection);
        self.controller.poll(self.tracker.face())
    }

    /// Submit a humanity claim (trigger event)
    pub fn submit_claim(&mut self) -> StatusOutput {
        if !self.active {
            return self.controller.status();
        }
        self.controller.submit_claim()
    }

    /// Take the tutorial offer
    pub fn choose_tutorial(&mut self) -> StatusOutput {
        if !self.active {
            return self.controller.status();
        }
        self.controller.choose_tutorial()
    }

    /// Accept the final rejection
    pub fn choose_rejection(&mut self) -> StatusOutput {
        if !self.active {
            return self.controller.status();
        }
        self.controller.choose_rejection()
    }

    /// Current status snapshot
    pub fn status(&self) -> StatusOutput {
        self.controller.status()
    }

    pub fn session_state(&self) -> SessionState {
        self.controller.session_state()
    }

    pub fn last_attempt(&self) -> Option<&ChallengeAttempt> {
        self.controller.last_attempt()
    }

    pub fn face(&self) -> Option<&TrackedFace> {
        self.tracker.face()
    }

    /// Overlay primitives for the current tracked state, None before the
    /// first frame
    pub fn overlay(&self) -> Option<OverlayFrame> {
        let face = self.tracker.face()?;
        let width = if self.last_frame_width > 0.0 {
            self.last_frame_width
        } else {
            face.bounding_box.width / 0.35 // fallback synthesis ratio
        };
        let metrics = self.controller.last_attempt().map(|a| &a.sub_metrics);
        Some(self.projector.project(face, width, metrics))
    }

    /// Reset to initial values; the session stays usable
    pub fn reset(&mut self) {
        self.controller.reset();
        self.tracker.reset();
        self.started = Instant::now();
        self.last_frame_width = 0.0;
    }

    /// Tear the session down: all further frames and triggers are ignored
    pub fn shutdown(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

// =============================================================================
// TESTS
// =============================================================================
