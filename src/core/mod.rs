//! Core modules for HumanGate

pub mod normalizer;
pub mod tracker;
pub mod scoring;
pub mod controller;
pub mod projector;
pub mod session;
pub mod api;

pub use normalizer::LandmarkNormalizer;
pub use tracker::{fallback_box, LandmarkTracker, TrackedFace, TrackingMode};
pub use scoring::ScoringEngine;
pub use controller::ChallengeController;
pub use projector::{OverlayFrame, OverlayProjector, ScreenPoint};
pub use session::{FrameInput, VerificationSession};
pub use api::{create_router, run_server};
