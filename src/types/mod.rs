//! Core types for Humangate

mod face;
mod landmark;
mod metrics;
mod output;
mod reason;
mod session;
mod state;

pub use face::{FaceRecord, RawBox, RawKeypoint};
pub use landmark::{
    BasicPoint, BoundingBox, Landmark, LandmarkFrame,
    MESH_BOTTOM_LIP, MESH_CHIN, MESH_LEFT_EYE_INNER, MESH_LEFT_EYE_OUTER,
    MESH_LEFT_MOUTH_CORNER, MESH_NOSE_TIP, MESH_RIGHT_EYE_INNER,
    MESH_RIGHT_EYE_OUTER, MESH_RIGHT_MOUTH_CORNER, MESH_TOP_LIP,
};
pub use metrics::{ChallengeAttempt, SubMetrics};
pub use output::StatusOutput;
pub use reason::ReasonCode;
pub use session::{ChallengeConfig, SessionState};
pub use state::ChallengePhase;
