//! Landmark normalizer: raw detector records → canonical pixel-space frames
//!
//! Rules, in order:
//! - prefer per-point keypoints over a box summary
//! - accept object-style or positional point encodings
//! - classify (x,y) as normalized [0,1] vs. pixel-scaled by range test,
//!   scaling normalized points by the current frame size
//! - a box-only record yields the derived 6-point basic set
//! - anything else yields no landmarks
//!
//! Side-effect-free and deterministic given identical input.

use crate::types::{BoundingBox, FaceRecord, Landmark, LandmarkFrame, RawBox};

/// Stateless normalizer for detector output
#[derive(Debug, Default)]
pub struct LandmarkNormalizer;

impl LandmarkNormalizer {
    /// Create new normalizer
    pub fn new() -> Self {
        Self
    }

    /// Normalize one opaque detector value against the current frame size.
    /// None means "unusable" - malformed shape, empty keypoints, or a
    /// degenerate frame size.
    pub fn normalize(
        &self,
        raw: &serde_json::Value,
        frame_width: f64,
        frame_height: f64,
    ) -> Option<LandmarkFrame> {
        if frame_width <= 0.0 || frame_height <= 0.0 {
            return None;
        }

        match FaceRecord::from_value(raw)? {
            FaceRecord::Keypoints { keypoints } => {
                if keypoints.is_empty() {
                    return None;
                }
                let points = keypoints
                    .iter()
                    .map(|kp| {
                        let (x, y, z) = kp.coords();
                        scale_point(x, y, z, frame_width, frame_height)
                    })
                    .collect();
                Some(LandmarkFrame::from_points(points))
            }
            FaceRecord::Box { bounding_box } => {
                Some(box_to_frame(&bounding_box, frame_width, frame_height).basic_landmarks())
            }
        }
    }
}

/// Range test: both coordinates inside [0,1] means normalized space
fn is_normalized(x: f64, y: f64) -> bool {
    (0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y)
}

fn scale_point(x: f64, y: f64, z: f64, frame_width: f64, frame_height: f64) -> Landmark {
    if is_normalized(x, y) {
        Landmark::new(x * frame_width, y * frame_height, z)
    } else {
        Landmark::new(x, y, z)
    }
}

/// Convert a corner-origin raw box to the center+extent convention,
/// scaling from normalized space when needed.
fn box_to_frame(raw: &RawBox, frame_width: f64, frame_height: f64) -> BoundingBox {
    let normalized = is_normalized(raw.x, raw.y)
        && raw.width <= 1.0
        && raw.height <= 1.0;
    let (x, y, w, h) = if normalized {
        (
            raw.x * frame_width,
            raw.y * frame_height,
            raw.width * frame_width,
            raw.height * frame_height,
        )
    } else {
        (raw.x, raw.y, raw.width, raw.height)
    };
    BoundingBox::new(x + w / 2.0, y + h / 2.0, w, h)
}

// =============================================================================
// TESTS
// =============================================================================
