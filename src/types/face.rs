//! Accepted detector input shapes
//!
//! The detector capability is a black box; the shapes it may hand us form a
//! small closed set, tagged by structure. Anything outside the set fails
//! deserialization and counts as "no landmarks" upstream.

use serde::{Deserialize, Serialize};

/// One raw keypoint as provided by a detector: either an object with named
/// coordinates or a positional tuple. Both in the detector's own coordinate
/// space (normalized [0,1] or pixels - classified later).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawKeypoint {
    /// `{"x": .., "y": .., "z": ..?}`
    Object {
        x: f64,
        y: f64,
        #[serde(default)]
        z: f64,
    },
    /// `[x, y, z]`
    Triple(f64, f64, f64),
    /// `[x, y]`
    Pair(f64, f64),
}

impl RawKeypoint {
    pub fn coords(&self) -> (f64, f64, f64) {
        match *self {
            RawKeypoint::Object { x, y, z } => (x, y, z),
            RawKeypoint::Triple(x, y, z) => (x, y, z),
            RawKeypoint::Pair(x, y) => (x, y, 0.0),
        }
    }
}

/// Bounding-box summary as some detectors report it: corner origin plus size,
/// normalized or pixel-scaled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawBox {
    #[serde(alias = "xMin", alias = "x_min")]
    pub x: f64,
    #[serde(alias = "yMin", alias = "y_min")]
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A single detected face in one of the accepted shapes.
/// Keypoints are preferred over a box summary when both could apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FaceRecord {
    /// Per-point keypoints under a `keypoints` (or `landmarks`) field
    Keypoints {
        #[serde(alias = "landmarks", alias = "scaledMesh")]
        keypoints: Vec<RawKeypoint>,
    },
    /// Box-only summary under a `boundingBox` (or `box`) field
    Box {
        #[serde(alias = "box", alias = "bounding_box")]
        #[serde(rename = "boundingBox")]
        bounding_box: RawBox,
    },
}

impl FaceRecord {
    /// Parse an opaque detector value into the closed shape set.
    /// None for anything unrecognized - never an error.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_keypoints() {
        let v = json!({"keypoints": [{"x": 0.5, "y": 0.5}, {"x": 0.6, "y": 0.4, "z": 0.1}]});
        let rec = FaceRecord::from_value(&v).unwrap();
        match rec {
            FaceRecord::Keypoints { keypoints } => {
                assert_eq!(keypoints.len(), 2);
                assert_eq!(keypoints[0].coords(), (0.5, 0.5, 0.0));
                assert_eq!(keypoints[1].coords(), (0.6, 0.4, 0.1));
            }
            _ => panic!("expected keypoints shape"),
        }
    }

    #[test]
    fn test_positional_keypoints_under_landmarks_alias() {
        let v = json!({"landmarks": [[120.0, 80.0], [130.0, 90.0, 2.0]]});
        let rec = FaceRecord::from_value(&v).unwrap();
        match rec {
            FaceRecord::Keypoints { keypoints } => {
                assert_eq!(keypoints[0].coords(), (120.0, 80.0, 0.0));
                assert_eq!(keypoints[1].coords(), (130.0, 90.0, 2.0));
            }
            _ => panic!("expected keypoints shape"),
        }
    }

    #[test]
    fn test_box_summary() {
        let v = json!({"boundingBox": {"xMin": 0.2, "yMin": 0.3, "width": 0.4, "height": 0.5}});
        let rec = FaceRecord::from_value(&v).unwrap();
        match rec {
            FaceRecord::Box { bounding_box } => {
                assert_eq!(bounding_box.x, 0.2);
                assert_eq!(bounding_box.height, 0.5);
            }
            _ => panic!("expected box shape"),
        }
    }

    #[test]
    fn test_keypoints_preferred_over_box() {
        // Untagged variants try in declaration order: keypoints win
        let v = json!({
            "keypoints": [{"x": 1.0, "y": 2.0}],
            "boundingBox": {"x": 0.0, "y": 0.0, "width": 1.0, "height": 1.0}
        });
        assert!(matches!(
            FaceRecord::from_value(&v),
            Some(FaceRecord::Keypoints { .. })
        ));
    }

    #[test]
    fn test_unrecognized_shape_is_none() {
        assert!(FaceRecord::from_value(&json!({"confidence": 0.9})).is_none());
        assert!(FaceRecord::from_value(&json!("not a face")).is_none());
        assert!(FaceRecord::from_value(&json!(42)).is_none());
    }
}
