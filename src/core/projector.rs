//! Overlay projector: tracked state → mirrored screen-space draw primitives
//!
//! The video is presented mirrored (selfie view), so every x coordinate is
//! flipped against the frame width before drawing. Actual rendering is a
//! presentation concern; this module only produces the primitives.

use serde::{Deserialize, Serialize};

use crate::core::tracker::TrackedFace;
use crate::types::{
    BasicPoint, BoundingBox, Landmark, SubMetrics,
    MESH_CHIN, MESH_LEFT_EYE_OUTER, MESH_LEFT_MOUTH_CORNER, MESH_NOSE_TIP,
    MESH_RIGHT_EYE_OUTER, MESH_RIGHT_MOUTH_CORNER,
};

/// A point in mirrored screen space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Labeled key-point marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub label: &'static str,
    pub point: ScreenPoint,
}

/// One metric bar, value in [0,100]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricBar {
    pub label: &'static str,
    pub value: f64,
}

/// Everything a renderer needs for one overlay frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayFrame {
    /// Convex hull of all landmarks, counterclockwise
    pub hull: Vec<ScreenPoint>,
    /// Semantic key-point markers
    pub markers: Vec<Marker>,
    /// Mirrored bounding box (center + extents)
    pub bounding_box: BoundingBox,
    /// Metric bars from the latest attempt, empty before the first score
    pub bars: Vec<MetricBar>,
}

/// Stateless projector
#[derive(Debug, Default)]
pub struct OverlayProjector;

impl OverlayProjector {
    /// Create new projector
    pub fn new() -> Self {
        Self
    }

    /// Project the tracked face into mirrored screen space
    pub fn project(
        &self,
        face: &TrackedFace,
        frame_width: f64,
        metrics: Option<&SubMetrics>,
    ) -> OverlayFrame {
        let mirror = |p: &Landmark| ScreenPoint {
            x: frame_width - p.x,
            y: p.y,
        };

        let mirrored: Vec<ScreenPoint> = face.landmarks.points().iter().map(mirror).collect();
        let hull = convex_hull(&mirrored);
        let markers = key_markers(face, &mirror);

        let bb = face.bounding_box;
        let bounding_box = BoundingBox::new(frame_width - bb.x, bb.y, bb.width, bb.height);

        let bars = metrics.map(metric_bars).unwrap_or_default();

        OverlayFrame {
            hull,
            markers,
            bounding_box,
            bars,
        }
    }
}

fn metric_bars(m: &SubMetrics) -> Vec<MetricBar> {
    vec![
        MetricBar { label: "mouth curvature", value: m.mouth_curvature },
        MetricBar { label: "eye symmetry", value: m.eye_symmetry },
        MetricBar { label: "smile intensity", value: m.smile_intensity },
        MetricBar { label: "mouth width", value: m.mouth_width },
        MetricBar { label: "facial tension", value: m.facial_tension },
    ]
}

fn key_markers(face: &TrackedFace, mirror: &impl Fn(&Landmark) -> ScreenPoint) -> Vec<Marker> {
    let lm = &face.landmarks;
    let semantic: &[(&'static str, usize)] = if lm.is_full_mesh() {
        &[
            ("left_eye", MESH_LEFT_EYE_OUTER),
            ("right_eye", MESH_RIGHT_EYE_OUTER),
            ("nose", MESH_NOSE_TIP),
            ("left_mouth_corner", MESH_LEFT_MOUTH_CORNER),
            ("right_mouth_corner", MESH_RIGHT_MOUTH_CORNER),
            ("chin", MESH_CHIN),
        ]
    } else {
        &[
            ("left_eye", BasicPoint::LeftEye as usize),
            ("right_eye", BasicPoint::RightEye as usize),
            ("nose", BasicPoint::Nose as usize),
            ("left_mouth_corner", BasicPoint::LeftMouthCorner as usize),
            ("right_mouth_corner", BasicPoint::RightMouthCorner as usize),
            ("chin", BasicPoint::Chin as usize),
        ]
    };

    semantic
        .iter()
        .filter_map(|(label, idx)| {
            lm.get(*idx).map(|p| Marker {
                label,
                point: mirror(p),
            })
        })
        .collect()
}

/// Convex hull via the monotone chain, counterclockwise order.
/// Degenerate inputs (< 3 points) come back as-is.
fn convex_hull(points: &[ScreenPoint]) -> Vec<ScreenPoint> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    sorted.dedup_by(|a, b| a.x == b.x && a.y == b.y);
    if sorted.len() < 3 {
        return sorted;
    }

    let cross = |o: &ScreenPoint, a: &ScreenPoint, b: &ScreenPoint| {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    };

    let mut lower: Vec<ScreenPoint> = Vec::new();
    for p in &sorted {
        while lower.len() >= 2
            && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0
        {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<ScreenPoint> = Vec::new();
    for p in sorted.iter().rev() {
        while upper.len() >= 2
            && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0
        {
            upper.pop();
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

// =============================================================================
// TESTS
// =============================================================================
