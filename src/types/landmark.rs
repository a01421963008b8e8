//! Landmark geometry: points, frames, bounding boxes
//!
//! Index identity is a stable contract: for the full 468-point mesh the
//! semantic indices follow the FaceMesh convention, for the 6-point basic
//! set the order is fixed by [`BasicPoint`].

use serde::{Deserialize, Serialize};

// =============================================================================
// FULL MESH SEMANTIC INDICES (468-point FaceMesh convention)
// =============================================================================

pub const MESH_TOP_LIP: usize = 13;
pub const MESH_BOTTOM_LIP: usize = 14;
pub const MESH_LEFT_MOUTH_CORNER: usize = 61;
pub const MESH_RIGHT_MOUTH_CORNER: usize = 291;
pub const MESH_LEFT_EYE_OUTER: usize = 33;
pub const MESH_LEFT_EYE_INNER: usize = 133;
pub const MESH_RIGHT_EYE_INNER: usize = 362;
pub const MESH_RIGHT_EYE_OUTER: usize = 263;
pub const MESH_NOSE_TIP: usize = 1;
pub const MESH_CHIN: usize = 152;

/// A single tracked facial reference point in video-pixel space.
/// `z` defaults to 0 for synthetic or 2D-only sources.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// 2D point with z = 0
    pub fn flat(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Euclidean distance in the xy plane
    pub fn distance(&self, other: &Landmark) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Positions of the 6-point basic landmark set, in frame order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum BasicPoint {
    LeftEye = 0,
    RightEye = 1,
    Nose = 2,
    LeftMouthCorner = 3,
    RightMouthCorner = 4,
    Chin = 5,
}

/// Face bounding box as center + extents (not corner-origin)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Center x in pixels
    pub x: f64,
    /// Center y in pixels
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Derive the 6-point basic landmark set from the box center/extents:
    /// two eyes, nose, two mouth corners, chin (see [`BasicPoint`]).
    pub fn basic_landmarks(&self) -> LandmarkFrame {
        let (cx, cy) = self.center();
        let w = self.width;
        let h = self.height;
        LandmarkFrame::from_points(vec![
            Landmark::flat(cx - 0.18 * w, cy - 0.12 * h),
            Landmark::flat(cx + 0.18 * w, cy - 0.12 * h),
            Landmark::flat(cx, cy + 0.05 * h),
            Landmark::flat(cx - 0.15 * w, cy + 0.25 * h),
            Landmark::flat(cx + 0.15 * w, cy + 0.25 * h),
            Landmark::flat(cx, cy + 0.42 * h),
        ])
    }
}

/// An ordered sequence of landmarks for one face in one frame.
/// Length is 0 (no detection), 6 (basic set) or 468 (full mesh).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkFrame {
    points: Vec<Landmark>,
}

impl LandmarkFrame {
    /// Empty frame (no detection)
    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_points(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when the frame carries the full mesh with semantic indices
    pub fn is_full_mesh(&self) -> bool {
        self.points.len() >= crate::MESH_POINT_COUNT
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    /// Basic-set accessor; only meaningful for 6-point frames
    pub fn basic(&self, point: BasicPoint) -> Option<&Landmark> {
        self.points.get(point as usize)
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut [Landmark] {
        &mut self.points
    }

    /// Bounding box over min/max extents of all points.
    /// None for an empty frame.
    pub fn extents_box(&self) -> Option<BoundingBox> {
        let first = self.points.first()?;
        let mut min_x = first.x;
        let mut max_x = first.x;
        let mut min_y = first.y;
        let mut max_y = first.y;
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        Some(BoundingBox::new(
            (min_x + max_x) / 2.0,
            (min_y + max_y) / 2.0,
            max_x - min_x,
            max_y - min_y,
        ))
    }
}

// =============================================================================
// TESTS
// =============================================================================
