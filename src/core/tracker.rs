//! Landmark tracker: smoothed per-frame facial state
//!
//! Two modes:
//! - Detected: consumes normalized frames of >= 6 points, applies
//!   per-coordinate EMA smoothing (fast alpha for landmarks, slow alpha
//!   for the bounding box)
//! - Fallback: no usable detection this frame; synthesizes a box that
//!   oscillates as a deterministic function of elapsed time and derives
//!   the 6-point basic set from it
//!
//! The bounding box is always recomputed from the current smoothed landmark
//! extents, so box and landmarks never diverge. A failed detection falls
//! through to fallback for that frame only; detected mode resumes on the
//! next successful detection.

use serde::{Deserialize, Serialize};
use crate::types::{BoundingBox, LandmarkFrame};
use crate::{BASIC_POINT_COUNT, BOX_SMOOTHING_ALPHA, LANDMARK_SMOOTHING_ALPHA};

/// Frame size used when the video source reports degenerate dimensions
const FALLBACK_FRAME_WIDTH: f64 = 640.0;
const FALLBACK_FRAME_HEIGHT: f64 = 480.0;

// Fallback oscillation amplitudes (pixels) and angular frequencies (rad/s)
const JITTER_X_AMPLITUDE: f64 = 12.0;
const JITTER_Y_AMPLITUDE: f64 = 8.0;
const JITTER_SIZE_AMPLITUDE: f64 = 6.0;
const JITTER_X_FREQ: f64 = 0.8;
const JITTER_Y_FREQ: f64 = 0.6;
const JITTER_W_FREQ: f64 = 0.5;
const JITTER_H_FREQ: f64 = 0.7;

/// Which pipeline produced the current tracked state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingMode {
    Detected,
    Fallback,
}

/// The tracker's persistent per-face state, mutated once per tracked frame.
/// Created lazily on the first frame; reset only on session reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedFace {
    pub landmarks: LandmarkFrame,
    pub bounding_box: BoundingBox,
    pub mode: TrackingMode,
}

impl TrackedFace {
    /// Face center mirrors the box center
    pub fn face_center(&self) -> (f64, f64) {
        self.bounding_box.center()
    }
}

/// Per-session landmark tracker
#[derive(Debug, Default)]
pub struct LandmarkTracker {
    face: Option<TrackedFace>,
}

impl LandmarkTracker {
    /// Create new tracker
    pub fn new() -> Self {
        Self { face: None }
    }

    /// One tracking step per frame.
    ///
    /// `detection` carries the normalized landmark frame when the detector
    /// produced one; None (or a frame below the basic point count) engages
    /// fallback mode for this frame. `elapsed_secs` drives the fallback
    /// oscillation and must be monotonic within a session.
    pub fn track(
        &mut self,
        elapsed_secs: f64,
        frame_width: f64,
        frame_height: f64,
        detection: Option<LandmarkFrame>,
    ) -> &TrackedFace {
        let next = match detection {
            Some(frame) if frame.len() >= BASIC_POINT_COUNT => self.track_detected(frame),
            _ => track_fallback(elapsed_secs, frame_width, frame_height),
        };
        self.face.insert(next)
    }

    /// Current tracked state, if any frame has been processed
    pub fn face(&self) -> Option<&TrackedFace> {
        self.face.as_ref()
    }

    /// Discard all tracked state
    pub fn reset(&mut self) {
        self.face = None;
    }

    fn track_detected(&self, raw: LandmarkFrame) -> TrackedFace {
        let smoothed = match &self.face {
            // Smoothing only applies across frames with matching landmark
            // counts; a count change (basic <-> mesh) reinitializes.
            Some(face)
                if face.mode == TrackingMode::Detected
                    && face.landmarks.len() == raw.len() =>
            {
                let mut next = face.landmarks.clone();
                for (s, r) in next.points_mut().iter_mut().zip(raw.points()) {
                    s.x += (r.x - s.x) * LANDMARK_SMOOTHING_ALPHA;
                    s.y += (r.y - s.y) * LANDMARK_SMOOTHING_ALPHA;
                    s.z += (r.z - s.z) * LANDMARK_SMOOTHING_ALPHA;
                }
                next
            }
            _ => raw,
        };

        // Box from current smoothed extents, then the slower EMA on top
        let raw_box = smoothed
            .extents_box()
            .unwrap_or(BoundingBox::new(0.0, 0.0, 0.0, 0.0));
        let bounding_box = match &self.face {
            Some(face) if face.mode == TrackingMode::Detected => {
                smooth_box(&face.bounding_box, &raw_box)
            }
            _ => raw_box,
        };

        TrackedFace {
            landmarks: smoothed,
            bounding_box,
            mode: TrackingMode::Detected,
        }
    }
}

fn track_fallback(elapsed_secs: f64, frame_width: f64, frame_height: f64) -> TrackedFace {
    let bounding_box = fallback_box(elapsed_secs, frame_width, frame_height);
    let landmarks = bounding_box.basic_landmarks();
    TrackedFace {
        landmarks,
        bounding_box,
        mode: TrackingMode::Fallback,
    }
}

/// Synthetic bounding box for fallback mode: centered on the frame with
/// sinusoidal jitter on position and size. Pure in `elapsed_secs`, so the
/// same timestamp always reproduces the same box.
pub fn fallback_box(elapsed_secs: f64, frame_width: f64, frame_height: f64) -> BoundingBox {
    let w = if frame_width > 0.0 { frame_width } else { FALLBACK_FRAME_WIDTH };
    let h = if frame_height > 0.0 { frame_height } else { FALLBACK_FRAME_HEIGHT };
    let t = elapsed_secs;

    BoundingBox::new(
        w / 2.0 + (t * JITTER_X_FREQ).sin() * JITTER_X_AMPLITUDE,
        h / 2.0 + (t * JITTER_Y_FREQ).cos() * JITTER_Y_AMPLITUDE,
        w * 0.35 + (t * JITTER_W_FREQ).sin() * JITTER_SIZE_AMPLITUDE,
        h * 0.45 + (t * JITTER_H_FREQ).cos() * JITTER_SIZE_AMPLITUDE,
    )
}

fn smooth_box(prev: &BoundingBox, raw: &BoundingBox) -> BoundingBox {
    let a = BOX_SMOOTHING_ALPHA;
    BoundingBox::new(
        prev.x + (raw.x - prev.x) * a,
        prev.y + (raw.y - prev.y) * a,
        prev.width + (raw.width - prev.width) * a,
        prev.height + (raw.height - prev.height) * a,
    )
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Landmark;

    const W: f64 = 640.0;
    const H: f64 = 480.0;

    fn basic_frame(offset: f64) -> LandmarkFrame {
        LandmarkFrame::from_points(
            (0..BASIC_POINT_COUNT)
                .map(|i| Landmark::flat(100.0 + offset + i as f64 * 10.0, 200.0 + offset))
                .collect(),
        )
    }

    #[test]
    fn test_first_detection_initializes_directly() {
        let mut tracker = LandmarkTracker::new();
        let face = tracker.track(0.0, W, H, Some(basic_frame(0.0)));
        assert_eq!(face.mode, TrackingMode::Detected);
        assert_eq!(face.landmarks, basic_frame(0.0));
    }

    #[test]
    fn test_smoothing_delta_is_alpha_exact() {
        let mut tracker = LandmarkTracker::new();
        tracker.track(0.0, W, H, Some(basic_frame(0.0)));
        let face = tracker.track(0.1, W, H, Some(basic_frame(10.0)));

        // Raw delta is 10 on both axes; smoothed delta must be exactly 10*alpha
        let expected = 10.0 * LANDMARK_SMOOTHING_ALPHA;
        let p = face.landmarks.get(0).unwrap();
        assert!((p.x - (100.0 + expected)).abs() < 1e-9);
        assert!((p.y - (200.0 + expected)).abs() < 1e-9);
    }

    #[test]
    fn test_box_recomputed_from_smoothed_extents() {
        let mut tracker = LandmarkTracker::new();
        let face = tracker.track(0.0, W, H, Some(basic_frame(0.0)));
        let expected = face.landmarks.extents_box().unwrap();
        assert_eq!(face.bounding_box, expected);
    }

    #[test]
    fn test_box_smoothing_is_slower() {
        let mut tracker = LandmarkTracker::new();
        tracker.track(0.0, W, H, Some(basic_frame(0.0)));
        let face = tracker.track(0.1, W, H, Some(basic_frame(10.0)));

        // Landmark extents moved by 10*0.7 = 7; the box center only follows
        // at the slower alpha: 7 * 0.3 = 2.1
        assert!((face.bounding_box.x - (125.0 + 2.1)).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_box_is_deterministic() {
        let a = fallback_box(1.5, W, H);
        let b = fallback_box(1.5, W, H);
        assert_eq!(a, b);
        let c = fallback_box(1.6, W, H);
        assert_ne!(a, c);
    }

    #[test]
    fn test_fallback_box_golden_values_at_t0() {
        // t = 0: sin terms vanish, cos terms are 1
        let bb = fallback_box(0.0, W, H);
        assert_eq!(bb.x, 320.0);
        assert_eq!(bb.y, 240.0 + 8.0);
        assert_eq!(bb.width, 224.0);
        assert_eq!(bb.height, 216.0 + 6.0);
    }

    #[test]
    fn test_empty_detection_engages_fallback() {
        let mut tracker = LandmarkTracker::new();
        let face = tracker.track(0.5, W, H, Some(LandmarkFrame::empty()));
        assert_eq!(face.mode, TrackingMode::Fallback);
        assert_eq!(face.landmarks.len(), BASIC_POINT_COUNT);
    }

    #[test]
    fn test_hundred_empty_frames_stay_in_fallback() {
        let mut tracker = LandmarkTracker::new();
        for i in 0..100 {
            let face = tracker.track(i as f64 / 30.0, W, H, None);
            assert_eq!(face.mode, TrackingMode::Fallback);
        }
        assert!(tracker.face().is_some());
    }

    #[test]
    fn test_detected_resumes_after_fallback() {
        let mut tracker = LandmarkTracker::new();
        tracker.track(0.0, W, H, Some(basic_frame(0.0)));
        tracker.track(0.1, W, H, None);
        let face = tracker.track(0.2, W, H, Some(basic_frame(5.0)));
        assert_eq!(face.mode, TrackingMode::Detected);
    }

    #[test]
    fn test_zero_frame_size_uses_fallback_dimensions() {
        let mut tracker = LandmarkTracker::new();
        let face = tracker.track(0.0, 0.0, 0.0, None);
        assert_eq!(face.bounding_box.x, FALLBACK_FRAME_WIDTH / 2.0);
    }

    #[test]
    fn test_landmark_count_change_reinitializes() {
        let mut tracker = LandmarkTracker::new();
        tracker.track(0.0, W, H, Some(basic_frame(0.0)));

        let mesh = LandmarkFrame::from_points(
            (0..crate::MESH_POINT_COUNT)
                .map(|i| Landmark::flat(i as f64, i as f64))
                .collect(),
        );
        let face = tracker.track(0.1, W, H, Some(mesh.clone()));
        assert_eq!(face.landmarks, mesh, "no smoothing across count change");
    }

    #[test]
    fn test_reset_discards_state() {
        let mut tracker = LandmarkTracker::new();
        tracker.track(0.0, W, H, None);
        assert!(tracker.face().is_some());
        tracker.reset();
        assert!(tracker.face().is_none());
    }

    #[test]
    fn test_face_center_mirrors_box_center() {
        let mut tracker = LandmarkTracker::new();
        let face = tracker.track(2.0, W, H, None);
        assert_eq!(face.face_center(), face.bounding_box.center());
    }
}
