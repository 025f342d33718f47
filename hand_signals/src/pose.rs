//! Synthetic landmark sets.
//!
//! Builds geometrically plausible hands and faces from a handful of
//! parameters.  Used by the keyboard/mouse simulation source and by tests.

use glam::Vec2;

use crate::landmark::{idx, FaceLandmarks, HandLabel, HandLandmarks, HandObservation, Handedness};

/// Horizontal offset of each finger column from the hand centre.
const FINGER_DX: [f32; 4] = [-0.03, -0.01, 0.01, 0.03];

/// A hand described by which digits are extended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandPose {
    /// Knuckle line centre, in normalised image coordinates.
    pub center:  Vec2,
    pub thumb:   bool,
    /// Index, middle, ring, pinky.
    pub fingers: [bool; 4],
    /// Bring the thumb tip onto the index tip.
    pub pinch:   bool,
}

impl HandPose {
    pub fn open(center: Vec2) -> Self {
        HandPose { center, thumb: true, fingers: [true; 4], pinch: false }
    }

    pub fn fist(center: Vec2) -> Self {
        HandPose { center, thumb: false, fingers: [false; 4], pinch: false }
    }

    /// `n` extended digits: fingers from the index outward, the thumb only
    /// at five.
    pub fn counting(center: Vec2, n: u8) -> Self {
        let mut fingers = [false; 4];
        for (i, f) in fingers.iter_mut().enumerate() {
            *f = (i as u8) < n.min(4);
        }
        HandPose { center, thumb: n >= 5, fingers, pinch: false }
    }

    /// Index finger out, thumb tip touching it.  The thumb sits between the
    /// folded and extended spreads so the pose is neither a fist nor a count
    /// of two.
    pub fn pinching(center: Vec2) -> Self {
        HandPose { center, thumb: false, fingers: [true, false, false, false], pinch: true }
    }

    pub fn landmarks(&self) -> HandLandmarks {
        let c = self.center;
        let at = |dx: f32, dy: f32| Some(c + Vec2::new(dx, dy));
        let mut hand = HandLandmarks::default();

        hand.set(idx::WRIST, at(0.0, 0.10));

        for (f, &dx) in FINGER_DX.iter().enumerate() {
            let mcp = idx::INDEX_MCP + 4 * f;
            hand.set(mcp,     at(dx, 0.0));
            hand.set(mcp + 1, at(dx, -0.04));
            if self.fingers[f] {
                hand.set(mcp + 2, at(dx, -0.07));
                hand.set(mcp + 3, at(dx, -0.10));
            } else {
                hand.set(mcp + 2, at(dx, -0.03));
                hand.set(mcp + 3, at(dx, -0.02));
            }
        }

        hand.set(idx::THUMB_CMC, at(-0.04, 0.07));
        hand.set(idx::THUMB_MCP, at(-0.07, 0.05));
        if self.thumb {
            hand.set(idx::THUMB_IP,  at(-0.11, 0.03));
            hand.set(idx::THUMB_TIP, at(-0.16, 0.02));
        } else {
            hand.set(idx::THUMB_IP,  at(0.00, 0.07));
            hand.set(idx::THUMB_TIP, at(0.06, 0.07));
        }

        if self.pinch {
            let tip = hand.get(idx::INDEX_TIP).map(|t| t + Vec2::new(-0.08, 0.02));
            hand.set(idx::THUMB_TIP, tip);
        }
        hand
    }

    pub fn observe(&self, label: HandLabel) -> HandObservation {
        HandObservation { landmarks: self.landmarks(), handedness: Some(Handedness::new(label)) }
    }
}

/// Half the distance between the two outer eye corners.
const EYE_HALF_SPAN: f32 = 0.06;

/// A face centred at `center` whose eye line is rotated by `tilt` radians
/// (positive tips the image-right corner downward).
pub fn face(center: Vec2, tilt: f32) -> FaceLandmarks {
    let half = Vec2::new(tilt.cos(), tilt.sin()) * EYE_HALF_SPAN;
    FaceLandmarks::sparse(&[
        (1,   center + Vec2::new(0.0, 0.04)),
        (33,  center - half),
        (263, center + half),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_clamps_at_five() {
        assert_eq!(HandPose::counting(Vec2::ZERO, 9), HandPose::open(Vec2::ZERO));
        assert_eq!(HandPose::counting(Vec2::ZERO, 0), HandPose::fist(Vec2::ZERO));
    }

    #[test]
    fn landmarks_are_complete() {
        assert_eq!(HandPose::open(Vec2::splat(0.5)).landmarks().iter().count(), 21);
    }

    #[test]
    fn face_has_eye_corners() {
        let f = face(Vec2::splat(0.5), 0.0);
        let a = f.get(33).unwrap();
        let b = f.get(263).unwrap();
        assert!((b.x - a.x - 0.12).abs() < 1e-6);
        assert_eq!(a.y, b.y);
    }
}
