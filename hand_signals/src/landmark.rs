//! Landmark data model.
//!
//! A detector may drop individual points, so every slot is an `Option`.

use glam::Vec2;

use crate::error::{SignalError, SignalResult};

/// Normalised image coordinate.
pub type Point = Vec2;

// ════════════════════════════════════════════════════════════════════════════
// Hand landmarks
// ════════════════════════════════════════════════════════════════════════════

/// Slot indices of the 21-point hand layout.
pub mod idx {
    pub const WRIST:      usize = 0;
    pub const THUMB_CMC:  usize = 1;
    pub const THUMB_MCP:  usize = 2;
    pub const THUMB_IP:   usize = 3;
    pub const THUMB_TIP:  usize = 4;
    pub const INDEX_MCP:  usize = 5;
    pub const INDEX_PIP:  usize = 6;
    pub const INDEX_DIP:  usize = 7;
    pub const INDEX_TIP:  usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_PIP:   usize = 14;
    pub const RING_TIP:   usize = 16;
    pub const PINKY_MCP:  usize = 17;
    pub const PINKY_PIP:  usize = 18;
    pub const PINKY_TIP:  usize = 20;

    /// `(tip, pip)` pairs of the four non-thumb fingers.
    pub const FINGERS: [(usize, usize); 4] = [
        (INDEX_TIP,  INDEX_PIP),
        (MIDDLE_TIP, MIDDLE_PIP),
        (RING_TIP,   RING_PIP),
        (PINKY_TIP,  PINKY_PIP),
    ];
}

pub const HAND_POINTS: usize = 21;

/// Bones of the hand skeleton, for drawing.
pub const HAND_CONNECTIONS: [(usize, usize); 24] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (0, 9), (9, 10), (10, 11), (11, 12),
    (0, 13), (13, 14), (14, 15), (15, 16),
    (0, 17), (17, 18), (18, 19), (19, 20),
    (5, 9), (9, 13), (13, 17), (0, 17),
];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandLandmarks {
    points: [Option<Point>; HAND_POINTS],
}

impl HandLandmarks {
    /// Build from a detector's point list, filling slots in order.
    pub fn from_points(points: &[Point]) -> SignalResult<Self> {
        if points.len() > HAND_POINTS {
            return Err(SignalError::TooManyPoints { max: HAND_POINTS, got: points.len() });
        }
        let mut hand = HandLandmarks::default();
        for (slot, p) in hand.points.iter_mut().zip(points) {
            *slot = Some(*p);
        }
        Ok(hand)
    }

    pub fn get(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied().flatten()
    }

    pub fn set(&mut self, index: usize, point: Option<Point>) {
        if let Some(slot) = self.points.get_mut(index) {
            *slot = point;
        }
    }

    /// Present points with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Point)> + '_ {
        self.points.iter().enumerate().filter_map(|(i, p)| p.map(|p| (i, p)))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Face landmarks
// ════════════════════════════════════════════════════════════════════════════

/// Face mesh points, indexed as the detector numbers them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceLandmarks {
    points: Vec<Option<Point>>,
}

impl FaceLandmarks {
    pub fn from_points(points: &[Point]) -> Self {
        FaceLandmarks { points: points.iter().copied().map(Some).collect() }
    }

    /// A sparse face carrying only the given `(index, point)` pairs.
    pub fn sparse(points: &[(usize, Point)]) -> Self {
        let len = points.iter().map(|&(i, _)| i + 1).max().unwrap_or(0);
        let mut slots = vec![None; len];
        for &(i, p) in points {
            slots[i] = Some(p);
        }
        FaceLandmarks { points: slots }
    }

    pub fn get(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize { self.points.len() }
    pub fn is_empty(&self) -> bool { self.points.is_empty() }
}

// ════════════════════════════════════════════════════════════════════════════
// Handedness and per-frame observations
// ════════════════════════════════════════════════════════════════════════════

/// Detector's handedness label, as seen in the (mirrored) image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandLabel {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Handedness {
    pub label: HandLabel,
    /// Detector confidence, `0.0..=1.0`.
    pub score: f32,
}

impl Handedness {
    pub fn new(label: HandLabel) -> Self { Handedness { label, score: 1.0 } }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HandObservation {
    pub landmarks:  HandLandmarks,
    /// `None` when the detector gave no label for this hand.
    pub handedness: Option<Handedness>,
}

/// Everything detected in one camera frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameObservation {
    /// Source frame time; a repeat means no new frame.
    pub timestamp_ms: f64,
    pub face:         Option<FaceLandmarks>,
    pub hands:        Vec<HandObservation>,
}
