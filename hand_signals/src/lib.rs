//! # hand_signals
//!
//! Turns per-frame hand and face landmark sets into the discrete signals
//! that steer the sand toy.  Coordinates are normalised image coordinates
//! (`0.0..=1.0`, y grows downward) in the 21-point hand layout and the
//! indexed face-mesh layout.
//!
//! ## Signals
//!
//! | Signal | Input | Rule |
//! |---|---|---|
//! | Fist | one hand | ≥ 4 of: four fingertips below their PIP joints, thumb tip near pinky base |
//! | Extended fingers | one hand | fingertips above PIP joints, thumb tip far from pinky base |
//! | Pinch | one hand | index tip within 0.1 of thumb tip |
//! | Reset | two hands | user-left and user-right show 2 and 3 fingers (either way round) |
//! | Head tilt | face | `atan2` of the eye-corner line × gain |
//! | Gaze | face over time | frames the eye-corner span has stayed still |
//!
//! Any landmark a rule needs that is missing simply fails that check.
//!
//! ## Handedness
//!
//! Labels come from a mirrored (selfie) camera view, so a hand labelled
//! `Right` is the user's **left** hand.  [`UserSide`] carries that mapping.

pub mod config;
pub mod error;
pub mod face;
pub mod hand;
pub mod landmark;
pub mod pair;
pub mod pose;

pub use config::GestureConfig;
pub use error::{SignalError, SignalResult};
pub use face::{head_tilt_bias, GazeTracker};
pub use hand::{count_extended_fingers, is_fist, is_pinch, palm_center, user_side, UserSide};
pub use landmark::{
    FaceLandmarks, FrameObservation, HandLabel, HandLandmarks, HandObservation, Handedness, Point,
    HAND_CONNECTIONS,
};
pub use pair::{classify_two_hand_reset, split_user_hands};
