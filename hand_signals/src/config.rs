//! Classifier thresholds.

use serde::{Deserialize, Serialize};

use crate::error::{SignalError, SignalResult};

/// Thresholds used by the hand and face classifiers.
///
/// Distances are in normalised image units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Thumb counts as folded when `|tip.x - pinky_base.x|` is below this.
    pub thumb_folded_max: f32,
    /// Thumb counts as extended when `|tip.x - pinky_base.x|` exceeds this.
    pub thumb_extended_min: f32,
    /// Folded digits (of five) needed for a fist.
    pub fist_min_folded: u8,
    /// Index-tip to thumb-tip distance below which the hand pinches.
    pub pinch_max: f32,
    /// Multiplier from head-tilt angle (radians) to gravity bias.
    pub tilt_gain: f32,
    /// Frame-to-frame change in eye-corner span counted as "still".
    pub gaze_stillness: f32,
    /// Face-mesh index of the outer corner at image left.
    pub eye_corner_a: usize,
    /// Face-mesh index of the outer corner at image right.
    pub eye_corner_b: usize,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            thumb_folded_max:   0.1,
            thumb_extended_min: 0.15,
            fist_min_folded:    4,
            pinch_max:          0.1,
            tilt_gain:          2.5,
            gaze_stillness:     0.005,
            eye_corner_a:       33,
            eye_corner_b:       263,
        }
    }
}

impl GestureConfig {
    pub fn validate(&self) -> SignalResult<()> {
        if !(self.thumb_folded_max > 0.0 && self.thumb_extended_min > 0.0) {
            return Err(SignalError::Config("thumb thresholds must be positive".into()));
        }
        if !(1..=5).contains(&self.fist_min_folded) {
            return Err(SignalError::Config(format!(
                "fist_min_folded must be 1..=5, got {}",
                self.fist_min_folded
            )));
        }
        if !(self.pinch_max > 0.0) {
            return Err(SignalError::Config(format!("pinch_max must be positive, got {}", self.pinch_max)));
        }
        if self.gaze_stillness < 0.0 {
            return Err(SignalError::Config("gaze_stillness must be non-negative".into()));
        }
        if self.eye_corner_a == self.eye_corner_b {
            return Err(SignalError::Config("eye corner indices must differ".into()));
        }
        Ok(())
    }
}
