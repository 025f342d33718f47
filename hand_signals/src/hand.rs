//! Single-hand classifiers.

use crate::config::GestureConfig;
use crate::landmark::{idx, HandLabel, HandLandmarks, Handedness, Point};

/// The user's own hand, after undoing the camera mirror.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserSide {
    Left,
    Right,
}

/// A `Right` label in the mirrored image is the user's left hand.
pub fn user_side(handedness: &Handedness) -> UserSide {
    match handedness.label {
        HandLabel::Right => UserSide::Left,
        HandLabel::Left  => UserSide::Right,
    }
}

/// `|thumb_tip.x - pinky_base.x|`, if both points are present.
fn thumb_spread(hand: &HandLandmarks) -> Option<f32> {
    let tip  = hand.get(idx::THUMB_TIP)?;
    let base = hand.get(idx::PINKY_MCP)?;
    Some((tip.x - base.x).abs())
}

/// Closed fist: enough folded digits among the four fingers (tip below PIP)
/// and the thumb (tip tucked near the pinky base).
pub fn is_fist(hand: &HandLandmarks, cfg: &GestureConfig) -> bool {
    let folded_fingers = idx::FINGERS
        .iter()
        .filter(|&&(tip, pip)| match (hand.get(tip), hand.get(pip)) {
            (Some(t), Some(p)) => t.y > p.y,
            _ => false,
        })
        .count();
    let folded_thumb = thumb_spread(hand).is_some_and(|s| s < cfg.thumb_folded_max);
    folded_fingers + usize::from(folded_thumb) >= cfg.fist_min_folded as usize
}

/// Number of extended digits, 0..=5.
pub fn count_extended_fingers(hand: &HandLandmarks, cfg: &GestureConfig) -> u8 {
    let fingers = idx::FINGERS
        .iter()
        .filter(|&&(tip, pip)| match (hand.get(tip), hand.get(pip)) {
            (Some(t), Some(p)) => t.y < p.y,
            _ => false,
        })
        .count() as u8;
    let thumb = thumb_spread(hand).is_some_and(|s| s > cfg.thumb_extended_min);
    fingers + u8::from(thumb)
}

/// Index tip and thumb tip touching.
pub fn is_pinch(hand: &HandLandmarks, cfg: &GestureConfig) -> bool {
    match (hand.get(idx::INDEX_TIP), hand.get(idx::THUMB_TIP)) {
        (Some(i), Some(t)) => i.distance(t) < cfg.pinch_max,
        _ => false,
    }
}

/// Midpoint of the wrist and the middle-finger knuckle.
pub fn palm_center(hand: &HandLandmarks) -> Option<Point> {
    let wrist = hand.get(idx::WRIST)?;
    let knuckle = hand.get(idx::MIDDLE_MCP)?;
    Some(wrist.lerp(knuckle, 0.5))
}
