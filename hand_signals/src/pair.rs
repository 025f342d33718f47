//! Two-hand gestures.

use tracing::trace;

use crate::config::GestureConfig;
use crate::hand::{count_extended_fingers, user_side, UserSide};
use crate::landmark::HandObservation;

/// Resolve the user's left and right hand from exactly two labelled hands.
///
/// Declines (returns `None`) for any other hand count, a missing label, or
/// two hands resolving to the same side.
pub fn split_user_hands(hands: &[HandObservation]) -> Option<(&HandObservation, &HandObservation)> {
    let [a, b] = hands else { return None };
    let side_a = user_side(a.handedness.as_ref()?);
    let side_b = user_side(b.handedness.as_ref()?);
    match (side_a, side_b) {
        (UserSide::Left, UserSide::Right) => Some((a, b)),
        (UserSide::Right, UserSide::Left) => Some((b, a)),
        _ => None,
    }
}

/// Two-hand reset: one hand shows two fingers and the other three.
pub fn classify_two_hand_reset(hands: &[HandObservation], cfg: &GestureConfig) -> bool {
    let Some((left, right)) = split_user_hands(hands) else {
        return false;
    };
    let counts = (
        count_extended_fingers(&left.landmarks, cfg),
        count_extended_fingers(&right.landmarks, cfg),
    );
    let fired = matches!(counts, (2, 3) | (3, 2));
    if fired {
        trace!(left = counts.0, right = counts.1, "two-hand reset");
    }
    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::HandLabel;
    use crate::pose::HandPose;
    use glam::Vec2;

    fn cfg() -> GestureConfig { GestureConfig::default() }

    fn hand(n: u8, label: HandLabel) -> HandObservation {
        let x = if label == HandLabel::Right { 0.3 } else { 0.7 };
        HandPose::counting(Vec2::new(x, 0.5), n).observe(label)
    }

    #[test]
    fn two_and_three_resets() {
        let hands = [hand(2, HandLabel::Right), hand(3, HandLabel::Left)];
        assert!(classify_two_hand_reset(&hands, &cfg()));
        let hands = [hand(3, HandLabel::Left), hand(2, HandLabel::Right)];
        assert!(classify_two_hand_reset(&hands, &cfg()));
        let hands = [hand(3, HandLabel::Right), hand(2, HandLabel::Left)];
        assert!(classify_two_hand_reset(&hands, &cfg()));
    }

    #[test]
    fn two_and_two_does_not() {
        let hands = [hand(2, HandLabel::Right), hand(2, HandLabel::Left)];
        assert!(!classify_two_hand_reset(&hands, &cfg()));
        let hands = [hand(5, HandLabel::Right), hand(3, HandLabel::Left)];
        assert!(!classify_two_hand_reset(&hands, &cfg()));
    }

    #[test]
    fn needs_exactly_two_hands() {
        assert!(!classify_two_hand_reset(&[], &cfg()));
        assert!(!classify_two_hand_reset(&[hand(2, HandLabel::Right)], &cfg()));
        let three = [hand(2, HandLabel::Right), hand(3, HandLabel::Left), hand(3, HandLabel::Left)];
        assert!(!classify_two_hand_reset(&three, &cfg()));
    }

    #[test]
    fn unlabelled_or_same_side_declines() {
        let mut unlabelled = hand(3, HandLabel::Left);
        unlabelled.handedness = None;
        let hands = [hand(2, HandLabel::Right), unlabelled];
        assert!(!classify_two_hand_reset(&hands, &cfg()));

        let hands = [hand(2, HandLabel::Right), hand(3, HandLabel::Right)];
        assert!(!classify_two_hand_reset(&hands, &cfg()));
    }

    #[test]
    fn split_undoes_mirror() {
        let hands = [hand(3, HandLabel::Left), hand(2, HandLabel::Right)];
        let (left, right) = split_user_hands(&hands).unwrap();
        assert_eq!(left.handedness.unwrap().label, HandLabel::Right);
        assert_eq!(right.handedness.unwrap().label, HandLabel::Left);
    }
}
