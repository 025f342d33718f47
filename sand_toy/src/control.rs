//! Control mapping: turns one frame of landmarks into world edits.
//!
//! | Signal | Hand | Effect |
//! |---|---|---|
//! | Head tilt | face | gravity bias = eye-line angle × gain |
//! | Still gaze | face | alert ramps up after the onset |
//! | Two + three fingers | both | reset the world |
//! | Fist | user's left | purge, then cool down |
//! | Five fingers | any | repulsor at the palm centre |
//! | Pinch | any | spawn a burst at the index tip |

use glam::Vec2;
use hand_signals::landmark::idx;
use hand_signals::{
    classify_two_hand_reset, count_extended_fingers, head_tilt_bias, is_fist, is_pinch,
    palm_center, user_side, FrameObservation, GazeTracker, GestureConfig, HandObservation,
    UserSide,
};
use sand_grid::{Repulsor, SandWorld};
use sand_synth::SoundCue;
use tracing::{debug, trace};

use crate::settings::{AlertSettings, ControlSettings};

// ════════════════════════════════════════════════════════════════════════════
// AlertLevel
// ════════════════════════════════════════════════════════════════════════════

/// What the glitch overlay should react to this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum AlertLevel {
    #[default]
    Calm,
    /// The viewer has held still past the onset; carries the intensity.
    Gaze(f32),
    /// Too many particles on screen.
    Overload,
}

impl AlertLevel {
    /// Overload beats gaze; neither gives `Calm`.
    pub fn classify(active_count: usize, gaze_frames: u32, cfg: &AlertSettings) -> Self {
        if active_count > cfg.overload {
            AlertLevel::Overload
        } else if gaze_frames > cfg.gaze_onset {
            let over = (gaze_frames - cfg.gaze_onset) as f32;
            AlertLevel::Gaze((over * cfg.gaze_ramp).min(1.0))
        } else {
            AlertLevel::Calm
        }
    }

    /// Target overlay intensity in `0.0..=1.0`.
    pub fn intensity(self) -> f32 {
        match self {
            AlertLevel::Calm     => 0.0,
            AlertLevel::Gaze(i)  => i,
            AlertLevel::Overload => 1.0,
        }
    }

    /// HUD caption, empty when calm.
    pub fn caption(self) -> &'static str {
        match self {
            AlertLevel::Calm     => "",
            AlertLevel::Gaze(_)  => "GAZE DETECTED",
            AlertLevel::Overload => "CRITICAL OVERLOAD",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameControl
// ════════════════════════════════════════════════════════════════════════════

/// A purge that fired this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PurgeMark {
    /// Knuckle of the fist, in canvas units.
    pub at:      Vec2,
    pub removed: usize,
}

/// Everything [`ControlMapper::apply`] decided for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameControl {
    pub bias:        f32,
    pub gaze_frames: u32,
    pub alert:       AlertLevel,
    /// Repulsors for this frame's physics step.
    pub repulsors:   Vec<Repulsor>,
    pub purge:       Option<PurgeMark>,
    pub spawned:     usize,
    pub reset:       bool,
    pub cues:        Vec<SoundCue>,
}

// ════════════════════════════════════════════════════════════════════════════
// ControlMapper
// ════════════════════════════════════════════════════════════════════════════

pub struct ControlMapper {
    gestures: GestureConfig,
    controls: ControlSettings,
    alerts:   AlertSettings,
    gaze:     GazeTracker,
    cooldown: u32,
}

impl ControlMapper {
    pub fn new(gestures: GestureConfig, controls: ControlSettings, alerts: AlertSettings) -> Self {
        let gaze = GazeTracker::new(gestures.clone());
        ControlMapper { gestures, controls, alerts, gaze, cooldown: 0 }
    }

    /// Display frames left before the next purge may fire.
    pub fn cooldown(&self) -> u32 { self.cooldown }

    /// Count down the purge cooldown; call once per display frame.
    pub fn tick(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    /// Apply one frame of observations to `world`.
    ///
    /// Does not step the world: the caller passes the returned repulsors to
    /// [`SandWorld::step`].
    pub fn apply(&mut self, obs: &FrameObservation, world: &mut SandWorld) -> FrameControl {
        let mut out = FrameControl::default();

        // ── 1. Face ───────────────────────────────────────────────────────
        let face = obs.face.as_ref();
        out.bias = face.and_then(|f| head_tilt_bias(f, &self.gestures)).unwrap_or(0.0);
        out.gaze_frames = self.gaze.observe(face);
        world.set_gravity_bias(out.bias);
        out.alert = AlertLevel::classify(world.active_count(), out.gaze_frames, &self.alerts);

        // ── 2. Two-hand reset ─────────────────────────────────────────────
        if classify_two_hand_reset(&obs.hands, &self.gestures) {
            world.reset();
            out.reset = true;
            out.cues.push(SoundCue::Reset);
            debug!("reset gesture");
            return out;
        }

        // ── 3. Per-hand actions ───────────────────────────────────────────
        let (w, h) = world.canvas();
        let canvas = Vec2::new(w as f32, h as f32);
        for hand in &obs.hands {
            self.apply_hand(hand, canvas, world, &mut out);
        }

        trace!(
            bias = out.bias,
            gaze = out.gaze_frames,
            repulsors = out.repulsors.len(),
            spawned = out.spawned,
            "frame mapped"
        );
        out
    }

    fn apply_hand(&mut self, hand: &HandObservation, canvas: Vec2, world: &mut SandWorld, out: &mut FrameControl) {
        let marks = &hand.landmarks;
        let users_left = hand
            .handedness
            .as_ref()
            .map(|h| user_side(h) == UserSide::Left)
            .unwrap_or(false);

        // Fist on the user's left hand: purge.
        if users_left && self.cooldown == 0 && is_fist(marks, &self.gestures) {
            let removed = world.purge(self.controls.purge_quota);
            self.cooldown = self.controls.purge_cooldown;
            let at = marks.get(idx::MIDDLE_MCP).unwrap_or(Vec2::splat(0.5)) * canvas;
            out.purge = Some(PurgeMark { at, removed });
            out.cues.push(SoundCue::Purge);
            debug!(removed, "fist purge");
        }

        // Open palm: repulsor.
        if count_extended_fingers(marks, &self.gestures) == 5 {
            if let Some(c) = palm_center(marks) {
                let at = c * canvas;
                out.repulsors.push(Repulsor::new(at.x, at.y));
            }
        }

        // Pinch: spawn at the index tip.
        if is_pinch(marks, &self.gestures) {
            if let Some(tip) = marks.get(idx::INDEX_TIP) {
                world.spawn_burst(tip * canvas, self.controls.spawn_count);
                out.spawned += self.controls.spawn_count;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hand_signals::pose::{self, HandPose};
    use hand_signals::HandLabel;
    use sand_grid::PhysicsConfig;

    fn mapper() -> ControlMapper {
        ControlMapper::new(GestureConfig::default(), ControlSettings::default(), AlertSettings::default())
    }

    fn world() -> SandWorld {
        SandWorld::with_seed(200, 100, PhysicsConfig::default(), 11).unwrap()
    }

    fn frame(hands: Vec<HandObservation>) -> FrameObservation {
        FrameObservation { timestamp_ms: 0.0, face: None, hands }
    }

    // "Right" from the camera is the user's left hand.
    fn users_left(p: HandPose) -> HandObservation { p.observe(HandLabel::Right) }
    fn users_right(p: HandPose) -> HandObservation { p.observe(HandLabel::Left) }

    #[test]
    fn fist_purges_five_airborne() {
        let mut w = world();
        for i in 0..5 {
            w.spawn(Vec2::new(20.0 + 10.0 * i as f32, 5.0), Vec2::ZERO);
        }
        let mut m = mapper();
        let c = m.apply(&frame(vec![users_left(HandPose::fist(Vec2::new(0.5, 0.5)))]), &mut w);
        let purge = c.purge.unwrap();
        assert_eq!(purge.removed, 5);
        assert_eq!(w.airborne().len(), 0);
        assert_eq!(c.cues, vec![SoundCue::Purge]);
        assert_eq!(m.cooldown(), 30);
        // Ring sits on the middle knuckle, scaled to the canvas.
        assert!((purge.at - Vec2::new(0.49 * 200.0, 0.5 * 100.0)).length() < 1e-3);
    }

    #[test]
    fn cooldown_blocks_until_ticked_out() {
        let mut w = world();
        let mut m = mapper();
        let fist = frame(vec![users_left(HandPose::fist(Vec2::splat(0.5)))]);
        assert!(m.apply(&fist, &mut w).purge.is_some());
        for _ in 0..29 {
            m.tick();
            assert!(m.apply(&fist, &mut w).purge.is_none());
        }
        m.tick();
        assert!(m.apply(&fist, &mut w).purge.is_some());
    }

    #[test]
    fn fist_on_users_right_or_unlabelled_does_nothing() {
        let mut w = world();
        w.spawn(Vec2::new(50.0, 5.0), Vec2::ZERO);
        let mut m = mapper();
        let mut unlabelled = HandPose::fist(Vec2::splat(0.5)).observe(HandLabel::Right);
        unlabelled.handedness = None;
        let c = m.apply(&frame(vec![users_right(HandPose::fist(Vec2::splat(0.5))), unlabelled]), &mut w);
        assert!(c.purge.is_none());
        assert_eq!(w.airborne().len(), 1);
        assert_eq!(m.cooldown(), 0);
    }

    #[test]
    fn open_palm_places_repulsor_at_palm_centre() {
        let mut w = world();
        let mut m = mapper();
        let c = m.apply(&frame(vec![users_right(HandPose::open(Vec2::new(0.5, 0.4)))]), &mut w);
        assert_eq!(c.repulsors.len(), 1);
        // Midpoint of wrist (0, +0.10) and middle knuckle (-0.01, 0).
        let want = Vec2::new(0.495 * 200.0, 0.45 * 100.0);
        assert!((c.repulsors[0].at - want).length() < 1e-3);
        assert!(c.purge.is_none());
        assert_eq!(c.spawned, 0);
    }

    #[test]
    fn pinch_spawns_a_burst_near_the_index_tip() {
        let mut w = world();
        let mut m = mapper();
        let c = m.apply(&frame(vec![users_right(HandPose::pinching(Vec2::new(0.5, 0.5)))]), &mut w);
        assert_eq!(c.spawned, 4);
        assert_eq!(w.airborne().len(), 4);
        // Index tip sits at (-0.03, -0.10) from the centre.
        let tip = Vec2::new(0.47 * 200.0, 0.40 * 100.0);
        for p in w.airborne().iter() {
            let pos = p.position(10.0);
            assert!((pos.x - tip.x).abs() <= 15.0);
            assert!((pos.y - tip.y).abs() < 1e-3);
        }
    }

    #[test]
    fn two_and_three_fingers_reset_the_world() {
        let mut w = world();
        for i in 0..10 {
            w.spawn(Vec2::new(10.0 * i as f32, 5.0), Vec2::ZERO);
        }
        w.step(&[]);
        let mut m = mapper();
        let hands = vec![
            users_left(HandPose::counting(Vec2::new(0.3, 0.5), 2)),
            users_right(HandPose::counting(Vec2::new(0.7, 0.5), 3)),
        ];
        let c = m.apply(&frame(hands), &mut w);
        assert!(c.reset);
        assert_eq!(c.cues, vec![SoundCue::Reset]);
        assert_eq!(w.airborne().len(), 0);
        assert_eq!(w.grid().occupied(), 0);
    }

    #[test]
    fn two_and_two_is_not_a_reset() {
        let mut w = world();
        w.spawn(Vec2::new(50.0, 5.0), Vec2::ZERO);
        let mut m = mapper();
        let hands = vec![
            users_left(HandPose::counting(Vec2::new(0.3, 0.5), 2)),
            users_right(HandPose::counting(Vec2::new(0.7, 0.5), 2)),
        ];
        let c = m.apply(&frame(hands), &mut w);
        assert!(!c.reset);
        assert_eq!(w.airborne().len(), 1);
    }

    #[test]
    fn reset_frame_skips_hand_actions() {
        let mut w = world();
        let mut m = mapper();
        // A reset pose cannot pinch, so check the cooldown is untouched instead.
        let hands = vec![
            users_left(HandPose::counting(Vec2::new(0.3, 0.5), 3)),
            users_right(HandPose::counting(Vec2::new(0.7, 0.5), 2)),
        ];
        let c = m.apply(&frame(hands), &mut w);
        assert!(c.reset);
        assert!(c.repulsors.is_empty());
        assert_eq!(c.spawned, 0);
        assert_eq!(m.cooldown(), 0);
    }

    #[test]
    fn face_sets_bias_and_absence_clears_it() {
        let mut w = world();
        let mut m = mapper();
        let tilted = FrameObservation {
            timestamp_ms: 0.0,
            face: Some(pose::face(Vec2::splat(0.5), 0.2)),
            hands: vec![],
        };
        let c = m.apply(&tilted, &mut w);
        assert!((c.bias - 0.5).abs() < 1e-4);
        assert!((w.gravity_bias() - 0.5).abs() < 1e-4);

        let c = m.apply(&frame(vec![]), &mut w);
        assert_eq!(c.bias, 0.0);
        assert_eq!(c.gaze_frames, 0);
        assert_eq!(w.gravity_bias(), 0.0);
    }

    #[test]
    fn still_face_raises_gaze_alert() {
        let mut w = world();
        let mut m = mapper();
        let still = FrameObservation {
            timestamp_ms: 0.0,
            face: Some(pose::face(Vec2::splat(0.5), 0.0)),
            hands: vec![],
        };
        let mut last = m.apply(&still, &mut w);
        for _ in 0..130 {
            last = m.apply(&still, &mut w);
        }
        // First frame moves off the zero span; 130 still frames follow.
        assert_eq!(last.gaze_frames, 130);
        match last.alert {
            AlertLevel::Gaze(i) => assert!((i - 0.1).abs() < 1e-4),
            other => panic!("expected gaze, got {:?}", other),
        }
    }

    #[test]
    fn alert_classification() {
        let cfg = AlertSettings::default();
        assert_eq!(AlertLevel::classify(6001, 0, &cfg), AlertLevel::Overload);
        assert_eq!(AlertLevel::classify(6001, 500, &cfg), AlertLevel::Overload);
        assert_eq!(AlertLevel::classify(6000, 120, &cfg), AlertLevel::Calm);
        assert_eq!(AlertLevel::classify(0, 121, &cfg), AlertLevel::Gaze(0.01));
        assert_eq!(AlertLevel::classify(0, 1000, &cfg).intensity(), 1.0);
        assert_eq!(AlertLevel::Calm.caption(), "");
    }
}
