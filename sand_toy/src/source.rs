//! Landmark sources: where each frame's face and hands come from.
//!
//! The public interface is the [`LandmarkSource`] trait, polled once per
//! display frame.  Consumers don't need to know whether landmarks came from
//! a vision model, the keyboard simulator or a test script; the
//! [`FrameGate`] tells them whether a polled frame is new.

use std::collections::{HashSet, VecDeque};
use std::sync::mpsc::Receiver;

use glam::Vec2;
use hand_signals::pose::{self, HandPose};
use hand_signals::{FrameObservation, HandLabel, HandObservation};

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver landmark frames.
pub trait LandmarkSource {
    /// Latest frame at `now_ms`, or `None` if the source has none.
    ///
    /// A source may hand out the same frame on several polls; its
    /// `timestamp_ms` only changes when the frame does.
    fn poll(&mut self, now_ms: f64) -> Option<FrameObservation>;
}

// ════════════════════════════════════════════════════════════════════════════
// FrameGate
// ════════════════════════════════════════════════════════════════════════════

/// Lets a frame through only when its timestamp differs from the last one.
#[derive(Debug, Default)]
pub struct FrameGate {
    last: Option<f64>,
}

impl FrameGate {
    pub fn new() -> Self { Self::default() }

    /// True if `timestamp_ms` is new; remembers it.
    pub fn admit(&mut self, timestamp_ms: f64) -> bool {
        if self.last == Some(timestamp_ms) {
            return false;
        }
        self.last = Some(timestamp_ms);
        true
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimLandmarkSource: keyboard/mouse simulation
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Pointer position, normalised to `0.0..=1.0` across the canvas.
    Pointer { x: f32, y: f32 },
    KeyDown(SimKey),
    KeyUp(SimKey),
}

/// Simulated gestures (mapped from window keys).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SimKey {
    Fist,       // F
    OpenPalm,   // O
    Pinch,      // P / left mouse button
    Reset,      // R
    TiltLeft,   // Left arrow
    TiltRight,  // Right arrow
    LookAway,   // H
}

/// Head roll while a tilt key is held, in radians.
const SIM_TILT: f32 = 0.25;
/// Where the simulated face sits.
const SIM_FACE: Vec2 = Vec2::new(0.5, 0.3);
/// Half the gap between the two hands of the reset gesture.
const RESET_SPREAD: f32 = 0.15;

/// Landmark source driven by [`SimInput`] events from the visualizer.
///
/// Emits a frame every `1000 / fps` ms.  The pointer hand is the user's
/// left hand (camera label `Right`); the reset gesture adds the right one.
pub struct SimLandmarkSource {
    rx:       Receiver<SimInput>,
    frame_ms: f64,
    pointer:  Vec2,
    held:     HashSet<SimKey>,
}

impl SimLandmarkSource {
    pub fn new(rx: Receiver<SimInput>, fps: f64) -> Self {
        SimLandmarkSource {
            rx,
            frame_ms: 1000.0 / fps.max(1.0),
            pointer:  Vec2::splat(0.5),
            held:     HashSet::new(),
        }
    }

    fn drain(&mut self) {
        while let Ok(input) = self.rx.try_recv() {
            match input {
                SimInput::Pointer { x, y } => self.pointer = Vec2::new(x, y).clamp(Vec2::ZERO, Vec2::ONE),
                SimInput::KeyDown(k)       => { self.held.insert(k); }
                SimInput::KeyUp(k)         => { self.held.remove(&k); }
            }
        }
    }

    fn holds(&self, key: SimKey) -> bool { self.held.contains(&key) }

    fn hands(&self) -> Vec<HandObservation> {
        let p = self.pointer;
        if self.holds(SimKey::Reset) {
            return vec![
                HandPose::counting(p - Vec2::new(RESET_SPREAD, 0.0), 2).observe(HandLabel::Right),
                HandPose::counting(p + Vec2::new(RESET_SPREAD, 0.0), 3).observe(HandLabel::Left),
            ];
        }
        let pose = if self.holds(SimKey::Fist) {
            HandPose::fist(p)
        } else if self.holds(SimKey::Pinch) {
            HandPose::pinching(p)
        } else if self.holds(SimKey::OpenPalm) {
            HandPose::open(p)
        } else {
            // Two fingers: neither a fist, a pinch nor an open palm.
            HandPose::counting(p, 2)
        };
        vec![pose.observe(HandLabel::Right)]
    }

    fn tilt(&self) -> f32 {
        match (self.holds(SimKey::TiltLeft), self.holds(SimKey::TiltRight)) {
            (true, false) => -SIM_TILT,
            (false, true) => SIM_TILT,
            _             => 0.0,
        }
    }
}

impl LandmarkSource for SimLandmarkSource {
    fn poll(&mut self, now_ms: f64) -> Option<FrameObservation> {
        self.drain();
        let timestamp_ms = (now_ms / self.frame_ms).floor() * self.frame_ms;
        let face = (!self.holds(SimKey::LookAway)).then(|| pose::face(SIM_FACE, self.tilt()));
        Some(FrameObservation { timestamp_ms, face, hands: self.hands() })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ScriptedSource: canned frames
// ════════════════════════════════════════════════════════════════════════════

/// Plays back a fixed list of frames, one per poll, then runs dry.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    frames: VecDeque<FrameObservation>,
}

impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = FrameObservation>) -> Self {
        ScriptedSource { frames: frames.into_iter().collect() }
    }

    pub fn remaining(&self) -> usize { self.frames.len() }
}

impl LandmarkSource for ScriptedSource {
    fn poll(&mut self, _now_ms: f64) -> Option<FrameObservation> {
        self.frames.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hand_signals::{
        classify_two_hand_reset, count_extended_fingers, head_tilt_bias, is_fist, is_pinch, GestureConfig,
    };
    use std::sync::mpsc;

    fn sim() -> (mpsc::Sender<SimInput>, SimLandmarkSource) {
        let (tx, rx) = mpsc::channel();
        (tx, SimLandmarkSource::new(rx, 20.0))
    }

    #[test]
    fn gate_passes_each_timestamp_once() {
        let mut gate = FrameGate::new();
        assert!(gate.admit(0.0));
        assert!(!gate.admit(0.0));
        assert!(gate.admit(33.3));
        assert!(gate.admit(0.0));
    }

    #[test]
    fn sim_timestamps_step_at_frame_rate() {
        let (_tx, mut src) = sim();
        let a = src.poll(10.0).unwrap().timestamp_ms;
        let b = src.poll(49.0).unwrap().timestamp_ms;
        let c = src.poll(50.0).unwrap().timestamp_ms;
        assert_eq!(a, 0.0);
        assert_eq!(a, b);
        assert_eq!(c, 50.0);
    }

    #[test]
    fn pointer_hand_is_users_left_and_idle() {
        let (tx, mut src) = sim();
        tx.send(SimInput::Pointer { x: 0.25, y: 0.75 }).unwrap();
        let obs = src.poll(0.0).unwrap();
        assert_eq!(obs.hands.len(), 1);
        let hand = &obs.hands[0];
        assert_eq!(hand.handedness.map(|h| h.label), Some(HandLabel::Right));
        let cfg = GestureConfig::default();
        assert!(!is_fist(&hand.landmarks, &cfg));
        assert!(!is_pinch(&hand.landmarks, &cfg));
        assert_eq!(count_extended_fingers(&hand.landmarks, &cfg), 2);
    }

    #[test]
    fn held_keys_shape_the_hand() {
        let (tx, mut src) = sim();
        let cfg = GestureConfig::default();
        tx.send(SimInput::KeyDown(SimKey::Fist)).unwrap();
        assert!(is_fist(&src.poll(0.0).unwrap().hands[0].landmarks, &cfg));

        tx.send(SimInput::KeyUp(SimKey::Fist)).unwrap();
        tx.send(SimInput::KeyDown(SimKey::Pinch)).unwrap();
        assert!(is_pinch(&src.poll(0.0).unwrap().hands[0].landmarks, &cfg));

        tx.send(SimInput::KeyUp(SimKey::Pinch)).unwrap();
        tx.send(SimInput::KeyDown(SimKey::Reset)).unwrap();
        let obs = src.poll(0.0).unwrap();
        assert!(classify_two_hand_reset(&obs.hands, &cfg));
    }

    #[test]
    fn tilt_and_look_away() {
        let (tx, mut src) = sim();
        let cfg = GestureConfig::default();
        tx.send(SimInput::KeyDown(SimKey::TiltLeft)).unwrap();
        let face = src.poll(0.0).unwrap().face.unwrap();
        assert!(head_tilt_bias(&face, &cfg).unwrap() < -0.2);

        tx.send(SimInput::KeyDown(SimKey::TiltRight)).unwrap();
        let face = src.poll(0.0).unwrap().face.unwrap();
        assert_eq!(head_tilt_bias(&face, &cfg), Some(0.0));

        tx.send(SimInput::KeyDown(SimKey::LookAway)).unwrap();
        assert!(src.poll(0.0).unwrap().face.is_none());
    }

    #[test]
    fn script_runs_dry() {
        let mut src = ScriptedSource::new(vec![FrameObservation::default(); 2]);
        assert!(src.poll(0.0).is_some());
        assert_eq!(src.remaining(), 1);
        assert!(src.poll(0.0).is_some());
        assert!(src.poll(0.0).is_none());
    }
}
