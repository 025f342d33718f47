//! One-shot sound cues: pitch sweeps rendered as a run of short MIDI notes.

use crate::pitch::{hz_to_midi, Program};

/// Shape of a frequency sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Curve {
    Linear,
    /// Constant ratio per unit time.
    Exponential,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sweep {
    pub from_hz: f32,
    pub to_hz:   f32,
    pub seconds: f64,
    pub curve:   Curve,
}

/// One note of a rendered sweep, timed from the start of the cue.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CueNote {
    pub offset_s:   f64,
    pub duration_s: f64,
    pub pitch:      u8,
}

impl Sweep {
    /// Frequency `t` seconds into the sweep (clamped to the sweep length).
    pub fn hz_at(&self, t: f64) -> f32 {
        let f = if self.seconds > 0.0 { (t / self.seconds).clamp(0.0, 1.0) as f32 } else { 1.0 };
        match self.curve {
            Curve::Linear      => self.from_hz + (self.to_hz - self.from_hz) * f,
            Curve::Exponential => self.from_hz * (self.to_hz / self.from_hz).powf(f),
        }
    }

    /// Sample the sweep every `step_s` seconds and merge equal neighbours,
    /// so each returned note lasts until the pitch changes.
    pub fn notes(&self, step_s: f64) -> Vec<CueNote> {
        let step_s = step_s.max(1e-3);
        let samples = (self.seconds / step_s).ceil().max(1.0) as usize;
        let mut notes: Vec<CueNote> = Vec::new();
        for k in 0..samples {
            let t = k as f64 * step_s;
            let pitch = hz_to_midi(self.hz_at(t));
            match notes.last_mut() {
                Some(last) if last.pitch == pitch => {}
                _ => notes.push(CueNote { offset_s: t, duration_s: 0.0, pitch }),
            }
        }
        // Each note runs until the next one starts; the last until the end.
        let ends: Vec<f64> = notes.iter().skip(1).map(|n| n.offset_s).chain([self.seconds]).collect();
        for (note, end) in notes.iter_mut().zip(ends) {
            note.duration_s = (end - note.offset_s).max(0.0);
        }
        notes
    }
}

/// Audible feedback for control actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue {
    /// Falling sawtooth sweep, 800 Hz → 50 Hz in 0.3 s.
    Purge,
    /// Rising sweep, 100 Hz → 2 kHz in 1 s.
    Reset,
}

impl SoundCue {
    pub fn sweep(self) -> Sweep {
        match self {
            SoundCue::Purge => Sweep { from_hz: 800.0, to_hz: 50.0,   seconds: 0.3, curve: Curve::Exponential },
            SoundCue::Reset => Sweep { from_hz: 100.0, to_hz: 2000.0, seconds: 1.0, curve: Curve::Linear },
        }
    }

    pub fn program(self) -> Program {
        match self {
            SoundCue::Purge => Program::Lead2Sawtooth,
            SoundCue::Reset => Program::Fx8Scifi,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SoundCue::Purge => "purge",
            SoundCue::Reset => "reset",
        }
    }
}
