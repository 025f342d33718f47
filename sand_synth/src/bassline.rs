//! The looping bassline and its lookahead scheduler.
//!
//! The caller polls [`Sequencer::poll`] every `tick_ms` with the current
//! time; each poll returns the notes whose start falls inside the lookahead
//! window, stamped with their exact start times.  Jitter in the polling loop
//! therefore never shifts the rhythm.

use tracing::debug;

use crate::config::SequencerConfig;
use crate::timbre::Timbre;

/// Steps per loop.
pub const STEPS: u8 = 16;

const E1: u8 = 28;
const G1: u8 = 31;
const A1: u8 = 33;

/// Pitch played on `step` (taken modulo [`STEPS`]), or `None` for a rest.
pub fn step_pitch(step: u8) -> Option<u8> {
    let step = step % STEPS;
    if step % 4 != 0 && step % 4 != 2 {
        return None;
    }
    Some(match step {
        0..=7  => E1,
        8..=11 => G1,
        _      => A1,
    })
}

/// A note with an absolute start time on the caller's clock.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledNote {
    pub at_s:       f64,
    pub duration_s: f64,
    pub pitch:      u8,
    pub velocity:   u8,
    pub timbre:     Timbre,
}

pub struct Sequencer {
    cfg:         SequencerConfig,
    step:        u8,
    next_note_s: f64,
    running:     bool,
}

impl Sequencer {
    pub fn new(cfg: SequencerConfig) -> Self {
        Sequencer { cfg, step: 0, next_note_s: 0.0, running: false }
    }

    pub fn config(&self) -> &SequencerConfig { &self.cfg }
    pub fn is_running(&self) -> bool { self.running }

    /// Step that the next scheduled slot will play.
    pub fn step(&self) -> u8 { self.step }

    /// Start the loop from step 0 at `now_s`.
    pub fn start(&mut self, now_s: f64) {
        self.step = 0;
        self.next_note_s = now_s;
        self.running = true;
        debug!(tempo = self.cfg.tempo_bpm, "bassline started");
    }

    pub fn stop(&mut self) {
        self.running = false;
        debug!("bassline stopped");
    }

    /// Hand out every note starting before `now_s + lookahead`.
    ///
    /// `timbre` is sampled at scheduling time, so a load change is heard from
    /// the next scheduled note.  If the caller stalled for more than a step,
    /// missed slots are skipped rather than played in a burst.
    pub fn poll(&mut self, now_s: f64, timbre: Timbre) -> Vec<ScheduledNote> {
        let mut out = Vec::new();
        if !self.running {
            return out;
        }
        let step_s = self.cfg.step_seconds();
        if self.next_note_s + step_s < now_s {
            let missed = ((now_s - self.next_note_s) / step_s).floor();
            self.next_note_s += missed * step_s;
            self.step = ((self.step as u64 + missed as u64) % STEPS as u64) as u8;
        }
        while self.next_note_s < now_s + self.cfg.lookahead_s {
            if let Some(pitch) = step_pitch(self.step) {
                out.push(ScheduledNote {
                    at_s:       self.next_note_s,
                    duration_s: self.cfg.note_seconds,
                    pitch,
                    velocity:   self.cfg.velocity,
                    timbre,
                });
            }
            self.next_note_s += step_s;
            self.step = (self.step + 1) % STEPS;
        }
        out
    }
}
