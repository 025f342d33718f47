use serde::{Deserialize, Serialize};

use crate::error::{SynthError, SynthResult};

/// Timing of the bassline loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    pub tempo_bpm:     f64,
    /// Length of each bass note in seconds.
    pub note_seconds:  f64,
    /// How far ahead of "now" notes are handed out.
    pub lookahead_s:   f64,
    /// Suggested polling period for the caller's scheduler loop.
    pub tick_ms:       u64,
    /// MIDI velocity of bass notes.
    pub velocity:      u8,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            tempo_bpm:    120.0,
            note_seconds: 0.15,
            lookahead_s:  0.1,
            tick_ms:      25,
            velocity:     96,
        }
    }
}

impl SequencerConfig {
    /// Seconds per sixteenth-note step.
    pub fn step_seconds(&self) -> f64 {
        60.0 / self.tempo_bpm / 4.0
    }

    pub fn validate(&self) -> SynthResult<()> {
        if !(self.tempo_bpm > 0.0 && self.tempo_bpm <= 300.0) {
            return Err(SynthError::Config(format!("tempo must be 1–300 BPM, got {}", self.tempo_bpm)));
        }
        if !(self.note_seconds > 0.0) {
            return Err(SynthError::Config("note_seconds must be positive".into()));
        }
        if self.lookahead_s < 0.0 {
            return Err(SynthError::Config("lookahead_s must be non-negative".into()));
        }
        if self.tick_ms == 0 {
            return Err(SynthError::Config("tick_ms must be at least 1".into()));
        }
        if self.velocity > 127 {
            return Err(SynthError::Config(format!("velocity must be 0–127, got {}", self.velocity)));
        }
        Ok(())
    }
}
