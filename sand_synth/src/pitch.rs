//! Frequency ↔ MIDI note conversion and the General MIDI programs used.

/// MIDI note nearest to `hz` (A4 = 440 Hz = note 69), clamped to 0–127.
pub fn hz_to_midi(hz: f32) -> u8 {
    if !(hz > 0.0) {
        return 0;
    }
    let note = 69.0 + 12.0 * (hz / 440.0).log2();
    note.round().clamp(0.0, 127.0) as u8
}

/// Frequency of MIDI note `note`.
pub fn midi_to_hz(note: u8) -> f32 {
    440.0 * 2f32.powf((note as f32 - 69.0) / 12.0)
}

/// General MIDI programs (0-indexed, as sent in Program Change).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Program {
    Lead1Square   = 80,
    Lead2Sawtooth = 81,
    Fx8Scifi      = 103,
}

impl Program {
    pub fn number(self) -> u8 { self as u8 }

    pub fn name(self) -> &'static str {
        match self {
            Program::Lead1Square   => "Lead 1 (square)",
            Program::Lead2Sawtooth => "Lead 2 (sawtooth)",
            Program::Fx8Scifi      => "FX 8 (sci-fi)",
        }
    }
}
