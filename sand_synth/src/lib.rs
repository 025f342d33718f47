//! # sand_synth
//!
//! The sand toy's soundtrack, expressed as MIDI note events so any
//! General MIDI synth can voice it.
//!
//! * [`Sequencer`]: a looping 16-step bassline with lookahead scheduling.
//! * [`Timbre`]: the lead program, switched by how full the screen is.
//! * [`SoundCue`]: one-shot pitch sweeps for purge and reset.
//! * [`smf`]: export the loop as a Standard MIDI File.
//!
//! ## The loop
//!
//! | Steps | Note | Hz |
//! |---|---|---|
//! | 0, 2, 4, 6 | E1 (28) | 41.20 |
//! | 8, 10 | G1 (31) | 49.00 |
//! | 12, 14 | A1 (33) | 55.00 |
//!
//! Odd steps rest.  At 120 BPM a step is a sixteenth note (125 ms).
//!
//! ## Quick start
//!
//! ```rust
//! use sand_synth::{Sequencer, SequencerConfig, Timbre};
//!
//! let mut seq = Sequencer::new(SequencerConfig::default());
//! seq.start(0.0);
//! let first = seq.poll(0.0, Timbre::Warm);
//! assert_eq!(first.len(), 1);
//! assert_eq!(first[0].pitch, 28);
//! ```

pub mod bassline;
pub mod config;
pub mod cue;
pub mod error;
pub mod pitch;
pub mod smf;
pub mod timbre;

pub use bassline::{step_pitch, ScheduledNote, Sequencer, STEPS};
pub use config::SequencerConfig;
pub use cue::{CueNote, Curve, SoundCue, Sweep};
pub use error::{SynthError, SynthResult};
pub use pitch::{hz_to_midi, midi_to_hz, Program};
pub use timbre::Timbre;
