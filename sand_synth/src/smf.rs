//! Standard MIDI File export of the bassline loop.
//!
//! Writes a Type-0 (single track) file: tempo, track name, one Program
//! Change for the timbre, then the loop's notes repeated `bars` times.

use std::io::Write;

use tracing::info;

use crate::bassline::{step_pitch, STEPS};
use crate::config::SequencerConfig;
use crate::error::SynthResult;
use crate::timbre::Timbre;

/// Resolution of exported files.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Raw MIDI events at absolute tick positions.
struct Timeline {
    events: Vec<(u32, [u8; 3])>,
}

impl Timeline {
    fn new() -> Self { Timeline { events: Vec::new() } }

    fn note(&mut self, start: u32, length: u32, channel: u8, pitch: u8, velocity: u8) {
        let ch = channel & 0x0F;
        self.events.push((start, [0x90 | ch, pitch, velocity]));
        self.events.push((start + length, [0x80 | ch, pitch, 0x00]));
    }

    /// Events in time order, note-offs before note-ons at the same tick.
    fn sorted(mut self) -> Vec<(u32, [u8; 3])> {
        self.events.sort_by_key(|&(tick, msg)| (tick, msg[0] & 0xF0 == 0x90));
        self.events
    }
}

/// Serialise `bars` repetitions of the loop.
pub fn loop_to_bytes(cfg: &SequencerConfig, timbre: Timbre, channel: u8, bars: u32) -> Vec<u8> {
    let tpq = TICKS_PER_QUARTER as u32;
    let step_ticks = tpq / 4;
    let note_ticks = ((cfg.note_seconds * cfg.tempo_bpm / 60.0) * tpq as f64).round().max(1.0) as u32;

    let mut timeline = Timeline::new();
    for bar in 0..bars {
        for step in 0..STEPS {
            if let Some(pitch) = step_pitch(step) {
                let start = (bar * STEPS as u32 + step as u32) * step_ticks;
                timeline.note(start, note_ticks, channel, pitch, cfg.velocity);
            }
        }
    }

    let mut t: Vec<u8> = Vec::new();
    let ch = channel & 0x0F;

    // ── Tempo meta-event ──────────────────────────────────────────────────
    let micros = (60_000_000.0 / cfg.tempo_bpm).round() as u32;
    t.extend_from_slice(&[0x00, 0xFF, 0x51, 0x03]);
    t.push(((micros >> 16) & 0xFF) as u8);
    t.push(((micros >>  8) & 0xFF) as u8);
    t.push(( micros        & 0xFF) as u8);

    // ── Track name ────────────────────────────────────────────────────────
    let name = format!("sand bassline ({})", timbre.program().name());
    t.extend_from_slice(&[0x00, 0xFF, 0x03]);
    write_vlq(&mut t, name.len() as u32);
    t.extend_from_slice(name.as_bytes());

    // ── Program Change ────────────────────────────────────────────────────
    t.extend_from_slice(&[0x00, 0xC0 | ch, timbre.program().number()]);

    // ── Notes ─────────────────────────────────────────────────────────────
    let mut last = 0u32;
    for (tick, msg) in timeline.sorted() {
        write_vlq(&mut t, tick - last);
        t.extend_from_slice(&msg);
        last = tick;
    }

    // ── End of track ──────────────────────────────────────────────────────
    t.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);

    let mut out = Vec::with_capacity(t.len() + 22);
    out.extend_from_slice(b"MThd");
    out.extend_from_slice(&6u32.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&TICKS_PER_QUARTER.to_be_bytes());
    out.extend_from_slice(b"MTrk");
    out.extend_from_slice(&(t.len() as u32).to_be_bytes());
    out.extend_from_slice(&t);
    out
}

/// Write the loop to `path`.
pub fn write_loop(path: &str, cfg: &SequencerConfig, timbre: Timbre, channel: u8, bars: u32) -> SynthResult<()> {
    cfg.validate()?;
    let bytes = loop_to_bytes(cfg, timbre, channel, bars);
    let mut f = std::fs::File::create(path)?;
    f.write_all(&bytes)?;
    info!(path, bars, bytes = bytes.len(), "bassline exported");
    Ok(())
}

/// Write a MIDI variable-length quantity.
fn write_vlq(buf: &mut Vec<u8>, mut value: u32) {
    let mut bytes = [0u8; 5];
    let mut i = bytes.len() - 1;
    bytes[i] = (value & 0x7F) as u8;
    value >>= 7;
    while value > 0 {
        i -= 1;
        bytes[i] = ((value & 0x7F) | 0x80) as u8;
        value >>= 7;
    }
    buf.extend_from_slice(&bytes[i..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vlq(v: u32) -> Vec<u8> {
        let mut b = Vec::new();
        write_vlq(&mut b, v);
        b
    }

    #[test]
    fn vlq_encoding() {
        assert_eq!(vlq(0), vec![0x00]);
        assert_eq!(vlq(0x7F), vec![0x7F]);
        assert_eq!(vlq(0x80), vec![0x81, 0x00]);
        assert_eq!(vlq(0x0FFF_FFFF), vec![0xFF, 0xFF, 0xFF, 0x7F]);
    }

    #[test]
    fn header_and_track_lengths() {
        let bytes = loop_to_bytes(&SequencerConfig::default(), Timbre::Warm, 0, 2);
        assert_eq!(&bytes[0..4], b"MThd");
        assert_eq!(&bytes[12..14], &480u16.to_be_bytes());
        assert_eq!(&bytes[14..18], b"MTrk");
        let len = u32::from_be_bytes([bytes[18], bytes[19], bytes[20], bytes[21]]) as usize;
        assert_eq!(bytes.len(), 22 + len);
        assert_eq!(&bytes[bytes.len() - 3..], &[0xFF, 0x2F, 0x00]);
    }

    #[test]
    fn note_count_per_bar() {
        let bytes = loop_to_bytes(&SequencerConfig::default(), Timbre::Harsh, 1, 3);
        let ons = bytes.windows(2).filter(|w| w[0] == 0x91 && [28, 31, 33].contains(&w[1])).count();
        assert_eq!(ons, 8 * 3);
        // Square lead program on channel 1.
        assert!(bytes.windows(2).any(|w| w == [0xC1, 80]));
    }

    #[test]
    fn offs_sort_before_ons() {
        let mut tl = Timeline::new();
        tl.note(0, 10, 0, 40, 100);
        tl.note(10, 10, 0, 41, 100);
        let ev = tl.sorted();
        assert_eq!(ev[1], (10, [0x80, 40, 0]));
        assert_eq!(ev[2], (10, [0x90, 41, 100]));
    }
}
