//! Real-time MIDI playback thread.
//!
//! The bassline is scheduled ahead by the [`Sequencer`] and sent to a MIDI
//! output port together with the sweep cues.  The thread is driven by
//! commands over a channel; nothing else is shared with the simulation.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use sand_synth::{Sequencer, SoundCue, Timbre};
use tracing::{debug, info, warn};

use crate::settings::AudioSettings;

// ════════════════════════════════════════════════════════════════════════════
// PlayerCommand: sent to the playback thread
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerCommand {
    /// Start the bassline loop from its first step.
    StartBassline,
    /// Stop scheduling bassline notes; sounding notes still end.
    StopBassline,
    /// Current active particle count, which picks the timbre.
    SetLoad(usize),
    /// Play a one-shot sweep.
    Cue(SoundCue),
    /// Silence everything and end the thread.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// MidiOut: abstraction over midir / null (for testing)
// ════════════════════════════════════════════════════════════════════════════

pub trait MidiOut: Send {
    fn program_change(&mut self, channel: u8, program: u8);
    fn note_on(&mut self,  channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
}

impl<M: MidiOut + ?Sized> MidiOut for Box<M> {
    fn program_change(&mut self, channel: u8, program: u8) { (**self).program_change(channel, program) }
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) { (**self).note_on(channel, note, velocity) }
    fn note_off(&mut self, channel: u8, note: u8) { (**self).note_off(channel, note) }
}

// ── midir backend ─────────────────────────────────────────────────────────

struct MidirOut {
    conn: midir::MidiOutputConnection,
}

impl MidiOut for MidirOut {
    fn program_change(&mut self, channel: u8, program: u8) {
        let _ = self.conn.send(&[0xC0 | (channel & 0x0F), program & 0x7F]);
    }
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        let _ = self.conn.send(&[0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]);
    }
    fn note_off(&mut self, channel: u8, note: u8) {
        let _ = self.conn.send(&[0x80 | (channel & 0x0F), note & 0x7F, 0]);
    }
}

// ── null backend (used when no MIDI port is available) ────────────────────

struct NullOut;
impl MidiOut for NullOut {
    fn program_change(&mut self, _ch: u8, _p: u8)   {}
    fn note_on(&mut self, _ch: u8, _n: u8, _v: u8)  {}
    fn note_off(&mut self, _ch: u8, _n: u8)          {}
}

// ════════════════════════════════════════════════════════════════════════════
// open_midi_output: enumerate ports and pick a synthesiser
// ════════════════════════════════════════════════════════════════════════════

/// Open a MIDI output port, preferring a software synthesiser.
/// Falls back to `NullOut` with a warning if none can be opened.
fn open_midi_output() -> Box<dyn MidiOut> {
    let midi_out = match midir::MidiOutput::new("sand_toy") {
        Ok(m)  => m,
        Err(e) => {
            warn!(error = %e, "MIDI init failed, audio muted");
            return Box::new(NullOut);
        }
    };

    let ports = midi_out.ports();
    if ports.is_empty() {
        warn!("no MIDI output ports, audio muted (start a synth such as `fluidsynth` or `timidity -iA`)");
        return Box::new(NullOut);
    }

    let port_idx = ports.iter()
        .position(|p| {
            midi_out.port_name(p).map(|n| {
                let n = n.to_lowercase();
                n.contains("fluid") || n.contains("timidity") ||
                n.contains("microsoft") || n.contains("synth")
            }).unwrap_or(false)
        })
        .unwrap_or(0);

    let port = &ports[port_idx];
    let name = midi_out.port_name(port).unwrap_or_else(|_| "unknown".to_string());

    match midi_out.connect(port, "sand-toy-out") {
        Ok(conn) => {
            info!(port = %name, "MIDI output open");
            Box::new(MidirOut { conn })
        }
        Err(e) => {
            warn!(port = %name, error = %e, "MIDI connect failed, audio muted");
            Box::new(NullOut)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Engine: turns commands and the clock into MIDI messages
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
enum Message {
    Off     { channel: u8, pitch: u8 },
    Program { channel: u8, program: u8 },
    On      { channel: u8, pitch: u8, velocity: u8 },
}

impl Message {
    /// Order within one instant: release, switch sound, then strike.
    fn rank(&self) -> u8 {
        match self {
            Message::Off { .. }     => 0,
            Message::Program { .. } => 1,
            Message::On { .. }      => 2,
        }
    }
}

struct Engine<M: MidiOut> {
    out:         M,
    seq:         Sequencer,
    channel:     u8,
    cue_channel: u8,
    velocity:    u8,
    overload:    usize,
    active:      usize,
    /// Program last scheduled on the bassline channel.
    program:     Option<u8>,
    queue:       Vec<(f64, Message)>,
}

impl<M: MidiOut> Engine<M> {
    fn new(out: M, audio: &AudioSettings, overload: usize) -> Self {
        Engine {
            out,
            seq:         Sequencer::new(audio.sequencer.clone()),
            channel:     audio.channel & 0x0F,
            cue_channel: audio.cue_channel(),
            velocity:    audio.sequencer.velocity,
            overload,
            active:      0,
            program:     None,
            queue:       Vec::new(),
        }
    }

    /// Apply one command at `now_s`; false once the engine should stop.
    fn handle(&mut self, cmd: PlayerCommand, now_s: f64) -> bool {
        match cmd {
            PlayerCommand::StartBassline => self.seq.start(now_s),
            PlayerCommand::StopBassline  => {
                self.seq.stop();
                self.drop_pending(self.channel);
            }
            PlayerCommand::SetLoad(n)    => self.active = n,
            PlayerCommand::Cue(cue)      => self.schedule_cue(cue, now_s),
            PlayerCommand::Quit          => {
                self.silence();
                return false;
            }
        }
        true
    }

    /// Forget notes on `ch` that have not started, with their releases.
    fn drop_pending(&mut self, ch: u8) {
        let unplayed: Vec<(f64, u8)> = self.queue.iter()
            .filter_map(|&(at, m)| match m {
                Message::On { channel, pitch, .. } if channel == ch => Some((at, pitch)),
                _ => None,
            })
            .collect();
        for (at, pitch) in unplayed {
            let release = self.queue.iter()
                .enumerate()
                .filter(|(_, entry)| entry.0 >= at && entry.1 == Message::Off { channel: ch, pitch })
                .min_by(|a, b| (a.1).0.total_cmp(&(b.1).0))
                .map(|(i, _)| i);
            if let Some(i) = release {
                self.queue.remove(i);
            }
        }
        self.queue.retain(|(_, m)| !matches!(m, Message::On { channel, .. } if *channel == ch));
    }

    fn schedule_cue(&mut self, cue: SoundCue, now_s: f64) {
        let ch = self.cue_channel;
        self.queue.push((now_s, Message::Program { channel: ch, program: cue.program().number() }));
        for n in cue.sweep().notes(0.02) {
            let at = now_s + n.offset_s;
            self.queue.push((at, Message::On { channel: ch, pitch: n.pitch, velocity: self.velocity }));
            self.queue.push((at + n.duration_s, Message::Off { channel: ch, pitch: n.pitch }));
        }
        debug!(cue = cue.name(), "cue scheduled");
    }

    /// Schedule bassline notes up to the lookahead and send what is due.
    fn pump(&mut self, now_s: f64) {
        let timbre = Timbre::for_load(self.active, self.overload);
        for note in self.seq.poll(now_s, timbre) {
            let program = note.timbre.program().number();
            if self.program != Some(program) {
                self.program = Some(program);
                self.queue.push((note.at_s, Message::Program { channel: self.channel, program }));
            }
            let ch = self.channel;
            self.queue.push((note.at_s, Message::On { channel: ch, pitch: note.pitch, velocity: note.velocity }));
            self.queue.push((note.at_s + note.duration_s, Message::Off { channel: ch, pitch: note.pitch }));
        }

        self.queue.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.rank().cmp(&b.1.rank())));
        let due = self.queue.iter().take_while(|(at, _)| *at <= now_s).count();
        let ready: Vec<Message> = self.queue.drain(..due).map(|(_, m)| m).collect();
        for m in ready {
            self.send(m);
        }
    }

    /// Release every pending note now and forget the rest.
    fn silence(&mut self) {
        let offs: Vec<Message> = self.queue.drain(..)
            .map(|(_, m)| m)
            .filter(|m| matches!(m, Message::Off { .. }))
            .collect();
        for m in offs {
            self.send(m);
        }
    }

    fn send(&mut self, m: Message) {
        match m {
            Message::Off { channel, pitch }              => self.out.note_off(channel, pitch),
            Message::Program { channel, program }        => self.out.program_change(channel, program),
            Message::On { channel, pitch, velocity }     => self.out.note_on(channel, pitch, velocity),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Player: the playback thread
// ════════════════════════════════════════════════════════════════════════════

/// Handle to the MIDI playback thread.  Dropping it stops the thread.
pub struct Player {
    cmd_tx: Sender<PlayerCommand>,
}

impl Player {
    /// Spawn the playback thread.  `overload` is the active count above
    /// which the bassline turns harsh.
    pub fn spawn(audio: AudioSettings, overload: usize) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<PlayerCommand>();
        thread::spawn(move || player_thread(audio, overload, cmd_rx));
        Player { cmd_tx }
    }

    pub fn start_bassline(&self) { self.send(PlayerCommand::StartBassline); }
    pub fn stop_bassline(&self)  { self.send(PlayerCommand::StopBassline);  }
    pub fn set_load(&self, active: usize) { self.send(PlayerCommand::SetLoad(active)); }
    pub fn cue(&self, cue: SoundCue) { self.send(PlayerCommand::Cue(cue)); }
    pub fn quit(&self) { self.send(PlayerCommand::Quit); }

    fn send(&self, cmd: PlayerCommand) {
        let _ = self.cmd_tx.send(cmd);
    }
}

impl Drop for Player {
    fn drop(&mut self) { self.quit(); }
}

// ════════════════════════════════════════════════════════════════════════════
// player_thread: the actual loop
// ════════════════════════════════════════════════════════════════════════════

fn player_thread(audio: AudioSettings, overload: usize, cmd_rx: Receiver<PlayerCommand>) {
    let tick = Duration::from_millis(audio.sequencer.tick_ms.max(1));
    let mut engine = Engine::new(open_midi_output(), &audio, overload);
    let start = Instant::now();

    loop {
        let now = start.elapsed().as_secs_f64();

        // ── drain commands ────────────────────────────────────────────────
        loop {
            match cmd_rx.try_recv() {
                Ok(cmd) => {
                    if !engine.handle(cmd, now) {
                        debug!("player stopped");
                        return;
                    }
                }
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => {
                    engine.silence();
                    return;
                }
            }
        }

        engine.pump(now);
        thread::sleep(tick);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
