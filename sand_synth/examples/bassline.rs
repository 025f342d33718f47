//! Prints one bar of the bassline schedule and the two sound cues, then
//! writes a four-bar `.mid` file (path from the first argument).

use sand_synth::{smf, Sequencer, SequencerConfig, SoundCue, Timbre};

fn main() {
    println!("\n=== Sand Bassline ===\n");

    let cfg = SequencerConfig::default();

    // ── 1. One bar through the lookahead scheduler ────────────────────────
    println!("1. One bar at {} BPM, polled every {} ms", cfg.tempo_bpm, cfg.tick_ms);
    let mut seq = Sequencer::new(cfg.clone());
    seq.start(0.0);
    let tick = cfg.tick_ms as f64 / 1000.0;
    let mut now = 0.0;
    while now < 2.0 {
        let timbre = if now < 1.0 { Timbre::Warm } else { Timbre::Harsh };
        for n in seq.poll(now, timbre) {
            println!(
                "   t={:>6.3}s  note {:>3}  len {:.2}s  {:?}  (polled at {:.3})",
                n.at_s, n.pitch, n.duration_s, n.timbre, now
            );
        }
        now += tick;
    }
    println!();

    // ── 2. Sound cues ─────────────────────────────────────────────────────
    for cue in [SoundCue::Purge, SoundCue::Reset] {
        let notes = cue.sweep().notes(0.02);
        let pitches: Vec<u8> = notes.iter().map(|n| n.pitch).collect();
        println!("2. {} cue ({}): {:?}", cue.name(), cue.program().name(), pitches);
    }
    println!();

    // ── 3. Export ─────────────────────────────────────────────────────────
    let path = std::env::args().nth(1).unwrap_or_else(|| "sand_bassline.mid".to_string());
    match smf::write_loop(&path, &cfg, Timbre::Warm, 0, 4) {
        Ok(())  => println!("3. Wrote 4 bars to {}", path),
        Err(e)  => eprintln!("3. Export failed: {}", e),
    }
}
