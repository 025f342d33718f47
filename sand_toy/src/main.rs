//! sand_toy: interactive entry point.

use anyhow::Context;
use sand_synth::{smf, Timbre};
use sand_toy::app::run;
use sand_toy::settings::Settings;

/// Bars written by `--export-bassline` unless `--bars` says otherwise.
const DEFAULT_BARS: u32 = 4;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Sand Toy · gesture-steered digital sand               ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let settings = Settings::load().context("loading settings")?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    if let Some(path) = flag_value(&args, "--export-bassline") {
        let bars = match flag_value(&args, "--bars") {
            Some(b) => b.parse::<u32>().with_context(|| format!("--bars expects a number, got {b:?}"))?,
            None    => DEFAULT_BARS,
        };
        let timbre = if args.iter().any(|a| a == "--harsh") { Timbre::Harsh } else { Timbre::Warm };
        smf::write_loop(path, &settings.audio.sequencer, timbre, settings.audio.channel, bars)
            .with_context(|| format!("writing {path}"))?;
        println!("  Wrote {bars} bars of bassline to {path}");
        return Ok(());
    }

    println!("  Mode: keyboard/mouse simulation  (P pinch · O palm · F fist · R reset)");
    println!("  Opening visualizer window…");
    println!();

    run(settings)
}

/// Value following `name` on the command line.
fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}
