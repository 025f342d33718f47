//! Top-level application state.
//!
//! `AppState` owns the `SandWorld`, the `ControlMapper`, the glitch overlay
//! and the optional `Player`.  It admits landmark frames, steps the world
//! once per new frame and hands the visualizer a `Scene` every display
//! frame.

use std::sync::mpsc;
use std::time::Instant;

use anyhow::Context;
use hand_signals::{FrameObservation, HandObservation};
use sand_grid::SandWorld;
use tracing::{debug, info};

use crate::control::{ControlMapper, FrameControl};
use crate::glitch::{GlitchEffects, GlitchOverlay};
use crate::player::Player;
use crate::settings::Settings;
use crate::source::{FrameGate, LandmarkSource, SimInput, SimLandmarkSource};
use crate::visualizer::{Hud, Scene, UiEvent, Visualizer};

/// Flash strength lost per display frame after a reset.
const FLASH_DECAY: f32 = 0.15;

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    settings: Settings,

    // ── simulation ────────────────────────────────────────────────────────
    world:    SandWorld,
    mapper:   ControlMapper,
    gate:     FrameGate,

    // ── last admitted frame ───────────────────────────────────────────────
    hands:    Vec<HandObservation>,
    control:  FrameControl,

    // ── overlay ───────────────────────────────────────────────────────────
    glitch:   GlitchOverlay,
    effects:  GlitchEffects,
    flash:    f32,

    // ── audio ─────────────────────────────────────────────────────────────
    player:   Option<Player>,
    music_on: bool,

    pub status: String,
}

impl AppState {
    /// Build the world from `settings`.  With a player, the bassline starts
    /// right away.
    pub fn new(settings: Settings, player: Option<Player>) -> anyhow::Result<Self> {
        let (w, h) = (settings.canvas.width, settings.canvas.height);
        let (world, glitch) = match settings.seed {
            Some(seed) => (
                SandWorld::with_seed(w, h, settings.physics.clone(), seed)?,
                GlitchOverlay::with_seed(w, h, seed.wrapping_add(1)),
            ),
            None => (SandWorld::new(w, h, settings.physics.clone())?, GlitchOverlay::new(w, h)),
        };
        let mapper = ControlMapper::new(
            settings.gestures.clone(),
            settings.controls.clone(),
            settings.alerts.clone(),
        );

        if let Some(p) = &player {
            p.start_bassline();
        }
        let music_on = player.is_some();

        let mut app = AppState {
            settings,
            world,
            mapper,
            gate:    FrameGate::new(),
            hands:   Vec::new(),
            control: FrameControl::default(),
            glitch,
            effects: GlitchEffects::default(),
            flash:   0.0,
            player,
            music_on,
            status:  String::new(),
        };
        app.refresh_status();
        Ok(app)
    }

    // ── landmark frames ───────────────────────────────────────────────────

    /// Apply one landmark frame.  Returns false, doing nothing, when the
    /// frame's timestamp has already been seen.
    pub fn handle_frame(&mut self, obs: FrameObservation) -> bool {
        if !self.gate.admit(obs.timestamp_ms) {
            return false;
        }

        self.glitch.update();
        let control = self.mapper.apply(&obs, &mut self.world);
        self.glitch.set_target(control.alert.intensity());
        if control.reset {
            self.glitch.reset();
            self.flash = 1.0;
        }

        self.world.step(&control.repulsors);

        if let Some(player) = &self.player {
            player.set_load(self.world.active_count());
            for &cue in &control.cues {
                player.cue(cue);
            }
        }
        if let Some(purge) = control.purge {
            debug!(removed = purge.removed, left = self.world.active_count(), "purge applied");
        }

        self.effects = self.glitch.effects();
        self.hands = obs.hands;
        self.control = control;
        true
    }

    /// Poll `source` and apply what it returns.
    pub fn poll_source(&mut self, source: &mut dyn LandmarkSource, now_ms: f64) -> bool {
        match source.poll(now_ms) {
            Some(obs) => self.handle_frame(obs),
            None      => false,
        }
    }

    // ── per display frame ─────────────────────────────────────────────────

    pub fn tick(&mut self) {
        self.mapper.tick();
        self.flash = (self.flash - FLASH_DECAY).max(0.0);
        self.refresh_status();
    }

    pub fn toggle_music(&mut self) {
        let Some(player) = &self.player else {
            self.status = "music unavailable: no MIDI player".to_string();
            return;
        };
        self.music_on = !self.music_on;
        if self.music_on {
            player.start_bassline();
        } else {
            player.stop_bassline();
        }
        info!(on = self.music_on, "music toggled");
        self.refresh_status();
    }

    fn music_label(&self) -> &'static str {
        match (&self.player, self.music_on) {
            (None, _)        => "OFFLINE",
            (Some(_), true)  => "ONLINE",
            (Some(_), false) => "MUTED",
        }
    }

    fn refresh_status(&mut self) {
        let caption = self.control.alert.caption();
        self.status = format!(
            "{} particles  gravity {:.2}  music {}{}{}",
            self.world.active_count(),
            self.world.gravity_bias(),
            self.music_label(),
            if caption.is_empty() { "" } else { "  " },
            caption,
        );
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn world(&self)   -> &SandWorld          { &self.world }
    pub fn control(&self) -> &FrameControl       { &self.control }
    pub fn hands(&self)   -> &[HandObservation]  { &self.hands }
    pub fn effects(&self) -> &GlitchEffects      { &self.effects }
    pub fn flash(&self)   -> f32                 { self.flash }
    pub fn music_on(&self) -> bool               { self.music_on }

    pub fn hud(&self) -> Hud {
        Hud {
            count:    self.world.active_count(),
            gravity:  self.world.gravity_bias(),
            alert:    self.control.alert,
            overload: self.settings.alerts.overload,
            music:    self.music_label(),
        }
    }

    pub fn scene<'a>(&'a self, hud: &'a Hud) -> Scene<'a> {
        Scene {
            world:       &self.world,
            hands:       &self.hands,
            control:     &self.control,
            dead_pixels: self.glitch.pixels(),
            effects:     &self.effects,
            flash:       self.flash,
            hud,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Opens the visualizer, feeds it to the keyboard/mouse landmark source and
/// drives the world at the display rate; the world itself only steps when
/// the source delivers a new frame.
pub fn run(settings: Settings) -> anyhow::Result<()> {
    // ── Sim landmark channel ──────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let mut source = SimLandmarkSource::new(sim_rx, settings.source.fps);

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(settings.canvas.width, settings.canvas.height, sim_tx)
        .context("starting visualizer")?;

    // ── Audio ─────────────────────────────────────────────────────────────
    let player = settings
        .audio
        .enabled
        .then(|| Player::spawn(settings.audio.clone(), settings.alerts.overload));

    // ── App state ─────────────────────────────────────────────────────────
    let mut app = AppState::new(settings, player)?;
    info!(status = %app.status, "sand toy running");

    let start = Instant::now();
    'main: while vis.is_open() {
        // 1. Window input: gesture keys go to the source, the rest here
        for event in vis.poll_input() {
            match event {
                UiEvent::Quit        => break 'main,
                UiEvent::ToggleMusic => app.toggle_music(),
            }
        }

        // 2. Per-frame logic
        app.tick();

        // 3. New landmarks step the world
        let now_ms = start.elapsed().as_secs_f64() * 1000.0;
        app.poll_source(&mut source, now_ms);

        // 4. Render
        let hud = app.hud();
        vis.render(&app.scene(&hud));
    }

    info!(particles = app.world().active_count(), "sand toy closed");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::AlertLevel;
    use crate::settings::CanvasSettings;
    use crate::source::ScriptedSource;
    use glam::Vec2;
    use hand_signals::pose::HandPose;
    use hand_signals::HandLabel;

    fn make_app() -> AppState {
        let settings = Settings {
            canvas: CanvasSettings { width: 200, height: 100 },
            seed: Some(7),
            ..Settings::default()
        };
        AppState::new(settings, None).unwrap()
    }

    fn frame(t: f64, hands: Vec<HandObservation>) -> FrameObservation {
        FrameObservation { timestamp_ms: t, face: None, hands }
    }

    fn pinch() -> HandObservation {
        HandPose::pinching(Vec2::new(0.5, 0.5)).observe(HandLabel::Right)
    }

    #[test]
    fn repeated_timestamp_is_ignored() {
        let mut app = make_app();
        assert!(app.handle_frame(frame(0.0, vec![pinch()])));
        assert_eq!(app.world().frame(), 1);
        assert!(!app.handle_frame(frame(0.0, vec![pinch()])));
        assert_eq!(app.world().frame(), 1);
        assert_eq!(app.world().active_count(), 4);
    }

    #[test]
    fn pinch_frames_accumulate_sand() {
        let mut app = make_app();
        let mut src = ScriptedSource::new((0..3).map(|i| frame(i as f64 * 33.0, vec![pinch()])));
        let mut admitted = 0;
        for t in 0..5 {
            if app.poll_source(&mut src, t as f64) {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 3);
        assert_eq!(app.world().active_count(), 12);
        assert_eq!(app.hands().len(), 1);
    }

    #[test]
    fn reset_clears_and_flashes() {
        let mut app = make_app();
        app.handle_frame(frame(0.0, vec![pinch()]));
        assert!(app.world().active_count() > 0);

        let reset = vec![
            HandPose::counting(Vec2::new(0.3, 0.5), 2).observe(HandLabel::Right),
            HandPose::counting(Vec2::new(0.7, 0.5), 3).observe(HandLabel::Left),
        ];
        app.handle_frame(frame(33.0, reset));
        assert!(app.control().reset);
        assert_eq!(app.world().active_count(), 0);
        assert_eq!(app.flash(), 1.0);

        app.tick();
        assert!((app.flash() - 0.85).abs() < 1e-6);
        for _ in 0..10 {
            app.tick();
        }
        assert_eq!(app.flash(), 0.0);
    }

    #[test]
    fn purge_ring_follows_the_fist() {
        let mut app = make_app();
        app.handle_frame(frame(0.0, vec![pinch()]));
        let fist = HandPose::fist(Vec2::new(0.5, 0.5)).observe(HandLabel::Right);
        app.handle_frame(frame(33.0, vec![fist]));
        let purge = app.control().purge.unwrap();
        assert_eq!(purge.removed, 4);
        assert_eq!(app.world().active_count(), 0);
    }

    #[test]
    fn status_and_hud_without_player() {
        let mut app = make_app();
        app.handle_frame(frame(0.0, vec![pinch()]));
        app.tick();
        assert_eq!(app.status, "4 particles  gravity 0.00  music OFFLINE");
        let hud = app.hud();
        assert_eq!(hud.count, 4);
        assert_eq!(hud.alert, AlertLevel::Calm);
        assert_eq!(hud.music, "OFFLINE");

        app.toggle_music();
        assert!(!app.music_on());
        assert!(app.status.contains("unavailable"));
    }
}
