//! Application settings.
//!
//! Every section has defaults, so a settings file only needs the keys it
//! changes:
//!
//! ```json
//! { "canvas": { "width": 800 }, "audio": { "enabled": false } }
//! ```
//!
//! Lookup order: the path in `SAND_TOY_CONFIG`, then `sand_toy.json` in the
//! working directory, then built-in defaults.

use std::path::{Path, PathBuf};

use hand_signals::{GestureConfig, SignalError};
use sand_grid::{PhysicsConfig, SandError};
use sand_synth::{SequencerConfig, SynthError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Environment variable naming a settings file.
pub const CONFIG_ENV: &str = "SAND_TOY_CONFIG";
/// Settings file picked up from the working directory.
pub const DEFAULT_FILE: &str = "sand_toy.json";

// ════════════════════════════════════════════════════════════════════════════
// SettingsError
// ════════════════════════════════════════════════════════════════════════════

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("cannot read settings {}: {source}", .path.display())]
    Read {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse settings {}: {source}", .path.display())]
    Parse {
        path:   PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid settings: {0}")]
    Invalid(String),

    #[error(transparent)]
    Physics(#[from] SandError),

    #[error(transparent)]
    Gestures(#[from] SignalError),

    #[error(transparent)]
    Audio(#[from] SynthError),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

// ════════════════════════════════════════════════════════════════════════════
// Sections
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    pub width:  u32,
    pub height: u32,
}

impl Default for CanvasSettings {
    fn default() -> Self { CanvasSettings { width: 640, height: 480 } }
}

/// Quotas of the gesture actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    /// Particles removed by one fist purge.
    pub purge_quota:    usize,
    /// Display frames between two purges.
    pub purge_cooldown: u32,
    /// Particles spawned per pinch frame.
    pub spawn_count:    usize,
}

impl Default for ControlSettings {
    fn default() -> Self {
        ControlSettings { purge_quota: 1000, purge_cooldown: 30, spawn_count: 4 }
    }
}

/// When the glitch overlay kicks in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    /// Active count above which the overlay runs at full strength.
    pub overload:   usize,
    /// Still-gaze frames before the overlay starts.
    pub gaze_onset: u32,
    /// Intensity gained per gaze frame past the onset.
    pub gaze_ramp:  f32,
}

impl Default for AlertSettings {
    fn default() -> Self {
        AlertSettings { overload: 6000, gaze_onset: 120, gaze_ramp: 0.01 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Frame rate of the simulated landmark feed.
    pub fps: f64,
}

impl Default for SourceSettings {
    fn default() -> Self { SourceSettings { fps: 30.0 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub enabled:   bool,
    /// MIDI channel of the bassline; cues play on the next channel.
    pub channel:   u8,
    pub sequencer: SequencerConfig,
}

impl Default for AudioSettings {
    fn default() -> Self {
        AudioSettings { enabled: true, channel: 0, sequencer: SequencerConfig::default() }
    }
}

impl AudioSettings {
    pub fn cue_channel(&self) -> u8 { self.channel.wrapping_add(1) & 0x0F }
}

// ════════════════════════════════════════════════════════════════════════════
// Settings
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub canvas:   CanvasSettings,
    pub controls: ControlSettings,
    pub alerts:   AlertSettings,
    pub source:   SourceSettings,
    pub audio:    AudioSettings,
    pub physics:  PhysicsConfig,
    pub gestures: GestureConfig,
    /// Fixed RNG seed for reproducible runs.
    pub seed:     Option<u64>,
}

impl Settings {
    /// Load from the first settings file found, or fall back to defaults.
    pub fn load() -> SettingsResult<Self> {
        let env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match locate(env, Path::new(DEFAULT_FILE)) {
            Some(path) => Self::from_path(&path),
            None => {
                info!("no settings file, using defaults");
                let s = Settings::default();
                s.validate()?;
                Ok(s)
            }
        }
    }

    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| SettingsError::Read { path: path.to_path_buf(), source })?;
        let s: Settings = serde_json::from_str(&text)
            .map_err(|source| SettingsError::Parse { path: path.to_path_buf(), source })?;
        s.validate()?;
        info!(path = %path.display(), "settings loaded");
        Ok(s)
    }

    pub fn validate(&self) -> SettingsResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(SettingsError::Invalid(format!(
                "canvas must be non-empty, got {}x{}",
                self.canvas.width, self.canvas.height
            )));
        }
        if !(self.source.fps.is_finite() && self.source.fps > 0.0) {
            return Err(SettingsError::Invalid(format!("source fps must be > 0, got {}", self.source.fps)));
        }
        if !(self.alerts.gaze_ramp.is_finite() && self.alerts.gaze_ramp >= 0.0) {
            return Err(SettingsError::Invalid(format!(
                "gaze_ramp must be >= 0, got {}",
                self.alerts.gaze_ramp
            )));
        }
        if self.audio.channel > 15 {
            return Err(SettingsError::Invalid(format!("MIDI channel must be 0-15, got {}", self.audio.channel)));
        }
        self.physics.validate()?;
        self.gestures.validate()?;
        self.audio.sequencer.validate()?;
        Ok(())
    }
}

/// Settings file to read: `env` if given, else `fallback` if it exists.
pub fn locate(env: Option<PathBuf>, fallback: &Path) -> Option<PathBuf> {
    env.or_else(|| fallback.is_file().then(|| fallback.to_path_buf()))
}
