//! Physical constants of the sand engine.

use serde::{Deserialize, Serialize};

use crate::error::{SandError, SandResult};

/// Tunable physics parameters.
///
/// Defaults: 10-unit cells, gentle gravity, light horizontal air drag and
/// a 150-unit repulsor reach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Edge length of one grid cell in canvas units.
    pub cell_edge: f32,
    /// Downward acceleration added to `vy` every frame.
    pub gravity: f32,
    /// Multiplier applied to `vx` every frame (air resistance).
    pub air_damping: f32,
    /// Reach of a repulsor in canvas units.
    pub repulsor_radius: f32,
    /// Velocity added at zero distance from a repulsor.
    pub repulsor_strength: f32,
    /// Full width of the horizontal jitter applied to spawned bursts.
    pub spawn_jitter: f32,
    /// `|bias|` above which the relaxation scan direction is forced.
    pub scan_override: f32,
    /// `|bias|` above which diagonal slides always prefer the bias side.
    pub slide_override: f32,
    /// Height ratio (`row / rows`) below which a settle is coloured `High`.
    pub high_band: f32,
    /// Height ratio below which a settle is coloured `Middle`.
    pub middle_band: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            cell_edge:         10.0,
            gravity:           0.5,
            air_damping:       0.95,
            repulsor_radius:   150.0,
            repulsor_strength: 5.0,
            spawn_jitter:      30.0,
            scan_override:     0.2,
            slide_override:    0.1,
            high_band:         0.5,
            middle_band:       0.8,
        }
    }
}

impl PhysicsConfig {
    /// Validate parameter ranges.
    pub fn validate(&self) -> SandResult<()> {
        if !(self.cell_edge.is_finite() && self.cell_edge >= 1.0) {
            return Err(SandError::Config(format!(
                "cell_edge must be >= 1, got {}",
                self.cell_edge
            )));
        }
        if !(0.0..=1.0).contains(&self.air_damping) {
            return Err(SandError::Config(format!(
                "air_damping must be in [0, 1], got {}",
                self.air_damping
            )));
        }
        if !(self.repulsor_radius > 0.0) {
            return Err(SandError::Config(format!(
                "repulsor_radius must be positive, got {}",
                self.repulsor_radius
            )));
        }
        if !(0.0 < self.high_band && self.high_band <= self.middle_band && self.middle_band <= 1.0) {
            return Err(SandError::Config(format!(
                "colour bands must satisfy 0 < high ({}) <= middle ({}) <= 1",
                self.high_band, self.middle_band
            )));
        }
        if self.slide_override < 0.0 || self.scan_override < 0.0 {
            return Err(SandError::Config("bias overrides must be non-negative".to_string()));
        }
        Ok(())
    }
}
