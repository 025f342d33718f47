//! `SandWorld`: the grid, the airborne set and everything that steps them.
//!
//! The world is the only owner of simulation state.  Control code mutates it
//! through a handful of operations (spawn, purge, reset, bias) and then calls
//! [`SandWorld::step`] once per source frame.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::airborne::AirborneSet;
use crate::config::PhysicsConfig;
use crate::error::{SandError, SandResult};
use crate::grid::CellGrid;
use crate::particle::{random_glyph, Particle};
use crate::physics::{advance, ParticleOutcome, Repulsor};

// ════════════════════════════════════════════════════════════════════════════
// Relaxation scan order
// ════════════════════════════════════════════════════════════════════════════

/// Column order of one relaxation row sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanDirection {
    LeftToRight,
    RightToLeft,
}

impl ScanDirection {
    /// The `i`-th column visited in a row of `cols` columns.
    pub fn column(self, i: usize, cols: usize) -> usize {
        match self {
            ScanDirection::LeftToRight => i,
            ScanDirection::RightToLeft => cols - 1 - i,
        }
    }
}

/// Scan order for `frame`.
///
/// A bias beyond `threshold` sweeps against the slide direction; otherwise
/// the order alternates with frame parity.
pub fn scan_direction(frame: u64, bias: f32, threshold: f32) -> ScanDirection {
    if bias > threshold {
        ScanDirection::RightToLeft
    } else if bias < -threshold {
        ScanDirection::LeftToRight
    } else if frame % 2 == 0 {
        ScanDirection::LeftToRight
    } else {
        ScanDirection::RightToLeft
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SandWorld
// ════════════════════════════════════════════════════════════════════════════

pub struct SandWorld {
    width:        u32,
    height:       u32,
    cfg:          PhysicsConfig,
    grid:         CellGrid,
    airborne:     AirborneSet,
    rng:          StdRng,
    frame:        u64,
    gravity_bias: f32,
    active_count: usize,
}

impl SandWorld {
    /// World for a `width × height` canvas, seeded from OS entropy.
    pub fn new(width: u32, height: u32, cfg: PhysicsConfig) -> SandResult<Self> {
        Self::build(width, height, cfg, StdRng::from_entropy())
    }

    /// Deterministic world for tests and replays.
    pub fn with_seed(width: u32, height: u32, cfg: PhysicsConfig, seed: u64) -> SandResult<Self> {
        Self::build(width, height, cfg, StdRng::seed_from_u64(seed))
    }

    fn build(width: u32, height: u32, cfg: PhysicsConfig, rng: StdRng) -> SandResult<Self> {
        cfg.validate()?;
        if width == 0 || height == 0 {
            return Err(SandError::EmptyCanvas { width, height, cell_edge: cfg.cell_edge });
        }
        let grid = CellGrid::for_canvas(width, height, cfg.cell_edge);
        info!(width, height, cols = grid.cols(), rows = grid.rows(), "sand world created");
        Ok(SandWorld {
            width,
            height,
            cfg,
            grid,
            airborne: AirborneSet::new(),
            rng,
            frame: 0,
            gravity_bias: 0.0,
            active_count: 0,
        })
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn grid(&self) -> &CellGrid { &self.grid }
    pub fn airborne(&self) -> &AirborneSet { &self.airborne }
    pub fn config(&self) -> &PhysicsConfig { &self.cfg }
    pub fn canvas(&self) -> (u32, u32) { (self.width, self.height) }
    pub fn frame(&self) -> u64 { self.frame }
    pub fn gravity_bias(&self) -> f32 { self.gravity_bias }

    /// Settled plus airborne particles.
    pub fn active_count(&self) -> usize { self.active_count }

    /// Bias is recomputed by the caller every frame; it is not clamped.
    pub fn set_gravity_bias(&mut self, bias: f32) { self.gravity_bias = bias; }

    fn recount(&mut self) {
        self.active_count = self.grid.occupied() + self.airborne.len();
    }

    // ── Lifecycle ──────────────────────────────────────────────────────────

    /// Adopt a new canvas size.  A changed size discards every particle;
    /// returns whether anything changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if (width, height) == (self.width, self.height) {
            return false;
        }
        self.width = width;
        self.height = height;
        self.grid = CellGrid::for_canvas(width, height, self.cfg.cell_edge);
        self.airborne.clear();
        self.recount();
        info!(width, height, cols = self.grid.cols(), rows = self.grid.rows(), "sand world resized");
        true
    }

    /// Remove every particle.  Bias and frame counter are kept.
    pub fn reset(&mut self) {
        let dropped = self.active_count;
        self.grid.clear();
        self.airborne.clear();
        self.recount();
        info!(dropped, "sand world reset");
    }

    // ── Spawning and purging ───────────────────────────────────────────────

    /// Add one airborne particle with a random glyph.
    pub fn spawn(&mut self, pos: Vec2, vel: Vec2) {
        let glyph = random_glyph(&mut self.rng);
        self.airborne.push(Particle::airborne(glyph, pos, vel));
        self.recount();
    }

    /// Throw `count` particles upward around `at`.
    ///
    /// Each gets a horizontal jitter of up to half of `spawn_jitter` either
    /// side, `vx ∈ [-2, 2)` and `vy ∈ [-6, -3)`.
    pub fn spawn_burst(&mut self, at: Vec2, count: usize) {
        for _ in 0..count {
            let jitter = (self.rng.gen::<f32>() - 0.5) * self.cfg.spawn_jitter;
            let vx = (self.rng.gen::<f32>() - 0.5) * 4.0;
            let vy = -3.0 - self.rng.gen::<f32>() * 3.0;
            self.spawn(Vec2::new(at.x + jitter, at.y), Vec2::new(vx, vy));
        }
        trace!(x = at.x, y = at.y, count, "burst spawned");
    }

    /// Remove up to `quota` particles and return how many went.
    ///
    /// The oldest airborne particles go first.  Any quota left over is spent
    /// on uniformly random grid probes, at most `2 × quota` of them, so a
    /// sparse grid may yield fewer removals than asked.
    pub fn purge(&mut self, quota: usize) -> usize {
        let from_air = self.airborne.remove_oldest(quota);
        let mut remaining = quota - from_air;

        let cells = self.grid.len();
        let mut probes = quota.saturating_mul(2);
        while remaining > 0 && probes > 0 && cells > 0 && self.grid.occupied() > 0 {
            probes -= 1;
            let index = self.rng.gen_range(0..cells);
            if self.grid.take_index(index).is_some() {
                remaining -= 1;
            }
        }

        let removed = quota - remaining;
        self.recount();
        debug!(quota, from_air, from_grid = removed - from_air, left = self.active_count, "purge");
        removed
    }

    // ── Simulation ─────────────────────────────────────────────────────────

    /// Advance the simulation by one frame.
    ///
    /// `repulsors` apply to this frame only.
    pub fn step(&mut self, repulsors: &[Repulsor]) {
        if !repulsors.is_empty() {
            self.dislodge(repulsors);
        }

        let grid = &mut self.grid;
        let cfg = &self.cfg;
        let mut settled = 0usize;
        let mut expired = 0usize;
        self.airborne.advance_each(|p| match advance(p, grid, repulsors, cfg) {
            ParticleOutcome::Airborne(p) => Some(p),
            ParticleOutcome::Settled { .. } => { settled += 1; None }
            ParticleOutcome::Expired => { expired += 1; None }
        });

        self.relax();
        self.recount();
        trace!(frame = self.frame, settled, expired, active = self.active_count, "step");
        self.frame += 1;
    }

    /// Lift every settled particle whose cell origin is in reach of a
    /// repulsor back into the airborne set.
    fn dislodge(&mut self, repulsors: &[Repulsor]) {
        let radius = self.cfg.repulsor_radius;
        let edge = self.cfg.cell_edge;
        let cols = self.grid.cols();
        for row in 0..self.grid.rows() {
            for col in 0..cols {
                let origin = Vec2::new(col as f32, row as f32) * edge;
                if !repulsors.iter().any(|r| r.reaches(origin, radius)) {
                    continue;
                }
                if let Some(mut p) = self.grid.take(col as i64, row as i64) {
                    p.lift(edge);
                    self.airborne.push(p);
                }
            }
        }
    }

    /// One relaxation sweep: every settled particle drops a row if it can,
    /// straight down first, else diagonally toward the bias.
    fn relax(&mut self) {
        let rows = self.grid.rows();
        let cols = self.grid.cols();
        if rows < 2 || cols == 0 {
            return;
        }
        let bias = self.gravity_bias;
        let direction = scan_direction(self.frame, bias, self.cfg.scan_override);

        for row in (0..rows - 1).rev() {
            let r = row as i64;
            for i in 0..cols {
                let c = direction.column(i, cols) as i64;
                if !self.grid.is_occupied(c, r) {
                    continue;
                }
                if self.grid.shift((c, r), (c, r + 1)) {
                    continue;
                }
                let preferred: i64 = if bias < -self.cfg.slide_override {
                    -1
                } else if bias > self.cfg.slide_override {
                    1
                } else if self.rng.gen_bool(0.5) {
                    -1
                } else {
                    1
                };
                if !self.grid.shift((c, r), (c + preferred, r + 1)) {
                    self.grid.shift((c, r), (c - preferred, r + 1));
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
