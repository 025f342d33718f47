//! Per-particle airborne physics: repulsion, integration and settling.
//!
//! [`advance`] is a plain function over particle data; the frame-level
//! ordering (dislodging settled cells, relaxing the pile) lives in
//! [`crate::world`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;
use crate::grid::CellGrid;
use crate::particle::{ColorBand, Motion, Particle};

/// A point force source, valid for a single frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Repulsor {
    pub at: Vec2,
}

impl Repulsor {
    pub fn new(x: f32, y: f32) -> Self { Repulsor { at: Vec2::new(x, y) } }

    /// Is `point` within `radius` of this repulsor?
    pub fn reaches(&self, point: Vec2, radius: f32) -> bool {
        self.at.distance(point) < radius
    }
}

/// What happened to an airborne particle this frame.
#[derive(Debug, PartialEq)]
pub enum ParticleOutcome {
    /// Still in flight, with its updated position and velocity.
    Airborne(Particle),
    /// Placed into the grid at this cell.
    Settled { col: usize, row: usize },
    /// Left the grid sideways, or landed on a full column.
    Expired,
}

/// Sum of radial pushes from every repulsor in reach of `pos`.
pub fn repulsion(pos: Vec2, repulsors: &[Repulsor], cfg: &PhysicsConfig) -> Vec2 {
    let radius = cfg.repulsor_radius;
    repulsors.iter().fold(Vec2::ZERO, |acc, r| {
        let offset = pos - r.at;
        let dist = offset.length();
        if dist >= radius || dist <= f32::EPSILON {
            return acc;
        }
        let force = (radius - dist) / radius;
        acc + offset / dist * force * cfg.repulsor_strength
    })
}

/// Advance one airborne particle by a frame.
///
/// Settled particles are expected to have been lifted first; one passed
/// here is written back to the cell it names.
pub fn advance(
    mut particle: Particle,
    grid: &mut CellGrid,
    repulsors: &[Repulsor],
    cfg: &PhysicsConfig,
) -> ParticleOutcome {
    let (mut pos, mut vel) = match particle.motion {
        Motion::Airborne { pos, vel } => (pos, vel),
        Motion::Settled { col, row } => {
            grid.set(col as i64, row as i64, Some(particle));
            return ParticleOutcome::Settled { col, row };
        }
    };

    // 1. Repulsion
    vel += repulsion(pos, repulsors, cfg);

    // 2. Integration: gravity, then motion, then horizontal drag
    vel.y += cfg.gravity;
    pos += vel;
    vel.x *= cfg.air_damping;

    // 3. Collision with floor or pile
    let col = (pos.x / cfg.cell_edge).floor() as i64;
    let row = (pos.y / cfg.cell_edge).floor() as i64;
    let last_row = grid.rows() as i64 - 1;

    if row >= last_row || grid.is_occupied(col, row) {
        if col < 0 || col >= grid.cols() as i64 {
            return ParticleOutcome::Expired;
        }
        let mut r = row.min(last_row);
        while r >= 0 && grid.is_occupied(col, r) {
            r -= 1;
        }
        if r < 0 {
            return ParticleOutcome::Expired;
        }
        particle.band = ColorBand::for_row(r as usize, grid.rows(), cfg.high_band, cfg.middle_band);
        grid.set(col, r, Some(particle));
        return ParticleOutcome::Settled { col: col as usize, row: r as usize };
    }

    particle.motion = Motion::Airborne { pos, vel };
    ParticleOutcome::Airborne(particle)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Slot;

    fn grain(x: f32, y: f32) -> Particle {
        Particle::airborne('1', Vec2::new(x, y), Vec2::ZERO)
    }

    fn flying(outcome: ParticleOutcome) -> Particle {
        match outcome {
            ParticleOutcome::Airborne(p) => p,
            other => panic!("expected airborne, got {:?}", other),
        }
    }

    #[test]
    fn gravity_and_drag() {
        let cfg = PhysicsConfig::default();
        let mut grid = CellGrid::new(10, 10);
        let p = Particle::airborne('1', Vec2::new(50.0, 10.0), Vec2::new(2.0, 0.0));
        let p = flying(advance(p, &mut grid, &[], &cfg));
        // vy gains gravity before moving; vx decays after moving.
        assert_eq!(p.position(10.0), Vec2::new(52.0, 10.5));
        assert_eq!(p.velocity(), Vec2::new(1.9, 0.5));
    }

    #[test]
    fn lands_on_floor_row() {
        let cfg = PhysicsConfig::default();
        let mut grid = CellGrid::new(10, 10);
        let p = grain(35.0, 89.8);
        assert_eq!(advance(p, &mut grid, &[], &cfg), ParticleOutcome::Settled { col: 3, row: 9 });
        match grid.get(3, 9) {
            Slot::Occupied(q) => {
                assert_eq!(q.velocity(), Vec2::ZERO);
                assert_eq!(q.band, ColorBand::Low);
            }
            other => panic!("expected occupant, got {:?}", other),
        }
    }

    #[test]
    fn stacks_above_obstruction() {
        let cfg = PhysicsConfig::default();
        let mut grid = CellGrid::new(10, 10);
        for r in 4..10 {
            grid.set(2, r, Some(grain(0.0, 0.0)));
        }
        // Falls into the occupied cell at row 4 → settles at row 3.
        let p = grain(25.0, 39.8);
        assert_eq!(advance(p, &mut grid, &[], &cfg), ParticleOutcome::Settled { col: 2, row: 3 });
        match grid.get(2, 3) {
            Slot::Occupied(q) => assert_eq!(q.band, ColorBand::High),
            other => panic!("expected occupant, got {:?}", other),
        }
    }

    #[test]
    fn overshooting_the_floor_clamps_to_last_row() {
        let cfg = PhysicsConfig::default();
        let mut grid = CellGrid::new(10, 10);
        let p = Particle::airborne('1', Vec2::new(15.0, 80.0), Vec2::new(0.0, 60.0));
        assert_eq!(advance(p, &mut grid, &[], &cfg), ParticleOutcome::Settled { col: 1, row: 9 });
    }

    #[test]
    fn off_grid_landing_expires() {
        let cfg = PhysicsConfig::default();
        let mut grid = CellGrid::new(10, 10);
        let p = grain(-20.0, 95.0);
        assert_eq!(advance(p, &mut grid, &[], &cfg), ParticleOutcome::Expired);
        let p = grain(130.0, 95.0);
        assert_eq!(advance(p, &mut grid, &[], &cfg), ParticleOutcome::Expired);
        assert_eq!(grid.occupied(), 0);
    }

    #[test]
    fn full_column_expires() {
        let cfg = PhysicsConfig::default();
        let mut grid = CellGrid::new(3, 4);
        for r in 0..4 {
            grid.set(1, r, Some(grain(0.0, 0.0)));
        }
        let p = grain(15.0, 5.0);
        assert_eq!(advance(p, &mut grid, &[], &cfg), ParticleOutcome::Expired);
        assert_eq!(grid.occupied(), 4);
    }

    #[test]
    fn off_grid_flight_continues() {
        let cfg = PhysicsConfig::default();
        let mut grid = CellGrid::new(10, 10);
        let p = grain(-50.0, 10.0);
        let p = flying(advance(p, &mut grid, &[], &cfg));
        assert!(p.position(10.0).x < 0.0);
    }

    #[test]
    fn repulsion_pushes_away() {
        let cfg = PhysicsConfig::default();
        let push = repulsion(Vec2::new(100.0, 0.0), &[Repulsor::new(25.0, 0.0)], &cfg);
        // d = 75 → force 0.5 → 2.5 along +x
        assert!((push.x - 2.5).abs() < 1e-5);
        assert!(push.y.abs() < 1e-6);
    }

    #[test]
    fn repulsion_ignores_far_and_coincident() {
        let cfg = PhysicsConfig::default();
        let far = repulsion(Vec2::new(400.0, 0.0), &[Repulsor::new(0.0, 0.0)], &cfg);
        assert_eq!(far, Vec2::ZERO);
        let same = repulsion(Vec2::new(5.0, 5.0), &[Repulsor::new(5.0, 5.0)], &cfg);
        assert_eq!(same, Vec2::ZERO);
    }

    #[test]
    fn repulsors_add_up() {
        let cfg = PhysicsConfig::default();
        let both = repulsion(
            Vec2::ZERO,
            &[Repulsor::new(-75.0, 0.0), Repulsor::new(75.0, 0.0)],
            &cfg,
        );
        assert!(both.length() < 1e-5);
    }
}
