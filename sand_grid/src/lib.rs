//! # sand_grid
//!
//! A falling-glyph "digital sand" engine.  Glyph particles are either
//! **airborne** (continuous position and velocity) or **settled** (resident
//! in exactly one cell of a fixed-resolution grid).  Each frame the engine
//! pushes particles away from repulsors, integrates airborne motion, settles
//! anything that lands on the pile, then lets the pile relax one row under a
//! steerable directional bias, cellular-automaton style.
//!
//! ## Frame sequence
//!
//! | Phase | Applies to | Effect |
//! |---|---|---|
//! | Dislodge | settled | cells near a repulsor are vacated, particle goes airborne |
//! | Repel | airborne | radial push `(R - d) / R × strength` away from each repulsor |
//! | Integrate | airborne | `vy += g`, `pos += vel`, `vx *= damping` |
//! | Collide | airborne | floor or pile contact → settle in first free cell above |
//! | Relax | settled | drop straight down, else diagonally toward the bias |
//!
//! ## Quick start
//!
//! ```rust
//! use sand_grid::{SandWorld, PhysicsConfig};
//! use glam::Vec2;
//!
//! let mut world = SandWorld::with_seed(640, 480, PhysicsConfig::default(), 7).unwrap();
//! world.spawn_burst(Vec2::new(320.0, 40.0), 4);
//! for _ in 0..120 { world.step(&[]); }
//! assert_eq!(world.active_count(), 4);
//! ```

pub mod airborne;
pub mod config;
pub mod error;
pub mod grid;
pub mod particle;
pub mod physics;
pub mod world;

pub use airborne::AirborneSet;
pub use config::PhysicsConfig;
pub use error::{SandError, SandResult};
pub use grid::{CellGrid, Slot};
pub use particle::{ColorBand, Motion, Particle, GLYPHS};
pub use physics::{advance, ParticleOutcome, Repulsor};
pub use world::{scan_direction, ScanDirection, SandWorld};
