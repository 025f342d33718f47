//! Glyph particles and their colour bands.

use glam::Vec2;
use rand::Rng;

// ════════════════════════════════════════════════════════════════════════════
// Glyph alphabet
// ════════════════════════════════════════════════════════════════════════════

/// Characters a particle may display.  Picked uniformly at creation.
pub const GLYPHS: [char; 16] = [
    '0', '1', 'X', 'Y', 'Z', '_', '█', '▓', '▒', '░', 'E', 'R', 'R', 'O', 'R', '#',
];

/// Pick a glyph uniformly from [`GLYPHS`].
pub fn random_glyph<R: Rng + ?Sized>(rng: &mut R) -> char {
    GLYPHS[rng.gen_range(0..GLYPHS.len())]
}

// ════════════════════════════════════════════════════════════════════════════
// ColorBand: colour assigned by settle height
// ════════════════════════════════════════════════════════════════════════════

/// Colour of a particle, fixed when it settles.
///
/// Bands run top to bottom: a pile reaching into the upper half of the
/// screen glows red.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorBand {
    /// Upper half of the grid (band A).
    High,
    /// Between 50% and 80% of the grid height (band B).
    Middle,
    /// Bottom fifth (band C); also the colour of fresh airborne particles.
    Low,
}

impl ColorBand {
    /// Band for a settle at `row` of a grid `rows` tall.
    pub fn for_row(row: usize, rows: usize, high: f32, middle: f32) -> Self {
        let ratio = row as f32 / rows.max(1) as f32;
        if ratio < high {
            ColorBand::High
        } else if ratio < middle {
            ColorBand::Middle
        } else {
            ColorBand::Low
        }
    }

    /// Packed ARGB (0xAARRGGBB, A = 0xFF).
    pub fn argb(self) -> u32 {
        match self {
            ColorBand::High   => 0xFFFF2A2A,
            ColorBand::Middle => 0xFF00FFFF,
            ColorBand::Low    => 0xFF00FF00,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Particle
// ════════════════════════════════════════════════════════════════════════════

/// Where a particle is and how it moves.
///
/// The two variants are exclusive: an airborne particle has no cell, a
/// settled one has no velocity and its position is implied by its cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    Airborne { pos: Vec2, vel: Vec2 },
    Settled  { col: usize, row: usize },
}

/// One falling character.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub glyph:  char,
    pub band:   ColorBand,
    pub motion: Motion,
}

impl Particle {
    /// A fresh airborne particle.
    pub fn airborne(glyph: char, pos: Vec2, vel: Vec2) -> Self {
        Particle { glyph, band: ColorBand::Low, motion: Motion::Airborne { pos, vel } }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.motion, Motion::Settled { .. })
    }

    /// Grid cell for settled particles.
    pub fn cell(&self) -> Option<(usize, usize)> {
        match self.motion {
            Motion::Settled { col, row } => Some((col, row)),
            Motion::Airborne { .. }      => None,
        }
    }

    /// Canvas position: the continuous position while airborne, the cell
    /// origin once settled.
    pub fn position(&self, cell_edge: f32) -> Vec2 {
        match self.motion {
            Motion::Airborne { pos, .. }  => pos,
            Motion::Settled { col, row } => Vec2::new(col as f32, row as f32) * cell_edge,
        }
    }

    /// Velocity; always zero for settled particles.
    pub fn velocity(&self) -> Vec2 {
        match self.motion {
            Motion::Airborne { vel, .. } => vel,
            Motion::Settled { .. }       => Vec2::ZERO,
        }
    }

    /// Release a settled particle at its cell origin with zero velocity.
    /// Airborne particles are unchanged.
    pub(crate) fn lift(&mut self, cell_edge: f32) {
        if self.is_settled() {
            let pos = self.position(cell_edge);
            self.motion = Motion::Airborne { pos, vel: Vec2::ZERO };
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn band_thresholds() {
        assert_eq!(ColorBand::for_row(0, 10, 0.5, 0.8), ColorBand::High);
        assert_eq!(ColorBand::for_row(4, 10, 0.5, 0.8), ColorBand::High);
        assert_eq!(ColorBand::for_row(5, 10, 0.5, 0.8), ColorBand::Middle);
        assert_eq!(ColorBand::for_row(7, 10, 0.5, 0.8), ColorBand::Middle);
        assert_eq!(ColorBand::for_row(8, 10, 0.5, 0.8), ColorBand::Low);
        assert_eq!(ColorBand::for_row(9, 10, 0.5, 0.8), ColorBand::Low);
    }

    #[test]
    fn band_colors_opaque_and_distinct() {
        let all = [ColorBand::High, ColorBand::Middle, ColorBand::Low];
        for b in all {
            assert_eq!(b.argb() >> 24, 0xFF);
        }
        assert_ne!(ColorBand::High.argb(), ColorBand::Low.argb());
    }

    #[test]
    fn lift_moves_to_cell_origin() {
        let mut p = Particle::airborne('X', Vec2::ZERO, Vec2::ZERO);
        p.motion = Motion::Settled { col: 3, row: 7 };
        assert_eq!(p.velocity(), Vec2::ZERO);
        p.lift(10.0);
        assert!(!p.is_settled());
        assert_eq!(p.position(10.0), Vec2::new(30.0, 70.0));
        assert_eq!(p.cell(), None);
    }

    #[test]
    fn glyphs_come_from_alphabet() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..64 {
            assert!(GLYPHS.contains(&random_glyph(&mut rng)));
        }
    }
}
