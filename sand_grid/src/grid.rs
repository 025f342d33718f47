//! The settled-particle grid.
//!
//! A fixed `cols × rows` array of cells, each empty or owning exactly one
//! settled [`Particle`].  Coordinates are signed so callers can probe
//! neighbours off the edge; such probes report [`Slot::OutOfRange`], which
//! is deliberately distinct from [`Slot::Empty`].

use crate::particle::{Motion, Particle};

/// Result of looking up one cell.
#[derive(Debug, PartialEq)]
pub enum Slot<'a> {
    OutOfRange,
    Empty,
    Occupied(&'a Particle),
}

/// Row-major grid of settled particles.
#[derive(Debug, Clone)]
pub struct CellGrid {
    cols:     usize,
    rows:     usize,
    cells:    Vec<Option<Particle>>,
    occupied: usize,
}

impl CellGrid {
    pub fn new(cols: usize, rows: usize) -> Self {
        CellGrid {
            cols,
            rows,
            cells: vec![None; cols * rows],
            occupied: 0,
        }
    }

    /// Grid covering a `width × height` canvas with square cells of
    /// `cell_edge` units (partial cells at the edges count).
    pub fn for_canvas(width: u32, height: u32, cell_edge: f32) -> Self {
        let cols = (width as f32 / cell_edge).ceil() as usize;
        let rows = (height as f32 / cell_edge).ceil() as usize;
        CellGrid::new(cols, rows)
    }

    pub fn cols(&self) -> usize { self.cols }
    pub fn rows(&self) -> usize { self.rows }

    /// Number of cells in the grid.
    pub fn len(&self) -> usize { self.cells.len() }
    pub fn is_empty(&self) -> bool { self.cells.is_empty() }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize { self.occupied }

    fn index(&self, col: i64, row: i64) -> Option<usize> {
        if col < 0 || row < 0 || col >= self.cols as i64 || row >= self.rows as i64 {
            return None;
        }
        Some(row as usize * self.cols + col as usize)
    }

    pub fn get(&self, col: i64, row: i64) -> Slot<'_> {
        match self.index(col, row) {
            None => Slot::OutOfRange,
            Some(i) => match &self.cells[i] {
                Some(p) => Slot::Occupied(p),
                None    => Slot::Empty,
            },
        }
    }

    /// In range and empty.
    pub fn is_free(&self, col: i64, row: i64) -> bool {
        matches!(self.get(col, row), Slot::Empty)
    }

    pub fn is_occupied(&self, col: i64, row: i64) -> bool {
        matches!(self.get(col, row), Slot::Occupied(_))
    }

    /// Store `occupant` at `(col, row)` and return the previous occupant.
    ///
    /// A stored particle is stamped as settled at this cell.  Out of range,
    /// nothing is stored and `occupant` is handed back unchanged.
    pub fn set(&mut self, col: i64, row: i64, occupant: Option<Particle>) -> Option<Particle> {
        let Some(i) = self.index(col, row) else {
            return occupant;
        };
        let occupant = occupant.map(|mut p| {
            p.motion = Motion::Settled { col: col as usize, row: row as usize };
            p
        });
        if occupant.is_some() { self.occupied += 1; }
        let previous = std::mem::replace(&mut self.cells[i], occupant);
        if previous.is_some() { self.occupied -= 1; }
        previous
    }

    /// Remove and return the occupant of `(col, row)`.
    pub fn take(&mut self, col: i64, row: i64) -> Option<Particle> {
        let i = self.index(col, row)?;
        self.take_index(i)
    }

    /// Remove the occupant at a flat row-major index.
    pub fn take_index(&mut self, index: usize) -> Option<Particle> {
        let taken = self.cells.get_mut(index)?.take();
        if taken.is_some() { self.occupied -= 1; }
        taken
    }

    /// Move the occupant of `from` into the empty cell `to`.
    /// Returns false (and changes nothing) unless `from` is occupied and
    /// `to` is free.
    pub fn shift(&mut self, from: (i64, i64), to: (i64, i64)) -> bool {
        if !self.is_occupied(from.0, from.1) || !self.is_free(to.0, to.1) {
            return false;
        }
        let moved = self.take(from.0, from.1);
        self.set(to.0, to.1, moved);
        true
    }

    /// Row index of the topmost occupant in `col`; `rows` when the column
    /// is empty or out of range.
    pub fn column_top_row(&self, col: i64) -> usize {
        if col < 0 || col >= self.cols as i64 {
            return self.rows;
        }
        (0..self.rows)
            .find(|&r| self.is_occupied(col, r as i64))
            .unwrap_or(self.rows)
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
        self.occupied = 0;
    }

    /// Every settled particle in row-major order.
    pub fn iter_settled(&self) -> impl Iterator<Item = &Particle> {
        self.cells.iter().flatten()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn grain() -> Particle {
        Particle::airborne('#', Vec2::ZERO, Vec2::ZERO)
    }

    #[test]
    fn canvas_dimensions_round_up() {
        let g = CellGrid::for_canvas(645, 480, 10.0);
        assert_eq!(g.cols(), 65);
        assert_eq!(g.rows(), 48);
        assert_eq!(g.len(), 65 * 48);
    }

    #[test]
    fn out_of_range_is_not_empty() {
        let g = CellGrid::new(4, 4);
        assert_eq!(g.get(-1, 0), Slot::OutOfRange);
        assert_eq!(g.get(0, 4), Slot::OutOfRange);
        assert_eq!(g.get(0, 0), Slot::Empty);
        assert!(!g.is_free(4, 0));
    }

    #[test]
    fn set_stamps_cell_and_counts() {
        let mut g = CellGrid::new(4, 4);
        assert!(g.set(2, 3, Some(grain())).is_none());
        assert_eq!(g.occupied(), 1);
        match g.get(2, 3) {
            Slot::Occupied(p) => assert_eq!(p.cell(), Some((2, 3))),
            other => panic!("expected occupant, got {:?}", other),
        }
        // Replacing keeps the count at one.
        assert!(g.set(2, 3, Some(grain())).is_some());
        assert_eq!(g.occupied(), 1);
        assert!(g.set(2, 3, None).is_some());
        assert_eq!(g.occupied(), 0);
    }

    #[test]
    fn set_out_of_range_hands_back() {
        let mut g = CellGrid::new(2, 2);
        let back = g.set(5, 5, Some(grain()));
        assert!(back.is_some());
        assert_eq!(g.occupied(), 0);
    }

    #[test]
    fn column_top_row_finds_highest() {
        let mut g = CellGrid::new(3, 6);
        assert_eq!(g.column_top_row(1), 6);
        g.set(1, 5, Some(grain()));
        g.set(1, 3, Some(grain()));
        assert_eq!(g.column_top_row(1), 3);
        assert_eq!(g.column_top_row(-1), 6);
        assert_eq!(g.column_top_row(3), 6);
    }

    #[test]
    fn shift_requires_free_target() {
        let mut g = CellGrid::new(3, 3);
        g.set(0, 0, Some(grain()));
        g.set(0, 1, Some(grain()));
        assert!(!g.shift((0, 0), (0, 1)));
        assert!(g.shift((0, 1), (1, 2)));
        assert!(g.is_free(0, 1));
        match g.get(1, 2) {
            Slot::Occupied(p) => assert_eq!(p.cell(), Some((1, 2))),
            other => panic!("expected occupant, got {:?}", other),
        }
        assert_eq!(g.occupied(), 2);
    }

    #[test]
    fn clear_empties_everything() {
        let mut g = CellGrid::new(3, 3);
        g.set(1, 1, Some(grain()));
        g.clear();
        assert_eq!(g.occupied(), 0);
        assert_eq!(g.iter_settled().count(), 0);
    }
}
