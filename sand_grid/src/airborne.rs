//! The airborne particle set.
//!
//! Insertion order is age order: index 0 is the oldest particle, which is
//! what purges remove first.

use crate::particle::Particle;

#[derive(Debug, Default, Clone)]
pub struct AirborneSet {
    particles: Vec<Particle>,
}

impl AirborneSet {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, particle: Particle) { self.particles.push(particle); }

    pub fn len(&self) -> usize { self.particles.len() }
    pub fn is_empty(&self) -> bool { self.particles.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> { self.particles.iter() }

    pub fn clear(&mut self) { self.particles.clear(); }

    /// Keep only the particles matching `keep`.
    pub fn retain<F: FnMut(&Particle) -> bool>(&mut self, keep: F) {
        self.particles.retain(keep);
    }

    /// Drop up to `n` of the oldest particles; returns how many went.
    pub fn remove_oldest(&mut self, n: usize) -> usize {
        let n = n.min(self.particles.len());
        self.particles.drain(..n);
        n
    }

    /// Hand every particle to `step` exactly once, in age order.
    ///
    /// `step` returns the particle to keep it airborne, or `None` when it
    /// left the set (settled into the grid or expired).  Survivors keep
    /// their relative order.
    pub fn advance_each<F>(&mut self, mut step: F)
    where
        F: FnMut(Particle) -> Option<Particle>,
    {
        let current = std::mem::take(&mut self.particles);
        self.particles.reserve(current.len());
        for p in current {
            if let Some(p) = step(p) {
                self.particles.push(p);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn set_of(n: usize) -> AirborneSet {
        let mut s = AirborneSet::new();
        for i in 0..n {
            s.push(Particle::airborne('0', Vec2::new(i as f32, 0.0), Vec2::ZERO));
        }
        s
    }

    #[test]
    fn remove_oldest_takes_from_front() {
        let mut s = set_of(5);
        assert_eq!(s.remove_oldest(2), 2);
        let xs: Vec<f32> = s.iter().map(|p| p.position(10.0).x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn remove_oldest_caps_at_len() {
        let mut s = set_of(5);
        assert_eq!(s.remove_oldest(1000), 5);
        assert!(s.is_empty());
    }

    #[test]
    fn advance_each_visits_every_particle_once() {
        let mut s = set_of(6);
        let mut seen = Vec::new();
        s.advance_each(|p| {
            let x = p.position(10.0).x;
            seen.push(x);
            // Expire every odd one.
            if x as usize % 2 == 1 { None } else { Some(p) }
        });
        assert_eq!(seen, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let left: Vec<f32> = s.iter().map(|p| p.position(10.0).x).collect();
        assert_eq!(left, vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn retain_filters() {
        let mut s = set_of(4);
        s.retain(|p| p.position(10.0).x >= 2.0);
        assert_eq!(s.len(), 2);
    }
}
