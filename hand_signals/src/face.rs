//! Face classifiers: head tilt and sustained gaze.

use glam::Vec2;

use crate::config::GestureConfig;
use crate::landmark::FaceLandmarks;

/// Eye-corner vector (`b - a`), if both corners were detected.
fn eye_line(face: &FaceLandmarks, cfg: &GestureConfig) -> Option<Vec2> {
    let a = face.get(cfg.eye_corner_a)?;
    let b = face.get(cfg.eye_corner_b)?;
    Some(b - a)
}

/// Gravity bias from head roll: the eye-line angle times `tilt_gain`.
///
/// Tilting the head toward image-right gives a positive bias.  The result
/// is not clamped.
pub fn head_tilt_bias(face: &FaceLandmarks, cfg: &GestureConfig) -> Option<f32> {
    eye_line(face, cfg).map(|d| d.y.atan2(d.x) * cfg.tilt_gain)
}

/// Counts consecutive frames in which the head has held still.
///
/// "Still" compares the absolute eye-line span against the previous
/// observed frame.  A missing face resets the count.
#[derive(Debug, Clone)]
pub struct GazeTracker {
    cfg:       GestureConfig,
    last_span: Vec2,
    frames:    u32,
}

impl GazeTracker {
    pub fn new(cfg: GestureConfig) -> Self {
        GazeTracker { cfg, last_span: Vec2::ZERO, frames: 0 }
    }

    /// Feed one frame; returns the updated still-frame count.
    pub fn observe(&mut self, face: Option<&FaceLandmarks>) -> u32 {
        let Some(line) = face.and_then(|f| eye_line(f, &self.cfg)) else {
            self.frames = 0;
            return 0;
        };
        let span = line.abs();
        let delta = (span - self.last_span).abs();
        if delta.x + delta.y < self.cfg.gaze_stillness {
            self.frames = self.frames.saturating_add(1);
        } else {
            self.frames = 0;
        }
        self.last_span = span;
        self.frames
    }

    pub fn frames(&self) -> u32 { self.frames }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::face;

    fn cfg() -> GestureConfig { GestureConfig::default() }

    #[test]
    fn tilt_scales_angle() {
        let bias = head_tilt_bias(&face(Vec2::splat(0.5), 0.2), &cfg()).unwrap();
        assert!((bias - 0.5).abs() < 1e-4);
        let bias = head_tilt_bias(&face(Vec2::splat(0.5), -0.1), &cfg()).unwrap();
        assert!((bias + 0.25).abs() < 1e-4);
    }

    #[test]
    fn level_head_no_bias() {
        let bias = head_tilt_bias(&face(Vec2::splat(0.5), 0.0), &cfg()).unwrap();
        assert_eq!(bias, 0.0);
    }

    #[test]
    fn missing_corner_no_bias() {
        let half = FaceLandmarks::sparse(&[(33, Vec2::new(0.4, 0.5))]);
        assert_eq!(head_tilt_bias(&half, &cfg()), None);
    }

    #[test]
    fn still_head_accumulates() {
        let mut gaze = GazeTracker::new(cfg());
        let f = face(Vec2::splat(0.5), 0.05);
        // First frame compares against the zero span and starts over.
        assert_eq!(gaze.observe(Some(&f)), 0);
        for n in 1..=10 {
            assert_eq!(gaze.observe(Some(&f)), n);
        }
        assert_eq!(gaze.frames(), 10);
    }

    #[test]
    fn translation_alone_is_still() {
        let mut gaze = GazeTracker::new(cfg());
        gaze.observe(Some(&face(Vec2::splat(0.5), 0.0)));
        assert_eq!(gaze.observe(Some(&face(Vec2::new(0.3, 0.6), 0.0))), 1);
    }

    #[test]
    fn movement_or_absence_resets() {
        let mut gaze = GazeTracker::new(cfg());
        let f = face(Vec2::splat(0.5), 0.0);
        gaze.observe(Some(&f));
        gaze.observe(Some(&f));
        gaze.observe(Some(&f));
        assert_eq!(gaze.frames(), 2);
        assert_eq!(gaze.observe(Some(&face(Vec2::splat(0.5), 0.3))), 0);
        gaze.observe(Some(&f));
        assert_eq!(gaze.observe(None), 0);
    }
}
