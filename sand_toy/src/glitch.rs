//! Glitch overlay: dead pixels, tearing and colour split driven by the
//! alert level.
//!
//! The overlay only decides *what* to draw each frame; the visualizer
//! applies it to the framebuffer.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Opacity a fading dead pixel loses per frame.
const FADE_STEP: f32 = 0.033;
/// Smoothing kept from the previous intensity.
const SMOOTHING: f32 = 0.9;

/// A black square burned into the overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeadPixel {
    pub x:         f32,
    pub y:         f32,
    pub size:      f32,
    pub opacity:   f32,
    pub permanent: bool,
}

/// A band of the image displaced along its length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tear {
    /// Horizontal bands shift sideways; vertical ones shift up or down.
    pub horizontal: bool,
    /// Start of the band across its thickness, in pixels.
    pub at:         f32,
    pub thickness:  f32,
    pub shift:      f32,
    /// Draw a green scanline along a horizontal tear.
    pub scanline:   bool,
}

/// Effects chosen for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlitchEffects {
    pub tears:     Vec<Tear>,
    /// Channel offset in pixels, when the colour split is on.
    pub rgb_split: Option<f32>,
    /// Mirror (x, y) when a flip fires.
    pub flip:      Option<(bool, bool)>,
}

impl GlitchEffects {
    pub fn is_empty(&self) -> bool {
        self.tears.is_empty() && self.rgb_split.is_none() && self.flip.is_none()
    }
}

pub struct GlitchOverlay {
    width:     f32,
    height:    f32,
    intensity: f32,
    pixels:    Vec<DeadPixel>,
    rng:       StdRng,
}

impl GlitchOverlay {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_rng(width, height, StdRng::from_entropy())
    }

    pub fn with_seed(width: u32, height: u32, seed: u64) -> Self {
        Self::with_rng(width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(width: u32, height: u32, rng: StdRng) -> Self {
        GlitchOverlay { width: width as f32, height: height as f32, intensity: 0.0, pixels: Vec::new(), rng }
    }

    pub fn intensity(&self) -> f32 { self.intensity }
    pub fn pixels(&self) -> &[DeadPixel] { &self.pixels }

    /// Ease toward `target` so the overlay never jumps.
    pub fn set_target(&mut self, target: f32) {
        self.intensity = self.intensity * SMOOTHING + target.clamp(0.0, 1.0) * (1.0 - SMOOTHING);
    }

    /// Age dead pixels and spawn new ones.
    ///
    /// Above 0.1 intensity, `floor(i * 5)` spawn attempts are made, each
    /// succeeding half the time; 2% of new pixels never fade.
    pub fn update(&mut self) {
        for p in &mut self.pixels {
            if !p.permanent {
                p.opacity -= FADE_STEP;
            }
        }
        self.pixels.retain(|p| p.permanent || p.opacity > 0.0);

        if self.intensity > 0.1 {
            let attempts = (self.intensity * 5.0).floor() as usize;
            for _ in 0..attempts {
                if self.rng.gen_bool(0.5) {
                    continue;
                }
                let permanent = self.rng.gen_bool(0.02);
                let size = self.rng.gen::<f32>() * 30.0 + 5.0;
                let x = self.rng.gen::<f32>() * self.width;
                let y = self.rng.gen::<f32>() * self.height;
                self.pixels.push(DeadPixel { x, y, size, opacity: 1.0, permanent });
            }
        }
    }

    /// Drop every dead pixel, permanent ones included.
    pub fn reset(&mut self) {
        self.pixels.clear();
    }

    /// Nothing to draw: faint and no dead pixels left.
    pub fn is_idle(&self) -> bool {
        self.intensity < 0.05 && self.pixels.is_empty()
    }

    /// Pick this frame's distortions.
    pub fn effects(&mut self) -> GlitchEffects {
        let mut fx = GlitchEffects::default();
        if self.is_idle() {
            return fx;
        }
        let i = self.intensity;

        if i > 0.8 && self.rng.gen_bool(0.05) {
            fx.flip = Some((self.rng.gen_bool(0.5), self.rng.gen_bool(0.5)));
        }
        if i > 0.3 {
            fx.rgb_split = Some(i * 25.0);
        }
        if i > 0.2 {
            let count = (i * 25.0).floor() as usize;
            for _ in 0..count {
                let horizontal = self.rng.gen_bool(0.5);
                let span = if horizontal { self.height } else { self.width };
                fx.tears.push(Tear {
                    horizontal,
                    at:        self.rng.gen::<f32>() * span,
                    thickness: self.rng.gen::<f32>() * 50.0 + 5.0,
                    shift:     (self.rng.gen::<f32>() - 0.5) * 120.0 * i,
                    scanline:  horizontal && self.rng.gen_bool(0.2),
                });
            }
        }
        fx
    }
}
