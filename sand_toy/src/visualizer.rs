//! Software-rendered visualizer using `minifb`.
//!
//! Layers, bottom to top:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ PARTICLES: 1234   ← HUD                      │
//! │ GRAVITY: -0.45                               │
//! │              airborne glyphs  0 1 X          │
//! │        ╭─╮ hand skeleton, rings              │
//! │        ╰─╯                                   │
//! │  ▒▓█ settled pile, coloured by height █▓▒░   │
//! │ key legend                                   │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Glitch distortions are applied to the glyph layer before the hands,
//! rings and HUD are drawn over it.

use std::f32::consts::TAU;
use std::sync::mpsc::Sender;

use anyhow::Context;
use glam::Vec2;
use hand_signals::{HandObservation, HAND_CONNECTIONS};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use sand_grid::{Particle, SandWorld};

use crate::control::{AlertLevel, FrameControl};
use crate::glitch::{DeadPixel, GlitchEffects};
use crate::source::{SimInput, SimKey};

// ════════════════════════════════════════════════════════════════════════════
// Palette
// ════════════════════════════════════════════════════════════════════════════

const BG_COLOR:     u32 = 0xFF050A08;
const SCANLINE:     u32 = 0xFF0A140F;
const BONE_COLOR:   u32 = 0xFF00FFCC;
const JOINT_COLOR:  u32 = 0xFFFFFFFF;
const PURGE_COLOR:  u32 = 0xFFFF0000;
const RING_COLOR:   u32 = 0xFFFFFFFF;
const HUD_COLOR:    u32 = 0xFF00FF66;
const ALERT_COLOR:  u32 = 0xFFFF3030;
const LEGEND_COLOR: u32 = 0xFF668877;
const TEAR_GREEN:   u32 = 0xFF00FF00;

const PURGE_RADIUS:    f32 = 100.0;
const REPULSOR_RADIUS: f32 = 80.0;
const HUD_SCALE:       usize = 2;

// ════════════════════════════════════════════════════════════════════════════
// Scene: one frame's worth of things to draw
// ════════════════════════════════════════════════════════════════════════════

/// HUD readout.
#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    pub count:    usize,
    pub gravity:  f32,
    pub alert:    AlertLevel,
    pub overload: usize,
    pub music:    &'static str,
}

impl Hud {
    /// Lines shown top-left; the alert line is added only when raised.
    pub fn lines(&self) -> Vec<String> {
        let mut out = vec![
            format!("PARTICLES: {}", self.count),
            format!("GRAVITY: {:.2}", self.gravity),
            format!("MUSIC: {}", self.music),
        ];
        match self.alert {
            AlertLevel::Calm     => {}
            AlertLevel::Gaze(_)  => out.push(self.alert.caption().to_string()),
            AlertLevel::Overload => out.push(format!("{}: >{}", self.alert.caption(), self.overload)),
        }
        out
    }
}

pub struct Scene<'a> {
    pub world:       &'a SandWorld,
    pub hands:       &'a [HandObservation],
    pub control:     &'a FrameControl,
    pub dead_pixels: &'a [DeadPixel],
    pub effects:     &'a GlitchEffects,
    /// White-out strength after a reset, `0.0..=1.0`.
    pub flash:       f32,
    pub hud:         &'a Hud,
}

/// Non-gesture window commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiEvent {
    ToggleMusic,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// Framebuffer
// ════════════════════════════════════════════════════════════════════════════

/// ARGB pixel buffer with the drawing primitives.
pub struct Framebuffer {
    width:  usize,
    height: usize,
    buf:    Vec<u32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Framebuffer { width, height, buf: vec![BG_COLOR; width * height] }
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn pixels(&self) -> &[u32] { &self.buf }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    fn clear(&mut self) {
        for (row, line) in self.buf.chunks_mut(self.width.max(1)).enumerate() {
            line.fill(if row % 4 == 0 { SCANLINE } else { BG_COLOR });
        }
    }

    fn set_pixel(&mut self, x: i64, y: i64, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    fn blend_pixel(&mut self, x: i64, y: i64, color: u32, t: f32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            let i = y as usize * self.width + x as usize;
            self.buf[i] = blend(self.buf[i], color, t);
        }
    }

    fn fill_rect(&mut self, x: i64, y: i64, w: usize, h: usize, color: u32) {
        for row in y..y + h as i64 {
            for col in x..x + w as i64 {
                self.set_pixel(col, row, color);
            }
        }
    }

    fn line(&mut self, a: Vec2, b: Vec2, color: u32) {
        let (mut x0, mut y0) = (a.x.round() as i64, a.y.round() as i64);
        let (x1, y1) = (b.x.round() as i64, b.y.round() as i64);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_pixel(x0, y0, color);
            if x0 == x1 && y0 == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x0 += sx; }
            if e2 <= dx { err += dx; y0 += sy; }
        }
    }

    /// Circle outline; `dashed` draws 4 px on, 4 px off.
    fn ring(&mut self, c: Vec2, r: f32, color: u32, t: f32, dashed: bool) {
        let steps = (TAU * r).ceil().max(8.0) as usize;
        for k in 0..steps {
            if dashed && (k / 4) % 2 == 1 { continue; }
            let a = k as f32 / steps as f32 * TAU;
            let p = c + Vec2::new(a.cos(), a.sin()) * r;
            self.blend_pixel(p.x.round() as i64, p.y.round() as i64, color, t);
        }
    }

    fn disk(&mut self, c: Vec2, r: f32, color: u32, t: f32) {
        let ri = r.ceil() as i64;
        let (cx, cy) = (c.x.round() as i64, c.y.round() as i64);
        for dy in -ri..=ri {
            for dx in -ri..=ri {
                if ((dx * dx + dy * dy) as f32) <= r * r {
                    self.blend_pixel(cx + dx, cy + dy, color, t);
                }
            }
        }
    }

    fn text(&mut self, text: &str, x: i64, y: i64, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            self.font_char(ch, cx, y, scale, color);
            cx += 4 * scale as i64;
            if cx >= self.width as i64 { break; }
        }
    }

    fn font_char(&mut self, ch: char, x: i64, y: i64, scale: usize, color: u32) {
        for (row, &bits) in char_glyph(ch).iter().enumerate() {
            for col in 0..3usize {
                if bits & (1 << (2 - col)) != 0 {
                    let px = x + (col * scale) as i64;
                    let py = y + (row * scale) as i64;
                    self.fill_rect(px, py, scale, scale, color);
                }
            }
        }
    }

    /// One particle glyph filling a cell of `edge` pixels.
    fn glyph(&mut self, ch: char, x: i64, y: i64, edge: usize, color: u32) {
        if block_shade(ch, 0, 0).is_some() {
            for py in 0..edge {
                for px in 0..edge {
                    if block_shade(ch, px, py) == Some(true) {
                        self.set_pixel(x + px as i64, y + py as i64, color);
                    }
                }
            }
        } else {
            let scale = (edge / 5).max(1);
            let pad = edge.saturating_sub(3 * scale) / 2;
            self.font_char(ch, x + pad as i64, y, scale, color);
        }
    }

    // ── glitch distortions ────────────────────────────────────────────────

    fn apply_effects(&mut self, fx: &GlitchEffects) {
        if let Some((fx_x, fx_y)) = fx.flip {
            self.flip(fx_x, fx_y);
        }
        if let Some(offset) = fx.rgb_split {
            self.rgb_split(offset.round() as usize);
        }
        for tear in &fx.tears {
            let at = tear.at.max(0.0) as usize;
            let thick = tear.thickness.max(1.0) as usize;
            let shift = tear.shift.round() as i64;
            if tear.horizontal {
                for y in at..(at + thick).min(self.height) {
                    self.shift_row(y, shift);
                }
                if tear.scanline {
                    for y in at..(at + 2).min(self.height) {
                        for x in 0..self.width {
                            self.blend_pixel(x as i64, y as i64, TEAR_GREEN, 0.6);
                        }
                    }
                }
            } else {
                for x in at..(at + thick).min(self.width) {
                    self.shift_column(x, shift);
                }
            }
        }
    }

    fn flip(&mut self, flip_x: bool, flip_y: bool) {
        if flip_x {
            for line in self.buf.chunks_mut(self.width.max(1)) {
                line.reverse();
            }
        }
        if flip_y {
            let w = self.width;
            for y in 0..self.height / 2 {
                let (top, bottom) = self.buf.split_at_mut((self.height - 1 - y) * w);
                top[y * w..(y + 1) * w].swap_with_slice(&mut bottom[..w]);
            }
        }
    }

    /// Screen-like channel split: red borrowed from the left, blue from above.
    fn rgb_split(&mut self, offset: usize) {
        if offset == 0 { return; }
        let src = self.buf.clone();
        for y in 0..self.height {
            for x in 0..self.width {
                let i = y * self.width + x;
                let red  = if x >= offset { src[i - offset] & 0x00FF0000 } else { 0 };
                let blue = if y >= offset { src[i - offset * self.width] & 0x000000FF } else { 0 };
                let cur = src[i];
                let r = (cur & 0x00FF0000).max(red);
                let b = (cur & 0x000000FF).max(blue);
                self.buf[i] = 0xFF000000 | r | (cur & 0x0000FF00) | b;
            }
        }
    }

    fn shift_row(&mut self, y: usize, shift: i64) {
        let start = y * self.width;
        let row: Vec<u32> = self.buf[start..start + self.width].to_vec();
        for (x, &px) in row.iter().enumerate() {
            self.set_pixel(x as i64 + shift, y as i64, px);
        }
    }

    fn shift_column(&mut self, x: usize, shift: i64) {
        let col: Vec<u32> = (0..self.height).map(|y| self.buf[y * self.width + x]).collect();
        for (y, &px) in col.iter().enumerate() {
            self.set_pixel(x as i64, y as i64 + shift, px);
        }
    }

    fn whiteout(&mut self, t: f32) {
        for px in &mut self.buf {
            *px = blend(*px, 0xFFFFFFFF, t);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// paint: draw a Scene into a Framebuffer
// ════════════════════════════════════════════════════════════════════════════

pub fn paint(fb: &mut Framebuffer, scene: &Scene) {
    fb.clear();

    // ── Particles ─────────────────────────────────────────────────────────
    let edge_f = scene.world.config().cell_edge;
    let edge = edge_f.max(1.0) as usize;
    let draw = |fb: &mut Framebuffer, p: &Particle| {
        let pos = p.position(edge_f);
        fb.glyph(p.glyph, pos.x.floor() as i64, pos.y.floor() as i64, edge, p.band.argb());
    };
    for p in scene.world.grid().iter_settled() {
        draw(fb, p);
    }
    for p in scene.world.airborne().iter() {
        draw(fb, p);
    }

    // ── Glitch ────────────────────────────────────────────────────────────
    fb.apply_effects(scene.effects);
    for d in scene.dead_pixels {
        let size = d.size as usize;
        for py in 0..size {
            for px in 0..size {
                fb.blend_pixel(d.x as i64 + px as i64, d.y as i64 + py as i64, 0xFF000000, d.opacity.clamp(0.0, 1.0));
            }
        }
    }

    // ── Hands ─────────────────────────────────────────────────────────────
    let canvas = Vec2::new(fb.width as f32, fb.height as f32);
    for hand in scene.hands {
        let marks = &hand.landmarks;
        for &(a, b) in HAND_CONNECTIONS.iter() {
            if let (Some(pa), Some(pb)) = (marks.get(a), marks.get(b)) {
                fb.line(pa * canvas, pb * canvas, BONE_COLOR);
            }
        }
        for (_, p) in marks.iter() {
            let p = p * canvas;
            fb.fill_rect(p.x as i64 - 1, p.y as i64 - 1, 3, 3, JOINT_COLOR);
        }
    }

    // ── Gesture feedback ──────────────────────────────────────────────────
    if let Some(purge) = scene.control.purge {
        fb.disk(purge.at, PURGE_RADIUS, PURGE_COLOR, 0.5);
    }
    for r in &scene.control.repulsors {
        fb.ring(r.at, REPULSOR_RADIUS, RING_COLOR, 0.5, true);
    }

    if scene.flash > 0.0 {
        fb.whiteout(scene.flash.min(1.0));
    }

    // ── HUD ───────────────────────────────────────────────────────────────
    let line_h = (6 * HUD_SCALE) as i64;
    for (i, line) in scene.hud.lines().iter().enumerate() {
        let color = if i >= 3 { ALERT_COLOR } else { HUD_COLOR };
        fb.text(line, 8, 8 + i as i64 * line_h, HUD_SCALE, color);
    }
    fb.text(
        "F=FIST  O=PALM  P/CLICK=PINCH  R=RESET  ARROWS=TILT  H=LOOK AWAY  M=MUSIC  Q=QUIT",
        8, fb.height as i64 - 10, 1, LEGEND_COLOR,
    );
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

/// Gesture keys and the simulated gesture each holds.
const HOLD_KEYS: [(Key, SimKey); 7] = [
    (Key::F,     SimKey::Fist),
    (Key::O,     SimKey::OpenPalm),
    (Key::P,     SimKey::Pinch),
    (Key::R,     SimKey::Reset),
    (Key::Left,  SimKey::TiltLeft),
    (Key::Right, SimKey::TiltRight),
    (Key::H,     SimKey::LookAway),
];

pub struct Visualizer {
    window:     Window,
    fb:         Framebuffer,
    sim_tx:     Sender<SimInput>,
    mouse_down: bool,
}

impl Visualizer {
    pub fn new(width: u32, height: u32, sim_tx: Sender<SimInput>) -> anyhow::Result<Self> {
        let (w, h) = (width as usize, height as usize);
        let mut window = Window::new(
            "Sand Toy - gesture-steered digital sand",
            w, h,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).context("opening visualizer window")?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer { window, fb: Framebuffer::new(w, h), sim_tx, mouse_down: false })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Forward pointer and gesture keys to the simulated source; return the
    /// window commands pressed this frame.
    pub fn poll_input(&mut self) -> Vec<UiEvent> {
        let mut events = Vec::new();
        if !self.window.is_open() {
            events.push(UiEvent::Quit);
            return events;
        }

        if self.window.is_key_pressed(Key::Q, KeyRepeat::No)
            || self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
        {
            events.push(UiEvent::Quit);
        }
        if self.window.is_key_pressed(Key::M, KeyRepeat::No) {
            events.push(UiEvent::ToggleMusic);
        }

        if let Some((x, y)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            let _ = self.sim_tx.send(SimInput::Pointer {
                x: x / self.fb.width.max(1) as f32,
                y: y / self.fb.height.max(1) as f32,
            });
        }

        for (key, sim) in HOLD_KEYS {
            if self.window.is_key_pressed(key, KeyRepeat::No) {
                let _ = self.sim_tx.send(SimInput::KeyDown(sim));
            }
            if self.window.is_key_released(key) {
                let _ = self.sim_tx.send(SimInput::KeyUp(sim));
            }
        }

        let down = self.window.get_mouse_down(MouseButton::Left);
        if down != self.mouse_down {
            self.mouse_down = down;
            let input = if down { SimInput::KeyDown(SimKey::Pinch) } else { SimInput::KeyUp(SimKey::Pinch) };
            let _ = self.sim_tx.send(input);
        }

        events
    }

    /// Render one frame.
    pub fn render(&mut self, scene: &Scene) {
        paint(&mut self.fb, scene);
        let (w, h) = (self.fb.width, self.fb.height);
        self.window.update_with_buffer(&self.fb.buf, w, h).ok();
    }
}

/// Dither for the block glyphs; `None` for anything drawn from the font.
fn block_shade(ch: char, px: usize, py: usize) -> Option<bool> {
    match ch {
        '█' => Some(true),
        '▓' => Some(px % 2 == 1 || py % 2 == 1),
        '▒' => Some((px + py) % 2 == 0),
        '░' => Some(px % 2 == 0 && py % 2 == 0),
        _   => None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t).round() as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::PurgeMark;
    use hand_signals::pose::HandPose;
    use hand_signals::HandLabel;
    use sand_grid::{ColorBand, PhysicsConfig, GLYPHS};

    fn hud() -> Hud {
        Hud { count: 0, gravity: 0.0, alert: AlertLevel::Calm, overload: 6000, music: "ONLINE" }
    }

    fn scene<'a>(
        world: &'a SandWorld,
        hands: &'a [HandObservation],
        control: &'a FrameControl,
        effects: &'a GlitchEffects,
        hud: &'a Hud,
        flash: f32,
    ) -> Scene<'a> {
        Scene { world, hands, control, dead_pixels: &[], effects, flash, hud }
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 0.0), 0xFF000000);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
        assert_eq!(blend(0xFF000000, 0xFF0000FF, 0.5), 0xFF000080);
    }

    #[test]
    fn every_particle_glyph_draws_something() {
        for &g in GLYPHS.iter() {
            let mut fb = Framebuffer::new(10, 10);
            fb.glyph(g, 0, 0, 10, 0xFFFFFFFF);
            assert!(fb.pixels().contains(&0xFFFFFFFF), "glyph {:?} is blank", g);
        }
    }

    #[test]
    fn settled_particle_lands_in_its_cell() {
        let mut world = SandWorld::with_seed(100, 100, PhysicsConfig::default(), 1).unwrap();
        world.spawn(Vec2::new(55.0, 95.0), Vec2::ZERO);
        world.step(&[]);
        let p = world.grid().iter_settled().next().unwrap();
        assert_eq!(p.cell(), Some((5, 9)));
        let color = p.band.argb();
        assert_eq!(p.band, ColorBand::Low);

        let mut fb = Framebuffer::new(100, 100);
        let control = FrameControl::default();
        let fx = GlitchEffects::default();
        let h = hud();
        paint(&mut fb, &scene(&world, &[], &control, &fx, &h, 0.0));
        let hits = (90..100).flat_map(|y| (50..60).map(move |x| (x, y)))
            .filter(|&(x, y)| fb.pixel(x, y) == Some(color))
            .count();
        assert!(hits > 0);
        assert!(!(0..50).any(|x| fb.pixel(x, 95) == Some(color)));
    }

    #[test]
    fn hand_skeleton_and_purge_ring_are_drawn() {
        let world = SandWorld::with_seed(200, 200, PhysicsConfig::default(), 1).unwrap();
        let hands = vec![HandPose::open(Vec2::splat(0.5)).observe(HandLabel::Right)];
        let control = FrameControl {
            purge: Some(PurgeMark { at: Vec2::new(190.0, 10.0), removed: 0 }),
            ..FrameControl::default()
        };
        let fx = GlitchEffects::default();
        let h = hud();
        let mut fb = Framebuffer::new(200, 200);
        paint(&mut fb, &scene(&world, &hands, &control, &fx, &h, 0.0));
        // Wrist joint at (100, 120).
        assert_eq!(fb.pixel(100, 120), Some(JOINT_COLOR));
        // Inside the purge disk the background turns red.
        let px = fb.pixel(190, 10).unwrap();
        assert!((px >> 16) & 0xFF > 0x70);
    }

    #[test]
    fn flash_whitens_the_frame() {
        let world = SandWorld::with_seed(50, 50, PhysicsConfig::default(), 1).unwrap();
        let control = FrameControl::default();
        let fx = GlitchEffects::default();
        let h = hud();
        let mut fb = Framebuffer::new(50, 50);
        paint(&mut fb, &scene(&world, &[], &control, &fx, &h, 1.0));
        assert_eq!(fb.pixel(25, 47), Some(0xFFFFFFFF));
    }

    #[test]
    fn flip_reverses_rows_and_columns() {
        let mut fb = Framebuffer::new(3, 2);
        fb.set_pixel(0, 0, 0xFF112233);
        fb.flip(true, false);
        assert_eq!(fb.pixel(2, 0), Some(0xFF112233));
        fb.flip(false, true);
        assert_eq!(fb.pixel(2, 1), Some(0xFF112233));
        assert_eq!(fb.pixel(2, 0), Some(BG_COLOR));
    }

    #[test]
    fn tear_shifts_a_row() {
        let mut fb = Framebuffer::new(10, 3);
        fb.set_pixel(2, 1, 0xFFABCDEF);
        fb.shift_row(1, 3);
        assert_eq!(fb.pixel(5, 1), Some(0xFFABCDEF));
    }

    #[test]
    fn hud_lines() {
        let mut h = hud();
        h.count = 42;
        h.gravity = -0.456;
        assert_eq!(h.lines(), vec!["PARTICLES: 42", "GRAVITY: -0.46", "MUSIC: ONLINE"]);
        h.alert = AlertLevel::Overload;
        assert_eq!(h.lines()[3], "CRITICAL OVERLOAD: >6000");
        h.alert = AlertLevel::Gaze(0.3);
        assert_eq!(h.lines()[3], "GAZE DETECTED");
    }
}
