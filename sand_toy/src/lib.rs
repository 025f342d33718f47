//! # sand_toy
//!
//! Gesture-steered digital sand: glyph particles rain down the window,
//! pile up and can be pushed, thrown, purged and wiped with hand gestures.
//! Head tilt steers gravity; holding still too long, or overfilling the
//! screen, corrupts the picture.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Hand | Action |
//! |---|---|---|
//! | Head tilt | face | Gravity bias: piles slide toward the lower eye |
//! | Still gaze | face | After ~4 s the glitch overlay ramps up |
//! | Pinch (thumb on index) | either | Spawn a burst at the index tip |
//! | Open palm (5 fingers) | either | Repulsor at the palm centre |
//! | Fist | user's left | Purge up to 1000 particles, then cool down |
//! | Two + three fingers | both | Reset the world |
//!
//! ## Keyboard simulation
//!
//! The window stands in for the camera: the pointer is the hand, held keys
//! shape it.
//!
//! | Key | Gesture |
//! |---|---|
//! | `P` / left mouse | Pinch |
//! | `O` | Open palm |
//! | `F` | Fist |
//! | `R` | Two-hand reset |
//! | `←` / `→` | Tilt head |
//! | `H` | Look away (no face) |
//! | `M` | Toggle the bassline |
//! | `Q` / `Escape` | Quit |

pub mod settings;
pub mod control;
pub mod source;
pub mod glitch;
pub mod player;
pub mod visualizer;
pub mod app;
