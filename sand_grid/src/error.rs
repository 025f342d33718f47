//! Error type for the sand engine.
//!
//! Simulation steps never fail; only construction-time inputs
//! (configuration, canvas size) are validated.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SandError {
    /// A physics parameter is out of its usable range.
    #[error("physics config error: {0}")]
    Config(String),

    /// The canvas is too small to hold a single cell.
    #[error("canvas {width}x{height} holds no cells at edge {cell_edge}")]
    EmptyCanvas { width: u32, height: u32, cell_edge: f32 },
}

pub type SandResult<T> = Result<T, SandError>;
