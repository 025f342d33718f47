use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("gesture config error: {0}")]
    Config(String),

    /// More points supplied than the hand layout has slots.
    #[error("hand landmark set takes at most {max} points, got {got}")]
    TooManyPoints { max: usize, got: usize },
}

pub type SignalResult<T> = Result<T, SignalError>;
