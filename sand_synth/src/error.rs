use thiserror::Error;

#[derive(Error, Debug)]
pub enum SynthError {
    #[error("sequencer config error: {0}")]
    Config(String),

    #[error("writing MIDI file: {0}")]
    Io(#[from] std::io::Error),
}

pub type SynthResult<T> = Result<T, SynthError>;
