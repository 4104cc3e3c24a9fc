//! Error types for the MIDI layer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("MIDI parse error: {0}")]
    Parse(String),

    #[error("Unsupported MIDI timing format")]
    UnsupportedTiming,
}

impl From<midly::Error> for Error {
    fn from(e: midly::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
