//! Error types for the sequencer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("track resource '{0}' not found")]
    NotFound(String),

    #[error("track parse error: {0}")]
    Parse(String),

    #[error("unsupported MIDI timing format")]
    UnsupportedTiming,

    #[error("not ready: {0}")]
    NotReady(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<solista_midi::Error> for Error {
    fn from(e: solista_midi::Error) -> Self {
        match e {
            solista_midi::Error::Io(io) => Error::Io(io),
            solista_midi::Error::Parse(msg) => Error::Parse(msg),
            solista_midi::Error::UnsupportedTiming => Error::UnsupportedTiming,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
