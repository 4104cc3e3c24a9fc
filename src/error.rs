//! Error type for the umbrella crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] solista_core::Error),

    #[error(transparent)]
    Directory(#[from] solista_plugin::DirectoryError),

    #[error(transparent)]
    Instantiate(#[from] solista_plugin::InstantiateError),

    #[error(transparent)]
    Sequencer(#[from] solista_sequencer::Error),

    #[error("not ready: {0}")]
    NotReady(&'static str),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
