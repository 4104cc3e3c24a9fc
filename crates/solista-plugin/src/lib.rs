//! Instrument plugin discovery and asynchronous instantiation.
//!
//! The host platform's component services sit behind the [`PluginHost`]
//! collaborator trait; this crate adds the cached [`InstrumentDirectory`]
//! and the time-bounded [`InstrumentFactory`] on top of it.

pub mod descriptor;
pub mod directory;
pub mod error;
pub mod factory;
pub mod host;

pub use descriptor::{ComponentFilter, ComponentKind, InstrumentDescriptor};
pub use directory::{DirectoryEvent, InstrumentDirectory};
pub use error::{DirectoryError, InstantiateError, InstantiateStage};
pub use factory::{InstrumentFactory, DEFAULT_INSTANTIATE_TIMEOUT};
pub use host::{Icon, PluginHost};
