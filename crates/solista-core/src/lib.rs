//! Audio graph runtime kernel.
//!
//! # Primary API
//!
//! - [`AudioGraph`]: nodes, connections, Stopped/Prepared/Running lifecycle
//! - [`InstrumentSlot`]: the single active-instrument binding and swap
//! - [`InstrumentHandle`] / [`MusicDevice`]: live instrument instances
//! - [`AudioBackend`]: hardware output collaborator ([`NullBackend`] for
//!   headless use)
//!
//! Structural mutation (attach/detach/connect/disconnect, rebind) is meant
//! to be serialized under one lock owned by the caller; snapshot-style
//! reads ([`EngineStateHandle`], event channels) never need it.

pub mod backend;
pub mod device;
pub mod error;
pub mod events;
pub mod format;
pub mod graph;
pub mod slot;
pub mod state;

pub use backend::{AudioBackend, NullBackend};
pub use device::{EventTarget, InstrumentHandle, InstrumentId, MusicDevice, SharedDevice};
pub use error::{Error, Result};
pub use events::Broadcast;
pub use format::StreamFormat;
pub use graph::{AudioGraph, Connection, NodeId, NodeKind};
pub use slot::{InstrumentSlot, ENGINE_CONTEXT};
pub use state::{EngineState, EngineStateHandle};

/// Re-export of the MIDI type layer for downstream crates.
pub use solista_midi as midi;
