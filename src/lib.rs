//! # Solista - Instrument Audition Engine
//!
//! Pick an instrument plugin from the host's directory, swap it into a
//! live audio graph, and play a MIDI track through it.
//!
//! ## Architecture
//!
//! Solista is an umbrella crate that coordinates:
//! - **solista-core** - Audio graph runtime (nodes, connections, lifecycle,
//!   instrument slot)
//! - **solista-plugin** - Instrument discovery and async instantiation
//! - **solista-sequencer** - Track loading and timed event playback
//! - **solista-midi** - MIDI event types and SMF parsing
//!
//! ## Quick Start
//!
//! ```ignore
//! use solista::prelude::*;
//!
//! let controller = PlaybackController::builder()
//!     .host(platform_host)          // the platform's component services
//!     .resource_dir("assets")       // where track files live
//!     .build()?;
//!
//! controller.refresh_instruments();
//!
//! // UI row tap:
//! controller.select_instrument(&controller.instruments()[0]);
//!
//! // Once the event channel reports PlayEnabled(true):
//! controller.play()?;
//! ```
//!
//! Selection is last-writer-wins: picking another instrument while one is
//! still instantiating discards the stale result instead of binding it
//! late.

/// Re-export of solista-core for direct access
pub use solista_core as core;

pub use solista_core::{
    AudioBackend, AudioGraph, Broadcast, Connection, EngineState, EngineStateHandle, EventTarget,
    InstrumentHandle, InstrumentId, InstrumentSlot, MusicDevice, NodeId, NodeKind, NullBackend,
    StreamFormat,
};

/// MIDI types and SMF parsing
pub use solista_midi as midi;

pub use solista_midi::{ChannelEvent, MidiEvent, MidiScore, TimedEvent};

/// Instrument discovery and instantiation
pub use solista_plugin as plugin;

pub use solista_plugin::{
    ComponentFilter, ComponentKind, DirectoryEvent, Icon, InstrumentDescriptor,
    InstrumentDirectory, InstrumentFactory, PluginHost,
};

/// Track loading and playback
pub use solista_sequencer as sequencer;

pub use solista_sequencer::{DirResolver, ResourceResolver, Sequencer, Track};

mod builder;
mod controller;
mod error;
mod events;

pub use builder::{PlaybackControllerBuilder, DEFAULT_TRACK};
pub use controller::{ControllerState, PlaybackController, RebindOutcome};
pub use error::{Error, Result};
pub use events::ControllerEvent;

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{
        ComponentFilter, ControllerEvent, ControllerState, InstrumentDescriptor,
        PlaybackController, PlaybackControllerBuilder, PluginHost, RebindOutcome,
    };

    pub use crate::core::{AudioBackend, InstrumentHandle, MusicDevice, NullBackend};

    pub use crate::sequencer::{DirResolver, ResourceResolver};
}
