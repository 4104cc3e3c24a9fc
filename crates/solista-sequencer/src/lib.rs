//! Track loading and timed MIDI playback.
//!
//! [`Sequencer`] replays a loaded [`Track`] against the instrument bound
//! into the engine's slot, on a dedicated worker thread. Resources are
//! resolved through the [`ResourceResolver`] collaborator.

pub mod bundle;
mod clock;
pub mod error;
pub mod sequencer;
pub mod track;

pub use bundle::{DirResolver, ResourceResolver};
pub use clock::BeatClock;
pub use error::{Error, Result};
pub use sequencer::Sequencer;
pub use track::Track;
