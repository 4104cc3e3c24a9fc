//! MIDI event types and Standard MIDI File parsing.
//!
//! This crate is the pure-data layer of solista: channel-voice event types
//! used for playback delivery, and the [`MidiScore`] loader that turns a
//! Standard MIDI File into a flat, beat-timed event list.

pub mod error;
pub mod event;
pub mod file;

pub use error::{Error, Result};
pub use event::{ChannelEvent, MidiEvent, TimedEvent};
pub use file::MidiScore;
