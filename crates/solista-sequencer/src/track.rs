//! A loaded track and its destination binding.

use solista_core::{EventTarget, InstrumentHandle};
use solista_midi::MidiScore;
use std::sync::Arc;
use tracing::debug;

/// A named, loaded score bound (once per instrument rebind) to the
/// instrument that should play it.
///
/// The event data is read-only after load; only the destination binding
/// changes, exactly once per rebind.
#[derive(Debug, Clone)]
pub struct Track {
    name: String,
    score: Arc<MidiScore>,
    destination: Option<EventTarget>,
}

impl Track {
    pub fn new(name: impl Into<String>, score: MidiScore) -> Self {
        Self {
            name: name.into(),
            score: Arc::new(score),
            destination: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> &MidiScore {
        &self.score
    }

    pub(crate) fn score_arc(&self) -> Arc<MidiScore> {
        Arc::clone(&self.score)
    }

    /// Route this track's events to the given instrument.
    ///
    /// Only a weak target is kept: once the instrument is unbound from the
    /// slot, deliveries stop on their own.
    pub fn bind_destination(&mut self, handle: &InstrumentHandle) {
        debug!(
            track = %self.name,
            instrument = %handle.id(),
            name = handle.display_name(),
            "track destination bound"
        );
        self.destination = Some(handle.target());
    }

    pub fn destination(&self) -> Option<&EventTarget> {
        self.destination.as_ref()
    }

    pub fn has_destination(&self) -> bool {
        self.destination.is_some()
    }
}
