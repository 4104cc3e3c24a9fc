//! Instrument instances and the music-device capability trait.

use parking_lot::Mutex;
use solista_midi::MidiEvent;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// A sound-generating unit selectable at runtime.
///
/// Implementations are driven from control threads only; nothing here runs
/// on a realtime render path.
pub trait MusicDevice: Send {
    /// Deliver one channel-voice event.
    fn handle_event(&mut self, event: MidiEvent);

    /// Silence all sounding notes. Called before the unit is torn down and
    /// when playback stops.
    fn all_notes_off(&mut self) {}

    /// Return the unit to its initial state.
    fn reset(&mut self) {}
}

/// Shared handle to a boxed device. The slot owns the strong reference;
/// event producers hold [`EventTarget`] weak references.
pub type SharedDevice = Arc<Mutex<Box<dyn MusicDevice>>>;

/// Process-unique identifier of a live instrument instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstrumentId(u64);

impl InstrumentId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instrument#{}", self.0)
    }
}

/// An instantiated, live instrument.
///
/// Created by the factory; ownership moves into the slot on bind and the
/// instance is dropped on unbind, rebind, or controller teardown.
pub struct InstrumentHandle {
    id: InstrumentId,
    display_name: String,
    unit: SharedDevice,
    context_name: Option<String>,
}

impl InstrumentHandle {
    pub fn new(display_name: impl Into<String>, device: Box<dyn MusicDevice>) -> Self {
        Self {
            id: InstrumentId::next(),
            display_name: display_name.into(),
            unit: Arc::new(Mutex::new(device)),
            context_name: None,
        }
    }

    pub fn id(&self) -> InstrumentId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Context tag of the owning engine, set when the instrument is bound.
    pub fn context_name(&self) -> Option<&str> {
        self.context_name.as_deref()
    }

    pub fn set_context_name(&mut self, name: impl Into<String>) {
        self.context_name = Some(name.into());
    }

    pub fn device(&self) -> &SharedDevice {
        &self.unit
    }

    /// A weak delivery target for sequenced events.
    ///
    /// Targets stop delivering as soon as the handle is dropped, so a
    /// detached instrument can never be driven late.
    pub fn target(&self) -> EventTarget {
        EventTarget {
            instrument: self.id,
            device: Arc::downgrade(&self.unit),
        }
    }
}

impl fmt::Debug for InstrumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstrumentHandle")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("context_name", &self.context_name)
            .finish()
    }
}

/// Weak event destination bound into a track.
#[derive(Clone)]
pub struct EventTarget {
    instrument: InstrumentId,
    device: Weak<Mutex<Box<dyn MusicDevice>>>,
}

impl EventTarget {
    pub fn instrument(&self) -> InstrumentId {
        self.instrument
    }

    pub fn is_alive(&self) -> bool {
        self.device.strong_count() > 0
    }

    /// Deliver one event. Returns false if the instrument is gone.
    pub fn send(&self, event: MidiEvent) -> bool {
        match self.device.upgrade() {
            Some(unit) => {
                unit.lock().handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Silence the instrument. Returns false if it is gone.
    pub fn all_notes_off(&self) -> bool {
        match self.device.upgrade() {
            Some(unit) => {
                unit.lock().all_notes_off();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTarget")
            .field("instrument", &self.instrument)
            .field("alive", &self.is_alive())
            .finish()
    }
}
