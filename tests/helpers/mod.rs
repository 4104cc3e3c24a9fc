//! Shared fixtures for integration tests: a scripted plugin host, a
//! recording instrument device, and a bundled track file.

use parking_lot::Mutex;
use solista::plugin::{
    ComponentFilter, DirectoryError, InstantiateError, InstantiateStage, PluginHost,
};
use solista::{InstrumentDescriptor, InstrumentHandle, MidiEvent, MusicDevice};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Deliveries observed by mock instruments, tagged with the instrument name.
pub type DeliveryLog = Arc<Mutex<Vec<(String, MidiEvent)>>>;

struct MockDevice {
    name: String,
    log: DeliveryLog,
}

impl MusicDevice for MockDevice {
    fn handle_event(&mut self, event: MidiEvent) {
        self.log.lock().push((self.name.clone(), event));
    }
}

/// Scripted component host: per-instrument instantiation delays and
/// failures, plus a log of what was instantiated and what got played.
pub struct MockHost {
    instruments: Vec<InstrumentDescriptor>,
    delays: Mutex<HashMap<String, Duration>>,
    failures: Mutex<HashMap<String, String>>,
    instantiated: Mutex<Vec<String>>,
    log: DeliveryLog,
}

impl MockHost {
    pub fn new(names: &[&str]) -> Arc<Self> {
        let instruments = names
            .iter()
            .map(|name| InstrumentDescriptor::instrument(name.to_lowercase(), *name, "Mock Audio"))
            .collect();
        Arc::new(Self {
            instruments,
            delays: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            instantiated: Mutex::new(Vec::new()),
            log: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn descriptor(&self, name: &str) -> InstrumentDescriptor {
        self.instruments
            .iter()
            .find(|d| d.name == name)
            .unwrap_or_else(|| panic!("no such mock instrument: {name}"))
            .clone()
    }

    /// Make instantiating `name` take this long.
    pub fn delay(&self, name: &str, delay: Duration) {
        self.delays.lock().insert(name.to_string(), delay);
    }

    /// Make instantiating `name` fail.
    pub fn fail(&self, name: &str, reason: &str) {
        self.failures
            .lock()
            .insert(name.to_string(), reason.to_string());
    }

    /// Names instantiated so far, in completion order.
    pub fn instantiated(&self) -> Vec<String> {
        self.instantiated.lock().clone()
    }

    /// Events delivered to the named instrument so far.
    pub fn deliveries(&self, name: &str) -> Vec<MidiEvent> {
        self.log
            .lock()
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, e)| *e)
            .collect()
    }

    /// Poll until the named instrument has received at least one event.
    pub fn wait_for_delivery(&self, name: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if !self.deliveries(name).is_empty() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        false
    }
}

impl PluginHost for MockHost {
    fn query(&self, filter: &ComponentFilter) -> Result<Vec<InstrumentDescriptor>, DirectoryError> {
        Ok(self
            .instruments
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect())
    }

    fn instantiate(
        &self,
        descriptor: &InstrumentDescriptor,
    ) -> Result<InstrumentHandle, InstantiateError> {
        if let Some(delay) = self.delays.lock().get(&descriptor.name).copied() {
            std::thread::sleep(delay);
        }
        if let Some(reason) = self.failures.lock().get(&descriptor.name).cloned() {
            return Err(InstantiateError::Failed {
                stage: InstantiateStage::Creation,
                reason,
            });
        }

        self.instantiated.lock().push(descriptor.name.clone());
        Ok(InstrumentHandle::new(
            descriptor.name.clone(),
            Box::new(MockDevice {
                name: descriptor.name.clone(),
                log: Arc::clone(&self.log),
            }),
        ))
    }
}

/// Write the bundled audition track: a note-on at beat 0 and its note-off
/// eight beats later (96 ticks per beat).
pub fn write_scale_track(dir: &Path) {
    let data: [u8; 35] = [
        0x4D, 0x54, 0x68, 0x64, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x01, 0x00, 0x60, //
        0x4D, 0x54, 0x72, 0x6B, 0x00, 0x00, 0x00, 0x0D, //
        0x00, 0x90, 0x3C, 0x64, //
        0x86, 0x00, 0x80, 0x3C, 0x00, //
        0x00, 0xFF, 0x2F, 0x00,
    ];
    std::fs::write(dir.join("Scale.mid"), data).unwrap();
}
