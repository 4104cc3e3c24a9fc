//! The host plugin service collaborator.

use crate::descriptor::{ComponentFilter, InstrumentDescriptor};
use crate::error::{DirectoryError, InstantiateError};
use solista_core::InstrumentHandle;

/// A rendered component icon (RGBA8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Platform directory + instantiation service.
///
/// `query` and `instantiate` may block; the directory and factory run them
/// on the background execution domain, never on the caller's thread.
/// Implementations must be callable from multiple threads at once.
pub trait PluginHost: Send + Sync {
    /// All components matching the filter, in host order. An empty result
    /// is not an error.
    fn query(&self, filter: &ComponentFilter) -> Result<Vec<InstrumentDescriptor>, DirectoryError>;

    /// Instantiate a descriptor into a live instrument. No graph-side
    /// effects; the caller owns binding.
    fn instantiate(
        &self,
        descriptor: &InstrumentDescriptor,
    ) -> Result<InstrumentHandle, InstantiateError>;

    /// Capability lookup for the component's icon at roughly the given
    /// pixel size. Hosts without icon support return `None`.
    fn icon(&self, _descriptor: &InstrumentDescriptor, _size: u32) -> Option<Icon> {
        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::InstantiateStage;
    use parking_lot::Mutex;
    use solista_core::midi::MidiEvent;
    use solista_core::MusicDevice;
    use std::time::Duration;

    struct NullDevice;

    impl MusicDevice for NullDevice {
        fn handle_event(&mut self, _event: MidiEvent) {}
    }

    /// Scripted host for directory/factory tests: per-call failures and a
    /// configurable instantiation delay.
    pub(crate) struct ScriptedHost {
        instruments: Mutex<Vec<InstrumentDescriptor>>,
        query_error: Mutex<Option<String>>,
        instantiate_error: Mutex<Option<String>>,
        instantiate_delay: Mutex<Duration>,
    }

    impl ScriptedHost {
        pub fn with_instruments(names: &[&str]) -> Self {
            let instruments = names
                .iter()
                .map(|name| InstrumentDescriptor::instrument(name.to_lowercase(), *name, "Scripted"))
                .collect();
            Self {
                instruments: Mutex::new(instruments),
                query_error: Mutex::new(None),
                instantiate_error: Mutex::new(None),
                instantiate_delay: Mutex::new(Duration::ZERO),
            }
        }

        pub fn fail_queries(&self, err: DirectoryError) {
            *self.query_error.lock() = Some(err.to_string());
        }

        pub fn fail_instantiations(&self, reason: &str) {
            *self.instantiate_error.lock() = Some(reason.to_string());
        }

        pub fn set_instantiate_delay(&self, delay: Duration) {
            *self.instantiate_delay.lock() = delay;
        }
    }

    impl PluginHost for ScriptedHost {
        fn query(
            &self,
            filter: &ComponentFilter,
        ) -> Result<Vec<InstrumentDescriptor>, DirectoryError> {
            if let Some(reason) = self.query_error.lock().clone() {
                return Err(DirectoryError::QueryFailed(reason));
            }
            Ok(self
                .instruments
                .lock()
                .iter()
                .filter(|d| filter.matches(d))
                .cloned()
                .collect())
        }

        fn instantiate(
            &self,
            descriptor: &InstrumentDescriptor,
        ) -> Result<InstrumentHandle, InstantiateError> {
            let delay = *self.instantiate_delay.lock();
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
            if let Some(reason) = self.instantiate_error.lock().clone() {
                return Err(InstantiateError::Failed {
                    stage: InstantiateStage::Creation,
                    reason,
                });
            }
            Ok(InstrumentHandle::new(
                descriptor.name.clone(),
                Box::new(NullDevice),
            ))
        }
    }
}
