//! Asynchronous instrument instantiation.

use crate::descriptor::InstrumentDescriptor;
use crate::error::{InstantiateError, InstantiateStage};
use crate::host::PluginHost;
use solista_core::InstrumentHandle;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Upper bound on how long one instantiation may take before it is
/// reported as failed rather than left hanging.
pub const DEFAULT_INSTANTIATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Instantiates descriptors into live instruments on the background
/// execution domain.
///
/// The factory never mutates shared state: the resulting handle is
/// returned to the caller, who is responsible for binding it.
pub struct InstrumentFactory {
    host: Arc<dyn PluginHost>,
    timeout: Duration,
}

impl InstrumentFactory {
    pub fn new(host: Arc<dyn PluginHost>) -> Self {
        Self {
            host,
            timeout: DEFAULT_INSTANTIATE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Instantiate the described component.
    ///
    /// Runs the host call on the blocking pool and bounds it with the
    /// configured timeout, so a wedged host yields an explicit error
    /// instead of hanging the selection forever.
    pub async fn instantiate(
        &self,
        descriptor: &InstrumentDescriptor,
    ) -> Result<InstrumentHandle, InstantiateError> {
        let host = Arc::clone(&self.host);
        let desc = descriptor.clone();
        let task = tokio::task::spawn_blocking(move || host.instantiate(&desc));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => {
                if let Ok(handle) = &result {
                    debug!(instrument = %handle.id(), name = handle.display_name(), "instantiated");
                }
                result
            }
            Ok(Err(join_err)) => Err(InstantiateError::Failed {
                stage: InstantiateStage::Creation,
                reason: join_err.to_string(),
            }),
            Err(_) => Err(InstantiateError::Timeout {
                name: descriptor.name.clone(),
                duration_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}
