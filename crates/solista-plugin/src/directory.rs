//! Cached directory of available instrument components.

use crate::descriptor::{ComponentFilter, InstrumentDescriptor};
use crate::host::PluginHost;
use arc_swap::ArcSwap;
use crossbeam_channel::Receiver;
use solista_core::Broadcast;
use std::sync::Arc;
use tracing::{debug, warn};

/// Notifications emitted when a refresh completes.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryEvent {
    /// The cached list was replaced.
    Updated { count: usize },

    /// The query failed; the previous cached list is still in effect.
    QueryFailed { reason: String },
}

/// Thread-safe cached list of available instruments.
///
/// The cache is a read-copy-update snapshot: readers get the last
/// successful result without any lock shared with the query path or the
/// graph. A failed query leaves the previous snapshot untouched and emits
/// a diagnostic event instead.
pub struct InstrumentDirectory {
    host: Arc<dyn PluginHost>,
    runtime: tokio::runtime::Handle,
    cache: ArcSwap<Vec<InstrumentDescriptor>>,
    events: Broadcast<DirectoryEvent>,
}

impl InstrumentDirectory {
    pub fn new(host: Arc<dyn PluginHost>, runtime: tokio::runtime::Handle) -> Self {
        Self {
            host,
            runtime,
            cache: ArcSwap::from_pointee(Vec::new()),
            events: Broadcast::new(),
        }
    }

    /// The last successful query result.
    pub fn snapshot(&self) -> Arc<Vec<InstrumentDescriptor>> {
        self.cache.load_full()
    }

    pub fn subscribe(&self) -> Receiver<DirectoryEvent> {
        self.events.subscribe()
    }

    /// Kick off a background refresh. Safe to call repeatedly; completion
    /// is reported through the event channel.
    pub fn refresh(self: &Arc<Self>, filter: ComponentFilter) {
        let dir = Arc::clone(self);
        self.runtime.spawn(async move {
            dir.run_refresh(filter).await;
        });
    }

    /// Run one refresh to completion on the current task.
    pub async fn run_refresh(&self, filter: ComponentFilter) {
        let host = Arc::clone(&self.host);
        let result = tokio::task::spawn_blocking(move || host.query(&filter)).await;

        match result {
            Ok(Ok(list)) => {
                debug!(count = list.len(), "instrument list refreshed");
                let count = list.len();
                self.cache.store(Arc::new(list));
                self.events.emit(DirectoryEvent::Updated { count });
            }
            Ok(Err(e)) => {
                warn!(error = %e, "instrument query failed; keeping cached list");
                self.events.emit(DirectoryEvent::QueryFailed {
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                warn!(error = %e, "instrument query task failed; keeping cached list");
                self.events.emit(DirectoryEvent::QueryFailed {
                    reason: e.to_string(),
                });
            }
        }
    }
}
