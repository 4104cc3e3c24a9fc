//! Builder for configuring and constructing a `PlaybackController`.

use crate::controller::PlaybackController;
use crate::error::{Error, Result};
use crate::events::ControllerEvent;
use solista_core::{AudioBackend, AudioGraph, Broadcast, InstrumentSlot, NullBackend};
use solista_plugin::{
    DirectoryEvent, InstrumentDirectory, InstrumentFactory, PluginHost,
};
use solista_sequencer::{DirResolver, ResourceResolver, Sequencer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default track auditioned after every instrument selection.
pub const DEFAULT_TRACK: &str = "Scale";

/// The plugin host is the only required collaborator; the backend defaults
/// to the headless [`NullBackend`] and resources resolve against the
/// current directory.
///
/// # Example
///
/// ```ignore
/// let controller = PlaybackController::builder()
///     .host(platform_host)
///     .resource_dir("assets")
///     .default_track("Scale")
///     .build()?;
///
/// controller.refresh_instruments();
/// ```
pub struct PlaybackControllerBuilder {
    host: Option<Arc<dyn PluginHost>>,
    backend: Option<Box<dyn AudioBackend>>,
    resolver: Option<Arc<dyn ResourceResolver>>,
    default_track: String,
    instantiate_timeout: Option<Duration>,
    runtime: Option<tokio::runtime::Handle>,
}

impl Default for PlaybackControllerBuilder {
    fn default() -> Self {
        Self {
            host: None,
            backend: None,
            resolver: None,
            default_track: DEFAULT_TRACK.to_string(),
            instantiate_timeout: None,
            runtime: None,
        }
    }
}

impl PlaybackControllerBuilder {
    /// The platform component directory + instantiation service. Required.
    pub fn host(mut self, host: Arc<dyn PluginHost>) -> Self {
        self.host = Some(host);
        self
    }

    /// Hardware output backend. Default: [`NullBackend`].
    pub fn backend(mut self, backend: Box<dyn AudioBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Resource resolver used for track loading. Default: the current
    /// directory.
    pub fn resolver(mut self, resolver: Arc<dyn ResourceResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Resolve track resources from a directory.
    pub fn resource_dir(self, dir: impl Into<PathBuf>) -> Self {
        self.resolver(Arc::new(DirResolver::new(dir)))
    }

    /// Track name loaded after each selection. Default: `"Scale"`.
    pub fn default_track(mut self, name: impl Into<String>) -> Self {
        self.default_track = name.into();
        self
    }

    /// Upper bound on a single instantiation.
    pub fn instantiate_timeout(mut self, timeout: Duration) -> Self {
        self.instantiate_timeout = Some(timeout);
        self
    }

    /// Runtime for the background domain (queries and instantiation).
    /// Defaults to the ambient tokio runtime.
    pub fn runtime(mut self, handle: tokio::runtime::Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn build(self) -> Result<PlaybackController> {
        let host = self
            .host
            .ok_or_else(|| Error::InvalidConfig("a plugin host is required".into()))?;

        let runtime = match self.runtime {
            Some(handle) => handle,
            None => tokio::runtime::Handle::try_current().map_err(|_| {
                Error::InvalidConfig(
                    "no tokio runtime available; provide one with .runtime()".into(),
                )
            })?,
        };

        let backend = self.backend.unwrap_or_else(|| Box::new(NullBackend::new()));
        let resolver: Arc<dyn ResourceResolver> = self
            .resolver
            .unwrap_or_else(|| Arc::new(DirResolver::new(".")));

        let graph = AudioGraph::new(backend);
        let sequencer = Sequencer::new(graph.state_handle());
        let directory = Arc::new(InstrumentDirectory::new(
            Arc::clone(&host),
            runtime.clone(),
        ));

        let mut factory = InstrumentFactory::new(Arc::clone(&host));
        if let Some(timeout) = self.instantiate_timeout {
            factory = factory.with_timeout(timeout);
        }

        let events = Arc::new(Broadcast::new());
        spawn_directory_forwarder(&directory, Arc::clone(&events));

        Ok(PlaybackController::from_parts(
            graph,
            InstrumentSlot::new(),
            sequencer,
            directory,
            factory,
            host,
            resolver,
            self.default_track,
            events,
            runtime,
        ))
    }
}

/// Re-emit directory notifications as controller events.
///
/// The thread owns only its receiver and the event hub, so it exits as
/// soon as the directory (and with it the sending side) is dropped.
fn spawn_directory_forwarder(
    directory: &Arc<InstrumentDirectory>,
    events: Arc<Broadcast<ControllerEvent>>,
) {
    let notifications = directory.subscribe();
    std::thread::Builder::new()
        .name("solista-directory-events".into())
        .spawn(move || {
            while let Ok(event) = notifications.recv() {
                let forwarded = match event {
                    DirectoryEvent::Updated { count } => {
                        ControllerEvent::InstrumentsUpdated { count }
                    }
                    DirectoryEvent::QueryFailed { reason } => {
                        ControllerEvent::DirectoryQueryFailed { reason }
                    }
                };
                events.emit(forwarded);
            }
        })
        .expect("failed to spawn directory event thread");
}
