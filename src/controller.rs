//! Selection → rebind → playback orchestration.

use crate::error::{Error, Result};
use crate::events::ControllerEvent;
use parking_lot::Mutex;
use solista_core::{
    AudioGraph, Broadcast, EngineState, EngineStateHandle, InstrumentId, InstrumentSlot,
};
use solista_plugin::{
    ComponentFilter, Icon, InstrumentDescriptor, InstrumentDirectory, InstrumentFactory,
    PluginHost,
};
use solista_sequencer::{ResourceResolver, Sequencer};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Controller state as shown to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    /// A selection is in flight; nothing is bound yet.
    InstrumentSelected,
    /// An instrument is bound and the track is routed to it.
    Ready,
    Playing,
    Stopped,
}

/// How a completed selection was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebindOutcome {
    /// The instrument was bound and the track routed to it.
    Accepted,
    /// A newer selection started while this one was in flight; its result
    /// was discarded without touching the graph.
    Superseded,
}

/// Graph and slot share one lock: every structural mutation, including the
/// whole rebind, is single-flight.
struct AudioSystem {
    graph: AudioGraph,
    slot: InstrumentSlot,
}

struct Inner {
    system: Mutex<AudioSystem>,
    engine_state: EngineStateHandle,
    sequencer: Sequencer,
    directory: Arc<InstrumentDirectory>,
    factory: InstrumentFactory,
    host: Arc<dyn PluginHost>,
    resolver: Arc<dyn ResourceResolver>,
    default_track: Mutex<String>,
    state: Mutex<ControllerState>,
    generation: AtomicU64,
    events: Arc<Broadcast<ControllerEvent>>,
    runtime: tokio::runtime::Handle,
}

/// Orchestrates the audition flow: select an instrument, swap it into the
/// graph, route the track to it, play and stop.
///
/// Selection is asynchronous and last-writer-wins: each request bumps a
/// generation counter, and a completion whose generation is stale is
/// discarded without touching the graph.
pub struct PlaybackController {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController").finish_non_exhaustive()
    }
}

impl PlaybackController {
    pub fn builder() -> crate::PlaybackControllerBuilder {
        crate::PlaybackControllerBuilder::default()
    }

    pub(crate) fn from_parts(
        graph: AudioGraph,
        slot: InstrumentSlot,
        sequencer: Sequencer,
        directory: Arc<InstrumentDirectory>,
        factory: InstrumentFactory,
        host: Arc<dyn PluginHost>,
        resolver: Arc<dyn ResourceResolver>,
        default_track: String,
        events: Arc<Broadcast<ControllerEvent>>,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        let engine_state = graph.state_handle();
        Self {
            inner: Arc::new(Inner {
                system: Mutex::new(AudioSystem { graph, slot }),
                engine_state,
                sequencer,
                directory,
                factory,
                host,
                resolver,
                default_track: Mutex::new(default_track),
                state: Mutex::new(ControllerState::Idle),
                generation: AtomicU64::new(0),
                events,
                runtime,
            }),
        }
    }

    // ------------------------------------------------------------------
    // UI surface
    // ------------------------------------------------------------------

    pub fn subscribe(&self) -> crossbeam_channel::Receiver<ControllerEvent> {
        self.inner.events.subscribe()
    }

    pub fn state(&self) -> ControllerState {
        *self.inner.state.lock()
    }

    pub fn engine_state(&self) -> EngineState {
        self.inner.engine_state.get()
    }

    /// Last refreshed instrument list.
    pub fn instruments(&self) -> Arc<Vec<InstrumentDescriptor>> {
        self.inner.directory.snapshot()
    }

    /// Kick off a background refresh of the instrument list.
    pub fn refresh_instruments(&self) {
        self.inner.directory.refresh(ComponentFilter::instruments());
    }

    /// Icon lookup for list rows; `None` when the host has no icon.
    pub fn icon(&self, descriptor: &InstrumentDescriptor, size: u32) -> Option<Icon> {
        self.inner.host.icon(descriptor, size)
    }

    /// Instrument currently bound in the slot, if any.
    pub fn bound_instrument(&self) -> Option<InstrumentId> {
        self.inner.system.lock().slot.instrument_id()
    }

    pub fn default_track(&self) -> String {
        self.inner.default_track.lock().clone()
    }

    pub fn set_default_track(&self, name: impl Into<String>) {
        *self.inner.default_track.lock() = name.into();
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Select an instrument: instantiate it asynchronously, rebind the
    /// slot, load the configured track and route it.
    ///
    /// Valid from any state. If a newer selection starts while this one is
    /// in flight, this one resolves to [`RebindOutcome::Superseded`] and
    /// leaves no trace in the graph. Completion is also reported through
    /// the event channel (`InstrumentBound` / `SelectionFailed` /
    /// `SelectionSuperseded`).
    pub fn select_instrument(
        &self,
        descriptor: &InstrumentDescriptor,
    ) -> JoinHandle<Result<RebindOutcome>> {
        let inner = Arc::clone(&self.inner);
        let descriptor = descriptor.clone();
        let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut state = inner.state.lock();
            if *state == ControllerState::Idle {
                *state = ControllerState::InstrumentSelected;
            }
        }
        debug!(name = %descriptor.name, generation, "instrument selected");

        self.inner
            .runtime
            .spawn(async move { inner.run_selection(descriptor, generation).await })
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    /// Start the engine and the sequencer.
    ///
    /// Valid only once an instrument is bound (`Ready`, or `Stopped` after
    /// a previous playback); otherwise `NotReady` without touching the
    /// graph. Playback always starts from the top of the track.
    pub fn play(&self) -> Result<()> {
        match self.state() {
            ControllerState::Ready | ControllerState::Stopped => {}
            ControllerState::Playing => return Err(Error::NotReady("already playing")),
            ControllerState::Idle | ControllerState::InstrumentSelected => {
                return Err(Error::NotReady("no instrument is ready"));
            }
        }

        {
            let mut system = self.inner.system.lock();
            system.graph.prepare()?;
            system.graph.start()?;
        }
        self.inner.sequencer.start()?;

        *self.inner.state.lock() = ControllerState::Playing;
        self.inner.events.emit(ControllerEvent::PlaybackStarted);
        info!("playback started");
        Ok(())
    }

    /// Stop the sequencer; the engine keeps running for a warm restart.
    ///
    /// Idempotent: stopping while not playing leaves everything unchanged.
    pub fn stop(&self) -> Result<()> {
        {
            let mut state = self.inner.state.lock();
            if *state != ControllerState::Playing {
                return Ok(());
            }
            *state = ControllerState::Stopped;
        }

        self.inner.sequencer.stop();
        self.inner.events.emit(ControllerEvent::PlaybackStopped);
        info!("playback stopped");
        Ok(())
    }

    /// Full teardown: stop playback, unbind the instrument, stop the
    /// engine. The controller returns to `Idle`.
    pub fn shutdown(&self) {
        self.inner.sequencer.stop();

        {
            let mut system = self.inner.system.lock();
            let AudioSystem { graph, slot } = &mut *system;
            slot.clear(graph);
            graph.stop();
        }

        *self.inner.state.lock() = ControllerState::Idle;
        self.inner.events.emit(ControllerEvent::PlayEnabled(false));
        info!("controller shut down");
    }
}

impl Inner {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn superseded(&self, descriptor: &InstrumentDescriptor) -> Result<RebindOutcome> {
        debug!(name = %descriptor.name, "selection superseded; result discarded");
        self.events.emit(ControllerEvent::SelectionSuperseded {
            name: descriptor.name.clone(),
        });
        Ok(RebindOutcome::Superseded)
    }

    fn selection_failed(&self, descriptor: &InstrumentDescriptor, reason: String) {
        warn!(name = %descriptor.name, reason = %reason, "selection failed");

        // Only the in-flight marker state is rolled back; a previously
        // bound instrument stays bound.
        {
            let mut state = self.state.lock();
            if *state == ControllerState::InstrumentSelected {
                *state = ControllerState::Idle;
            }
        }
        self.events.emit(ControllerEvent::SelectionFailed {
            name: descriptor.name.clone(),
            reason,
        });
        self.events.emit(ControllerEvent::PlayEnabled(false));
    }

    async fn run_selection(
        self: Arc<Self>,
        descriptor: InstrumentDescriptor,
        generation: u64,
    ) -> Result<RebindOutcome> {
        let handle = match self.factory.instantiate(&descriptor).await {
            Ok(handle) => handle,
            Err(e) => {
                if self.is_current(generation) {
                    self.selection_failed(&descriptor, e.to_string());
                }
                return Err(e.into());
            }
        };

        if !self.is_current(generation) {
            return self.superseded(&descriptor);
        }

        // Load the track before touching the graph, so a missing or
        // malformed file leaves the previous binding intact.
        let track_name = self.default_track.lock().clone();
        let mut track = match self
            .sequencer
            .load_track(self.resolver.as_ref(), &track_name)
        {
            Ok(track) => track,
            Err(e) => {
                if self.is_current(generation) {
                    self.selection_failed(&descriptor, e.to_string());
                }
                return Err(e.into());
            }
        };

        {
            let mut system = self.system.lock();

            // Re-check under the lock: a newer selection may have won the
            // race since the instantiation completed.
            if !self.is_current(generation) {
                return self.superseded(&descriptor);
            }

            let AudioSystem { graph, slot } = &mut *system;
            if let Err(e) = slot.rebind(graph, handle) {
                self.selection_failed(&descriptor, e.to_string());
                return Err(e.into());
            }

            // Route the track to the freshly bound instrument.
            track.bind_destination(slot.handle().expect("slot bound by rebind"));
        }

        self.sequencer.stop();
        self.sequencer.install(track);

        *self.state.lock() = ControllerState::Ready;
        info!(name = %descriptor.name, "instrument bound and track routed");
        self.events.emit(ControllerEvent::InstrumentBound {
            name: descriptor.name.clone(),
        });
        self.events.emit(ControllerEvent::PlayEnabled(true));
        Ok(RebindOutcome::Accepted)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.sequencer.stop();
        let system = self.system.get_mut();
        let AudioSystem { graph, slot } = &mut *system;
        slot.clear(graph);
        graph.stop();
    }
}
