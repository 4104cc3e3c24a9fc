//! The audio processing graph: nodes, connections, lifecycle.
//!
//! Structural rules:
//! - a node must be attached before it can be connected;
//! - all of a node's connections must be removed before it is detached.
//!
//! Separating disconnect from detach guarantees that no connection ever
//! references a node mid-teardown. All structural mutation is expected to
//! happen under one lock owned by the caller; this type itself is plain
//! `&mut` state.

use crate::backend::AudioBackend;
use crate::device::{InstrumentHandle, InstrumentId};
use crate::error::{Error, Result};
use crate::format::StreamFormat;
use crate::state::{EngineState, EngineStateHandle};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Identifier of a node registered with the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// What a graph node wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Mixer,
    Output,
    Instrument,
}

#[derive(Debug)]
struct NodeEntry {
    name: String,
    kind: NodeKind,
}

/// A directed audio connection with its negotiated format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub source: NodeId,
    pub dest: NodeId,
    pub format: StreamFormat,
}

/// The audio graph. Owns the fixed mixer and hardware output nodes and the
/// backend they render through.
pub struct AudioGraph {
    backend: Box<dyn AudioBackend>,
    nodes: HashMap<NodeId, NodeEntry>,
    connections: Vec<Connection>,
    instruments: HashMap<InstrumentId, NodeId>,
    mixer: NodeId,
    output: NodeId,
    state: EngineStateHandle,
    next_id: u64,
}

impl AudioGraph {
    /// Create a graph with its fixed mixer and output nodes attached.
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        let mut graph = Self {
            backend,
            nodes: HashMap::new(),
            connections: Vec::new(),
            instruments: HashMap::new(),
            mixer: NodeId(0),
            output: NodeId(0),
            state: EngineStateHandle::new(),
            next_id: 1,
        };

        graph.mixer = graph.insert_node("main mixer", NodeKind::Mixer);
        graph.output = graph.insert_node("hardware output", NodeKind::Output);
        graph
    }

    fn insert_node(&mut self, name: &str, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            NodeEntry {
                name: name.to_string(),
                kind,
            },
        );
        id
    }

    /// The fixed main mixer node.
    pub fn mixer(&self) -> NodeId {
        self.mixer
    }

    /// The fixed hardware output node.
    pub fn output(&self) -> NodeId {
        self.output
    }

    /// Hardware output format reported by the backend.
    pub fn hardware_format(&self) -> StreamFormat {
        self.backend.output_format()
    }

    /// Shared handle onto the engine lifecycle state.
    pub fn state_handle(&self) -> EngineStateHandle {
        self.state.clone()
    }

    pub fn state(&self) -> EngineState {
        self.state.get()
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Register an instrument as a not-yet-connected node.
    ///
    /// Attaching an instrument that is already attached is an error.
    pub fn attach_instrument(&mut self, handle: &InstrumentHandle) -> Result<NodeId> {
        if let Some(&existing) = self.instruments.get(&handle.id()) {
            return Err(Error::DuplicateAttach(existing));
        }

        let node = self.insert_node(handle.display_name(), NodeKind::Instrument);
        self.instruments.insert(handle.id(), node);
        debug!(%node, instrument = %handle.id(), name = handle.display_name(), "attached instrument node");
        Ok(node)
    }

    /// Create (or re-negotiate) a directed connection.
    ///
    /// Both nodes must be attached. The format must be valid and match the
    /// hardware sample rate. Connecting an edge that already exists replaces
    /// its format.
    pub fn connect(&mut self, source: NodeId, dest: NodeId, format: StreamFormat) -> Result<()> {
        if !self.nodes.contains_key(&source) {
            return Err(Error::NotAttached(source));
        }
        if !self.nodes.contains_key(&dest) {
            return Err(Error::NotAttached(dest));
        }
        if !format.is_valid() || format.sample_rate != self.backend.output_format().sample_rate {
            return Err(Error::Format(format));
        }

        if let Some(existing) = self
            .connections
            .iter_mut()
            .find(|c| c.source == source && c.dest == dest)
        {
            existing.format = format;
            debug!(%source, %dest, %format, "replaced connection format");
            return Ok(());
        }

        self.connections.push(Connection {
            source,
            dest,
            format,
        });
        debug!(%source, %dest, %format, "connected");
        Ok(())
    }

    /// Remove all inbound connections of `dest`. Safe when none exist.
    ///
    /// Returns the number of connections removed.
    pub fn disconnect_inputs(&mut self, dest: NodeId) -> usize {
        let before = self.connections.len();
        self.connections.retain(|c| c.dest != dest);
        let removed = before - self.connections.len();
        if removed > 0 {
            debug!(%dest, removed, "disconnected inputs");
        }
        removed
    }

    /// Remove a node from the graph.
    ///
    /// The node must have no remaining connections; callers disconnect
    /// first. The fixed mixer and output nodes cannot be detached.
    pub fn detach(&mut self, node: NodeId) -> Result<()> {
        if node == self.mixer || node == self.output {
            return Err(Error::FixedNode(node));
        }
        let entry = self.nodes.get(&node).ok_or(Error::NotAttached(node))?;

        let connections = self.connection_count(node);
        if connections > 0 {
            return Err(Error::DetachWhileConnected { node, connections });
        }

        debug!(%node, name = %entry.name, "detached");
        self.nodes.remove(&node);
        self.instruments.retain(|_, n| *n != node);
        Ok(())
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Node currently wrapping the given instrument instance, if attached.
    pub fn node_for_instrument(&self, id: InstrumentId) -> Option<NodeId> {
        self.instruments.get(&id).copied()
    }

    /// Number of connections touching `node`, inbound or outbound.
    pub fn connection_count(&self, node: NodeId) -> usize {
        self.connections
            .iter()
            .filter(|c| c.source == node || c.dest == node)
            .count()
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Total attached nodes, fixed nodes included.
    pub fn attached_count(&self) -> usize {
        self.nodes.len()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Pre-allocate backend resources. Stopped → Prepared.
    pub fn prepare(&mut self) -> Result<()> {
        self.backend.prepare()?;
        if self.state.get() == EngineState::Stopped {
            self.state.set(EngineState::Prepared);
        }
        Ok(())
    }

    /// Start the engine. A no-op returning success while already Running;
    /// a backend failure leaves the state Stopped.
    pub fn start(&mut self) -> Result<()> {
        if self.state.get() == EngineState::Running {
            return Ok(());
        }

        match self.backend.start() {
            Ok(()) => {
                self.state.set(EngineState::Running);
                info!(nodes = self.attached_count(), connections = self.connections.len(), "audio engine started");
                Ok(())
            }
            Err(e) => {
                self.state.set(EngineState::Stopped);
                warn!(error = %e, "audio engine failed to start");
                Err(e)
            }
        }
    }

    /// Stop the engine. Idempotent.
    pub fn stop(&mut self) {
        if self.state.get() != EngineState::Stopped {
            info!("audio engine stopped");
        }
        self.backend.stop();
        self.state.set(EngineState::Stopped);
    }
}

impl fmt::Debug for AudioGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioGraph")
            .field("nodes", &self.nodes.len())
            .field("connections", &self.connections)
            .field("state", &self.state.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NullBackend;
    use crate::device::MusicDevice;
    use solista_midi::MidiEvent;

    struct NullDevice;

    impl MusicDevice for NullDevice {
        fn handle_event(&mut self, _event: MidiEvent) {}
    }

    /// Backend whose start always fails, for lifecycle error paths.
    struct BrokenBackend;

    impl AudioBackend for BrokenBackend {
        fn output_format(&self) -> StreamFormat {
            StreamFormat::stereo(44100.0)
        }

        fn start(&mut self) -> Result<()> {
            Err(Error::EngineStart("device unavailable".into()))
        }

        fn stop(&mut self) {}
    }

    fn graph() -> AudioGraph {
        AudioGraph::new(Box::new(NullBackend::new()))
    }

    fn instrument(name: &str) -> InstrumentHandle {
        InstrumentHandle::new(name, Box::new(NullDevice))
    }

    #[test]
    fn test_fixed_nodes_attached_at_construction() {
        let g = graph();
        assert!(g.is_attached(g.mixer()));
        assert!(g.is_attached(g.output()));
        assert_eq!(g.attached_count(), 2);
    }

    #[test]
    fn test_duplicate_attach_is_error() {
        let mut g = graph();
        let handle = instrument("synth");
        let node = g.attach_instrument(&handle).unwrap();
        let err = g.attach_instrument(&handle).unwrap_err();
        assert!(matches!(err, Error::DuplicateAttach(n) if n == node));
        assert_eq!(g.attached_count(), 3);
    }

    #[test]
    fn test_connect_requires_attached_nodes() {
        let mut g = graph();
        let handle = instrument("synth");
        let node = g.attach_instrument(&handle).unwrap();
        g.detach(node).unwrap();

        let stereo = StreamFormat::stereo(44100.0);
        let mixer = g.mixer();
        assert!(matches!(
            g.connect(node, mixer, stereo),
            Err(Error::NotAttached(n)) if n == node
        ));
    }

    #[test]
    fn test_connect_rejects_bad_format() {
        let mut g = graph();
        let handle = instrument("synth");
        let node = g.attach_instrument(&handle).unwrap();

        let mixer = g.mixer();
        // zero channels
        assert!(matches!(
            g.connect(node, mixer, StreamFormat::new(44100.0, 0)),
            Err(Error::Format(_))
        ));
        // rate mismatch with the hardware
        assert!(matches!(
            g.connect(node, mixer, StreamFormat::stereo(96000.0)),
            Err(Error::Format(_))
        ));
        assert!(g.connections().is_empty());
    }

    #[test]
    fn test_reconnect_replaces_format() {
        let mut g = graph();
        let mixer = g.mixer();
        let output = g.output();
        g.connect(mixer, output, StreamFormat::stereo(44100.0)).unwrap();
        g.connect(mixer, output, StreamFormat::new(44100.0, 1)).unwrap();

        assert_eq!(g.connections().len(), 1);
        assert_eq!(g.connections()[0].format.channels, 1);
    }

    #[test]
    fn test_disconnect_inputs_is_noop_when_none() {
        let mut g = graph();
        let mixer = g.mixer();
        assert_eq!(g.disconnect_inputs(mixer), 0);
    }

    #[test]
    fn test_detach_while_connected_leaves_graph_unchanged() {
        let mut g = graph();
        let handle = instrument("synth");
        let node = g.attach_instrument(&handle).unwrap();
        let mixer = g.mixer();
        g.connect(node, mixer, StreamFormat::stereo(44100.0)).unwrap();

        let err = g.detach(node).unwrap_err();
        assert!(matches!(
            err,
            Error::DetachWhileConnected { node: n, connections: 1 } if n == node
        ));

        // still attached and still connected
        assert!(g.is_attached(node));
        assert_eq!(g.connection_count(node), 1);
        assert_eq!(g.node_for_instrument(handle.id()), Some(node));
    }

    #[test]
    fn test_detach_after_disconnect() {
        let mut g = graph();
        let handle = instrument("synth");
        let node = g.attach_instrument(&handle).unwrap();
        let mixer = g.mixer();
        g.connect(node, mixer, StreamFormat::stereo(44100.0)).unwrap();

        g.disconnect_inputs(mixer);
        g.detach(node).unwrap();
        assert!(!g.is_attached(node));
        assert_eq!(g.node_for_instrument(handle.id()), None);
    }

    #[test]
    fn test_fixed_nodes_cannot_be_detached() {
        let mut g = graph();
        let mixer = g.mixer();
        assert!(matches!(g.detach(mixer), Err(Error::FixedNode(n)) if n == mixer));
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut g = graph();
        assert_eq!(g.state(), EngineState::Stopped);

        g.prepare().unwrap();
        assert_eq!(g.state(), EngineState::Prepared);

        g.start().unwrap();
        assert_eq!(g.state(), EngineState::Running);

        // start while running is a successful no-op
        g.start().unwrap();
        assert_eq!(g.state(), EngineState::Running);

        g.stop();
        assert_eq!(g.state(), EngineState::Stopped);
        // stop is idempotent
        g.stop();
        assert_eq!(g.state(), EngineState::Stopped);
    }

    #[test]
    fn test_start_failure_leaves_stopped() {
        let mut g = AudioGraph::new(Box::new(BrokenBackend));
        g.prepare().unwrap();
        let err = g.start().unwrap_err();
        assert!(matches!(err, Error::EngineStart(_)));
        assert_eq!(g.state(), EngineState::Stopped);
    }

    #[test]
    fn test_state_handle_tracks_lifecycle() {
        let mut g = graph();
        let handle = g.state_handle();
        assert!(!handle.is_running());
        g.start().unwrap();
        assert!(handle.is_running());
        g.stop();
        assert!(!handle.is_running());
    }
}
