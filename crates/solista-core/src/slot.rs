//! The single active-instrument binding inside the graph.

use crate::device::{InstrumentHandle, InstrumentId};
use crate::error::Result;
use crate::format::StreamFormat;
use crate::graph::{AudioGraph, NodeId};
use tracing::{debug, warn};

/// Context tag stamped onto every instrument the slot binds.
pub const ENGINE_CONTEXT: &str = "solista";

struct BoundInstrument {
    node: NodeId,
    handle: InstrumentHandle,
}

/// Holds at most one live instrument and performs the swap.
///
/// A rebind tears the old instrument down completely (silence, disconnect,
/// detach) before the new one is attached; if attaching or connecting the
/// new instrument fails, the slot ends up `Empty` rather than holding a
/// half-attached node. Callers serialize rebinds by holding the same lock
/// that guards the graph.
pub struct InstrumentSlot {
    bound: Option<BoundInstrument>,
    context_name: String,
}

impl InstrumentSlot {
    pub fn new() -> Self {
        Self {
            bound: None,
            context_name: ENGINE_CONTEXT.to_string(),
        }
    }

    pub fn with_context(context_name: impl Into<String>) -> Self {
        Self {
            bound: None,
            context_name: context_name.into(),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    pub fn instrument_id(&self) -> Option<InstrumentId> {
        self.bound.as_ref().map(|b| b.handle.id())
    }

    pub fn instrument_name(&self) -> Option<&str> {
        self.bound.as_ref().map(|b| b.handle.display_name())
    }

    pub fn node(&self) -> Option<NodeId> {
        self.bound.as_ref().map(|b| b.node)
    }

    /// The currently bound handle, if any.
    pub fn handle(&self) -> Option<&InstrumentHandle> {
        self.bound.as_ref().map(|b| &b.handle)
    }

    /// Replace the active instrument.
    ///
    /// The old instrument (if any) is fully torn down first; then the new
    /// one is attached and connected to the mixer with the stereo format
    /// derived from the hardware output rate.
    pub fn rebind(&mut self, graph: &mut AudioGraph, mut handle: InstrumentHandle) -> Result<()> {
        self.clear(graph);

        let stereo = StreamFormat::stereo(graph.hardware_format().sample_rate);
        let mixer = graph.mixer();
        let output = graph.output();

        // Mixer feeds the hardware output at the derived format; the
        // reference re-negotiates this edge on every instrument swap.
        graph.connect(mixer, output, stereo)?;

        let node = graph.attach_instrument(&handle)?;
        if let Err(e) = graph.connect(node, mixer, stereo) {
            // Never keep a half-attached instrument.
            let _ = graph.detach(node);
            return Err(e);
        }

        handle.set_context_name(&self.context_name);
        debug!(
            %node,
            instrument = %handle.id(),
            name = handle.display_name(),
            %stereo,
            "instrument bound"
        );

        self.bound = Some(BoundInstrument { node, handle });
        Ok(())
    }

    /// Tear down the active instrument, leaving the slot `Empty`.
    ///
    /// Disconnect-before-detach ordering: the mixer's inputs are dropped
    /// first so the node is edge-free when it is removed.
    pub fn clear(&mut self, graph: &mut AudioGraph) {
        let Some(bound) = self.bound.take() else {
            return;
        };

        bound.handle.device().lock().all_notes_off();
        graph.disconnect_inputs(graph.mixer());
        if let Err(e) = graph.detach(bound.node) {
            warn!(node = %bound.node, error = %e, "detach during slot clear failed");
        }
        debug!(instrument = %bound.handle.id(), "instrument unbound");
    }
}

impl Default for InstrumentSlot {
    fn default() -> Self {
        Self::new()
    }
}
