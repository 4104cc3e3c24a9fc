//! Engine lifecycle state, shared across control threads.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Engine-wide lifecycle state.
///
/// The sequencer may only be started while the engine is `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Stopped,
    Prepared,
    Running,
}

impl EngineState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => EngineState::Prepared,
            2 => EngineState::Running,
            _ => EngineState::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            EngineState::Stopped => 0,
            EngineState::Prepared => 1,
            EngineState::Running => 2,
        }
    }
}

/// Cheaply clonable handle onto the engine state.
///
/// Readers (the sequencer, UI-facing status) observe lifecycle transitions
/// without touching the graph lock.
#[derive(Debug, Clone, Default)]
pub struct EngineStateHandle(Arc<AtomicU8>);

impl EngineStateHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> EngineState {
        EngineState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn is_running(&self) -> bool {
        self.get() == EngineState::Running
    }

    pub(crate) fn set(&self, state: EngineState) {
        self.0.store(state.as_u8(), Ordering::Release);
    }
}
