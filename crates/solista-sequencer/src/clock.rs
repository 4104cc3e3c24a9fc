//! Beat-position clock for playback.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Anchor {
    started: Instant,
    base_beats: f64,
    beats_per_sec: f64,
}

/// Tracks the playback position in beats.
///
/// While rolling, the position is derived from a wall-clock anchor and the
/// tempo; at rest it is a plain value stored as f64 bits in an atomic, so
/// readers never contend with the playback worker.
#[derive(Debug, Default)]
pub struct BeatClock {
    resting_bits: AtomicU64,
    anchor: Mutex<Option<Anchor>>,
}

impl BeatClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position in beats.
    pub fn position(&self) -> f64 {
        if let Some(anchor) = *self.anchor.lock() {
            return anchor.base_beats + anchor.started.elapsed().as_secs_f64() * anchor.beats_per_sec;
        }
        f64::from_bits(self.resting_bits.load(Ordering::Acquire))
    }

    pub fn is_rolling(&self) -> bool {
        self.anchor.lock().is_some()
    }

    /// Anchor the clock and start advancing from `base_beats`.
    pub(crate) fn roll(&self, base_beats: f64, tempo_bpm: f64) {
        *self.anchor.lock() = Some(Anchor {
            started: Instant::now(),
            base_beats,
            beats_per_sec: tempo_bpm / 60.0,
        });
    }

    /// Stop advancing and pin the position at `beats`.
    pub(crate) fn hold(&self, beats: f64) {
        let mut anchor = self.anchor.lock();
        self.resting_bits.store(beats.to_bits(), Ordering::Release);
        *anchor = None;
    }
}
