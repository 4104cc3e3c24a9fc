//! Timed event playback against the bound instrument.

use crate::clock::BeatClock;
use crate::error::{Error, Result};
use crate::track::Track;
use crate::ResourceResolver;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use solista_core::{EngineStateHandle, EventTarget};
use solista_midi::MidiScore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

struct PlaySpec {
    score: Arc<MidiScore>,
    destination: EventTarget,
    tempo_bpm: f64,
}

enum Command {
    Play(PlaySpec),
    Stop,
    Seek(f64),
    Shutdown,
}

/// Replays the installed track's events to its bound instrument.
///
/// One track plays at a time. Starting always resets the position to 0;
/// starting while already playing restarts from the top. Playback runs on
/// a dedicated worker thread fed through a control channel, never on a
/// realtime path.
pub struct Sequencer {
    engine_state: EngineStateHandle,
    track: Mutex<Option<Track>>,
    clock: Arc<BeatClock>,
    playing: Arc<AtomicBool>,
    control: Sender<Command>,
    worker: Option<JoinHandle<()>>,
}

impl Sequencer {
    /// Create a sequencer observing the given engine state.
    pub fn new(engine_state: EngineStateHandle) -> Self {
        let (control, commands) = unbounded();
        let clock = Arc::new(BeatClock::new());
        let playing = Arc::new(AtomicBool::new(false));

        let worker_clock = Arc::clone(&clock);
        let worker_playing = Arc::clone(&playing);
        let worker = std::thread::Builder::new()
            .name("solista-sequencer".into())
            .spawn(move || worker_loop(commands, worker_clock, worker_playing))
            .expect("failed to spawn sequencer thread");

        Self {
            engine_state,
            track: Mutex::new(None),
            clock,
            playing,
            control,
            worker: Some(worker),
        }
    }

    /// Load a named track through the resource resolver.
    ///
    /// The returned track has no destination yet; bind one and
    /// [`install`](Self::install) it.
    pub fn load_track(&self, resolver: &dyn ResourceResolver, name: &str) -> Result<Track> {
        let path = resolver
            .resolve(name, "mid")
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        let score = MidiScore::load(&path)?;
        info!(
            track = name,
            events = score.len(),
            tempo_bpm = score.tempo_bpm,
            "track loaded"
        );
        Ok(Track::new(name, score))
    }

    /// Make the given track current. Replaces any previous track.
    pub fn install(&self, track: Track) {
        debug!(track = track.name(), "track installed");
        *self.track.lock() = Some(track);
    }

    pub fn has_track(&self) -> bool {
        self.track.lock().is_some()
    }

    pub fn track_name(&self) -> Option<String> {
        self.track.lock().as_ref().map(|t| t.name().to_string())
    }

    /// Start playback from the beginning.
    ///
    /// Requires the engine to be running and an installed track with a
    /// bound destination; otherwise `NotReady`. A start while already
    /// playing restarts from position 0.
    pub fn start(&self) -> Result<()> {
        if !self.engine_state.is_running() {
            return Err(Error::NotReady("engine is not running"));
        }

        let spec = {
            let guard = self.track.lock();
            let track = guard.as_ref().ok_or(Error::NotReady("no track loaded"))?;
            let destination = track
                .destination()
                .cloned()
                .ok_or(Error::NotReady("no destination instrument bound"))?;
            PlaySpec {
                score: track.score_arc(),
                destination,
                tempo_bpm: track.score().tempo_bpm,
            }
        };

        // Playback always restarts from the top.
        self.clock.hold(0.0);
        self.playing.store(true, Ordering::SeqCst);
        self.control
            .send(Command::Play(spec))
            .map_err(|_| Error::NotReady("sequencer worker stopped"))?;
        debug!("sequencer started");
        Ok(())
    }

    /// Stop playback. Idempotent; silences the destination.
    pub fn stop(&self) {
        if self.playing.swap(false, Ordering::SeqCst) {
            debug!("sequencer stopped");
        }
        let _ = self.control.send(Command::Stop);
    }

    /// Move the playhead. Takes effect immediately, playing or not.
    pub fn seek(&self, beats: f64) {
        let beats = beats.max(0.0);
        if self.is_playing() {
            let _ = self.control.send(Command::Seek(beats));
        } else {
            self.clock.hold(beats);
        }
    }

    /// Current playhead position in beats.
    pub fn position(&self) -> f64 {
        self.clock.position()
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

impl Drop for Sequencer {
    fn drop(&mut self) {
        let _ = self.control.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("sequencer worker panicked");
            }
        }
    }
}

fn worker_loop(commands: Receiver<Command>, clock: Arc<BeatClock>, playing: Arc<AtomicBool>) {
    let mut current: Option<PlaySpec> = None;
    let mut index = 0usize;

    loop {
        let Some(spec) = current.as_ref() else {
            // Idle: wait for the next command.
            match commands.recv() {
                Ok(Command::Play(spec)) => {
                    clock.roll(0.0, spec.tempo_bpm);
                    index = 0;
                    current = Some(spec);
                }
                Ok(Command::Stop) | Ok(Command::Seek(_)) => {}
                Ok(Command::Shutdown) | Err(_) => return,
            }
            continue;
        };

        if index >= spec.score.len() {
            // End of track.
            clock.hold(spec.score.duration_beats);
            playing.store(false, Ordering::SeqCst);
            debug!("end of track");
            current = None;
            continue;
        }

        let event = spec.score.events()[index];
        let wait_beats = (event.time_beats - clock.position()).max(0.0);
        let wait = Duration::from_secs_f64(wait_beats * 60.0 / spec.tempo_bpm);
        let destination = spec.destination.clone();

        match commands.recv_timeout(wait) {
            Ok(Command::Play(new_spec)) => {
                clock.roll(0.0, new_spec.tempo_bpm);
                index = 0;
                current = Some(new_spec);
            }
            Ok(Command::Stop) => {
                destination.all_notes_off();
                clock.hold(clock.position());
                current = None;
            }
            Ok(Command::Seek(beats)) => {
                if let Some(spec) = current.as_ref() {
                    index = spec.score.index_at(beats);
                    clock.roll(beats, spec.tempo_bpm);
                }
            }
            Ok(Command::Shutdown) => return,
            Err(RecvTimeoutError::Timeout) => {
                if !destination.send(event.to_midi()) {
                    // Instrument is gone; nothing left to drive.
                    clock.hold(clock.position());
                    playing.store(false, Ordering::SeqCst);
                    current = None;
                    continue;
                }
                index += 1;
            }
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::DirResolver;
    use crossbeam_channel::Sender as EventSender;
    use solista_core::{AudioGraph, InstrumentHandle, MusicDevice, NullBackend};
    use solista_midi::{ChannelEvent, MidiEvent};

    /// Device that forwards every delivery into a channel.
    struct Probe {
        events: EventSender<MidiEvent>,
        silences: EventSender<()>,
    }

    impl MusicDevice for Probe {
        fn handle_event(&mut self, event: MidiEvent) {
            let _ = self.events.send(event);
        }

        fn all_notes_off(&mut self) {
            let _ = self.silences.send(());
        }
    }

    fn probe_instrument() -> (
        InstrumentHandle,
        Receiver<MidiEvent>,
        Receiver<()>,
    ) {
        let (events_tx, events_rx) = unbounded();
        let (silences_tx, silences_rx) = unbounded();
        let handle = InstrumentHandle::new(
            "probe",
            Box::new(Probe {
                events: events_tx,
                silences: silences_tx,
            }),
        );
        (handle, events_rx, silences_rx)
    }

    fn running_state() -> EngineStateHandle {
        let mut graph = AudioGraph::new(Box::new(NullBackend::new()));
        graph.start().unwrap();
        graph.state_handle()
    }

    /// 96 tpb score: note-on at beat 0, note-off at beat 8. At the default
    /// 120 BPM the second event sits 4 s out, far beyond test horizons.
    fn two_event_score() -> MidiScore {
        let data = [
            0x4D, 0x54, 0x68, 0x64, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x01, 0x00, 0x60,
            0x4D, 0x54, 0x72, 0x6B, 0x00, 0x00, 0x00, 0x0D, //
            0x00, 0x90, 0x3C, 0x64, // NoteOn at beat 0
            0x86, 0x00, 0x80, 0x3C, 0x00, // +768 ticks = beat 8, NoteOff
            0x00, 0xFF, 0x2F, 0x00,
        ];
        MidiScore::parse(&data).unwrap()
    }

    fn ready_track() -> (Track, InstrumentHandle, Receiver<MidiEvent>, Receiver<()>) {
        let (handle, events, silences) = probe_instrument();
        let mut track = Track::new("Scale", two_event_score());
        track.bind_destination(&handle);
        (track, handle, events, silences)
    }

    #[test]
    fn test_start_requires_running_engine() {
        let sequencer = Sequencer::new(EngineStateHandle::new());
        let (track, _handle, _events, _silences) = ready_track();
        sequencer.install(track);

        let err = sequencer.start().unwrap_err();
        assert!(matches!(err, Error::NotReady(_)));
        assert!(!sequencer.is_playing());
    }

    #[test]
    fn test_start_requires_track_and_destination() {
        let sequencer = Sequencer::new(running_state());
        assert!(matches!(sequencer.start(), Err(Error::NotReady(_))));

        sequencer.install(Track::new("Scale", two_event_score()));
        assert!(matches!(sequencer.start(), Err(Error::NotReady(_))));
    }

    #[test]
    fn test_start_delivers_events() {
        let sequencer = Sequencer::new(running_state());
        let (track, _handle, events, _silences) = ready_track();
        sequencer.install(track);

        sequencer.start().unwrap();
        let event = events.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(
            event.event,
            ChannelEvent::NoteOn {
                note: 60,
                velocity: 100
            }
        );
        assert!(sequencer.is_playing());
    }

    #[test]
    fn test_restart_resets_position_to_zero() {
        let sequencer = Sequencer::new(running_state());
        let (track, _handle, events, _silences) = ready_track();
        sequencer.install(track);

        sequencer.start().unwrap();
        events.recv_timeout(Duration::from_secs(2)).unwrap();
        // let the playhead travel a bit
        std::thread::sleep(Duration::from_millis(150));
        let progressed = sequencer.position();
        assert!(progressed > 0.0);

        // second start without stop: playback begins at 0 again
        sequencer.start().unwrap();
        let event = events.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(
            event.event,
            ChannelEvent::NoteOn {
                note: 60,
                velocity: 100
            }
        );
        assert!(sequencer.position() < progressed);
    }

    #[test]
    fn test_stop_is_idempotent_and_silences() {
        let sequencer = Sequencer::new(running_state());
        let (track, _handle, events, silences) = ready_track();
        sequencer.install(track);

        sequencer.stop();
        assert!(!sequencer.is_playing());

        sequencer.start().unwrap();
        events.recv_timeout(Duration::from_secs(2)).unwrap();
        sequencer.stop();
        assert!(!sequencer.is_playing());
        silences.recv_timeout(Duration::from_secs(2)).unwrap();

        // stopping again changes nothing
        sequencer.stop();
        assert!(!sequencer.is_playing());
    }

    #[test]
    fn test_dropped_instrument_halts_playback() {
        let sequencer = Sequencer::new(running_state());
        let (track, handle, events, _silences) = ready_track();
        sequencer.install(track);

        sequencer.start().unwrap();
        events.recv_timeout(Duration::from_secs(2)).unwrap();

        // The slot released the instrument; the late note-off must not be
        // delivered anywhere.
        drop(handle);
        sequencer.seek(8.0);
        assert!(events.recv_timeout(Duration::from_millis(300)).is_err());
    }

    #[test]
    fn test_seek_while_stopped_moves_playhead() {
        let sequencer = Sequencer::new(running_state());
        sequencer.seek(3.0);
        assert_eq!(sequencer.position(), 3.0);
    }

    #[test]
    fn test_load_track_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let sequencer = Sequencer::new(EngineStateHandle::new());
        let resolver = DirResolver::new(dir.path());

        let err = sequencer.load_track(&resolver, "Scale").unwrap_err();
        assert!(matches!(err, Error::NotFound(name) if name == "Scale"));
    }

    #[test]
    fn test_load_track_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Scale.mid"), b"garbage").unwrap();
        let sequencer = Sequencer::new(EngineStateHandle::new());
        let resolver = DirResolver::new(dir.path());

        let err = sequencer.load_track(&resolver, "Scale").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
