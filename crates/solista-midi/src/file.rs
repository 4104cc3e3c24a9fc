//! Standard MIDI File parsing.
//!
//! Uses the `midly` crate to parse SMF data and flattens it into a single
//! beat-timed event list suitable for sequenced playback.

use crate::error::{Error, Result};
use crate::event::{ChannelEvent, TimedEvent};
use midly::{MetaMessage, MidiMessage, Smf, Timing, Track, TrackEventKind};
use std::path::Path;
use tracing::debug;

/// A parsed MIDI file, flattened and ready for playback.
///
/// Events from all SMF tracks are merged and sorted by absolute beat time.
#[derive(Debug, Clone)]
pub struct MidiScore {
    events: Vec<TimedEvent>,

    /// Ticks per quarter note from the SMF header.
    pub ticks_per_beat: u16,

    /// Tempo in BPM from the first tempo meta event, or 120 if none.
    pub tempo_bpm: f64,

    /// Total duration in beats.
    pub duration_beats: f64,
}

impl MidiScore {
    /// Load and parse a MIDI file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::parse(&data)
    }

    /// Parse SMF data from bytes.
    ///
    /// SMPTE-timecode files are rejected as [`Error::UnsupportedTiming`];
    /// only metrical (ticks-per-beat) timing is supported.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let smf = Smf::parse(data)?;

        let ticks_per_beat = match smf.header.timing {
            Timing::Metrical(tpb) => tpb.as_int(),
            Timing::Timecode(_, _) => return Err(Error::UnsupportedTiming),
        };

        let mut events = Vec::new();
        let mut tempo_bpm = 120.0;
        let mut found_tempo = false;

        for track in smf.tracks.iter() {
            if !found_tempo {
                if let Some(tempo) = extract_tempo(track) {
                    tempo_bpm = tempo;
                    found_tempo = true;
                }
            }

            events.extend(parse_track(track, ticks_per_beat));
        }

        events.sort_by(|a, b| {
            a.time_beats
                .partial_cmp(&b.time_beats)
                .expect("event time is never NaN")
        });

        let duration_beats = events.last().map(|e| e.time_beats).unwrap_or(0.0);

        debug!(
            tracks = smf.tracks.len(),
            events = events.len(),
            tempo_bpm,
            duration_beats,
            "parsed MIDI score"
        );

        Ok(Self {
            events,
            ticks_per_beat,
            tempo_bpm,
            duration_beats,
        })
    }

    /// All events, sorted by beat time.
    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Index of the first event at or after `beats`.
    pub fn index_at(&self, beats: f64) -> usize {
        self.events
            .partition_point(|e| e.time_beats < beats)
    }
}

fn parse_track(track: &Track, ticks_per_beat: u16) -> Vec<TimedEvent> {
    let mut events = Vec::new();
    let mut current_tick = 0u64;

    for event in track.iter() {
        current_tick += event.delta.as_int() as u64;
        let time_beats = current_tick as f64 / ticks_per_beat as f64;

        if let Some(timed) = convert_event(&event.kind, time_beats) {
            events.push(timed);
        }
    }

    events
}

fn convert_event(kind: &TrackEventKind, time_beats: f64) -> Option<TimedEvent> {
    let TrackEventKind::Midi { channel, message } = kind else {
        // Meta and sysex events are not played back.
        return None;
    };

    let event = match message {
        MidiMessage::NoteOn { key, vel } => {
            // Running-status files encode Note Off as Note On with velocity 0.
            if vel.as_int() == 0 {
                ChannelEvent::NoteOff {
                    note: key.as_int(),
                    velocity: 0,
                }
            } else {
                ChannelEvent::NoteOn {
                    note: key.as_int(),
                    velocity: vel.as_int(),
                }
            }
        }
        MidiMessage::NoteOff { key, vel } => ChannelEvent::NoteOff {
            note: key.as_int(),
            velocity: vel.as_int(),
        },
        MidiMessage::Controller { controller, value } => ChannelEvent::ControlChange {
            controller: controller.as_int(),
            value: value.as_int(),
        },
        MidiMessage::ProgramChange { program } => ChannelEvent::ProgramChange {
            program: program.as_int(),
        },
        MidiMessage::PitchBend { bend } => ChannelEvent::PitchBend {
            value: bend.as_int(),
        },
        _ => return None,
    };

    Some(TimedEvent {
        time_beats,
        channel: channel.as_int(),
        event,
    })
}

fn extract_tempo(track: &Track) -> Option<f64> {
    for event in track.iter() {
        if let TrackEventKind::Meta(MetaMessage::Tempo(tempo)) = &event.kind {
            // Tempo meta is microseconds per quarter note.
            let us_per_qn = tempo.as_int();
            return Some(60_000_000.0 / us_per_qn as f64);
        }
    }
    None
}
