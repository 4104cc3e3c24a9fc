//! Channel-voice event types used for playback delivery.

/// Channel-voice messages supported for playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Note On: note number (0-127), velocity (0-127)
    NoteOn { note: u8, velocity: u8 },

    /// Note Off: note number (0-127), velocity (0-127)
    NoteOff { note: u8, velocity: u8 },

    /// Control Change: controller (0-127), value (0-127)
    ControlChange { controller: u8, value: u8 },

    /// Program Change: program (0-127)
    ProgramChange { program: u8 },

    /// Pitch Bend: value centered at 0 (-8192 to 8191)
    PitchBend { value: i16 },
}

/// An event addressed to a MIDI channel, ready for delivery to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEvent {
    /// MIDI channel (0-15)
    pub channel: u8,
    pub event: ChannelEvent,
}

impl MidiEvent {
    #[inline]
    pub fn new(channel: u8, event: ChannelEvent) -> Self {
        Self { channel, event }
    }

    #[inline]
    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            channel,
            event: ChannelEvent::NoteOn { note, velocity },
        }
    }

    #[inline]
    pub fn note_off(channel: u8, note: u8) -> Self {
        Self {
            channel,
            event: ChannelEvent::NoteOff { note, velocity: 0 },
        }
    }
}

/// A channel-voice event with an absolute timestamp in beats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEvent {
    /// Absolute time in beats from the start of the score.
    pub time_beats: f64,

    /// MIDI channel (0-15)
    pub channel: u8,

    pub event: ChannelEvent,
}

impl TimedEvent {
    /// Strip the timestamp for delivery.
    #[inline]
    pub fn to_midi(self) -> MidiEvent {
        MidiEvent {
            channel: self.channel,
            event: self.event,
        }
    }
}

#[inline]
pub fn note_to_hz(note: f32) -> f32 {
    440.0 * 2f32.powf((note - 69.0) / 12.0)
}

#[inline]
pub fn velocity_to_gain(velocity: u8) -> f32 {
    velocity as f32 / 127.0
}
