//! UI-facing controller notifications.

/// Events the UI layer consumes off the controller's channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// The instrument list was refreshed; re-display.
    InstrumentsUpdated { count: usize },

    /// A directory query failed; the previous list is still shown.
    DirectoryQueryFailed { reason: String },

    /// Whether the play control should be enabled.
    PlayEnabled(bool),

    /// An instrument finished binding and the track is routed to it.
    InstrumentBound { name: String },

    /// A selection completed after a newer one started and was discarded.
    SelectionSuperseded { name: String },

    /// A selection failed; the previous binding (if any) is untouched.
    SelectionFailed { name: String, reason: String },

    PlaybackStarted,
    PlaybackStopped,
}
