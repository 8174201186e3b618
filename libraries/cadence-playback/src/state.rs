//! Playback phase state machine
//!
//! Tracks where the player is in its lifecycle so that events arriving in
//! an impossible phase (a completion before anything was loaded, buffering
//! after release) are rejected explicitly instead of acted upon.

use thiserror::Error;

/// Lifecycle phase of a controlled player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing loaded, or released
    Unloaded,

    /// Loaded and not advancing
    Paused,

    /// Loaded and advancing
    Playing,

    /// Stalled waiting for data
    Buffering,

    /// Reached the end without looping
    Completed,
}

/// Inputs to the phase machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    /// Media finished loading
    Loaded,

    /// A play command was issued
    PlayStarted,

    /// A pause command was issued (by the caller, a focus loss or the host)
    Paused,

    BufferingStarted,

    /// Buffering ended; `playing` is the player's state at that moment
    BufferingStopped { playing: bool },

    /// End of media; looping players keep playing
    Finished { looping: bool },

    SeekCompleted,

    /// Load failed or the player was released
    Unloaded,
}

/// An event that has no meaning in the current phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{event:?} is not valid while {from:?}")]
pub struct RejectedTransition {
    pub from: Phase,
    pub event: PhaseEvent,
}

impl Phase {
    /// Whether media is loaded in this phase
    pub fn is_loaded(self) -> bool {
        !matches!(self, Phase::Unloaded)
    }

    /// Apply an event, returning the next phase
    pub fn on(self, event: PhaseEvent) -> Result<Phase, RejectedTransition> {
        use Phase::{Buffering, Completed, Paused, Playing, Unloaded};

        let next = match (self, event) {
            (_, PhaseEvent::Unloaded) => Unloaded,

            (Unloaded, PhaseEvent::Loaded) => Paused,

            // Commands are only meaningful once something is loaded
            (Paused | Playing | Completed, PhaseEvent::PlayStarted) => Playing,
            (Buffering, PhaseEvent::PlayStarted) => Buffering,
            (Paused | Playing | Buffering | Completed, PhaseEvent::Paused) => Paused,

            (Paused | Playing, PhaseEvent::BufferingStarted) => Buffering,
            (Buffering, PhaseEvent::BufferingStarted) => Buffering,
            (Buffering, PhaseEvent::BufferingStopped { playing: true }) => Playing,
            (Buffering, PhaseEvent::BufferingStopped { playing: false }) => Paused,
            (Paused | Playing, PhaseEvent::BufferingStopped { .. }) => self,

            (Playing | Buffering, PhaseEvent::Finished { looping: true }) => Playing,
            // A completion queued before a pause still reports the finish
            (Paused, PhaseEvent::Finished { looping: true }) => Paused,
            (Playing | Buffering | Paused, PhaseEvent::Finished { looping: false }) => Completed,

            (Paused | Playing | Buffering, PhaseEvent::SeekCompleted) => self,
            (Completed, PhaseEvent::SeekCompleted) => Paused,

            _ => return Err(RejectedTransition { from: self, event }),
        };

        Ok(next)
    }
}
