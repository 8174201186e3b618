//! Error types for playback control

use crate::types::SoundKey;
use thiserror::Error;

/// Result type alias using `PlaybackError`
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Errors surfaced by the playback control core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The audio focus arbiter refused to grant focus
    #[error("Audio focus not acquired: {0}")]
    FocusNotAcquired(String),

    /// Loading the media source failed; terminal for that load attempt
    #[error("Load error: {0}")]
    Load(String),

    /// Error reported by the underlying player
    #[error("Playback error: {0}")]
    Playback(String),

    /// No sound is registered under the given key
    #[error("Player does not exist: {0}")]
    NoPlayer(SoundKey),

    /// A partial update could not be interpreted
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The player has been released
    #[error("Player has been released")]
    Released,

    /// No async runtime is available to host background tasks
    #[error("Runtime unavailable: {0}")]
    Runtime(String),
}

impl PlaybackError {
    /// Create a focus error
    pub fn focus(msg: impl Into<String>) -> Self {
        Self::FocusNotAcquired(msg.into())
    }

    /// Create a load error
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Create an error reported by the player
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Stable code reported to callers alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            Self::FocusNotAcquired(_) | Self::InvalidArguments(_) => "E_AV_SETSTATUS",
            Self::Load(_) => "E_LOAD_ERROR",
            Self::Playback(_) => "E_AV_PLAYBACK",
            Self::NoPlayer(_) => "E_AUDIO_NOPLAYER",
            Self::Released => "E_AV_RELEASED",
            Self::Runtime(_) => "E_AV_RUNTIME",
        }
    }
}
