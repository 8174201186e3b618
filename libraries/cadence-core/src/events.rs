//! Events pushed by the underlying player
//!
//! Players deliver these on the channel handed to them through
//! [`MediaPlayer::attach_events`](crate::MediaPlayer::attach_events), in the
//! order they occurred.

use crate::types::VideoSize;
use tokio::sync::mpsc;

/// Asynchronous notifications from the underlying player
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Playback stalled waiting for data
    BufferingStarted,

    /// More data arrived while buffering
    BufferingProgress {
        /// Amount of media buffered so far
        buffered_millis: u64,
    },

    /// Enough data to continue
    BufferingStopped,

    /// Playback reached the end of the media
    Completed,

    /// A seek request finished
    SeekCompleted,

    /// The player hit an error; the message is forwarded verbatim
    Error {
        message: String,
    },

    /// Video frame dimensions changed
    VideoSizeChanged(VideoSize),

    /// Some observable property changed
    StatusUpdated,
}

/// Sending half handed to players
pub type PlayerEventSender = mpsc::UnboundedSender<PlayerEvent>;

/// Receiving half consumed by the control core
pub type PlayerEventReceiver = mpsc::UnboundedReceiver<PlayerEvent>;

/// Create a player event channel
pub fn player_event_channel() -> (PlayerEventSender, PlayerEventReceiver) {
    mpsc::unbounded_channel()
}
