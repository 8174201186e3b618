/// Collaborator contracts for the playback control core
use crate::error::Result;
use crate::events::PlayerEventSender;
use crate::types::{MediaSource, SurfaceHandle, VideoSize};
use async_trait::async_trait;
use std::sync::Weak;

/// Underlying media player
///
/// Implementers decode and render media; the control core only issues
/// commands and reads properties. Commands must not block and must not call
/// back into the core synchronously: events go through the channel given to
/// [`attach_events`](MediaPlayer::attach_events).
#[async_trait]
pub trait MediaPlayer: Send + Sync {
    /// Open a media source
    ///
    /// # Errors
    /// Returns `PlaybackError::Load` if the source cannot be opened
    async fn load(&self, source: &MediaSource, cookies: &[String]) -> Result<()>;

    /// Start or resume playback
    fn play(&self, is_muted: bool, rate: f64, should_correct_pitch: bool);

    /// Pause without fading
    fn pause_immediately(&self);

    /// Seek to a position in milliseconds
    fn seek_to(&self, position_millis: u64);

    /// Attach (or detach with `None`) a rendering surface
    fn set_surface(&self, surface: Option<SurfaceHandle>, should_play: bool);

    /// Release decoder and output resources
    fn release(&self);

    /// Hand the player the channel it delivers events on
    fn attach_events(&self, events: PlayerEventSender);

    fn is_loaded(&self) -> bool;

    fn is_playing(&self) -> bool;

    fn is_buffering(&self) -> bool;

    fn duration_millis(&self) -> u64;

    fn current_position_millis(&self) -> u64;

    /// Amount of media that can be played without further buffering, if known
    fn playable_duration_millis(&self) -> Option<u64>;

    fn is_looping(&self) -> bool;

    fn set_looping(&self, looping: bool);

    fn volume(&self) -> f32;

    fn set_volume(&self, volume: f32);

    fn audio_session_id(&self) -> i32;

    fn video_size(&self) -> Option<VideoSize>;

    /// Whether periodic progress updates are still meaningful
    ///
    /// Typically `false` once unloaded, paused or parked at the end.
    fn continue_updating_progress(&self) -> bool;
}

/// Shared audio-focus arbiter
///
/// One instance is shared by every active player in the process.
pub trait AudioFocus: Send + Sync {
    /// Acquire (or confirm) audio focus
    ///
    /// # Errors
    /// Returns `PlaybackError::FocusNotAcquired` when focus is denied
    fn acquire_focus(&self) -> Result<()>;

    /// Give focus back if no registered handler still needs it
    fn abandon_focus_if_unused(&self);

    /// Volume to apply given the mute flag and the current duck/focus state
    fn volume_for_duck_and_focus(&self, is_muted: bool, volume: f32) -> f32;

    /// Register a handler for focus and host lifecycle events
    ///
    /// Arbiters that never deliver events may ignore registrations.
    fn register_handler(&self, handler: Weak<dyn AudioEventHandler>) {
        let _ = handler;
    }
}

/// Receiver of focus and host lifecycle events
pub trait AudioEventHandler: Send + Sync {
    /// Another app took focus
    fn handle_audio_focus_interruption_began(&self);

    /// Focus came back
    fn handle_audio_focus_gained(&self);

    /// The host went to the background
    fn on_pause(&self);

    /// The host came back to the foreground
    fn on_resume(&self);

    fn pause_immediately(&self);

    /// Whether this handler is audibly playing and needs focus
    fn requires_audio_focus(&self) -> bool;

    /// Re-apply the effective volume after a duck or focus change
    fn update_volume_mute_and_duck(&self);
}

/// Source of cookies sent along with a media request
pub trait CookieProvider: Send + Sync {
    /// Cookie header values for the given URI
    ///
    /// # Errors
    /// Returns an I/O error if the cookie store cannot be read
    fn cookies_for(&self, uri: &str) -> std::io::Result<Vec<String>>;
}

/// Presenter able to show a video fullscreen
pub trait FullscreenPresenter: Send + Sync {
    fn is_presented_fullscreen(&self) -> bool;

    fn set_fullscreen_mode(&self, fullscreen: bool);
}
