//! Cadence Core
//!
//! Value types and collaborator contracts for the Cadence playback control core.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Intent**: `Parameters`, the desired playback behaviour, and
//!   `ParametersUpdate`, the partial map callers send to change it
//! - **Observation**: `Status`, a snapshot projected from the live player
//! - **Collaborators**: `MediaPlayer`, `AudioFocus`, `AudioEventHandler`,
//!   `CookieProvider`, `FullscreenPresenter`
//! - **Error Handling**: unified `PlaybackError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{Parameters, ParametersUpdate};
//!
//! let params = Parameters::default();
//! let next = params.update(&ParametersUpdate {
//!     should_play: Some(true),
//!     volume: Some(0.5),
//!     ..Default::default()
//! });
//!
//! assert!(next.should_actually_play());
//! assert_eq!(next.rate, 1.0);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod events;
pub mod traits;
pub mod types;

pub use error::{PlaybackError, Result};
pub use events::{player_event_channel, PlayerEvent, PlayerEventReceiver, PlayerEventSender};
pub use traits::{AudioEventHandler, AudioFocus, CookieProvider, FullscreenPresenter, MediaPlayer};
pub use types::{
    MediaSource, Parameters, ParametersUpdate, PlaybackConfig, SoundKey, Status, SurfaceHandle,
    VideoSize,
};
