//! Cadence - Player Control Core
//!
//! Keeps an underlying media player consistent with the playback intent
//! callers express, while sharing the process-wide audio focus with every
//! other player.
//!
//! This crate provides:
//! - Parameter reconciliation (play/pause, rate, pitch, volume, mute, loop)
//! - Audio focus arbitration with ducking and host background handling
//! - Periodic progress updates on a cancellable timer
//! - An explicit playback phase machine fed by player events
//! - A keyed registry for fire-and-forget sounds
//!
//! # Architecture
//!
//! `cadence-playback` does not decode or render anything. The underlying
//! player, the platform focus service and the presenters are provided via
//! the traits in `cadence-core`. Background work (player events, progress
//! updates) runs on the ambient tokio runtime.
//!
//! # Example
//!
//! ```rust,no_run
//! use cadence_core::{MediaPlayer, MediaSource, ParametersUpdate, PlaybackConfig, Status};
//! use cadence_playback::{AudioFocusCoordinator, FocusBackend, PlayerManager};
//! use std::sync::Arc;
//!
//! # async fn run(player: Arc<dyn MediaPlayer>, backend: Arc<dyn FocusBackend>) -> cadence_core::Result<()> {
//! let config = PlaybackConfig::default();
//! let focus = Arc::new(AudioFocusCoordinator::new(backend, &config));
//!
//! let manager = PlayerManager::new(player, focus, MediaSource::new("file:///song.mp3"), &config)?;
//! manager.set_status_listener(Some(Arc::new(|status: &Status| {
//!     println!("{}ms / {}ms", status.position_millis, status.duration_millis);
//! })));
//!
//! let report = manager.load(&ParametersUpdate::should_play(true)).await?;
//! assert!(report.status.is_loaded);
//!
//! manager.pause()?;
//! manager.release();
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod focus;
pub mod manager;
pub mod observers;
pub mod progress;
pub mod registry;
pub mod state;

pub use focus::{AudioFocusCoordinator, AudioMode, FocusBackend, FocusChange};
pub use manager::{LoadReport, PlayerManager};
pub use observers::{ErrorListener, Notification, ObserverRegistry, StatusListener, VideoSizeListener};
pub use progress::{ProgressScheduler, Tick};
pub use registry::{PlayerFactory, SoundEvent, SoundEventReceiver, SoundRegistry};
pub use state::{Phase, PhaseEvent, RejectedTransition};

// Re-export core types for convenience
pub use cadence_core::{Parameters, ParametersUpdate, PlaybackConfig, PlaybackError, Result, Status};
