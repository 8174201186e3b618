//! Core types for playback control

pub mod config;
pub mod media;
pub mod parameters;
pub mod status;

pub use config::PlaybackConfig;
pub use media::{MediaSource, SoundKey, SurfaceHandle, VideoSize};
pub use parameters::{Parameters, ParametersUpdate, DEFAULT_PROGRESS_UPDATE_INTERVAL_MILLIS};
pub use status::Status;
