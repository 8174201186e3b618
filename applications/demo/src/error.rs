/// Demo error types
use cadence_core::PlaybackError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DemoError>;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Session timed out after {0}ms")]
    Timeout(u64),
}

impl From<config::ConfigError> for DemoError {
    fn from(err: config::ConfigError) -> Self {
        DemoError::Config(err.to_string())
    }
}
