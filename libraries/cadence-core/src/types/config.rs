//! Playback configuration

use super::parameters::{Parameters, DEFAULT_PROGRESS_UPDATE_INTERVAL_MILLIS};
use serde::{Deserialize, Serialize};

/// Configuration for players and the focus coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial progress update interval (default: 500ms)
    pub progress_update_interval_millis: i64,

    /// Lower volume instead of pausing when another app takes transient focus (default: true)
    pub should_duck: bool,

    /// Volume multiplier applied while ducking (default: 0.5)
    pub duck_volume_factor: f32,

    /// Keep playing and allow focus requests while the host is backgrounded (default: false)
    pub stays_active_in_background: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            progress_update_interval_millis: DEFAULT_PROGRESS_UPDATE_INTERVAL_MILLIS,
            should_duck: true,
            duck_volume_factor: 0.5,
            stays_active_in_background: false,
        }
    }
}

impl PlaybackConfig {
    /// Parameters a freshly created player starts from
    pub fn initial_parameters(&self) -> Parameters {
        Parameters {
            progress_update_interval_millis: self.progress_update_interval_millis,
            ..Parameters::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.progress_update_interval_millis, 500);
        assert!(config.should_duck);
        assert_eq!(config.duck_volume_factor, 0.5);
        assert!(!config.stays_active_in_background);
    }

    #[test]
    fn initial_parameters_use_configured_interval() {
        let config = PlaybackConfig {
            progress_update_interval_millis: 250,
            ..PlaybackConfig::default()
        };
        let params = config.initial_parameters();
        assert_eq!(params.progress_update_interval_millis, 250);
        assert!(!params.should_play);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: PlaybackConfig =
            serde_json::from_str(r#"{ "should_duck": false }"#).unwrap();
        assert!(!config.should_duck);
        assert_eq!(config.duck_volume_factor, 0.5);
    }
}
