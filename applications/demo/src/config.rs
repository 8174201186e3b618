/// Demo configuration
use crate::error::{DemoError, Result};
use cadence_core::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DemoConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub session: SessionSettings,
}

/// What the scripted session plays and how
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionSettings {
    #[serde(default = "default_uri")]
    pub uri: String,

    /// Length of the simulated media
    #[serde(default = "default_duration_millis")]
    pub duration_millis: u64,

    #[serde(default = "default_volume")]
    pub volume: f32,

    #[serde(default = "default_rate")]
    pub rate: f64,

    #[serde(default)]
    pub looping: bool,

    /// When another app briefly takes focus, measured from session start
    #[serde(default = "default_interruption_after_millis")]
    pub interruption_after_millis: u64,

    /// Whether the simulated OS grants focus requests
    #[serde(default = "default_grant_focus")]
    pub grant_focus: bool,
}

impl DemoConfig {
    /// Load configuration from an optional TOML file and the environment
    ///
    /// Environment variables are prefixed with `CADENCE_` and nest with a
    /// double underscore, e.g. `CADENCE_SESSION__RATE=1.5`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(DemoError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            settings = settings.add_source(config::File::from(path));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let factor = self.playback.duck_volume_factor;
        if !(0.0..=1.0).contains(&factor) {
            return Err(DemoError::Config(format!(
                "duck_volume_factor must be within 0.0..=1.0, got {}",
                factor
            )));
        }

        if self.session.uri.trim().is_empty() {
            return Err(DemoError::Config("session uri is required".to_string()));
        }

        if self.session.duration_millis == 0 {
            return Err(DemoError::Config(
                "session duration_millis must be positive".to_string(),
            ));
        }

        if self.session.rate < 0.0 {
            return Err(DemoError::Config(format!(
                "session rate must not be negative, got {}",
                self.session.rate
            )));
        }

        if !(0.0..=1.0).contains(&self.session.volume) {
            return Err(DemoError::Config(format!(
                "session volume must be within 0.0..=1.0, got {}",
                self.session.volume
            )));
        }

        Ok(())
    }
}

// Default values
fn default_uri() -> String {
    "file:///demo/tone.ogg".to_string()
}

fn default_duration_millis() -> u64 {
    4_000
}

fn default_volume() -> f32 {
    0.8
}

fn default_rate() -> f64 {
    1.0
}

fn default_interruption_after_millis() -> u64 {
    1_200
}

fn default_grant_focus() -> bool {
    true
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            duration_millis: default_duration_millis(),
            volume: default_volume(),
            rate: default_rate(),
            looping: false,
            interruption_after_millis: default_interruption_after_millis(),
            grant_focus: default_grant_focus(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = DemoConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.playback.progress_update_interval_millis, 500);
        assert_eq!(config.session.duration_millis, 4_000);
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[playback]\nshould_duck = false\n\n[session]\nrate = 2.0\nlooping = true"
        )
        .unwrap();

        let config = DemoConfig::load(Some(file.path())).unwrap();

        assert!(!config.playback.should_duck);
        assert_eq!(config.playback.duck_volume_factor, 0.5);
        assert_eq!(config.session.rate, 2.0);
        assert!(config.session.looping);
        assert_eq!(config.session.volume, 0.8);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = DemoConfig::load(Some(Path::new("/nonexistent/cadence.toml"))).unwrap_err();
        assert!(matches!(err, DemoError::Config(_)));
    }

    #[test]
    fn validation_rejects_out_of_range_values() {
        let mut config = DemoConfig::default();
        config.playback.duck_volume_factor = 1.5;
        assert!(config.validate().is_err());

        let mut config = DemoConfig::default();
        config.session.rate = -1.0;
        assert!(config.validate().is_err());

        let mut config = DemoConfig::default();
        config.session.uri = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
