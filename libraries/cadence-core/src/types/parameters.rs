//! Desired playback parameters and partial updates

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const SHOULD_PLAY_KEY: &str = "shouldPlay";
const RATE_KEY: &str = "rate";
const SHOULD_CORRECT_PITCH_KEY: &str = "shouldCorrectPitch";
const VOLUME_KEY: &str = "volume";
const IS_MUTED_KEY: &str = "isMuted";
const IS_LOOPING_KEY: &str = "isLooping";
const PROGRESS_UPDATE_INTERVAL_KEY: &str = "progressUpdateIntervalMillis";

/// Default progress update interval in milliseconds
pub const DEFAULT_PROGRESS_UPDATE_INTERVAL_MILLIS: i64 = 500;

/// Desired playback intent
///
/// Replaced wholesale on every update; never mutated in place. Values are
/// not validated here (a volume of 1.5 is stored as-is), clamping is left
/// to the underlying player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    /// Caller wants audible progress
    pub should_play: bool,

    /// Playback rate; 0 means "not actually playing" even if `should_play` is set
    pub rate: f64,

    /// Keep pitch constant while rate changes
    pub should_correct_pitch: bool,

    /// Requested volume (0.0 - 1.0)
    pub volume: f32,

    /// Muted playback
    pub is_muted: bool,

    /// Restart from the beginning on completion
    pub is_looping: bool,

    /// Interval between periodic status pushes; 0 or negative disables them
    pub progress_update_interval_millis: i64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            should_play: false,
            rate: 1.0,
            should_correct_pitch: false,
            volume: 1.0,
            is_muted: false,
            is_looping: false,
            progress_update_interval_millis: DEFAULT_PROGRESS_UPDATE_INTERVAL_MILLIS,
        }
    }
}

impl Parameters {
    /// Merge a partial update, keeping this value for every absent field
    pub fn update(&self, partial: &ParametersUpdate) -> Parameters {
        Parameters {
            should_play: partial.should_play.unwrap_or(self.should_play),
            rate: partial.rate.unwrap_or(self.rate),
            should_correct_pitch: partial
                .should_correct_pitch
                .unwrap_or(self.should_correct_pitch),
            volume: partial.volume.unwrap_or(self.volume),
            is_muted: partial.is_muted.unwrap_or(self.is_muted),
            is_looping: partial.is_looping.unwrap_or(self.is_looping),
            progress_update_interval_millis: partial
                .progress_update_interval_millis
                .unwrap_or(self.progress_update_interval_millis),
        }
    }

    /// `should_play` and a positive rate
    pub fn should_actually_play(&self) -> bool {
        self.should_play && self.rate > 0.0
    }
}

/// Partial update map: `None` keeps the previous value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParametersUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_play: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_correct_pitch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_muted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_looping: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_update_interval_millis: Option<i64>,
}

impl ParametersUpdate {
    /// Update that only toggles `should_play`
    pub fn should_play(should_play: bool) -> Self {
        Self {
            should_play: Some(should_play),
            ..Self::default()
        }
    }

    /// Compose two updates; fields present in `later` win
    pub fn then(&self, later: &ParametersUpdate) -> ParametersUpdate {
        ParametersUpdate {
            should_play: later.should_play.or(self.should_play),
            rate: later.rate.or(self.rate),
            should_correct_pitch: later.should_correct_pitch.or(self.should_correct_pitch),
            volume: later.volume.or(self.volume),
            is_muted: later.is_muted.or(self.is_muted),
            is_looping: later.is_looping.or(self.is_looping),
            progress_update_interval_millis: later
                .progress_update_interval_millis
                .or(self.progress_update_interval_millis),
        }
    }

    /// True if no field is present
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Read a caller-supplied argument map
    ///
    /// Unrecognised keys are ignored so status read-back fields may ride
    /// along. Integers are accepted for float fields and fractional
    /// intervals are truncated.
    pub fn from_json(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| PlaybackError::invalid_arguments("expected an object"))?;

        Ok(Self {
            should_play: read_bool(map, SHOULD_PLAY_KEY)?,
            rate: read_f64(map, RATE_KEY)?,
            should_correct_pitch: read_bool(map, SHOULD_CORRECT_PITCH_KEY)?,
            volume: read_f64(map, VOLUME_KEY)?.map(|v| v as f32),
            is_muted: read_bool(map, IS_MUTED_KEY)?,
            is_looping: read_bool(map, IS_LOOPING_KEY)?,
            progress_update_interval_millis: read_f64(map, PROGRESS_UPDATE_INTERVAL_KEY)?
                .map(|v| v as i64),
        })
    }
}

fn read_bool(map: &Map<String, Value>, key: &str) -> Result<Option<bool>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(PlaybackError::invalid_arguments(format!(
            "{key} must be a boolean, got {other}"
        ))),
    }
}

fn read_f64(map: &Map<String, Value>, key: &str) -> Result<Option<f64>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_f64().map(Some).ok_or_else(|| {
            PlaybackError::invalid_arguments(format!("{key} is not representable"))
        }),
        Some(other) => Err(PlaybackError::invalid_arguments(format!(
            "{key} must be a number, got {other}"
        ))),
    }
}
