//! Observed player status

use serde::{Deserialize, Serialize};

/// Snapshot of the live player state
///
/// Always computed fresh from the player; `did_just_finish` is only set on
/// the snapshot delivered with a completion notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub is_loaded: bool,
    pub is_playing: bool,
    pub is_buffering: bool,
    pub duration_millis: u64,
    pub position_millis: u64,
    pub playable_duration_millis: u64,
    pub did_just_finish: bool,
}

impl Status {
    /// Status reported for an unloaded (or just unloaded) player
    pub fn unloaded() -> Self {
        Self::default()
    }

    /// Same snapshot, flagged as the completion notification
    #[must_use]
    pub fn finished(self) -> Self {
        Self {
            did_just_finish: true,
            ..self
        }
    }
}
