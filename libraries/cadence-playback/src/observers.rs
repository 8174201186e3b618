//! Observer registry
//!
//! One place holding every optional observer slot of a player, with a single
//! fan-out point. Once closed (on release) nothing is delivered again, even
//! for notifications computed before the close.

use cadence_core::{FullscreenPresenter, Status, VideoSize};
use parking_lot::RwLock;
use std::sync::Arc;

/// Receives status snapshots
pub type StatusListener = Arc<dyn Fn(&Status) + Send + Sync>;

/// Receives player error messages
pub type ErrorListener = Arc<dyn Fn(&str) + Send + Sync>;

/// Receives video size changes
pub type VideoSizeListener = Arc<dyn Fn(VideoSize) + Send + Sync>;

/// Something to tell observers
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Status(Status),
    Error(String),
    VideoSize(VideoSize),
}

#[derive(Default)]
struct Slots {
    status: Option<StatusListener>,
    error: Option<ErrorListener>,
    video_size: Option<VideoSizeListener>,
    fullscreen: Option<Arc<dyn FullscreenPresenter>>,
    closed: bool,
}

/// Optional observers of a single player
///
/// Listeners run under a shared lock: they may call back into the player,
/// but must not replace listeners or release the player from inside a
/// callback.
#[derive(Default)]
pub struct ObserverRegistry {
    slots: RwLock<Slots>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status_listener(&self, listener: Option<StatusListener>) {
        self.slots.write().status = listener;
    }

    pub fn set_error_listener(&self, listener: Option<ErrorListener>) {
        self.slots.write().error = listener;
    }

    pub fn set_video_size_listener(&self, listener: Option<VideoSizeListener>) {
        self.slots.write().video_size = listener;
    }

    pub fn set_fullscreen_presenter(&self, presenter: Option<Arc<dyn FullscreenPresenter>>) {
        self.slots.write().fullscreen = presenter;
    }

    pub fn fullscreen_presenter(&self) -> Option<Arc<dyn FullscreenPresenter>> {
        self.slots.read_recursive().fullscreen.clone()
    }

    pub fn has_status_listener(&self) -> bool {
        self.slots.read_recursive().status.is_some()
    }

    /// Deliver notifications in order; returns how many reached a listener
    pub fn dispatch(&self, notifications: impl IntoIterator<Item = Notification>) -> usize {
        let slots = self.slots.read_recursive();
        if slots.closed {
            return 0;
        }

        let mut delivered = 0;
        for notification in notifications {
            match notification {
                Notification::Status(status) => {
                    if let Some(listener) = &slots.status {
                        listener(&status);
                        delivered += 1;
                    }
                }
                Notification::Error(message) => {
                    if let Some(listener) = &slots.error {
                        listener(&message);
                        delivered += 1;
                    } else {
                        tracing::debug!("Dropping player error with no listener: {}", message);
                    }
                }
                Notification::VideoSize(size) => {
                    if let Some(listener) = &slots.video_size {
                        listener(size);
                        delivered += 1;
                    }
                }
            }
        }
        delivered
    }

    /// Drop every observer and refuse further deliveries
    ///
    /// Blocks until an in-flight dispatch has finished.
    pub fn close(&self) {
        let mut slots = self.slots.write();
        *slots = Slots {
            closed: true,
            ..Slots::default()
        };
    }

    pub fn is_closed(&self) -> bool {
        self.slots.read_recursive().closed
    }
}
