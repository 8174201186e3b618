//! Process-wide audio focus coordinator
//!
//! Concrete [`AudioFocus`] arbiter sitting between every player in the
//! process and the platform's focus service. It tracks whether focus is held,
//! whether audio is ducked, and whether the host is backgrounded, and fans
//! focus changes and host lifecycle events out to registered handlers.
//!
//! Handlers are called with no coordinator lock held: a handler reacting to
//! an event may call straight back into `acquire_focus`.

use cadence_core::{AudioEventHandler, AudioFocus, PlaybackConfig, PlaybackError, Result};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

const BACKGROUND_FOCUS_MESSAGE: &str =
    "This experience is currently in the background, so audio focus could not be acquired.";
const DENIED_FOCUS_MESSAGE: &str = "Audio focus could not be acquired from the OS at this time.";

/// Platform focus service
pub trait FocusBackend: Send + Sync {
    /// Ask the platform for focus; `true` if granted
    fn request_focus(&self) -> bool;

    /// Give focus back to the platform
    fn abandon_focus(&self);
}

/// Focus changes reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusChange {
    /// Focus granted or returned
    Gain,

    /// Focus lost for an unbounded time
    Loss,

    /// Focus lost briefly; expect it back
    LossTransient,

    /// Focus lost briefly; playing on at lower volume is acceptable
    LossTransientCanDuck,
}

/// How this process shares audio with others
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioMode {
    /// Duck instead of pausing on a duckable loss
    pub should_duck: bool,

    /// Keep playing, and keep requesting focus, while backgrounded
    pub stays_active_in_background: bool,
}

impl From<&PlaybackConfig> for AudioMode {
    fn from(config: &PlaybackConfig) -> Self {
        Self {
            should_duck: config.should_duck,
            stays_active_in_background: config.stays_active_in_background,
        }
    }
}

#[derive(Debug)]
struct FocusState {
    acquired: bool,
    ducking: bool,
    app_paused: bool,
    mode: AudioMode,
    duck_volume_factor: f32,
}

/// Audio focus arbiter shared by every player
pub struct AudioFocusCoordinator {
    backend: Arc<dyn FocusBackend>,
    state: Mutex<FocusState>,
    handlers: Mutex<Vec<Weak<dyn AudioEventHandler>>>,
}

impl AudioFocusCoordinator {
    pub fn new(backend: Arc<dyn FocusBackend>, config: &PlaybackConfig) -> Self {
        Self {
            backend,
            state: Mutex::new(FocusState {
                acquired: false,
                ducking: false,
                app_paused: false,
                mode: AudioMode::from(config),
                duck_volume_factor: config.duck_volume_factor,
            }),
            handlers: Mutex::new(Vec::new()),
        }
    }

    /// Whether focus is currently held
    pub fn has_focus(&self) -> bool {
        self.state.lock().acquired
    }

    /// Whether audio is currently ducked
    pub fn is_ducking(&self) -> bool {
        self.state.lock().ducking
    }

    /// Number of live registered handlers
    pub fn handler_count(&self) -> usize {
        self.live_handlers().len()
    }

    pub fn audio_mode(&self) -> AudioMode {
        self.state.lock().mode
    }

    /// Change the audio mode; turning ducking off un-ducks every handler
    pub fn set_audio_mode(&self, mode: AudioMode) {
        let unduck = {
            let mut state = self.state.lock();
            state.mode = mode;
            if !mode.should_duck && state.ducking {
                state.ducking = false;
                true
            } else {
                !mode.should_duck
            }
        };

        if unduck {
            for handler in self.live_handlers() {
                handler.update_volume_mute_and_duck();
            }
        }
    }

    /// React to a platform focus change
    pub fn on_focus_change(&self, change: FocusChange) {
        tracing::debug!("Audio focus change: {:?}", change);

        match change {
            FocusChange::Gain => {
                {
                    let mut state = self.state.lock();
                    state.acquired = true;
                    state.ducking = false;
                }
                for handler in self.live_handlers() {
                    handler.update_volume_mute_and_duck();
                    handler.handle_audio_focus_gained();
                }
            }
            FocusChange::LossTransientCanDuck if self.state.lock().mode.should_duck => {
                self.state.lock().ducking = true;
                for handler in self.live_handlers() {
                    handler.update_volume_mute_and_duck();
                }
            }
            FocusChange::Loss | FocusChange::LossTransient | FocusChange::LossTransientCanDuck => {
                self.state.lock().acquired = false;
                for handler in self.live_handlers() {
                    handler.handle_audio_focus_interruption_began();
                }
                if change == FocusChange::Loss {
                    self.abandon_focus();
                }
            }
        }
    }

    /// The host went to the background
    pub fn on_host_pause(&self) {
        let stays_active = {
            let mut state = self.state.lock();
            if state.app_paused {
                return;
            }
            state.app_paused = true;
            state.mode.stays_active_in_background
        };

        if !stays_active {
            for handler in self.live_handlers() {
                handler.on_pause();
            }
            self.abandon_focus_if_unused();
        }
    }

    /// The host came back to the foreground
    pub fn on_host_resume(&self) {
        {
            let mut state = self.state.lock();
            if !state.app_paused {
                return;
            }
            state.app_paused = false;
        }

        for handler in self.live_handlers() {
            handler.on_resume();
        }
    }

    fn abandon_focus(&self) {
        let was_acquired = {
            let mut state = self.state.lock();
            let was_acquired = state.acquired;
            state.acquired = false;
            state.ducking = false;
            was_acquired
        };
        if was_acquired {
            tracing::debug!("Abandoning audio focus");
        }
        self.backend.abandon_focus();
    }

    /// Upgrade live handlers, pruning dropped ones
    fn live_handlers(&self) -> Vec<Arc<dyn AudioEventHandler>> {
        let mut handlers = self.handlers.lock();
        handlers.retain(|handler| handler.strong_count() > 0);
        handlers.iter().filter_map(Weak::upgrade).collect()
    }
}

impl AudioFocus for AudioFocusCoordinator {
    fn acquire_focus(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.acquired {
            return Ok(());
        }
        if state.app_paused && !state.mode.stays_active_in_background {
            tracing::warn!("Refusing audio focus while backgrounded");
            return Err(PlaybackError::focus(BACKGROUND_FOCUS_MESSAGE));
        }

        if self.backend.request_focus() {
            state.acquired = true;
            Ok(())
        } else {
            tracing::warn!("Audio focus request denied");
            Err(PlaybackError::focus(DENIED_FOCUS_MESSAGE))
        }
    }

    fn abandon_focus_if_unused(&self) {
        let in_use = self
            .live_handlers()
            .iter()
            .any(|handler| handler.requires_audio_focus());
        if !in_use {
            self.abandon_focus();
        }
    }

    fn volume_for_duck_and_focus(&self, is_muted: bool, volume: f32) -> f32 {
        let state = self.state.lock();
        if !state.acquired || is_muted {
            0.0
        } else if state.ducking {
            volume * state.duck_volume_factor
        } else {
            volume
        }
    }

    fn register_handler(&self, handler: Weak<dyn AudioEventHandler>) {
        let mut handlers = self.handlers.lock();
        handlers.retain(|existing| existing.strong_count() > 0);
        handlers.push(handler);
    }
}
