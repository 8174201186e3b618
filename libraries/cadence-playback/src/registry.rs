//! Keyed sound registry
//!
//! Owns one [`PlayerManager`] per loaded sound, addressed by a
//! [`SoundKey`] handed out on load. Status pushes and player errors of every
//! sound are forwarded as [`SoundEvent`]s on a single channel.

use crate::manager::PlayerManager;
use cadence_core::{
    AudioFocus, MediaPlayer, MediaSource, ParametersUpdate, PlaybackConfig, PlaybackError,
    Result, SoundKey, Status,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// Creates underlying players for new sounds
pub trait PlayerFactory: Send + Sync {
    /// # Errors
    /// Returns `PlaybackError::Load` if no player can be created for `source`
    fn create_player(&self, source: &MediaSource) -> Result<Arc<dyn MediaPlayer>>;
}

/// Notifications about registered sounds
#[derive(Debug, Clone, PartialEq)]
pub enum SoundEvent {
    StatusUpdated { key: SoundKey, status: Status },

    /// The sound's player failed; the sound has been (or is being) unloaded
    Errored { key: SoundKey, error: PlaybackError },
}

/// Receiving half of the registry's event channel
pub type SoundEventReceiver = mpsc::UnboundedReceiver<SoundEvent>;

struct Inner {
    factory: Arc<dyn PlayerFactory>,
    focus: Arc<dyn AudioFocus>,
    config: PlaybackConfig,
    runtime: Handle,
    sounds: Mutex<HashMap<SoundKey, Arc<PlayerManager>>>,
    next_key: AtomicU32,
    events: mpsc::UnboundedSender<SoundEvent>,
}

/// Registry of loaded sounds
pub struct SoundRegistry {
    inner: Arc<Inner>,
}

impl SoundRegistry {
    /// Create an empty registry and the receiver for its events
    ///
    /// # Errors
    /// Returns `PlaybackError::Runtime` when called outside a tokio runtime
    pub fn new(
        factory: Arc<dyn PlayerFactory>,
        focus: Arc<dyn AudioFocus>,
        config: PlaybackConfig,
    ) -> Result<(Self, SoundEventReceiver)> {
        let runtime = Handle::try_current().map_err(|e| PlaybackError::Runtime(e.to_string()))?;
        let (events, receiver) = mpsc::unbounded_channel();

        let registry = Self {
            inner: Arc::new(Inner {
                factory,
                focus,
                config,
                runtime,
                sounds: Mutex::new(HashMap::new()),
                next_key: AtomicU32::new(0),
                events,
            }),
        };
        Ok((registry, receiver))
    }

    /// Load a sound and apply `update` as its initial parameters
    ///
    /// # Errors
    /// Returns `PlaybackError::Load` if the sound cannot be loaded; the key
    /// is not kept in that case
    pub async fn load_sound(
        &self,
        source: MediaSource,
        update: &ParametersUpdate,
    ) -> Result<(SoundKey, Status)> {
        let key = SoundKey(self.inner.next_key.fetch_add(1, Ordering::Relaxed));
        let player = self.inner.factory.create_player(&source)?;
        let manager = Arc::new(PlayerManager::new(
            player,
            self.inner.focus.clone(),
            source,
            &self.inner.config,
        )?);
        self.attach_listeners(key, &manager);
        self.inner.sounds.lock().insert(key, manager.clone());

        match manager.load(update).await {
            Ok(report) => {
                tracing::info!("Loaded sound {}", key);
                Ok((key, report.status))
            }
            Err(e) => {
                if let Some(manager) = self.inner.sounds.lock().remove(&key) {
                    manager.release();
                }
                Err(e)
            }
        }
    }

    /// Unload a sound
    ///
    /// # Errors
    /// Returns `PlaybackError::NoPlayer` for an unknown key
    pub fn unload_sound(&self, key: SoundKey) -> Result<Status> {
        let manager = self
            .inner
            .sounds
            .lock()
            .remove(&key)
            .ok_or(PlaybackError::NoPlayer(key))?;
        manager.release();
        tracing::info!("Unloaded sound {}", key);
        Ok(Status::unloaded())
    }

    /// Merge `update` into a sound's parameters
    ///
    /// # Errors
    /// Returns `PlaybackError::NoPlayer` for an unknown key, or the error of
    /// [`PlayerManager::set_parameters`]
    pub fn set_parameters_for_sound(&self, key: SoundKey, update: &ParametersUpdate) -> Result<Status> {
        self.sound(key)?.set_parameters(update)
    }

    /// Restart a sound from the beginning, then apply `update`
    ///
    /// # Errors
    /// Same as [`set_parameters_for_sound`](Self::set_parameters_for_sound)
    pub fn replay_sound(&self, key: SoundKey, update: &ParametersUpdate) -> Result<Status> {
        let manager = self.sound(key)?;
        manager.seek_to(0);
        manager.set_parameters(update)
    }

    /// # Errors
    /// Returns `PlaybackError::NoPlayer` for an unknown key
    pub fn status_for_sound(&self, key: SoundKey) -> Result<Status> {
        Ok(self.sound(key)?.status())
    }

    /// Unload every sound
    pub fn unload_all(&self) {
        let drained: Vec<_> = self.inner.sounds.lock().drain().collect();
        for (key, manager) in drained {
            manager.release();
            tracing::debug!("Unloaded sound {}", key);
        }
    }

    /// Number of registered sounds
    pub fn len(&self) -> usize {
        self.inner.sounds.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: SoundKey) -> bool {
        self.inner.sounds.lock().contains_key(&key)
    }

    fn sound(&self, key: SoundKey) -> Result<Arc<PlayerManager>> {
        self.inner
            .sounds
            .lock()
            .get(&key)
            .cloned()
            .ok_or(PlaybackError::NoPlayer(key))
    }

    fn attach_listeners(&self, key: SoundKey, manager: &PlayerManager) {
        let events = self.inner.events.clone();
        manager.set_status_listener(Some(Arc::new(move |status: &Status| {
            let _ = events.send(SoundEvent::StatusUpdated {
                key,
                status: status.clone(),
            });
        })));

        let events = self.inner.events.clone();
        let registry: Weak<Inner> = Arc::downgrade(&self.inner);
        let runtime = self.inner.runtime.clone();
        manager.set_error_listener(Some(Arc::new(move |message: &str| {
            let _ = events.send(SoundEvent::Errored {
                key,
                error: PlaybackError::playback(message),
            });

            // The listener runs inside the player's dispatch; unload from a task
            let registry = registry.clone();
            runtime.spawn(async move {
                if let Some(inner) = registry.upgrade() {
                    let removed = inner.sounds.lock().remove(&key);
                    if let Some(manager) = removed {
                        manager.release();
                        tracing::warn!("Unloaded sound {} after player error", key);
                    }
                }
            });
        })));
    }
}

impl Drop for SoundRegistry {
    fn drop(&mut self) {
        self.unload_all();
    }
}
