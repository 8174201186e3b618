//! Player manager - control core for one media item
//!
//! Reconciles desired [`Parameters`] against the underlying player, asks the
//! shared audio focus arbiter for focus before audible playback, reacts to
//! player and focus events, and drives periodic status pushes.
//!
//! All reads and writes of the parameters, the phase and the player go
//! through one mutex per player. Observers and the focus arbiter are only
//! called after that mutex is released: observers may query the player, and
//! the arbiter may ask every handler (this one included) whether it still
//! needs focus.

use crate::{
    observers::{
        ErrorListener, Notification, ObserverRegistry, StatusListener, VideoSizeListener,
    },
    progress::{ProgressScheduler, Tick},
    state::{Phase, PhaseEvent},
};
use cadence_core::{
    player_event_channel, AudioEventHandler, AudioFocus, CookieProvider, FullscreenPresenter,
    MediaPlayer, MediaSource, Parameters, ParametersUpdate, PlaybackConfig, PlaybackError,
    PlayerEvent, PlayerEventReceiver, Result, Status, SurfaceHandle, VideoSize,
};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Outcome of a successful load
///
/// Loading and applying the initial parameters are reported separately: a
/// focus denial while applying them does not turn a good load into a
/// failed one.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    /// Status right after load and initial reconciliation
    pub status: Status,

    /// Result of applying the initial parameters
    pub parameters: Result<()>,
}

struct CoreState {
    params: Parameters,
    phase: Phase,
    progress: ProgressScheduler,
    /// A status listener is registered, so progress pushes are wanted
    wants_progress: bool,
    released: bool,
}

/// Side effects collected under the state lock, run after it is released
#[derive(Default)]
struct Effects {
    notifications: Vec<Notification>,
    check_focus: bool,
}

struct Shared {
    player: Arc<dyn MediaPlayer>,
    focus: Arc<dyn AudioFocus>,
    source: MediaSource,
    cookies: Mutex<Option<Arc<dyn CookieProvider>>>,
    state: Mutex<CoreState>,
    observers: ObserverRegistry,
    lifetime: CancellationToken,
    this: Weak<Shared>,
}

/// Control core for one media item
///
/// Created when a source is opened and released explicitly with
/// [`release`](Self::release) or on drop. Must be created inside a tokio
/// runtime: player events and progress updates run as tasks on it.
pub struct PlayerManager {
    shared: Arc<Shared>,
}

impl PlayerManager {
    /// Create a manager for `source` played by `player`
    ///
    /// Hands the player its event channel and registers with `focus` for
    /// focus and host lifecycle events.
    ///
    /// # Errors
    /// Returns `PlaybackError::Runtime` when called outside a tokio runtime
    pub fn new(
        player: Arc<dyn MediaPlayer>,
        focus: Arc<dyn AudioFocus>,
        source: MediaSource,
        config: &PlaybackConfig,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| PlaybackError::Runtime(e.to_string()))?;
        let lifetime = CancellationToken::new();

        let shared = Arc::new_cyclic(|this| Shared {
            player,
            focus,
            source,
            cookies: Mutex::new(None),
            state: Mutex::new(CoreState {
                params: config.initial_parameters(),
                phase: Phase::Unloaded,
                progress: ProgressScheduler::new(runtime.clone(), lifetime.clone()),
                wants_progress: false,
                released: false,
            }),
            observers: ObserverRegistry::new(),
            lifetime: lifetime.clone(),
            this: this.clone(),
        });

        let (events_tx, events_rx) = player_event_channel();
        shared.player.attach_events(events_tx);
        spawn_event_pump(&runtime, Arc::downgrade(&shared), lifetime, events_rx);

        let handler: Weak<Shared> = Arc::downgrade(&shared);
        let handler: Weak<dyn AudioEventHandler> = handler;
        shared.focus.register_handler(handler);

        tracing::debug!("Player manager created for {}", shared.source.uri);
        Ok(Self { shared })
    }

    /// Cookie source consulted on load
    pub fn set_cookie_provider(&self, provider: Option<Arc<dyn CookieProvider>>) {
        *self.shared.cookies.lock() = provider;
    }

    /// Load the source and apply `update` on top of the current parameters
    ///
    /// # Errors
    /// Returns `PlaybackError::Load` if the player cannot open the source,
    /// `PlaybackError::Released` if the manager was released before or
    /// during the load
    pub async fn load(&self, update: &ParametersUpdate) -> Result<LoadReport> {
        self.shared.load(update).await
    }

    /// Merge `update` into the parameters and reconcile the player
    ///
    /// The status listener is notified whether or not reconciliation
    /// succeeds.
    ///
    /// # Errors
    /// Returns `PlaybackError::FocusNotAcquired` when audible playback was
    /// requested but focus was denied (the new parameters are still stored),
    /// `PlaybackError::Released` after release
    pub fn set_parameters(&self, update: &ParametersUpdate) -> Result<Status> {
        self.shared.set_parameters(update)
    }

    /// Shorthand for setting `shouldPlay: true`
    pub fn play(&self) -> Result<Status> {
        self.set_parameters(&ParametersUpdate::should_play(true))
    }

    /// Shorthand for setting `shouldPlay: false`
    pub fn pause(&self) -> Result<Status> {
        self.set_parameters(&ParametersUpdate::should_play(false))
    }

    /// Seek to `position_millis`; ignored until loaded
    pub fn seek_to(&self, position_millis: u64) {
        let state = self.shared.state.lock();
        if state.released || !state.phase.is_loaded() {
            tracing::debug!("Ignoring seek to {}ms: nothing loaded", position_millis);
            return;
        }
        self.shared.player.seek_to(position_millis);
    }

    /// Attach (or detach) a rendering surface
    pub fn set_surface(&self, surface: Option<SurfaceHandle>) {
        let state = self.shared.state.lock();
        if state.released {
            return;
        }
        self.shared
            .player
            .set_surface(surface, state.params.should_play);
    }

    /// Flip fullscreen presentation, if a presenter is registered
    pub fn toggle_fullscreen(&self) {
        match self.shared.observers.fullscreen_presenter() {
            Some(presenter) => {
                let fullscreen = !presenter.is_presented_fullscreen();
                presenter.set_fullscreen_mode(fullscreen);
            }
            None => tracing::debug!("No fullscreen presenter registered"),
        }
    }

    pub fn is_presented_fullscreen(&self) -> bool {
        self.shared
            .observers
            .fullscreen_presenter()
            .is_some_and(|presenter| presenter.is_presented_fullscreen())
    }

    /// Current status, projected from the player
    pub fn status(&self) -> Status {
        let state = self.shared.state.lock();
        self.shared.status_locked(&state)
    }

    /// Current desired parameters
    pub fn parameters(&self) -> Parameters {
        self.shared.state.lock().params.clone()
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.shared.state.lock().phase
    }

    /// Loaded and playing
    pub fn is_playing(&self) -> bool {
        let state = self.shared.state.lock();
        !state.released && self.shared.player.is_loaded() && self.shared.player.is_playing()
    }

    pub fn video_size(&self) -> Option<VideoSize> {
        let _state = self.shared.state.lock();
        self.shared.player.video_size()
    }

    pub fn audio_session_id(&self) -> i32 {
        let _state = self.shared.state.lock();
        self.shared.player.audio_session_id()
    }

    /// Whether periodic progress updates are currently scheduled
    pub fn is_updating_progress(&self) -> bool {
        self.shared.state.lock().progress.is_running()
    }

    /// Register (or clear) the status listener; registering starts progress updates
    pub fn set_status_listener(&self, listener: Option<StatusListener>) {
        let registered = listener.is_some();
        self.shared.observers.set_status_listener(listener);

        let mut state = self.shared.state.lock();
        if state.released {
            return;
        }
        state.wants_progress = registered;
        if registered {
            self.shared.start_progress(&mut state);
        } else {
            state.progress.stop();
        }
    }

    pub fn set_error_listener(&self, listener: Option<ErrorListener>) {
        self.shared.observers.set_error_listener(listener);
    }

    pub fn set_video_size_listener(&self, listener: Option<VideoSizeListener>) {
        self.shared.observers.set_video_size_listener(listener);
    }

    pub fn set_fullscreen_presenter(&self, presenter: Option<Arc<dyn FullscreenPresenter>>) {
        self.shared.observers.set_fullscreen_presenter(presenter);
    }

    /// Process one player event
    ///
    /// Events sent on the player's channel arrive here in order; calling this
    /// directly is equivalent.
    pub fn handle_player_event(&self, event: PlayerEvent) {
        self.shared.handle_player_event(event);
    }

    /// Stop progress updates, release the player and give up unused focus
    ///
    /// Idempotent. No observer is called once this returns.
    pub fn release(&self) {
        self.shared.release();
    }

    pub fn is_released(&self) -> bool {
        self.shared.state.lock().released
    }
}

impl AudioEventHandler for PlayerManager {
    fn handle_audio_focus_interruption_began(&self) {
        self.shared.handle_audio_focus_interruption_began();
    }

    fn handle_audio_focus_gained(&self) {
        self.shared.handle_audio_focus_gained();
    }

    fn on_pause(&self) {
        self.shared.on_pause();
    }

    fn on_resume(&self) {
        self.shared.on_resume();
    }

    fn pause_immediately(&self) {
        AudioEventHandler::pause_immediately(&*self.shared);
    }

    fn requires_audio_focus(&self) -> bool {
        self.shared.requires_audio_focus()
    }

    fn update_volume_mute_and_duck(&self) {
        self.shared.update_volume_mute_and_duck();
    }
}

impl Drop for PlayerManager {
    fn drop(&mut self) {
        self.shared.release();
    }
}

fn spawn_event_pump(
    runtime: &Handle,
    shared: Weak<Shared>,
    lifetime: CancellationToken,
    mut events: PlayerEventReceiver,
) {
    runtime.spawn(async move {
        loop {
            let event = tokio::select! {
                () = lifetime.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };
            let Some(shared) = shared.upgrade() else {
                break;
            };
            shared.handle_player_event(event);
        }
        tracing::debug!("Player event pump stopped");
    });
}

impl Shared {
    async fn load(&self, update: &ParametersUpdate) -> Result<LoadReport> {
        if self.state.lock().released {
            return Err(PlaybackError::Released);
        }

        let cookies = self.cookies_for_source();
        tracing::info!("Loading {}", self.source.uri);

        if let Err(e) = self.player.load(&self.source, &cookies).await {
            tracing::warn!("Failed to load {}: {}", self.source.uri, e);
            return Err(match e {
                PlaybackError::Load(_) => e,
                other => PlaybackError::load(other.to_string()),
            });
        }

        let mut effects = Effects::default();
        let (parameters, status) = {
            let mut state = self.state.lock();
            if state.released {
                return Err(PlaybackError::Released);
            }
            self.transition(&mut state, PhaseEvent::Loaded);

            let params = state.params.update(update);
            let parameters = self.apply_parameters(&mut state, params, &mut effects);
            if let Err(e) = &parameters {
                tracing::warn!("Loaded {} but initial parameters failed: {}", self.source.uri, e);
            }
            if state.wants_progress {
                self.start_progress(&mut state);
            }
            (parameters, self.status_locked(&state))
        };

        effects
            .notifications
            .push(Notification::Status(status.clone()));
        self.run_effects(effects);

        tracing::info!("Loaded {}", self.source.uri);
        Ok(LoadReport { status, parameters })
    }

    fn cookies_for_source(&self) -> Vec<String> {
        let provider = self.cookies.lock().clone();
        let Some(provider) = provider else {
            return Vec::new();
        };
        match provider.cookies_for(&self.source.uri) {
            Ok(cookies) => cookies,
            Err(e) => {
                tracing::warn!("Cookie lookup for {} failed: {}", self.source.uri, e);
                Vec::new()
            }
        }
    }

    fn set_parameters(&self, update: &ParametersUpdate) -> Result<Status> {
        let mut effects = Effects::default();
        let (result, status) = {
            let mut state = self.state.lock();
            if state.released {
                return Err(PlaybackError::Released);
            }
            let params = state.params.update(update);
            let result = self.apply_parameters(&mut state, params, &mut effects);
            (result, self.status_locked(&state))
        };

        effects
            .notifications
            .push(Notification::Status(status.clone()));
        self.run_effects(effects);

        result.map(|()| status)
    }

    /// Store `params` and converge the player towards them
    fn apply_parameters(
        &self,
        state: &mut CoreState,
        params: Parameters,
        effects: &mut Effects,
    ) -> Result<()> {
        state.params = params;
        self.player.set_looping(state.params.is_looping);

        if !state.params.should_actually_play() {
            self.player.pause_immediately();
            if state.phase.is_loaded() {
                self.transition(state, PhaseEvent::Paused);
            }
            effects.check_focus = true;
            return Ok(());
        }

        if !state.phase.is_loaded() {
            tracing::debug!("Play requested before load; deferring");
            return Ok(());
        }

        effects.check_focus = true;
        self.focus.acquire_focus()?;

        self.update_volume(state);
        let params = &state.params;
        self.player
            .play(params.is_muted, params.rate, params.should_correct_pitch);
        self.transition(state, PhaseEvent::PlayStarted);
        self.start_progress(state);
        Ok(())
    }

    /// Resume after focus came back or the host returned to the foreground
    fn acquire_focus_and_play(&self, state: &mut CoreState, effects: &mut Effects) -> Result<()> {
        if state.released || !state.phase.is_loaded() || !state.params.should_actually_play() {
            return Ok(());
        }

        effects.check_focus = true;
        if !state.params.is_muted {
            self.focus.acquire_focus()?;
        }

        self.update_volume(state);
        let params = &state.params;
        self.player
            .play(params.is_muted, params.rate, params.should_correct_pitch);
        self.transition(state, PhaseEvent::PlayStarted);
        self.start_progress(state);
        Ok(())
    }

    fn update_volume(&self, state: &CoreState) {
        if !self.player.is_loaded() {
            return;
        }
        let volume = self
            .focus
            .volume_for_duck_and_focus(state.params.is_muted, state.params.volume);
        self.player.set_volume(volume);
    }

    fn pause_locked(&self, state: &mut CoreState) {
        self.player.pause_immediately();
        if state.phase.is_loaded() {
            self.transition(state, PhaseEvent::Paused);
        }
    }

    fn status_locked(&self, state: &CoreState) -> Status {
        if state.released || !self.player.is_loaded() {
            return Status::unloaded();
        }
        Status {
            is_loaded: true,
            is_playing: self.player.is_playing(),
            is_buffering: self.player.is_buffering(),
            duration_millis: self.player.duration_millis(),
            position_millis: self.player.current_position_millis(),
            playable_duration_millis: self.player.playable_duration_millis().unwrap_or(0),
            did_just_finish: false,
        }
    }

    /// Apply a phase event; `false` if the current phase rejects it
    fn transition(&self, state: &mut CoreState, event: PhaseEvent) -> bool {
        match state.phase.on(event) {
            Ok(next) => {
                if next != state.phase {
                    tracing::debug!("Phase {:?} -> {:?} on {:?}", state.phase, next, event);
                }
                state.phase = next;
                true
            }
            Err(rejected) => {
                tracing::debug!("Ignoring event: {}", rejected);
                false
            }
        }
    }

    fn start_progress(&self, state: &mut CoreState) {
        if !state.wants_progress || !state.phase.is_loaded() || state.progress.is_running() {
            return;
        }
        let shared = self.this.clone();
        state.progress.start(move |run| match shared.upgrade() {
            Some(shared) => shared.progress_tick(run),
            None => Tick::Stop,
        });
    }

    fn progress_tick(&self, run: &CancellationToken) -> Tick {
        let status = {
            let state = self.state.lock();
            if run.is_cancelled() || state.released {
                return Tick::Stop;
            }
            self.status_locked(&state)
        };
        self.observers.dispatch([Notification::Status(status)]);

        // Decided after dispatch: listeners may have resumed playback or
        // changed the interval
        let mut state = self.state.lock();
        if run.is_cancelled() || state.released {
            return Tick::Stop;
        }
        let next = if self.player.continue_updating_progress() {
            Tick::after_millis(state.params.progress_update_interval_millis)
        } else {
            Tick::Stop
        };
        if next == Tick::Stop {
            state.progress.finish(run);
        }
        next
    }

    fn handle_player_event(&self, event: PlayerEvent) {
        let mut effects = Effects::default();
        {
            let mut state = self.state.lock();
            if state.released {
                return;
            }

            match event {
                PlayerEvent::BufferingStarted => {
                    if self.transition(&mut state, PhaseEvent::BufferingStarted) {
                        effects.push_status(self.status_locked(&state));
                    }
                }
                PlayerEvent::BufferingProgress { buffered_millis } => {
                    tracing::trace!("Buffered {}ms", buffered_millis);
                    effects.push_status(self.status_locked(&state));
                }
                PlayerEvent::BufferingStopped => {
                    let playing = self.player.is_playing();
                    if self.transition(&mut state, PhaseEvent::BufferingStopped { playing }) {
                        effects.push_status(self.status_locked(&state));
                    }
                }
                PlayerEvent::Completed => {
                    let looping = self.player.is_looping();
                    if self.transition(&mut state, PhaseEvent::Finished { looping }) {
                        effects.push_status(self.status_locked(&state).finished());
                        effects.check_focus = !looping;
                    }
                }
                PlayerEvent::SeekCompleted => {
                    if self.transition(&mut state, PhaseEvent::SeekCompleted) {
                        effects.push_status(self.status_locked(&state));
                    }
                }
                PlayerEvent::Error { message } => {
                    tracing::debug!("Player error: {}", message);
                    effects.notifications.push(Notification::Error(message));
                }
                PlayerEvent::VideoSizeChanged(size) => {
                    effects.notifications.push(Notification::VideoSize(size));
                }
                PlayerEvent::StatusUpdated => {
                    effects.push_status(self.status_locked(&state));
                }
            }
        }
        self.run_effects(effects);
    }

    fn run_effects(&self, effects: Effects) {
        if !effects.notifications.is_empty() {
            self.observers.dispatch(effects.notifications);
        }
        if effects.check_focus {
            self.focus.abandon_focus_if_unused();
        }
    }

    fn release(&self) {
        {
            let mut state = self.state.lock();
            if state.released {
                return;
            }
            state.released = true;
            self.lifetime.cancel();
            state.progress.stop();
            self.transition(&mut state, PhaseEvent::Unloaded);
            self.player.release();
        }

        self.observers.close();
        self.focus.abandon_focus_if_unused();
        tracing::info!("Released {}", self.source.uri);
    }
}

impl Effects {
    fn push_status(&mut self, status: Status) {
        self.notifications.push(Notification::Status(status));
    }
}

impl AudioEventHandler for Shared {
    fn handle_audio_focus_interruption_began(&self) {
        let mut state = self.state.lock();
        if state.released || state.params.is_muted {
            return;
        }
        tracing::debug!("Audio focus interrupted; pausing {}", self.source.uri);
        self.pause_locked(&mut state);
        state.progress.stop();
    }

    fn handle_audio_focus_gained(&self) {
        let mut effects = Effects::default();
        let result = {
            let mut state = self.state.lock();
            self.acquire_focus_and_play(&mut state, &mut effects)
        };
        if let Err(e) = result {
            tracing::debug!("Not resuming after focus gain: {}", e);
        }
        self.run_effects(effects);
    }

    fn on_pause(&self) {
        let mut state = self.state.lock();
        if state.released {
            return;
        }
        self.pause_locked(&mut state);
    }

    fn on_resume(&self) {
        let mut effects = Effects::default();
        let result = {
            let mut state = self.state.lock();
            self.acquire_focus_and_play(&mut state, &mut effects)
        };
        if let Err(e) = result {
            tracing::debug!("Not resuming with host: {}", e);
        }
        self.run_effects(effects);
    }

    fn pause_immediately(&self) {
        self.on_pause();
    }

    fn requires_audio_focus(&self) -> bool {
        let state = self.state.lock();
        !state.released && self.player.is_playing() && !state.params.is_muted
    }

    fn update_volume_mute_and_duck(&self) {
        let state = self.state.lock();
        if !state.released {
            self.update_volume(&state);
        }
    }
}
