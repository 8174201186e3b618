//! Shared test doubles for the playback integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use cadence_core::{
    AudioEventHandler, AudioFocus, CookieProvider, FullscreenPresenter, MediaPlayer, MediaSource,
    PlaybackError, PlayerEvent, PlayerEventSender, Result, Status, SurfaceHandle, VideoSize,
};
use cadence_playback::{FocusBackend, PlayerFactory, StatusListener};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

// ===== Mock Player =====

/// Commands the control core issued to the player
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load { uri: String, cookies: Vec<String> },
    Play { muted: bool, rate: f64, pitch: bool },
    Pause,
    Seek(u64),
    SetSurface { surface: Option<SurfaceHandle>, should_play: bool },
    SetVolume(f32),
    SetLooping(bool),
    Release,
}

#[derive(Debug)]
struct PlayerState {
    loaded: bool,
    playing: bool,
    buffering: bool,
    looping: bool,
    volume: f32,
    position_millis: u64,
    duration_millis: u64,
    video_size: Option<VideoSize>,
    load_error: Option<String>,
}

/// Player double that records every command and lets tests push events
pub struct MockPlayer {
    state: Mutex<PlayerState>,
    commands: Mutex<Vec<Command>>,
    events: Mutex<Option<PlayerEventSender>>,
}

impl MockPlayer {
    pub fn new(duration_millis: u64) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(PlayerState {
                loaded: false,
                playing: false,
                buffering: false,
                looping: false,
                volume: 1.0,
                position_millis: 0,
                duration_millis,
                video_size: None,
                load_error: None,
            }),
            commands: Mutex::new(Vec::new()),
            events: Mutex::new(None),
        })
    }

    /// Make the next load fail with `message`
    pub fn fail_load(&self, message: &str) {
        self.state.lock().load_error = Some(message.to_string());
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().clone()
    }

    pub fn clear_commands(&self) {
        self.commands.lock().clear();
    }

    pub fn count(&self, pred: impl Fn(&Command) -> bool) -> usize {
        self.commands.lock().iter().filter(|c| pred(*c)).count()
    }

    pub fn play_commands(&self) -> usize {
        self.count(|c| matches!(c, Command::Play { .. }))
    }

    pub fn last_volume(&self) -> Option<f32> {
        self.commands.lock().iter().rev().find_map(|c| match c {
            Command::SetVolume(v) => Some(*v),
            _ => None,
        })
    }

    pub fn set_video_size(&self, size: VideoSize) {
        self.state.lock().video_size = Some(size);
    }

    /// Reach the end of the media the way a real player would
    pub fn finish_playback(&self) {
        let mut state = self.state.lock();
        state.position_millis = state.duration_millis;
        if !state.looping {
            state.playing = false;
        }
    }

    /// Push an event on the attached channel
    pub fn emit(&self, event: PlayerEvent) {
        if let Some(events) = self.events.lock().as_ref() {
            let _ = events.send(event);
        }
    }

    fn record(&self, command: Command) {
        self.commands.lock().push(command);
    }
}

#[async_trait]
impl MediaPlayer for MockPlayer {
    async fn load(&self, source: &MediaSource, cookies: &[String]) -> Result<()> {
        self.record(Command::Load {
            uri: source.uri.clone(),
            cookies: cookies.to_vec(),
        });
        let mut state = self.state.lock();
        if let Some(message) = state.load_error.take() {
            return Err(PlaybackError::load(message));
        }
        state.loaded = true;
        Ok(())
    }

    fn play(&self, is_muted: bool, rate: f64, should_correct_pitch: bool) {
        self.record(Command::Play {
            muted: is_muted,
            rate,
            pitch: should_correct_pitch,
        });
        let mut state = self.state.lock();
        if state.loaded {
            state.playing = true;
        }
    }

    fn pause_immediately(&self) {
        self.record(Command::Pause);
        self.state.lock().playing = false;
    }

    fn seek_to(&self, position_millis: u64) {
        self.record(Command::Seek(position_millis));
        self.state.lock().position_millis = position_millis;
    }

    fn set_surface(&self, surface: Option<SurfaceHandle>, should_play: bool) {
        self.record(Command::SetSurface {
            surface,
            should_play,
        });
    }

    fn release(&self) {
        self.record(Command::Release);
        let mut state = self.state.lock();
        state.loaded = false;
        state.playing = false;
    }

    fn attach_events(&self, events: PlayerEventSender) {
        *self.events.lock() = Some(events);
    }

    fn is_loaded(&self) -> bool {
        self.state.lock().loaded
    }

    fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    fn is_buffering(&self) -> bool {
        self.state.lock().buffering
    }

    fn duration_millis(&self) -> u64 {
        self.state.lock().duration_millis
    }

    fn current_position_millis(&self) -> u64 {
        self.state.lock().position_millis
    }

    fn playable_duration_millis(&self) -> Option<u64> {
        let state = self.state.lock();
        state.loaded.then_some(state.duration_millis)
    }

    fn is_looping(&self) -> bool {
        self.state.lock().looping
    }

    fn set_looping(&self, looping: bool) {
        self.record(Command::SetLooping(looping));
        self.state.lock().looping = looping;
    }

    fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    fn set_volume(&self, volume: f32) {
        self.record(Command::SetVolume(volume));
        self.state.lock().volume = volume;
    }

    fn audio_session_id(&self) -> i32 {
        42
    }

    fn video_size(&self) -> Option<VideoSize> {
        self.state.lock().video_size
    }

    fn continue_updating_progress(&self) -> bool {
        let state = self.state.lock();
        state.loaded && state.playing
    }
}

// ===== Mock Arbiter =====

/// Focus arbiter double counting requests and abandon checks
pub struct MockFocus {
    grant: AtomicBool,
    requests: AtomicUsize,
    abandon_checks: AtomicUsize,
    handlers: Mutex<Vec<Weak<dyn AudioEventHandler>>>,
}

impl MockFocus {
    pub fn granting() -> Arc<Self> {
        Arc::new(Self {
            grant: AtomicBool::new(true),
            requests: AtomicUsize::new(0),
            abandon_checks: AtomicUsize::new(0),
            handlers: Mutex::new(Vec::new()),
        })
    }

    pub fn denying() -> Arc<Self> {
        let focus = Self::granting();
        focus.set_grant(false);
        focus
    }

    pub fn set_grant(&self, grant: bool) {
        self.grant.store(grant, Ordering::SeqCst);
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn abandon_checks(&self) -> usize {
        self.abandon_checks.load(Ordering::SeqCst)
    }

    pub fn registered_handlers(&self) -> usize {
        self.handlers
            .lock()
            .iter()
            .filter(|h| h.strong_count() > 0)
            .count()
    }
}

impl AudioFocus for MockFocus {
    fn acquire_focus(&self) -> Result<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.grant.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(PlaybackError::focus("denied by test"))
        }
    }

    fn abandon_focus_if_unused(&self) {
        self.abandon_checks.fetch_add(1, Ordering::SeqCst);
    }

    fn volume_for_duck_and_focus(&self, is_muted: bool, volume: f32) -> f32 {
        if is_muted {
            0.0
        } else {
            volume
        }
    }

    fn register_handler(&self, handler: Weak<dyn AudioEventHandler>) {
        self.handlers.lock().push(handler);
    }
}

// ===== Mock OS Backend =====

#[derive(Default)]
pub struct MockBackend {
    deny: AtomicBool,
    requests: AtomicUsize,
    abandons: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_deny(&self, deny: bool) {
        self.deny.store(deny, Ordering::SeqCst);
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn abandons(&self) -> usize {
        self.abandons.load(Ordering::SeqCst)
    }
}

impl FocusBackend for MockBackend {
    fn request_focus(&self) -> bool {
        self.requests.fetch_add(1, Ordering::SeqCst);
        !self.deny.load(Ordering::SeqCst)
    }

    fn abandon_focus(&self) {
        self.abandons.fetch_add(1, Ordering::SeqCst);
    }
}

// ===== Mock Factory =====

/// Player factory handing out [`MockPlayer`]s and remembering them
#[derive(Default)]
pub struct MockFactory {
    players: Mutex<Vec<Arc<MockPlayer>>>,
    fail_next_load: Mutex<Option<String>>,
}

impl MockFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next_load(&self, message: &str) {
        *self.fail_next_load.lock() = Some(message.to_string());
    }

    pub fn player(&self, index: usize) -> Arc<MockPlayer> {
        self.players.lock()[index].clone()
    }

    pub fn created(&self) -> usize {
        self.players.lock().len()
    }
}

impl PlayerFactory for MockFactory {
    fn create_player(&self, _source: &MediaSource) -> Result<Arc<dyn MediaPlayer>> {
        let player = MockPlayer::new(3_000);
        if let Some(message) = self.fail_next_load.lock().take() {
            player.fail_load(&message);
        }
        self.players.lock().push(player.clone());
        Ok(player)
    }
}

// ===== Presenters and Providers =====

#[derive(Default)]
pub struct MockPresenter {
    fullscreen: AtomicBool,
}

impl FullscreenPresenter for MockPresenter {
    fn is_presented_fullscreen(&self) -> bool {
        self.fullscreen.load(Ordering::SeqCst)
    }

    fn set_fullscreen_mode(&self, fullscreen: bool) {
        self.fullscreen.store(fullscreen, Ordering::SeqCst);
    }
}

/// Cookie provider returning a fixed answer
pub struct FixedCookies(pub std::result::Result<Vec<String>, String>);

impl CookieProvider for FixedCookies {
    fn cookies_for(&self, _uri: &str) -> std::io::Result<Vec<String>> {
        self.0.clone().map_err(std::io::Error::other)
    }
}

// ===== Helpers =====

/// Status listener that keeps every status it receives
pub fn status_recorder() -> (StatusListener, Arc<Mutex<Vec<Status>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let listener: StatusListener = Arc::new(move |status: &Status| {
        sink.lock().push(status.clone());
    });
    (listener, seen)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("cadence_playback=debug")
        .with_test_writer()
        .try_init();
}
