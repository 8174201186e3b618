//! Simulated platform
//!
//! A clock-driven media player and an OS focus service that stand in for
//! real decoders and platform APIs. Position advances with tokio time, so the
//! simulation runs the same under a paused test clock.

use async_trait::async_trait;
use cadence_core::{
    MediaPlayer, MediaSource, PlaybackError, PlayerEvent, PlayerEventSender, Result,
    SurfaceHandle, VideoSize,
};
use cadence_playback::{FocusBackend, PlayerFactory};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Simulated time it takes to open a source
const LOAD_LATENCY: Duration = Duration::from_millis(50);

struct Clock {
    loaded: bool,
    playing: bool,
    looping: bool,
    volume: f32,
    rate: f64,
    /// Position at `anchor`
    anchor_position_millis: u64,
    anchor: Instant,
    completion: Option<JoinHandle<()>>,
}

impl Clock {
    fn position_millis(&self, duration_millis: u64) -> u64 {
        if !self.playing {
            return self.anchor_position_millis;
        }
        let elapsed = self.anchor.elapsed().as_millis() as f64 * self.rate;
        (self.anchor_position_millis + elapsed as u64).min(duration_millis)
    }

    fn cancel_completion(&mut self) {
        if let Some(completion) = self.completion.take() {
            completion.abort();
        }
    }
}

/// Media player whose position follows the tokio clock
pub struct SimulatedPlayer {
    duration_millis: u64,
    session_id: i32,
    runtime: Handle,
    clock: Mutex<Clock>,
    events: Mutex<Option<PlayerEventSender>>,
    video_size: Mutex<Option<VideoSize>>,
    this: Weak<SimulatedPlayer>,
}

impl SimulatedPlayer {
    /// Must be called inside a tokio runtime
    pub fn new(duration_millis: u64, session_id: i32) -> Result<Arc<Self>> {
        let runtime = Handle::try_current().map_err(|e| PlaybackError::Runtime(e.to_string()))?;
        Ok(Arc::new_cyclic(|this| Self {
            duration_millis,
            session_id,
            runtime,
            clock: Mutex::new(Clock {
                loaded: false,
                playing: false,
                looping: false,
                volume: 1.0,
                rate: 1.0,
                anchor_position_millis: 0,
                anchor: Instant::now(),
                completion: None,
            }),
            events: Mutex::new(None),
            video_size: Mutex::new(None),
            this: this.clone(),
        }))
    }

    fn emit(&self, event: PlayerEvent) {
        if let Some(events) = self.events.lock().as_ref() {
            let _ = events.send(event);
        }
    }

    /// Re-anchor the clock at the current position
    fn reanchor(&self, clock: &mut Clock) {
        clock.anchor_position_millis = clock.position_millis(self.duration_millis);
        clock.anchor = Instant::now();
    }

    fn schedule_completion(&self, clock: &mut Clock) {
        clock.cancel_completion();
        if !clock.playing || clock.rate <= 0.0 {
            return;
        }

        let remaining = self.duration_millis.saturating_sub(clock.anchor_position_millis);
        let wait = Duration::from_millis((remaining as f64 / clock.rate) as u64);
        let player = self.this.clone();
        clock.completion = Some(self.runtime.spawn(async move {
            tokio::time::sleep(wait).await;
            if let Some(player) = player.upgrade() {
                player.reach_end();
            }
        }));
    }

    fn reach_end(&self) {
        {
            let mut clock = self.clock.lock();
            clock.completion = None;
            if clock.looping {
                clock.anchor_position_millis = 0;
                clock.anchor = Instant::now();
                self.schedule_completion(&mut clock);
            } else {
                clock.playing = false;
                clock.anchor_position_millis = self.duration_millis;
            }
        }
        tracing::debug!("Simulated player reached the end");
        self.emit(PlayerEvent::Completed);
    }
}

#[async_trait]
impl MediaPlayer for SimulatedPlayer {
    async fn load(&self, source: &MediaSource, cookies: &[String]) -> Result<()> {
        tracing::debug!("Opening {} with {} cookie(s)", source.uri, cookies.len());
        tokio::time::sleep(LOAD_LATENCY).await;

        if source.uri.contains("missing") {
            return Err(PlaybackError::load(format!("{} could not be opened", source.uri)));
        }

        self.clock.lock().loaded = true;
        if source.uri.ends_with(".mp4") {
            let size = VideoSize::new(1920, 1080);
            *self.video_size.lock() = Some(size);
            self.emit(PlayerEvent::VideoSizeChanged(size));
        }
        Ok(())
    }

    fn play(&self, is_muted: bool, rate: f64, should_correct_pitch: bool) {
        let mut clock = self.clock.lock();
        if !clock.loaded {
            return;
        }
        tracing::debug!(
            "play(muted={}, rate={}, pitch_correction={})",
            is_muted,
            rate,
            should_correct_pitch
        );
        self.reanchor(&mut clock);
        if clock.anchor_position_millis >= self.duration_millis {
            clock.anchor_position_millis = 0;
        }
        clock.rate = rate;
        clock.playing = true;
        self.schedule_completion(&mut clock);
    }

    fn pause_immediately(&self) {
        let mut clock = self.clock.lock();
        self.reanchor(&mut clock);
        clock.playing = false;
        clock.cancel_completion();
    }

    fn seek_to(&self, position_millis: u64) {
        {
            let mut clock = self.clock.lock();
            clock.anchor_position_millis = position_millis.min(self.duration_millis);
            clock.anchor = Instant::now();
            self.schedule_completion(&mut clock);
        }
        self.emit(PlayerEvent::SeekCompleted);
    }

    fn set_surface(&self, surface: Option<SurfaceHandle>, should_play: bool) {
        tracing::debug!("Surface {:?} attached (should_play={})", surface, should_play);
    }

    fn release(&self) {
        let mut clock = self.clock.lock();
        clock.cancel_completion();
        clock.loaded = false;
        clock.playing = false;
        self.events.lock().take();
    }

    fn attach_events(&self, events: PlayerEventSender) {
        *self.events.lock() = Some(events);
    }

    fn is_loaded(&self) -> bool {
        self.clock.lock().loaded
    }

    fn is_playing(&self) -> bool {
        self.clock.lock().playing
    }

    fn is_buffering(&self) -> bool {
        false
    }

    fn duration_millis(&self) -> u64 {
        self.duration_millis
    }

    fn current_position_millis(&self) -> u64 {
        self.clock.lock().position_millis(self.duration_millis)
    }

    fn playable_duration_millis(&self) -> Option<u64> {
        self.clock.lock().loaded.then_some(self.duration_millis)
    }

    fn is_looping(&self) -> bool {
        self.clock.lock().looping
    }

    fn set_looping(&self, looping: bool) {
        self.clock.lock().looping = looping;
    }

    fn volume(&self) -> f32 {
        self.clock.lock().volume
    }

    fn set_volume(&self, volume: f32) {
        self.clock.lock().volume = volume;
    }

    fn audio_session_id(&self) -> i32 {
        self.session_id
    }

    fn video_size(&self) -> Option<VideoSize> {
        *self.video_size.lock()
    }

    fn continue_updating_progress(&self) -> bool {
        let clock = self.clock.lock();
        clock.loaded && clock.playing
    }
}

/// OS focus service that grants requests unless told otherwise
pub struct SimulatedFocusService {
    grant: AtomicBool,
}

impl SimulatedFocusService {
    pub fn new(grant: bool) -> Arc<Self> {
        Arc::new(Self {
            grant: AtomicBool::new(grant),
        })
    }

    pub fn set_grant(&self, grant: bool) {
        self.grant.store(grant, Ordering::SeqCst);
    }
}

impl FocusBackend for SimulatedFocusService {
    fn request_focus(&self) -> bool {
        let granted = self.grant.load(Ordering::SeqCst);
        tracing::debug!("OS focus request: {}", if granted { "granted" } else { "denied" });
        granted
    }

    fn abandon_focus(&self) {
        tracing::debug!("OS focus abandoned");
    }
}

/// Creates simulated players of a fixed length
pub struct SimulatedPlayerFactory {
    duration_millis: u64,
    next_session: AtomicU32,
}

impl SimulatedPlayerFactory {
    pub fn new(duration_millis: u64) -> Arc<Self> {
        Arc::new(Self {
            duration_millis,
            next_session: AtomicU32::new(1),
        })
    }
}

impl PlayerFactory for SimulatedPlayerFactory {
    fn create_player(&self, _source: &MediaSource) -> Result<Arc<dyn MediaPlayer>> {
        let session = self.next_session.fetch_add(1, Ordering::Relaxed) as i32;
        let player = SimulatedPlayer::new(self.duration_millis, session)?;
        Ok(player)
    }
}
