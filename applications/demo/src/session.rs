//! Scripted sessions
//!
//! Walk a player (or a set of sounds) through the situations the control
//! core has to handle: load, progress, a duckable interruption, a transient
//! focus loss, the host going to the background, and completion.

use crate::config::DemoConfig;
use crate::error::{DemoError, Result};
use crate::sim::{SimulatedFocusService, SimulatedPlayer, SimulatedPlayerFactory};
use cadence_core::{MediaSource, ParametersUpdate, Status};
use cadence_playback::{
    AudioFocusCoordinator, FocusChange, Phase, PlayerManager, SoundEvent, SoundRegistry,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// What happened during a player session
#[derive(Debug, Clone, Default)]
pub struct SessionSummary {
    pub status_updates: usize,
    pub errors: Vec<String>,
    pub finished: bool,
    pub final_position_millis: u64,
}

/// Play the configured source from start to finish through the scripted events
pub async fn run_player_session(config: &DemoConfig) -> Result<SessionSummary> {
    let session = &config.session;
    let backend = SimulatedFocusService::new(session.grant_focus);
    let coordinator = Arc::new(AudioFocusCoordinator::new(backend, &config.playback));
    let player = SimulatedPlayer::new(session.duration_millis, 1)?;

    let manager = PlayerManager::new(
        player,
        coordinator.clone(),
        MediaSource::new(session.uri.clone()),
        &config.playback,
    )?;

    let summary = Arc::new(Mutex::new(SessionSummary::default()));
    let sink = summary.clone();
    manager.set_status_listener(Some(Arc::new(move |status: &Status| {
        log_status(status);
        let mut summary = sink.lock();
        summary.status_updates += 1;
        summary.final_position_millis = status.position_millis;
        summary.finished |= status.did_just_finish;
    })));
    let sink = summary.clone();
    manager.set_error_listener(Some(Arc::new(move |message: &str| {
        tracing::warn!("Player error: {}", message);
        sink.lock().errors.push(message.to_string());
    })));

    let update = ParametersUpdate {
        should_play: Some(true),
        volume: Some(session.volume),
        rate: Some(session.rate),
        is_looping: Some(session.looping),
        ..Default::default()
    };
    let report = manager.load(&update).await?;
    tracing::info!(
        "Loaded {} ({}ms), playing: {}",
        session.uri,
        report.status.duration_millis,
        report.status.is_playing
    );
    let started = match &report.parameters {
        Ok(()) => session.rate > 0.0,
        Err(e) => {
            tracing::warn!("Initial parameters not applied: {} ({})", e, e.code());
            false
        }
    };

    tokio::time::sleep(Duration::from_millis(session.interruption_after_millis)).await;
    tracing::info!("Another app asks to duck");
    coordinator.on_focus_change(FocusChange::LossTransientCanDuck);
    tokio::time::sleep(Duration::from_millis(300)).await;
    coordinator.on_focus_change(FocusChange::Gain);

    tracing::info!("Another app takes focus briefly");
    coordinator.on_focus_change(FocusChange::LossTransient);
    tokio::time::sleep(Duration::from_millis(300)).await;
    coordinator.on_focus_change(FocusChange::Gain);

    tracing::info!("Host goes to the background");
    coordinator.on_host_pause();
    tokio::time::sleep(Duration::from_millis(200)).await;
    if let Err(e) = manager.play() {
        tracing::info!("Play refused while backgrounded: {}", e);
    }
    coordinator.on_host_resume();

    if started && !session.looping {
        wait_for_completion(&manager, session.duration_millis).await?;
    }

    manager.release();
    let summary = summary.lock().clone();
    tracing::info!(
        "Session done: {} status update(s), finished: {}",
        summary.status_updates,
        summary.finished
    );
    Ok(summary)
}

async fn wait_for_completion(manager: &PlayerManager, duration_millis: u64) -> Result<()> {
    let limit = duration_millis.saturating_mul(4).max(1_000);
    let poll = Duration::from_millis(50);
    let mut waited = 0;
    while manager.phase() != Phase::Completed {
        if waited >= limit {
            return Err(DemoError::Timeout(limit));
        }
        tokio::time::sleep(poll).await;
        waited += 50;
    }
    Ok(())
}

fn log_status(status: &Status) {
    if status.did_just_finish {
        tracing::info!("Finished at {}ms", status.position_millis);
    } else {
        tracing::info!(
            "{:>6}ms / {}ms{}",
            status.position_millis,
            status.duration_millis,
            if status.is_playing { "" } else { " (paused)" }
        );
    }
}

/// Fire `count` overlapping sounds through the registry and wait for them to finish
pub async fn run_sounds_session(config: &DemoConfig, count: usize) -> Result<usize> {
    let backend = SimulatedFocusService::new(config.session.grant_focus);
    let coordinator = Arc::new(AudioFocusCoordinator::new(backend, &config.playback));
    let factory = SimulatedPlayerFactory::new(config.session.duration_millis);
    let (registry, mut events) =
        SoundRegistry::new(factory, coordinator, config.playback.clone())?;

    for index in 0..count {
        let source = MediaSource::new(format!("asset:///sounds/{}.wav", index));
        let update = ParametersUpdate {
            should_play: Some(true),
            volume: Some(config.session.volume),
            ..Default::default()
        };
        let (key, _status) = registry.load_sound(source, &update).await?;
        tracing::info!("Sound {} started", key);
    }

    let limit = config.session.duration_millis.saturating_mul(4).max(1_000);
    let mut finished = 0;
    let deadline = tokio::time::sleep(Duration::from_millis(limit));
    tokio::pin!(deadline);

    while finished < count {
        tokio::select! {
            () = &mut deadline => {
                registry.unload_all();
                return Err(DemoError::Timeout(limit));
            }
            event = events.recv() => match event {
                Some(SoundEvent::StatusUpdated { key, status }) if status.did_just_finish => {
                    tracing::info!("Sound {} finished", key);
                    finished += 1;
                }
                Some(SoundEvent::Errored { key, error }) => {
                    tracing::warn!("Sound {} failed: {} ({})", key, error, error.code());
                    finished += 1;
                }
                Some(_) => {}
                None => break,
            },
        }
    }

    registry.unload_all();
    Ok(finished)
}
