//! Scripted sessions against the simulated platform, on a paused clock

use cadence_demo::{session, DemoConfig, DemoError};

fn short_config() -> DemoConfig {
    let mut config = DemoConfig::default();
    config.session.duration_millis = 1_000;
    config.session.interruption_after_millis = 100;
    config
}

#[tokio::test(start_paused = true)]
async fn player_session_plays_through_interruptions_to_the_end() {
    let config = short_config();

    let summary = session::run_player_session(&config).await.unwrap();

    assert!(summary.finished);
    assert!(summary.errors.is_empty());
    assert!(summary.status_updates > 0);
    assert_eq!(summary.final_position_millis, 1_000);
}

#[tokio::test(start_paused = true)]
async fn player_session_without_focus_never_starts() {
    let mut config = short_config();
    config.session.grant_focus = false;

    let summary = session::run_player_session(&config).await.unwrap();

    assert!(!summary.finished);
}

#[tokio::test(start_paused = true)]
async fn missing_source_fails_the_session() {
    let mut config = short_config();
    config.session.uri = "file:///demo/missing.ogg".to_string();

    let err = session::run_player_session(&config).await.unwrap_err();

    match err {
        DemoError::Playback(e) => assert_eq!(e.code(), "E_LOAD_ERROR"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn sounds_session_waits_for_every_sound() {
    let mut config = short_config();
    config.session.duration_millis = 500;

    let finished = session::run_sounds_session(&config, 3).await.unwrap();

    assert_eq!(finished, 3);
}
