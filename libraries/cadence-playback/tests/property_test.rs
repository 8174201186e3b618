//! Property-based tests for parameter reconciliation
//!
//! Uses proptest to check the focus and pause invariants from any prior
//! state. No shallow tests - every property test verifies meaningful invariants.

mod common;

use cadence_core::{MediaSource, ParametersUpdate, PlaybackConfig};
use cadence_playback::PlayerManager;
use common::{Command, MockFocus, MockPlayer};
use proptest::prelude::*;
use std::sync::Arc;

// ===== Helpers =====

fn arbitrary_update() -> impl Strategy<Value = ParametersUpdate> {
    (
        proptest::option::of(any::<bool>()),
        proptest::option::of(0.0f64..4.0),
        proptest::option::of(any::<bool>()),
        proptest::option::of(0.0f32..=1.0),
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<bool>()),
        proptest::option::of(-100i64..2_000),
    )
        .prop_map(
            |(should_play, rate, should_correct_pitch, volume, is_muted, is_looping, interval)| {
                ParametersUpdate {
                    should_play,
                    rate,
                    should_correct_pitch,
                    volume,
                    is_muted,
                    is_looping,
                    progress_update_interval_millis: interval,
                }
            },
        )
}

/// Load a manager and walk it through `history` before the property is checked
fn run_with_history<F>(history: &[ParametersUpdate], grant: bool, check: F)
where
    F: FnOnce(&PlayerManager, &Arc<MockPlayer>, &Arc<MockFocus>),
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async {
        let player = MockPlayer::new(5_000);
        let focus = MockFocus::granting();
        let manager = PlayerManager::new(
            player.clone(),
            focus.clone(),
            MediaSource::new("file:///prop.mp3"),
            &PlaybackConfig::default(),
        )
        .unwrap();
        manager.load(&ParametersUpdate::default()).await.unwrap();

        for update in history {
            let _ = manager.set_parameters(update);
        }

        focus.set_grant(grant);
        player.clear_commands();
        check(&manager, &player, &focus);
    });
}

// ===== Property Tests =====

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn zero_rate_never_requests_focus(
        history in prop::collection::vec(arbitrary_update(), 0..6),
        base in arbitrary_update(),
    ) {
        run_with_history(&history, true, |manager, player, focus| {
            let requests = focus.requests();
            let update = base.then(&ParametersUpdate {
                should_play: Some(true),
                rate: Some(0.0),
                ..Default::default()
            });

            let status = manager.set_parameters(&update).unwrap();

            assert_eq!(focus.requests(), requests);
            assert!(!status.is_playing);
            assert_eq!(player.play_commands(), 0);
            assert!(player.commands().contains(&Command::Pause));
        });
    }

    #[test]
    fn not_playing_never_requests_focus(
        history in prop::collection::vec(arbitrary_update(), 0..6),
        base in arbitrary_update(),
    ) {
        run_with_history(&history, true, |manager, player, focus| {
            let requests = focus.requests();
            let update = base.then(&ParametersUpdate::should_play(false));

            manager.set_parameters(&update).unwrap();

            assert_eq!(focus.requests(), requests);
            assert!(!manager.is_playing());
            assert_eq!(player.play_commands(), 0);
        });
    }

    #[test]
    fn focus_denial_keeps_intent_and_player_paused(
        history in prop::collection::vec(arbitrary_update(), 0..6),
        base in arbitrary_update(),
        rate in 0.1f64..4.0,
    ) {
        run_with_history(&history, false, |manager, player, _focus| {
            // pause first so the player state does not depend on history
            manager.pause().unwrap();
            player.clear_commands();

            let update = base.then(&ParametersUpdate {
                should_play: Some(true),
                rate: Some(rate),
                ..Default::default()
            });
            let expected = manager.parameters().update(&update);

            assert!(manager.set_parameters(&update).is_err());
            assert_eq!(manager.parameters(), expected);
            assert!(!manager.is_playing());
            assert_eq!(player.play_commands(), 0);
        });
    }
}
