//! Property-based tests for the parameters merge
//!
//! No shallow tests - every property test verifies meaningful invariants.

use cadence_core::{Parameters, ParametersUpdate};
use proptest::prelude::*;

// ===== Helpers =====

fn arbitrary_update() -> impl Strategy<Value = ParametersUpdate> {
    (
        proptest::option::of(any::<bool>()),
        proptest::option::of(0.0f64..8.0),
        proptest::option::of(any::<bool>()),
        proptest::option::of(-1.0f32..2.0),
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<i64>()),
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

fn arbitrary_parameters() -> impl Strategy<Value = Parameters> {
    arbitrary_update().prop_map(|update| Parameters::default().update(&update))
}

// ===== Property Tests =====

proptest! {
    #[test]
    fn sequential_updates_equal_composed_update(
        base in arbitrary_parameters(),
        first in arbitrary_update(),
        second in arbitrary_update(),
    ) {
        let sequential = base.update(&first).update(&second);
        let composed = base.update(&first.then(&second));
        prop_assert_eq!(sequential, composed);
    }

    #[test]
    fn empty_update_is_identity(base in arbitrary_parameters()) {
        prop_assert_eq!(base.update(&ParametersUpdate::default()), base);
    }

    #[test]
    fn present_fields_always_win(base in arbitrary_parameters(), update in arbitrary_update()) {
        let merged = base.update(&update);

        prop_assert_eq!(merged.should_play, update.should_play.unwrap_or(base.should_play));
        prop_assert_eq!(merged.rate, update.rate.unwrap_or(base.rate));
        prop_assert_eq!(merged.volume, update.volume.unwrap_or(base.volume));
        prop_assert_eq!(merged.is_muted, update.is_muted.unwrap_or(base.is_muted));
        prop_assert_eq!(
            merged.progress_update_interval_millis,
            update
                .progress_update_interval_millis
                .unwrap_or(base.progress_update_interval_millis)
        );
    }

    #[test]
    fn zero_rate_is_never_actually_playing(base in arbitrary_parameters()) {
        let stopped = base.update(&ParametersUpdate {
            should_play: Some(true),
            rate: Some(0.0),
            ..Default::default()
        });
        prop_assert!(!stopped.should_actually_play());
    }
}
