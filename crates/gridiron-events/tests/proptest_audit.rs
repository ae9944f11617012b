//! Property tests for the stream audits.

use gridiron_events::prelude::*;
use gridiron_rules::state::GameState;
use proptest::prelude::*;

/// A legal sequence of HUD snapshots: quarters advance, the clock only runs
/// down within a quarter.
fn hud_stream() -> impl Strategy<Value = Vec<FlowEvent>> {
    prop::collection::vec((0u32..60, any::<bool>(), 0i32..=100), 1..80).prop_map(|steps| {
        let mut state = GameState::new(1);
        let mut events = Vec::new();
        for (run, next_quarter, ball_on) in steps {
            if next_quarter && state.quarter < 4 {
                state.quarter += 1;
                state.clock = 900;
            } else {
                state.clock = state.clock.saturating_sub(run);
            }
            state.ball_on = ball_on;
            events.push(FlowEvent::hud(&state));
        }
        events
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1_000))]

    #[test]
    fn legal_hud_streams_pass(events in hud_stream()) {
        prop_assert!(check_hud(&events).is_empty());
        prop_assert!(audit_stream(&events, 8).is_empty());
    }

    #[test]
    fn digest_is_stable(events in hud_stream()) {
        let a = stream_digest(&events).unwrap();
        let b = stream_digest(&events.clone()).unwrap();
        prop_assert_eq!(a, b);
        prop_assert_eq!(first_divergence(&events, &events), None);
    }

    #[test]
    fn truncation_diverges_at_the_cut(events in hud_stream(), cut in 0usize..80) {
        let cut = cut.min(events.len());
        let expected = if cut == events.len() { None } else { Some(cut) };
        prop_assert_eq!(first_divergence(&events, &events[..cut]), expected);
    }
}
