//! Time management: how many seconds a snap takes off the clock.
//!
//! The pipeline runs in a fixed order:
//!
//! 1. Base time by outcome category (or a resolver-supplied runoff).
//! 2. Two-minute stops: once inside the window, incompletions,
//!    out-of-bounds gains and plays that move the chains take no time.
//! 3. Tempo.
//! 4. The two-minute clamp, which overrides everything above: a snap that
//!    would carry the clock from above 2:00 to 2:00 or below in quarters 2
//!    and 4 stops it at exactly 2:00 and fires the warning, once per quarter.

use serde::{Deserialize, Serialize};

use crate::outcome::{OutcomeCategory, PlayOutcome};
use crate::state::{GameState, TWO_MINUTE_MARK};

/// Time off for incompletions, fumbles, penalties and out-of-bounds plays.
pub const STOPPED_SECONDS: u32 = 15;
/// Time off for ordinary gains, losses and interceptions.
pub const RUNNING_SECONDS: u32 = 30;
/// Time off for gains longer than [`LONG_PLAY_YARDS`].
pub const LONG_PLAY_SECONDS: u32 = 45;
pub const LONG_PLAY_YARDS: i32 = 20;

const TEMPO_FACTOR: f64 = 0.7;
const TEMPO_FLOOR: u32 = 5;
const BURN_MIN: u32 = 35;
const BURN_MAX: u32 = 40;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tempo {
    #[default]
    Normal,
    HurryUp,
    NoHuddle,
    BurnClock,
}

/// Situation inputs for one time-off computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockContext {
    /// Whether the two-minute stop rules apply to this snap.
    pub in_two_minute_window: bool,
    /// The snap moved the chains.
    pub converts: bool,
    pub tempo: Tempo,
    /// Resolver-supplied runoff replacing the category table.
    pub base_override: Option<u32>,
}

/// Result of [`time_off`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOff {
    pub seconds: u32,
    /// The two-minute clamp fired.
    pub two_minute_warning: bool,
}

/// Category table. Out of bounds overrides everything.
pub fn base_seconds(outcome: &PlayOutcome) -> u32 {
    if outcome.out_of_bounds {
        return STOPPED_SECONDS;
    }
    match outcome.category {
        OutcomeCategory::Incomplete | OutcomeCategory::Fumble | OutcomeCategory::Penalty => {
            STOPPED_SECONDS
        }
        OutcomeCategory::Interception | OutcomeCategory::Loss => RUNNING_SECONDS,
        OutcomeCategory::Gain if outcome.yards.abs() > LONG_PLAY_YARDS => LONG_PLAY_SECONDS,
        OutcomeCategory::Gain | OutcomeCategory::Other => RUNNING_SECONDS,
    }
}

/// Seconds `outcome` takes off `state.clock`.
pub fn time_off(outcome: &PlayOutcome, state: &GameState, ctx: ClockContext) -> TimeOff {
    let mut seconds = ctx.base_override.unwrap_or_else(|| base_seconds(outcome));

    if ctx.in_two_minute_window {
        let stops = outcome.category == OutcomeCategory::Incomplete
            || (outcome.out_of_bounds && outcome.category == OutcomeCategory::Gain)
            || ctx.converts;
        if stops {
            seconds = 0;
        }
    }

    seconds = apply_tempo(seconds, outcome.category, ctx.tempo);

    let crosses = matches!(state.quarter, 2 | 4)
        && !state.two_minute_warning_given
        && state.clock > TWO_MINUTE_MARK
        && state.clock.saturating_sub(seconds) <= TWO_MINUTE_MARK;
    if crosses {
        return TimeOff {
            seconds: state.clock - TWO_MINUTE_MARK,
            two_minute_warning: true,
        };
    }

    TimeOff {
        seconds,
        two_minute_warning: false,
    }
}

fn apply_tempo(seconds: u32, category: OutcomeCategory, tempo: Tempo) -> u32 {
    if seconds == 0 {
        return 0;
    }
    match tempo {
        Tempo::Normal => seconds,
        Tempo::HurryUp | Tempo::NoHuddle => {
            ((f64::from(seconds) * TEMPO_FACTOR).floor() as u32).max(TEMPO_FLOOR)
        }
        Tempo::BurnClock => match category {
            OutcomeCategory::Gain | OutcomeCategory::Loss => seconds.clamp(BURN_MIN, BURN_MAX),
            _ => seconds,
        },
    }
}

/// Run `time_off` off the clock and record a fired warning.
pub fn apply_time_off(state: &mut GameState, time_off: TimeOff) {
    state.clock = state.clock.saturating_sub(time_off.seconds);
    if time_off.two_minute_warning {
        state.two_minute_warning_given = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(quarter: u8, clock: u32) -> GameState {
        let mut state = GameState::new(1);
        state.quarter = quarter;
        state.clock = clock;
        state
    }

    #[test]
    fn category_table() {
        assert_eq!(base_seconds(&PlayOutcome::incomplete()), 15);
        assert_eq!(base_seconds(&PlayOutcome::interception(0, 0)), 30);
        assert_eq!(base_seconds(&PlayOutcome::fumble(0, 0)), 15);
        assert_eq!(base_seconds(&PlayOutcome::yardage(-4)), 30);
        assert_eq!(base_seconds(&PlayOutcome::yardage(8)), 30);
        assert_eq!(base_seconds(&PlayOutcome::yardage(21)), 45);
        assert_eq!(base_seconds(&PlayOutcome::yardage(21).with_out_of_bounds(true)), 15);
    }

    #[test]
    fn two_minute_clamp_lands_on_two_minutes() {
        let s = state(2, 130);
        let off = time_off(&PlayOutcome::yardage(25), &s, ClockContext::default());
        assert_eq!(off, TimeOff { seconds: 10, two_minute_warning: true });

        let mut s = s;
        apply_time_off(&mut s, off);
        assert_eq!(s.clock, 120);
        assert!(s.two_minute_warning_given);
    }

    #[test]
    fn clamp_fires_once_per_quarter() {
        let mut s = state(4, 130);
        s.two_minute_warning_given = true;
        let off = time_off(&PlayOutcome::yardage(25), &s, ClockContext::default());
        assert_eq!(off, TimeOff { seconds: 45, two_minute_warning: false });
    }

    #[test]
    fn clamp_ignores_odd_quarters() {
        let s = state(3, 130);
        let off = time_off(&PlayOutcome::yardage(25), &s, ClockContext::default());
        assert!(!off.two_minute_warning);
        assert_eq!(off.seconds, 45);
    }

    #[test]
    fn clock_stops_inside_the_window() {
        let s = state(4, 90);
        let ctx = ClockContext {
            in_two_minute_window: true,
            ..ClockContext::default()
        };
        assert_eq!(time_off(&PlayOutcome::incomplete(), &s, ctx).seconds, 0);
        assert_eq!(
            time_off(&PlayOutcome::yardage(4).with_out_of_bounds(true), &s, ctx).seconds,
            0
        );
        assert_eq!(time_off(&PlayOutcome::yardage(4), &s, ctx).seconds, 30);
        let converting = ClockContext { converts: true, ..ctx };
        assert_eq!(time_off(&PlayOutcome::yardage(12), &s, converting).seconds, 0);
    }

    #[test]
    fn tempo_adjustments() {
        let s = state(1, 600);
        let hurry = ClockContext {
            tempo: Tempo::HurryUp,
            ..ClockContext::default()
        };
        assert_eq!(time_off(&PlayOutcome::yardage(3), &s, hurry).seconds, 21);
        let burn = ClockContext {
            tempo: Tempo::BurnClock,
            ..ClockContext::default()
        };
        assert_eq!(time_off(&PlayOutcome::yardage(3), &s, burn).seconds, 35);
        assert_eq!(time_off(&PlayOutcome::yardage(30), &s, burn).seconds, 40);
        assert_eq!(time_off(&PlayOutcome::incomplete(), &s, burn).seconds, 15);
    }

    #[test]
    fn tempo_floor_is_five_seconds() {
        let s = state(1, 600);
        let ctx = ClockContext {
            tempo: Tempo::NoHuddle,
            base_override: Some(6),
            ..ClockContext::default()
        };
        assert_eq!(time_off(&PlayOutcome::incomplete(), &s, ctx).seconds, 5);
    }

    #[test]
    fn runoff_override_replaces_the_table() {
        let s = state(1, 600);
        let ctx = ClockContext {
            base_override: Some(10),
            ..ClockContext::default()
        };
        assert_eq!(time_off(&PlayOutcome::yardage(30), &s, ctx).seconds, 10);
    }

    #[test]
    fn clock_never_goes_negative() {
        let mut s = state(1, 12);
        apply_time_off(&mut s, TimeOff { seconds: 30, two_minute_warning: false });
        assert_eq!(s.clock, 0);
    }
}
