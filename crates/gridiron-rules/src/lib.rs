//! Gridiron Rules -- outcome tables, resolvers and football rule primitives.
//!
//! This crate holds every leaf the game-flow orchestrator builds on: the
//! seeded random source, the live [`GameState`](state::GameState), the
//! immutable outcome tables, the two interchangeable snap resolvers (chart
//! and 2d20 dice), the penalty administrator, time management and special
//! teams. Nothing here owns a game; everything is a pure function of its
//! inputs plus draws from one injected [`GameRng`](rng::GameRng).
//!
//! # Quick Start
//!
//! ```
//! use gridiron_rules::prelude::*;
//!
//! let tables = TableRepository::builtin().unwrap();
//! let mut rng = GameRng::from_seed(42);
//! let state = GameState::new(42);
//!
//! let outcome = resolve_chart(
//!     tables.chart.as_ref(),
//!     "Pro Style",
//!     "Off Tackle",
//!     "Pass Defense",
//!     &mut rng,
//! );
//! let off = time_off(&outcome, &state, ClockContext::default());
//! assert!(off.seconds > 0);
//! ```
//!
//! # Modules
//!
//! - [`rng`]: seeded PCG random source and d20 pairs.
//! - [`state`]: `GameState`, sides, score and the HUD projection.
//! - [`tables`]: chart, matchup and penalty tables plus validation.
//! - [`chart`] / [`dice`]: the two resolution strategies.
//! - [`penalty`]: accept/decline candidates and the decision hint.
//! - [`clock`]: time off, two-minute rules and tempo.
//! - [`special_teams`]: kickoffs, punts, field goals, free kicks, PAT.

#![deny(unsafe_code)]

pub mod chart;
pub mod clock;
pub mod dice;
pub mod long_gain;
pub mod outcome;
pub mod penalty;
pub mod rng;
pub mod special_teams;
pub mod state;
pub mod tables;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while loading tables or resolving against them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// A table file was not valid JSON for its schema.
    #[error("failed to parse {table} table: {details}")]
    TableParse { table: String, details: String },

    /// A matchup table does not cover every 2d20 sum.
    #[error("matchup table '{table}' is missing dice sums {missing:?}")]
    IncompleteMatchupTable { table: String, missing: Vec<u32> },

    /// A penalty table does not have exactly ten slots.
    #[error("penalty table '{table}' has {found} slots, expected 10")]
    PenaltyTableSize { table: String, found: usize },

    /// A matchup entry's clock is not one of `10`, `20`, `30`.
    #[error("matchup table '{table}' sum {sum} has invalid clock value '{value}'")]
    InvalidClockValue {
        table: String,
        sum: String,
        value: String,
    },

    /// A matchup table's doubles routing names a penalty table that was not
    /// loaded.
    #[error("matchup table '{table}' references unknown penalty table '{reference}'")]
    UnknownPenaltyTable { table: String, reference: String },

    /// A sum inside `3..=39` was not in a table asserted complete.
    #[error("dice sum {sum} missing from a validated matchup table")]
    MissingDiceSum { sum: u32 },

    /// A d10 face missing from a validated penalty table.
    #[error("penalty slot {face} missing from a validated penalty table")]
    MissingPenaltySlot { face: u32 },

    /// Reading a table file failed.
    #[error("failed to read {path}: {details}")]
    Io { path: String, details: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::chart::{parse_result, resolve_chart, ChartResult, ChartRule, CHART_RULES};
    pub use crate::clock::{apply_time_off, time_off, ClockContext, Tempo, TimeOff};
    pub use crate::dice::{
        clamp_yardage, resolve_cards, resolve_dice, resolve_roll, DiceOutcome, DiceOutcomeKind,
        FieldClamp,
    };
    pub use crate::long_gain::roll_long_gain;
    pub use crate::outcome::{OutcomeCategory, PenaltyCall, PenaltyOn, PlayOutcome};
    pub use crate::penalty::{
        administer, half_distance, DecisionHint, PenaltyAdministration, PenaltyDecision,
        PenaltyInput, PenaltyMeta, Recommendation,
    };
    pub use crate::rng::{DiceRoll, GameRng};
    pub use crate::special_teams::{
        attempt_pat, field_goal, kickoff, punt, safety_free_kick, FieldGoalResult, KickResult,
        KickoffType, PatChoice, PatResult, SafetyFreeKick,
    };
    pub use crate::state::{format_clock, GameState, HudSnapshot, Score, Side};
    pub use crate::tables::{DiceTables, MatchupTable, OffenseChart, PenaltyTable, TableRepository};
    pub use crate::RulesError;
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn chart_snap_then_clock() {
        let tables = TableRepository::builtin().unwrap();
        let mut rng = GameRng::from_seed(3);
        let mut state = GameState::new(3);
        state.set_first_down();

        let outcome = resolve_chart(
            tables.chart.as_ref(),
            "Pro Style",
            "Sideline Pass",
            "Pass Defense",
            &mut rng,
        );
        assert_eq!(outcome.category, OutcomeCategory::Penalty);
        let call = outcome.penalty.clone().unwrap();
        assert_eq!(call.on, PenaltyOn::Offense);

        let admin = administer(PenaltyInput {
            pre: &state,
            call: &call,
            play: None,
            long_gain: outcome.long_gain,
            in_two_minute_window: false,
            play_first_down: false,
            tempo: Tempo::Normal,
            runoff: None,
        });
        assert_eq!(admin.accepted.offense_yard_line(), state.offense_yard_line() - 10);
        assert_eq!(admin.meta.deciding_side, Side::Ai);
    }

    #[test]
    fn dice_snap_never_leaves_the_field() {
        let tables = TableRepository::builtin().unwrap();
        let dice = tables.dice.as_ref();
        for seed in 0..300 {
            let mut rng = GameRng::from_seed(seed);
            let mut state = GameState::new(seed);
            state.set_offense_yard_line((seed % 99) as i32 + 1);
            state.set_first_down();
            let out = resolve_cards("Long Bomb", "Blitz", dice, &state, &mut rng).unwrap();
            if matches!(out.kind, DiceOutcomeKind::Normal | DiceOutcomeKind::PenaltyOption)
                && !out.play.is_turnover()
            {
                let landed = state.offense_yard_line() + out.play.yards;
                assert!((0..=100).contains(&landed), "seed {seed}: {landed}");
            }
        }
    }
}
