//! Dice-based resolution (2d20 against a matchup table).
//!
//! 1. Roll two d20.
//! 2. `1-1` is a forced defensive touchdown, `20-20` a forced offensive
//!    touchdown. Neither offers a penalty choice.
//! 3. Any other doubles roll a d10 on the penalty table. Override slots
//!    replace the play entirely; the rest attach the penalty to the ordinary
//!    play result as an accept/decline option.
//! 4. Non-doubles sums (3..=39) are looked up in the matchup table.
//!
//! When the table enables `field_pos_clamp`, yardage is clamped so the ball
//! never passes either goal line: the clamped yards exactly equal the
//! distance to the goal (a touchdown) or back to the offense's own goal (a
//! safety).

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::outcome::{OutcomeCategory, PenaltyCall, PlayOutcome};
use crate::rng::{DiceRoll, GameRng};
use crate::state::{GameState, FIELD_LENGTH};
use crate::tables::{DiceTables, MatchupEntry, MatchupTable, PenaltyTable, TurnoverKind};
use crate::RulesError;

/// Runoff for out-of-bounds plays and incompletions.
pub const RUNOFF_STOPPED: u32 = 10;
/// Runoff for plays that move the chains.
pub const RUNOFF_FIRST_DOWN: u32 = 20;
/// Runoff for everything else.
pub const RUNOFF_RUNNING: u32 = 30;

// ---------------------------------------------------------------------------
// DiceOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiceOutcomeKind {
    /// Plain table lookup.
    Normal,
    /// `1-1`: the defense scores.
    ForcedDefensiveTouchdown,
    /// `20-20`: the offense scores.
    ForcedOffensiveTouchdown,
    /// Penalty slot that replaces the play; no choice.
    PenaltyOverride,
    /// Ordinary play result plus an optional penalty.
    PenaltyOption,
    /// Unknown cards or missing tables.
    Stub,
}

/// Which goal line clamping stopped the ball at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldClamp {
    Touchdown,
    Safety,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceOutcome {
    pub roll: Option<DiceRoll>,
    pub kind: DiceOutcomeKind,
    /// The play result. For [`DiceOutcomeKind::PenaltyOverride`] this is the
    /// penalty itself.
    pub play: PlayOutcome,
    /// Penalty attached by a doubles roll (option or override).
    pub penalty: Option<PenaltyCall>,
    /// d10 face that selected the penalty.
    pub penalty_slot: Option<u32>,
    pub tags: Vec<String>,
    pub clamp: Option<FieldClamp>,
    /// Clock runoff derived from the play shape: 10, 20 or 30.
    pub runoff: u32,
}

impl DiceOutcome {
    pub fn stub() -> Self {
        Self {
            roll: None,
            kind: DiceOutcomeKind::Stub,
            play: PlayOutcome::stub(),
            penalty: None,
            penalty_slot: None,
            tags: Vec::new(),
            clamp: None,
            runoff: RUNOFF_RUNNING,
        }
    }

    /// Accept/decline is offered only for non-override doubles.
    pub fn offers_choice(&self) -> bool {
        self.kind == DiceOutcomeKind::PenaltyOption
    }
}

// ---------------------------------------------------------------------------
// Clamping
// ---------------------------------------------------------------------------

/// Clamp `yards` gained from offense-relative `position` so the ball stays on
/// the field.
pub fn clamp_yardage(position: i32, yards: i32) -> (i32, Option<FieldClamp>) {
    if position + yards > FIELD_LENGTH {
        (FIELD_LENGTH - position, Some(FieldClamp::Touchdown))
    } else if position + yards < 0 {
        (-position, Some(FieldClamp::Safety))
    } else {
        (yards, None)
    }
}

/// Runoff from play shape.
pub fn runoff_for(play: &PlayOutcome, to_go: i32) -> u32 {
    if play.out_of_bounds || play.category == OutcomeCategory::Incomplete {
        RUNOFF_STOPPED
    } else if play.converts(to_go) {
        RUNOFF_FIRST_DOWN
    } else {
        RUNOFF_RUNNING
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Look up the tables for a card pairing and resolve. Unknown cards and
/// missing tables produce [`DiceOutcome::stub`] without drawing.
pub fn resolve_cards(
    offense_card: &str,
    defense_card: &str,
    tables: Option<&DiceTables>,
    state: &GameState,
    rng: &mut GameRng,
) -> Result<DiceOutcome, RulesError> {
    let Some(tables) = tables else {
        warn!(offense_card, defense_card, "no dice tables loaded, using stub result");
        return Ok(DiceOutcome::stub());
    };
    let Some(matchup) = tables.matchup_for(offense_card, defense_card) else {
        warn!(offense_card, defense_card, "unknown card pairing, using stub result");
        return Ok(DiceOutcome::stub());
    };
    let Some(penalties) = tables.penalty_table_for(matchup) else {
        warn!(
            reference = %matchup.doubles.middle.penalty_table_ref,
            "matchup references a missing penalty table, using stub result"
        );
        return Ok(DiceOutcome::stub());
    };
    resolve_dice(matchup, penalties, state, rng)
}

/// Roll 2d20 and resolve against `matchup`.
pub fn resolve_dice(
    matchup: &MatchupTable,
    penalties: &PenaltyTable,
    state: &GameState,
    rng: &mut GameRng,
) -> Result<DiceOutcome, RulesError> {
    let roll = rng.roll_2d20();
    resolve_roll(roll, matchup, penalties, state, rng)
}

/// Resolve an already-rolled pair. Draws a d10 for middle doubles.
pub fn resolve_roll(
    roll: DiceRoll,
    matchup: &MatchupTable,
    penalties: &PenaltyTable,
    state: &GameState,
    rng: &mut GameRng,
) -> Result<DiceOutcome, RulesError> {
    if roll.is_doubles {
        match roll.d1 {
            1 => return Ok(forced_touchdown(roll, DiceOutcomeKind::ForcedDefensiveTouchdown, state)),
            20 => return Ok(forced_touchdown(roll, DiceOutcomeKind::ForcedOffensiveTouchdown, state)),
            _ => {}
        }

        let face = rng.d10();
        let slot = penalties
            .slot(face)
            .ok_or(RulesError::MissingPenaltySlot { face })?;
        let call = slot.to_call();

        if slot.override_play_result {
            let play = PlayOutcome::penalty(call.clone());
            let runoff = runoff_for(&play, state.to_go);
            debug!(d1 = roll.d1, face, label = %slot.label, "forced penalty override");
            return Ok(DiceOutcome {
                roll: Some(roll),
                kind: DiceOutcomeKind::PenaltyOverride,
                play,
                penalty: Some(call),
                penalty_slot: Some(face),
                tags: Vec::new(),
                clamp: None,
                runoff,
            });
        }

        let mut outcome = lookup(roll, matchup, state)?;
        outcome.kind = DiceOutcomeKind::PenaltyOption;
        outcome.penalty = Some(call);
        outcome.penalty_slot = Some(face);
        return Ok(outcome);
    }

    lookup(roll, matchup, state)
}

fn forced_touchdown(roll: DiceRoll, kind: DiceOutcomeKind, state: &GameState) -> DiceOutcome {
    let play = match kind {
        DiceOutcomeKind::ForcedOffensiveTouchdown => PlayOutcome::yardage(state.yards_to_goal()),
        _ => PlayOutcome::fumble(0, FIELD_LENGTH),
    };
    DiceOutcome {
        roll: Some(roll),
        kind,
        play,
        penalty: None,
        penalty_slot: None,
        tags: Vec::new(),
        clamp: None,
        runoff: RUNOFF_RUNNING,
    }
}

fn lookup(roll: DiceRoll, matchup: &MatchupTable, state: &GameState) -> Result<DiceOutcome, RulesError> {
    let entry = matchup.entry(roll.sum)?;
    let explosive = matchup.is_explosive(roll.sum);
    let (play, clamp) = play_from_entry(entry, explosive, matchup.meta.field_pos_clamp, state);
    let runoff = runoff_for(&play, state.to_go);
    if entry.clock_seconds() != Some(runoff) {
        debug!(
            sum = roll.sum,
            table_clock = %entry.clock,
            runoff,
            "table clock differs from play shape, using play shape"
        );
    }
    Ok(DiceOutcome {
        roll: Some(roll),
        kind: DiceOutcomeKind::Normal,
        play,
        penalty: None,
        penalty_slot: None,
        tags: entry.tags.clone(),
        clamp,
        runoff,
    })
}

fn play_from_entry(
    entry: &MatchupEntry,
    explosive: bool,
    field_pos_clamp: bool,
    state: &GameState,
) -> (PlayOutcome, Option<FieldClamp>) {
    if let Some(turnover) = &entry.turnover {
        let mut play = match turnover.kind {
            TurnoverKind::Interception => PlayOutcome::interception(entry.yards, turnover.return_yards),
            TurnoverKind::Fumble => PlayOutcome::fumble(entry.yards, turnover.return_yards),
        };
        play.return_to = turnover.return_to;
        return (play, None);
    }
    if entry.has_tag("incomplete") {
        return (PlayOutcome::incomplete(), None);
    }

    let (yards, clamp) = if field_pos_clamp {
        clamp_yardage(state.offense_yard_line(), entry.yards)
    } else {
        (entry.yards, None)
    };
    let play = PlayOutcome::yardage(yards)
        .with_out_of_bounds(entry.oob)
        .with_long_gain(explosive);
    (play, clamp)
}
