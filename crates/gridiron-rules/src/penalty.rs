//! Penalty administration.
//!
//! Given the pre-snap state and a flag, [`administer`] builds both candidate
//! next states (penalty accepted, penalty declined) and a recommendation for
//! the offended team. It never mutates the pre-snap state.
//!
//! Enforcement rules:
//!
//! - Fouls by the defense march toward the offense's goal from the previous
//!   spot, or from midfield on a designated long-gain play.
//! - Fouls by the offense march back from the previous spot.
//! - Applied yardage is capped at half the distance to the relevant goal.
//! - Automatic first downs only come with defensive fouls; otherwise the down
//!   is replayed and the distance recomputed from the new spot.
//! - A defensive foul with the clock at `0:00` (before or after the snap) in
//!   regulation schedules an untimed down.

use serde::{Deserialize, Serialize};

use crate::clock::{apply_time_off, time_off, ClockContext, Tempo, TimeOff};
use crate::outcome::{OutcomeCategory, PenaltyCall, PenaltyOn, PlayOutcome};
use crate::special_teams::TOUCHBACK_LINE;
use crate::state::{GameState, Side, FIELD_LENGTH, MIDFIELD};

/// Score difference below which the recommendation is neutral.
pub const DECISION_TOLERANCE: f64 = 0.5;
/// Value of a candidate in which the offense lost the ball.
pub const POSSESSION_CHANGE_VALUE: f64 = -25.0;

const DOWN_WEIGHT: f64 = 2.0;
const TO_GO_WEIGHT: f64 = 0.3;
const TO_GO_CAP: i32 = 20;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything the administrator needs about one flagged snap.
#[derive(Debug, Clone, Copy)]
pub struct PenaltyInput<'a> {
    pub pre: &'a GameState,
    pub call: &'a PenaltyCall,
    /// The play the flag was thrown on, if it stands on its own. `None` for
    /// chart penalties and forced overrides; declining then leaves a 0-yard
    /// play.
    pub play: Option<&'a PlayOutcome>,
    /// Measure defensive fouls from midfield.
    pub long_gain: bool,
    pub in_two_minute_window: bool,
    /// Whether the underlying play alone moved the chains.
    pub play_first_down: bool,
    pub tempo: Tempo,
    /// Resolver runoff for the underlying play. Declining replays the play
    /// with this runoff, so the declined candidate uses it too.
    pub runoff: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PenaltyDecision {
    Accept,
    Decline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Accept,
    Decline,
    Neutral,
}

impl Recommendation {
    /// How an automated decider acts on the hint. Neutral accepts.
    pub fn as_decision(self) -> PenaltyDecision {
        match self {
            Recommendation::Decline => PenaltyDecision::Decline,
            Recommendation::Accept | Recommendation::Neutral => PenaltyDecision::Accept,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionHint {
    pub recommendation: Recommendation,
    /// Offense-perspective value of the accepted candidate.
    pub accepted_value: f64,
    pub declined_value: f64,
}

/// How the flag was enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyMeta {
    pub on: PenaltyOn,
    pub label: String,
    pub stated_yards: i32,
    pub applied_yards: i32,
    pub capped: bool,
    pub measured_from_midfield: bool,
    pub automatic_first_down: bool,
    pub loss_of_down: bool,
    pub untimed_down: bool,
    /// The offended team, who accepts or declines.
    pub deciding_side: Side,
    pub accepted_time_off: TimeOff,
    pub declined_time_off: TimeOff,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyAdministration {
    pub accepted: GameState,
    pub declined: GameState,
    pub meta: PenaltyMeta,
    pub hint: DecisionHint,
}

impl PenaltyAdministration {
    pub fn candidate(&self, decision: PenaltyDecision) -> &GameState {
        match decision {
            PenaltyDecision::Accept => &self.accepted,
            PenaltyDecision::Decline => &self.declined,
        }
    }
}

// ---------------------------------------------------------------------------
// Enforcement
// ---------------------------------------------------------------------------

/// Yardage actually applied for a foul of `stated` yards with `distance`
/// yards to the relevant goal, and whether the half-distance cap bit.
pub fn half_distance(stated: i32, distance: i32) -> (i32, bool) {
    let half = distance.max(0) / 2;
    if stated > half {
        (half, true)
    } else {
        (stated, false)
    }
}

/// Build both candidates and the recommendation.
pub fn administer(input: PenaltyInput<'_>) -> PenaltyAdministration {
    let pre = input.pre;
    let call = input.call;
    let from = pre.offense_yard_line();
    let line_to_gain = pre.line_to_gain();

    let measured_from_midfield = call.on == PenaltyOn::Defense && input.long_gain;
    let (spot, applied_yards, capped) = match call.on {
        PenaltyOn::Defense => {
            let base = if measured_from_midfield { MIDFIELD } else { from };
            let (applied, capped) = half_distance(call.yards, FIELD_LENGTH - base);
            (base + applied, applied, capped)
        }
        PenaltyOn::Offense => {
            let (applied, capped) = half_distance(call.yards, from);
            (from - applied, applied, capped)
        }
    };

    // Accepted candidate.
    let mut accepted = pre.clone();
    accepted.untimed_down_scheduled = false;
    accepted.set_offense_yard_line(spot);
    let automatic_first_down = call.first_down && call.on == PenaltyOn::Defense;
    if automatic_first_down || spot >= line_to_gain {
        accepted.set_first_down();
    } else {
        accepted.to_go = (line_to_gain - spot).max(1);
        if call.loss_of_down {
            if pre.down >= 4 {
                accepted.give_ball(pre.defense(), FIELD_LENGTH - spot);
            } else {
                accepted.down = pre.down + 1;
            }
        }
    }

    let penalty_play = PlayOutcome::penalty(call.clone());
    let accepted_time_off = run_clock(
        &mut accepted,
        pre,
        &penalty_play,
        ClockContext {
            in_two_minute_window: input.in_two_minute_window,
            converts: false,
            tempo: input.tempo,
            base_override: None,
        },
    );

    let untimed_down = call.on == PenaltyOn::Defense
        && pre.quarter <= 4
        && (pre.clock == 0 || accepted.clock == 0);
    accepted.untimed_down_scheduled = untimed_down;

    // Declined candidate.
    let fallback = PlayOutcome::other();
    let play = input.play.unwrap_or(&fallback);
    let mut declined = preview_scrimmage(pre, play);
    declined.untimed_down_scheduled = false;
    let declined_time_off = run_clock(
        &mut declined,
        pre,
        play,
        ClockContext {
            in_two_minute_window: input.in_two_minute_window,
            converts: input.play_first_down,
            tempo: input.tempo,
            base_override: input.runoff,
        },
    );

    let deciding_side = match call.on {
        PenaltyOn::Defense => pre.possession,
        PenaltyOn::Offense => pre.defense(),
    };
    let hint = decision_hint(pre, &accepted, &declined, deciding_side);

    PenaltyAdministration {
        meta: PenaltyMeta {
            on: call.on,
            label: call.label.clone(),
            stated_yards: call.yards,
            applied_yards,
            capped,
            measured_from_midfield,
            automatic_first_down,
            loss_of_down: call.loss_of_down,
            untimed_down,
            deciding_side,
            accepted_time_off,
            declined_time_off,
        },
        accepted,
        declined,
        hint,
    }
}

fn run_clock(candidate: &mut GameState, pre: &GameState, play: &PlayOutcome, ctx: ClockContext) -> TimeOff {
    // An untimed down takes nothing off.
    let off = if pre.untimed_down_scheduled {
        TimeOff::default()
    } else {
        time_off(play, pre, ctx)
    };
    candidate.clock = pre.clock;
    candidate.two_minute_warning_given = pre.two_minute_warning_given;
    apply_time_off(candidate, off);
    off
}

/// Where a plain scrimmage play leaves the ball, ignoring scoring and kicks.
/// Non-scoring results match what the orchestrator produces when it replays
/// a declined play.
pub fn preview_scrimmage(pre: &GameState, play: &PlayOutcome) -> GameState {
    let mut next = pre.clone();
    let from = pre.offense_yard_line();
    match play.category {
        OutcomeCategory::Interception | OutcomeCategory::Fumble => {
            let lost_at = (from + play.yards).clamp(0, FIELD_LENGTH);
            let recovered = play
                .return_to
                .unwrap_or(FIELD_LENGTH - lost_at + play.intercept_return.unwrap_or(0));
            let spot = if recovered <= 0 {
                TOUCHBACK_LINE
            } else {
                recovered.min(FIELD_LENGTH)
            };
            next.give_ball(pre.defense(), spot);
        }
        OutcomeCategory::Incomplete | OutcomeCategory::Other | OutcomeCategory::Penalty => {
            advance_down(&mut next, pre, from);
        }
        OutcomeCategory::Gain | OutcomeCategory::Loss => {
            let spot = (from + play.yards).clamp(0, FIELD_LENGTH);
            next.set_offense_yard_line(spot);
            advance_down(&mut next, pre, spot);
        }
    }
    next
}

fn advance_down(next: &mut GameState, pre: &GameState, spot: i32) {
    if spot >= pre.line_to_gain() {
        next.set_first_down();
    } else if pre.down >= 4 {
        next.give_ball(pre.defense(), FIELD_LENGTH - spot);
    } else {
        next.down = pre.down + 1;
        next.to_go = (pre.line_to_gain() - spot).max(1);
    }
}

// ---------------------------------------------------------------------------
// Decision hint
// ---------------------------------------------------------------------------

/// Offense-perspective value of a candidate.
pub fn candidate_value(pre: &GameState, candidate: &GameState) -> f64 {
    if candidate.possession != pre.possession {
        return POSSESSION_CHANGE_VALUE;
    }
    let advance = f64::from(candidate.offense_yard_line() - pre.offense_yard_line());
    let down_bonus = f64::from(4 - i32::from(candidate.down.min(4))) * DOWN_WEIGHT;
    let to_go_bonus = f64::from(10 - candidate.to_go.min(TO_GO_CAP)) * TO_GO_WEIGHT;
    advance + down_bonus + to_go_bonus
}

fn decision_hint(
    pre: &GameState,
    accepted: &GameState,
    declined: &GameState,
    deciding_side: Side,
) -> DecisionHint {
    let accepted_value = candidate_value(pre, accepted);
    let declined_value = candidate_value(pre, declined);
    let mut edge = accepted_value - declined_value;
    if deciding_side != pre.possession {
        edge = -edge;
    }
    let recommendation = if edge > DECISION_TOLERANCE {
        Recommendation::Accept
    } else if edge < -DECISION_TOLERANCE {
        Recommendation::Decline
    } else {
        Recommendation::Neutral
    };
    DecisionHint {
        recommendation,
        accepted_value,
        declined_value,
    }
}
