//! Kickoffs, onside kicks, punts, field goals, safety free kicks and the
//! try after a touchdown.
//!
//! Every function here is a pure function of its inputs and the draws it
//! takes from the game's [`GameRng`]. Results are reported as a
//! [`KickResult`]: who has the ball afterwards, where (measured from that
//! team's own goal line) and how much time the kick took.

use serde::{Deserialize, Serialize};

use crate::long_gain::roll_long_gain;
use crate::rng::GameRng;
use crate::state::{Score, Side, FIELD_LENGTH, MIDFIELD};

/// Kickoff results that carry a long gain are capped at the receiver's 50.
pub const KICKOFF_RETURN_CAP: i32 = MIDFIELD;
/// Yards a kickoff penalty marker costs the receiving team.
pub const KICKOFF_PENALTY_YARDS: i32 = 10;
pub const TOUCHBACK_LINE: i32 = 20;
/// A punt returner's long gain counts only beyond this.
pub const PUNT_RETURN_OFFSET: i32 = 30;
/// Yards from the line of scrimmage back to the holder.
pub const FIELD_GOAL_SNAP_YARDS: i32 = 7;
/// Beyond this many yards to the goal line, a kick cannot be good.
pub const MAX_FIELD_GOAL_YARDS_TO_GOAL: i32 = 45;

pub const KICKOFF_SECONDS: u32 = 5;
pub const KICKOFF_LONG_RETURN_SECONDS: u32 = 10;
pub const ONSIDE_SECONDS: u32 = 5;
pub const PUNT_SECONDS: u32 = 10;
pub const FIELD_GOAL_SECONDS: u32 = 5;
pub const FREE_KICK_SECONDS: u32 = 5;

pub const PAT_KICK_SUCCESS: f64 = 0.95;
pub const TWO_POINT_SUCCESS: f64 = 0.45;

// ---------------------------------------------------------------------------
// Choices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KickoffType {
    #[default]
    Normal,
    Onside,
}

/// Where the receiving team starts after a safety.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyFreeKick {
    /// Kickoff convention: receiver at its own 25.
    #[default]
    KickoffPlus25,
    /// Free-kick punt convention: receiver at its own 35.
    Punt35,
}

impl SafetyFreeKick {
    pub fn receiver_yard_line(self) -> i32 {
        match self {
            SafetyFreeKick::KickoffPlus25 => 25,
            SafetyFreeKick::Punt35 => 35,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatChoice {
    #[default]
    Kick,
    TwoPoint,
}

impl PatChoice {
    pub fn points(self) -> u32 {
        match self {
            PatChoice::Kick => 1,
            PatChoice::TwoPoint => 2,
        }
    }
}

// ---------------------------------------------------------------------------
// KickResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KickResult {
    /// Team in possession after the kick.
    pub possession: Side,
    /// Yard line from `possession`'s own goal.
    pub yard_line: i32,
    pub seconds: u32,
    /// The kicking team got the ball back.
    pub recovered_by_kicking_team: bool,
    /// The return went the distance.
    pub return_touchdown: bool,
    pub description: String,
}

impl KickResult {
    fn to(possession: Side, yard_line: i32, seconds: u32, description: String) -> Self {
        Self {
            possession,
            yard_line: yard_line.clamp(0, FIELD_LENGTH),
            seconds,
            recovered_by_kicking_team: false,
            return_touchdown: false,
            description,
        }
    }
}

// ---------------------------------------------------------------------------
// Kickoff
// ---------------------------------------------------------------------------

/// One row of the 2d6 kickoff table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickoffEntry {
    /// Receiver's own yard line.
    Spot(i32),
    /// Long-gain return plus a bonus, capped at the 50.
    LongGain { bonus: i32 },
    /// Kicking team recovers at the spot of the next roll.
    FumbleMarker,
    /// The next roll's spot loses ten yards.
    PenaltyMarker,
}

/// Kickoff table indexed by 2d6 (`2..=12`).
pub fn kickoff_entry(roll: u32) -> KickoffEntry {
    match roll {
        2 => KickoffEntry::LongGain { bonus: 0 },
        3 => KickoffEntry::FumbleMarker,
        4 => KickoffEntry::Spot(15),
        5 => KickoffEntry::Spot(20),
        6 | 7 => KickoffEntry::Spot(25),
        8 => KickoffEntry::Spot(30),
        9 => KickoffEntry::Spot(20),
        10 => KickoffEntry::Spot(35),
        11 => KickoffEntry::PenaltyMarker,
        _ => KickoffEntry::LongGain { bonus: 5 },
    }
}

/// Kick off from `kicking` to its opponent.
pub fn kickoff(kicking: Side, kind: KickoffType, score: &Score, rng: &mut GameRng) -> KickResult {
    match kind {
        KickoffType::Normal => normal_kickoff(kicking, rng),
        KickoffType::Onside => onside_kick(kicking, score, rng),
    }
}

fn normal_kickoff(kicking: Side, rng: &mut GameRng) -> KickResult {
    let receiving = kicking.opponent();
    let mut marker = None;
    let mut offset = false;

    let (spot, long_return) = loop {
        match kickoff_entry(rng.roll_2d6()) {
            KickoffEntry::Spot(spot) => break (spot, false),
            KickoffEntry::LongGain { bonus } => {
                break ((roll_long_gain(rng) + bonus).min(KICKOFF_RETURN_CAP), true)
            }
            entry => {
                if offset {
                    continue;
                }
                if marker.is_some() {
                    marker = None;
                    offset = true;
                } else {
                    marker = Some(entry);
                }
            }
        }
    };

    let seconds = if long_return {
        KICKOFF_LONG_RETURN_SECONDS
    } else {
        KICKOFF_SECONDS
    };

    match marker {
        Some(KickoffEntry::FumbleMarker) => KickResult {
            recovered_by_kicking_team: true,
            ..KickResult::to(
                kicking,
                FIELD_LENGTH - spot,
                seconds,
                format!("Kickoff fumbled, {kicking} recovers at the {receiving} {spot}"),
            )
        },
        Some(KickoffEntry::PenaltyMarker) => {
            let spot = (spot - KICKOFF_PENALTY_YARDS).max(0);
            KickResult::to(
                receiving,
                spot,
                seconds,
                format!("Kickoff return, penalty on {receiving}, ball at the {receiving} {spot}"),
            )
        }
        _ => {
            let note = if offset { " (offsetting markers)" } else { "" };
            KickResult::to(
                receiving,
                spot,
                seconds,
                format!("Kickoff returned to the {receiving} {spot}{note}"),
            )
        }
    }
}

/// Outcome of one onside row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnsideEntry {
    pub kicking_recovers: bool,
    /// Receiver's own yard line.
    pub receiver_yard_line: i32,
    pub penalty: bool,
}

/// Onside table indexed by 1d6 (after any boost).
pub fn onside_entry(face: u32) -> OnsideEntry {
    let (kicking_recovers, receiver_yard_line, penalty) = match face {
        1 => (false, 40, false),
        2 => (false, 45, false),
        3 => (false, 45, true),
        4 => (false, 50, false),
        5 => (true, 45, false),
        _ => (true, 40, false),
    };
    OnsideEntry {
        kicking_recovers,
        receiver_yard_line,
        penalty,
    }
}

/// Die face after the leading-or-tied boost.
pub fn onside_face(raw: u32, kicking: Side, score: &Score) -> u32 {
    if score.margin(kicking) >= 0 {
        (raw + 1).min(6)
    } else {
        raw
    }
}

fn onside_kick(kicking: Side, score: &Score, rng: &mut GameRng) -> KickResult {
    let receiving = kicking.opponent();
    let face = onside_face(rng.d6(), kicking, score);
    let entry = onside_entry(face);
    let mut spot = entry.receiver_yard_line;
    if entry.penalty {
        spot = (spot - KICKOFF_PENALTY_YARDS).max(0);
    }

    if entry.kicking_recovers {
        KickResult {
            recovered_by_kicking_team: true,
            ..KickResult::to(
                kicking,
                FIELD_LENGTH - spot,
                ONSIDE_SECONDS,
                format!("Onside kick recovered by {kicking} at the {receiving} {spot}"),
            )
        }
    } else {
        KickResult::to(
            receiving,
            spot,
            ONSIDE_SECONDS,
            format!("Onside kick recovered by {receiving} at its own {spot}"),
        )
    }
}

// ---------------------------------------------------------------------------
// Punt
// ---------------------------------------------------------------------------

/// Punt from the kicking team's own `yard_line`.
pub fn punt(kicking: Side, yard_line: i32, rng: &mut GameRng) -> KickResult {
    let receiving = kicking.opponent();
    let distance = roll_long_gain(rng);
    let landing = yard_line + distance;
    if landing >= FIELD_LENGTH {
        return KickResult::to(
            receiving,
            TOUCHBACK_LINE,
            PUNT_SECONDS,
            format!("Punt of {distance} yards, touchback"),
        );
    }

    let return_yards = (roll_long_gain(rng) - PUNT_RETURN_OFFSET).max(0);
    let caught_at = FIELD_LENGTH - landing;
    let spot = caught_at + return_yards;
    if spot >= FIELD_LENGTH {
        return KickResult {
            return_touchdown: true,
            ..KickResult::to(
                receiving,
                FIELD_LENGTH,
                PUNT_SECONDS,
                format!("Punt of {distance} yards returned for a touchdown"),
            )
        };
    }
    KickResult::to(
        receiving,
        spot,
        PUNT_SECONDS,
        format!("Punt of {distance} yards, returned {return_yards} to the {receiving} {spot}"),
    )
}

// ---------------------------------------------------------------------------
// Field goal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldGoalResult {
    pub good: bool,
    /// Distance of the kick (yards to goal plus the snap and end zone).
    pub distance: i32,
    pub roll: u32,
    /// Minimum 2d6 needed, `None` when out of range.
    pub needed: Option<u32>,
    /// On a miss, the defense's new possession.
    pub miss: Option<KickResult>,
    pub seconds: u32,
}

/// Place-kicking bucket for a distance measured as yards to the goal line.
pub fn field_goal_needed(yards_to_goal: i32) -> Option<u32> {
    match yards_to_goal {
        i32::MIN..=12 => Some(3),
        13..=22 => Some(4),
        23..=32 => Some(6),
        33..=38 => Some(8),
        39..=MAX_FIELD_GOAL_YARDS_TO_GOAL => Some(10),
        _ => None,
    }
}

/// Attempt a field goal for `kicking` from its own `yard_line`.
pub fn field_goal(kicking: Side, yard_line: i32, rng: &mut GameRng) -> FieldGoalResult {
    let yards_to_goal = FIELD_LENGTH - yard_line;
    let distance = yards_to_goal + FIELD_GOAL_SNAP_YARDS + 10;
    let needed = field_goal_needed(yards_to_goal);
    let roll = rng.roll_2d6();
    let good = needed.is_some_and(|n| roll >= n);

    let miss = (!good).then(|| {
        let receiving = kicking.opponent();
        let kick_spot = FIELD_LENGTH - (yard_line - FIELD_GOAL_SNAP_YARDS);
        // A kick from inside the kicker's own 7 would put the spot past the
        // goal line.
        let spot = kick_spot.clamp(TOUCHBACK_LINE, FIELD_LENGTH - 1);
        KickResult::to(
            receiving,
            spot,
            FIELD_GOAL_SECONDS,
            format!("{distance}-yard field goal no good, {receiving} takes over at its {spot}"),
        )
    });

    FieldGoalResult {
        good,
        distance,
        roll,
        needed,
        miss,
        seconds: FIELD_GOAL_SECONDS,
    }
}

// ---------------------------------------------------------------------------
// Safety free kick
// ---------------------------------------------------------------------------

/// Free kick by the team that conceded a safety.
pub fn safety_free_kick(conceding: Side, kind: SafetyFreeKick) -> KickResult {
    let receiving = conceding.opponent();
    let spot = kind.receiver_yard_line();
    KickResult::to(
        receiving,
        spot,
        FREE_KICK_SECONDS,
        format!("Free kick after the safety, {receiving} starts at its {spot}"),
    )
}

// ---------------------------------------------------------------------------
// Try after touchdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatResult {
    pub choice: PatChoice,
    pub good: bool,
    pub points: u32,
}

pub fn attempt_pat(choice: PatChoice, rng: &mut GameRng) -> PatResult {
    let threshold = match choice {
        PatChoice::Kick => PAT_KICK_SUCCESS,
        PatChoice::TwoPoint => TWO_POINT_SUCCESS,
    };
    let good = rng.chance(threshold);
    PatResult {
        choice,
        good,
        points: if good { choice.points() } else { 0 },
    }
}
