//! The live game state and the coordinate helpers around it.
//!
//! `ball_on` is an absolute yard line measured from the home (player) goal:
//! `0` is the player's goal line, `100` the AI's, regardless of who has the
//! ball. The player attacks toward `100`, the AI toward `0`. Most rules are
//! easier to state relative to the offense, so [`GameState`] exposes
//! offense-relative views ([`GameState::offense_yard_line`],
//! [`GameState::yards_to_goal`]) and conversion helpers on [`Side`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Seconds in a quarter.
pub const QUARTER_SECONDS: u32 = 900;
/// Clock value at which the two-minute warning fires in quarters 2 and 4.
pub const TWO_MINUTE_MARK: u32 = 120;
/// Length of the field between goal lines.
pub const FIELD_LENGTH: i32 = 100;
/// Absolute midfield.
pub const MIDFIELD: i32 = 50;
/// Yards needed for a fresh set of downs.
pub const FIRST_DOWN_YARDS: i32 = 10;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// One of the two coaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Ai,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Ai,
            Side::Ai => Side::Player,
        }
    }

    /// Convert an absolute yard line into this side's own-goal-relative
    /// yard line (`0` = this side's goal line).
    pub fn relative(self, absolute: i32) -> i32 {
        match self {
            Side::Player => absolute,
            Side::Ai => FIELD_LENGTH - absolute,
        }
    }

    /// Inverse of [`Side::relative`].
    pub fn absolute(self, relative: i32) -> i32 {
        match self {
            Side::Player => relative,
            Side::Ai => FIELD_LENGTH - relative,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => write!(f, "player"),
            Side::Ai => write!(f, "ai"),
        }
    }
}

// ---------------------------------------------------------------------------
// Score
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub player: u32,
    pub ai: u32,
}

impl Score {
    pub fn of(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player,
            Side::Ai => self.ai,
        }
    }

    pub fn add(&mut self, side: Side, points: u32) {
        match side {
            Side::Player => self.player += points,
            Side::Ai => self.ai += points,
        }
    }

    /// Points `side` is ahead by (negative when trailing).
    pub fn margin(&self, side: Side) -> i32 {
        self.of(side) as i32 - self.of(side.opponent()) as i32
    }
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// The single live state of one game.
///
/// Owned exclusively by the orchestrator; every other component reads it or
/// works on a clone (the penalty administrator builds candidate states from
/// clones, the resolvers only read).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Seed the game's random source was created from.
    pub seed: u64,
    /// `1..=4`.
    pub quarter: u8,
    /// Seconds remaining in the quarter, `0..=900`.
    pub clock: u32,
    /// `1..=4`.
    pub down: u8,
    /// Yards to the line to gain, at least 1.
    pub to_go: i32,
    /// Absolute yard line, `0..=100`.
    pub ball_on: i32,
    pub possession: Side,
    pub score: Score,
    /// True only between a touchdown and its extra-point/two-point attempt.
    pub awaiting_pat: bool,
    pub game_over: bool,
    /// A defensive penalty at `0:00` grants one more snap with no clock.
    pub untimed_down_scheduled: bool,
    /// Receiver of the opening kickoff; the other side receives in Q3.
    pub opening_kick_to: Option<Side>,
    /// The two-minute warning fires at most once per quarter.
    #[serde(default)]
    pub two_minute_warning_given: bool,
}

impl GameState {
    /// A fresh game before the opening kickoff.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            quarter: 1,
            clock: QUARTER_SECONDS,
            down: 1,
            to_go: FIRST_DOWN_YARDS,
            ball_on: 35,
            possession: Side::Player,
            score: Score::default(),
            awaiting_pat: false,
            game_over: false,
            untimed_down_scheduled: false,
            opening_kick_to: None,
            two_minute_warning_given: false,
        }
    }

    pub fn defense(&self) -> Side {
        self.possession.opponent()
    }

    /// Ball position measured from the offense's own goal line.
    pub fn offense_yard_line(&self) -> i32 {
        self.possession.relative(self.ball_on)
    }

    /// Yards between the ball and the goal line the offense attacks.
    pub fn yards_to_goal(&self) -> i32 {
        FIELD_LENGTH - self.offense_yard_line()
    }

    /// Offense-relative line to gain.
    pub fn line_to_gain(&self) -> i32 {
        self.offense_yard_line() + self.to_go
    }

    /// Place the ball at an offense-relative yard line, clamped to the field.
    pub fn set_offense_yard_line(&mut self, relative: i32) {
        let relative = relative.clamp(0, FIELD_LENGTH);
        self.ball_on = self.possession.absolute(relative);
    }

    /// Reset to 1st-and-10 (or 1st-and-goal) at the current spot.
    pub fn set_first_down(&mut self) {
        self.down = 1;
        self.to_go = FIRST_DOWN_YARDS.min(self.yards_to_goal()).max(1);
    }

    /// Hand the ball to `side` at its own-goal-relative `yard_line` with a
    /// fresh set of downs.
    pub fn give_ball(&mut self, side: Side, yard_line: i32) {
        self.possession = side;
        self.set_offense_yard_line(yard_line);
        self.set_first_down();
    }

    /// Quarter 2 or 4 with two minutes or less on the clock.
    pub fn in_two_minute_window(&self) -> bool {
        matches!(self.quarter, 2 | 4) && self.clock <= TWO_MINUTE_MARK
    }

    /// Neither a penalty decision nor a PAT is outstanding and the game is
    /// still running.
    pub fn is_pre_snap(&self) -> bool {
        !self.game_over && !self.awaiting_pat
    }

    /// Display projection.
    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            quarter: self.quarter,
            clock: self.clock,
            down: self.down,
            to_go: self.to_go,
            ball_on: self.ball_on,
            possession: self.possession,
            score: self.score,
        }
    }
}

// ---------------------------------------------------------------------------
// HudSnapshot
// ---------------------------------------------------------------------------

/// The `{quarter, clock, down, toGo, ballOn, possession, score}` projection
/// exposed for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub quarter: u8,
    pub clock: u32,
    pub down: u8,
    pub to_go: i32,
    pub ball_on: i32,
    pub possession: Side,
    pub score: Score,
}

/// `m:ss` rendering of a clock value.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
