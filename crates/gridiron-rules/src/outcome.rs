//! The per-snap outcome record shared by both resolution strategies.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What kind of thing happened on the snap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeCategory {
    Gain,
    Loss,
    Incomplete,
    Interception,
    Fumble,
    Penalty,
    Other,
}

/// The team a flag was thrown against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PenaltyOn {
    Offense,
    Defense,
}

impl fmt::Display for PenaltyOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PenaltyOn::Offense => "offense",
            PenaltyOn::Defense => "defense",
        })
    }
}

/// A flag: who fouled, how far, and whether it carries an automatic first
/// down or loss of down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyCall {
    pub on: PenaltyOn,
    /// Stated yardage, always non-negative.
    pub yards: i32,
    pub first_down: bool,
    #[serde(default)]
    pub loss_of_down: bool,
    #[serde(default)]
    pub label: String,
}

/// Result of one snap, produced once by a resolver and consumed once by the
/// orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayOutcome {
    pub category: OutcomeCategory,
    /// Yards gained by the offense from the line of scrimmage (negative for
    /// losses). For turnovers this is where the ball changed hands.
    pub yards: i32,
    pub out_of_bounds: bool,
    pub penalty: Option<PenaltyCall>,
    /// Return yardage after an interception or fumble recovery.
    pub intercept_return: Option<i32>,
    /// Fixed spot (recovering team's own yard line) the return ends at.
    #[serde(default)]
    pub return_to: Option<i32>,
    /// The play was a designated long gain; defensive penalties on it are
    /// measured from midfield.
    #[serde(default)]
    pub long_gain: bool,
}

impl PlayOutcome {
    fn base(category: OutcomeCategory, yards: i32) -> Self {
        Self {
            category,
            yards,
            out_of_bounds: false,
            penalty: None,
            intercept_return: None,
            return_to: None,
            long_gain: false,
        }
    }

    /// Gain or loss depending on the sign of `yards`.
    pub fn yardage(yards: i32) -> Self {
        let category = if yards < 0 {
            OutcomeCategory::Loss
        } else {
            OutcomeCategory::Gain
        };
        Self::base(category, yards)
    }

    pub fn incomplete() -> Self {
        Self::base(OutcomeCategory::Incomplete, 0)
    }

    pub fn interception(at: i32, return_yards: i32) -> Self {
        Self {
            intercept_return: Some(return_yards),
            ..Self::base(OutcomeCategory::Interception, at)
        }
    }

    pub fn fumble(at: i32, return_yards: i32) -> Self {
        Self {
            intercept_return: Some(return_yards),
            ..Self::base(OutcomeCategory::Fumble, at)
        }
    }

    pub fn penalty(call: PenaltyCall) -> Self {
        let signed = match call.on {
            PenaltyOn::Defense => call.yards,
            PenaltyOn::Offense => -call.yards,
        };
        Self {
            penalty: Some(call),
            ..Self::base(OutcomeCategory::Penalty, signed)
        }
    }

    pub fn other() -> Self {
        Self::base(OutcomeCategory::Other, 0)
    }

    /// The neutral zero-yard result used for unknown cards and degraded
    /// tables. Time management charges it the default 30 seconds.
    pub fn stub() -> Self {
        Self::other()
    }

    pub fn with_out_of_bounds(mut self, oob: bool) -> Self {
        self.out_of_bounds = oob;
        self
    }

    pub fn with_long_gain(mut self, long_gain: bool) -> Self {
        self.long_gain = long_gain;
        self
    }

    pub fn is_turnover(&self) -> bool {
        matches!(
            self.category,
            OutcomeCategory::Interception | OutcomeCategory::Fumble
        )
    }

    /// Whether a scrimmage play of this shape reaches the line to gain.
    pub fn converts(&self, to_go: i32) -> bool {
        matches!(self.category, OutcomeCategory::Gain) && self.yards >= to_go
    }
}
