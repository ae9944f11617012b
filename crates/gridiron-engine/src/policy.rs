//! Decision policy for AI-controlled sides.
//!
//! The orchestrator asks a [`Policy`] whenever an AI side has to choose:
//! tempo, PAT kind, kickoff type, safety free kick. The autopilot also asks
//! it on fourth down. [`DefaultPolicy`] is the named fallback used when no
//! other policy is injected.

use gridiron_rules::clock::Tempo;
use gridiron_rules::special_teams::{field_goal_needed, KickoffType, PatChoice, SafetyFreeKick};
use gridiron_rules::state::{GameState, Side};
use serde::{Deserialize, Serialize};

/// What a policy sees: the game from one side's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Situation {
    pub side: Side,
    pub has_ball: bool,
    pub quarter: u8,
    pub clock: u32,
    pub down: u8,
    pub to_go: i32,
    /// Offense-relative; meaningful when `has_ball`.
    pub yards_to_goal: i32,
    /// Points `side` leads by (negative when trailing).
    pub margin: i32,
}

impl Situation {
    pub fn new(state: &GameState, side: Side) -> Self {
        Self {
            side,
            has_ball: state.possession == side,
            quarter: state.quarter,
            clock: state.clock,
            down: state.down,
            to_go: state.to_go,
            yards_to_goal: state.yards_to_goal(),
            margin: state.score.margin(side),
        }
    }

    /// Fourth quarter with `seconds` or less left.
    pub fn late(&self, seconds: u32) -> bool {
        self.quarter == 4 && self.clock <= seconds
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FourthDownChoice {
    GoForIt,
    Punt,
    FieldGoal,
}

/// Pure functions of a situation. Implementations must not draw from the
/// game's random source.
pub trait Policy: Send + Sync {
    fn choose_fourth_down(&self, situation: &Situation) -> FourthDownChoice;
    fn choose_pat(&self, situation: &Situation) -> PatChoice;
    fn choose_tempo(&self, situation: &Situation) -> Tempo;
    fn choose_kickoff_type(&self, situation: &Situation) -> KickoffType;
    fn choose_safety_free_kick(&self, situation: &Situation) -> SafetyFreeKick;
}

/// Conservative, situational defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl Policy for DefaultPolicy {
    fn choose_fourth_down(&self, s: &Situation) -> FourthDownChoice {
        let kickable = field_goal_needed(s.yards_to_goal).is_some_and(|needed| needed <= 8);
        if s.late(300) && s.margin < 0 {
            if kickable && s.margin >= -3 {
                return FourthDownChoice::FieldGoal;
            }
            return FourthDownChoice::GoForIt;
        }
        if kickable {
            return FourthDownChoice::FieldGoal;
        }
        if s.to_go <= 2 && s.yards_to_goal <= 60 {
            return FourthDownChoice::GoForIt;
        }
        FourthDownChoice::Punt
    }

    fn choose_pat(&self, s: &Situation) -> PatChoice {
        // Margin already includes the six.
        if s.late(600) && matches!(s.margin, -2 | 1 | 5) {
            PatChoice::TwoPoint
        } else {
            PatChoice::Kick
        }
    }

    fn choose_tempo(&self, s: &Situation) -> Tempo {
        if matches!(s.quarter, 2 | 4) && s.clock <= 120 && s.margin <= 0 {
            Tempo::HurryUp
        } else if s.late(300) && s.margin > 0 {
            Tempo::BurnClock
        } else {
            Tempo::Normal
        }
    }

    fn choose_kickoff_type(&self, s: &Situation) -> KickoffType {
        if s.late(180) && s.margin < 0 {
            KickoffType::Onside
        } else {
            KickoffType::Normal
        }
    }

    fn choose_safety_free_kick(&self, _s: &Situation) -> SafetyFreeKick {
        SafetyFreeKick::KickoffPlus25
    }
}
