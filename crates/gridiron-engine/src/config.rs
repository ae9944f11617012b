//! Engine configuration, passed explicitly to [`GameFlow::new`].
//!
//! There is no ambient engine switch: everything that selects behavior
//! lives in an [`EngineConfig`] value owned by the flow.
//!
//! [`GameFlow::new`]: crate::flow::GameFlow::new

use gridiron_rules::special_teams::SafetyFreeKick;
use gridiron_rules::state::Side;
use serde::{Deserialize, Serialize};

use crate::FlowError;

/// Which resolution strategy turns a play/defense pairing into an outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Deterministic result chart.
    Chart,
    /// 2d20 against the matchup tables.
    #[default]
    Dice,
}

/// Who makes decisions for a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Controller {
    /// Decisions halt the flow with a `choice-required` event.
    Human,
    /// Decisions resolve immediately through the policy.
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controllers {
    pub player: Controller,
    pub ai: Controller,
}

impl Default for Controllers {
    fn default() -> Self {
        Self {
            player: Controller::Human,
            ai: Controller::Ai,
        }
    }
}

impl Controllers {
    pub fn of(&self, side: Side) -> Controller {
        match side {
            Side::Player => self.player,
            Side::Ai => self.ai,
        }
    }

    /// Both sides automated; what batch runs use.
    pub fn all_ai() -> Self {
        Self {
            player: Controller::Ai,
            ai: Controller::Ai,
        }
    }
}

/// Configuration for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub engine: EngineKind,
    pub controllers: Controllers,
    /// Free-kick convention used when a human-controlled side concedes a
    /// safety. AI sides ask the policy.
    pub safety_free_kick: SafetyFreeKick,
    /// The chart engine evaluates clock stops as if never inside the
    /// two-minute window. The two-minute clamp itself still applies.
    pub legacy_chart_clock: bool,
    /// Events allowed between a score and the following kickoff in audits.
    pub score_kickoff_window: usize,
    /// Deck the chart engine reads from when a play input leaves it blank.
    pub deck: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Dice,
            controllers: Controllers::default(),
            safety_free_kick: SafetyFreeKick::KickoffPlus25,
            legacy_chart_clock: true,
            score_kickoff_window: 8,
            deck: "Pro Style".to_owned(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, FlowError> {
        serde_json::from_str(raw).map_err(|e| FlowError::InvalidConfig {
            details: e.to_string(),
        })
    }

    pub fn with_engine(mut self, engine: EngineKind) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_controllers(mut self, controllers: Controllers) -> Self {
        self.controllers = controllers;
        self
    }

    /// Whether time management should see the real two-minute window.
    pub fn uses_two_minute_stops(&self) -> bool {
        !(self.engine == EngineKind::Chart && self.legacy_chart_clock)
    }
}
