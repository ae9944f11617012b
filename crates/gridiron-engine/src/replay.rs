//! Record a game's inputs and replay them to verify determinism.
//!
//! A [`GameRecord`] is the seed, the configuration and the ordered
//! [`Action`]s that drove a [`GameFlow`], plus the event stream they
//! produced and its BLAKE3 digest. Replaying the actions into a fresh flow
//! must reproduce the stream byte for byte; [`replay`] reports the first
//! event index where it does not.
//!
//! # Recording and replaying
//!
//! ```
//! use std::sync::Arc;
//! use gridiron_engine::prelude::*;
//!
//! let tables = Arc::new(TableRepository::builtin().unwrap());
//! let config = EngineConfig::default().with_controllers(Controllers::all_ai());
//! let mut flow = GameFlow::new(9, config.clone(), tables.clone());
//! let mut recorder = GameRecorder::new(9, config);
//!
//! recorder.apply(&mut flow, Action::StartGame).unwrap();
//! recorder
//!     .apply(&mut flow, Action::Snap(PlayInput::new("", "Draw", "Blitz")))
//!     .unwrap();
//!
//! let record = recorder.finish(flow.events().events()).unwrap();
//! let result = replay(&record, tables).unwrap();
//! assert!(result.completed);
//! assert!(result.first_divergence.is_none());
//! ```

use std::sync::Arc;

use anyhow::Context;
use gridiron_events::audit::{first_divergence, stream_digest};
use gridiron_events::event::FlowEvent;
use gridiron_events::EventsError;
use gridiron_rules::penalty::PenaltyDecision;
use gridiron_rules::special_teams::PatChoice;
use gridiron_rules::tables::TableRepository;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::flow::{FlowStep, GameFlow};
use crate::resolver::PlayInput;
use crate::FlowError;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// One call into the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    StartGame,
    Snap(PlayInput),
    PenaltyDecision { decision: PenaltyDecision },
    Pat { choice: PatChoice },
}

impl Action {
    /// Dispatch this action to `flow`.
    pub fn apply(&self, flow: &mut GameFlow) -> Result<FlowStep, FlowError> {
        match self {
            Action::StartGame => flow.start_game(),
            Action::Snap(input) => flow.resolve_snap(input),
            Action::PenaltyDecision { decision } => flow.finalize_penalty(*decision),
            Action::Pat { choice } => flow.finalize_pat(*choice),
        }
    }
}

// ---------------------------------------------------------------------------
// GameRecord
// ---------------------------------------------------------------------------

/// Everything needed to reproduce and verify one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub seed: u64,
    pub config: EngineConfig,
    pub actions: Vec<Action>,
    pub events: Vec<FlowEvent>,
    /// BLAKE3 hex digest of `events`.
    pub digest: String,
}

/// Accumulates the actions applied to a flow.
#[derive(Debug, Clone)]
pub struct GameRecorder {
    seed: u64,
    config: EngineConfig,
    actions: Vec<Action>,
}

impl GameRecorder {
    pub fn new(seed: u64, config: EngineConfig) -> Self {
        Self {
            seed,
            config,
            actions: Vec::new(),
        }
    }

    /// Record an action that was applied elsewhere.
    pub fn record(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Apply `action` to `flow` and record it if it succeeded. Rejected
    /// actions leave no trace, so the record replays cleanly.
    pub fn apply(&mut self, flow: &mut GameFlow, action: Action) -> Result<FlowStep, FlowError> {
        let step = action.apply(flow)?;
        self.actions.push(action);
        Ok(step)
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Seal the record with the stream the actions produced.
    pub fn finish(self, events: &[FlowEvent]) -> Result<GameRecord, EventsError> {
        let digest = stream_digest(events)?;
        Ok(GameRecord {
            seed: self.seed,
            config: self.config,
            actions: self.actions,
            events: events.to_vec(),
            digest,
        })
    }
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

/// The outcome of replaying a [`GameRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayResult {
    /// Every recorded action was accepted again.
    pub completed: bool,
    pub actions_replayed: usize,
    /// First event index where the replayed stream differs from the record.
    pub first_divergence: Option<usize>,
    pub digest_matches: bool,
    pub replayed_digest: String,
}

/// Re-run `record` against `tables` and compare the streams.
pub fn replay(record: &GameRecord, tables: Arc<TableRepository>) -> anyhow::Result<ReplayResult> {
    let mut flow = GameFlow::new(record.seed, record.config.clone(), tables);
    let mut completed = true;
    let mut actions_replayed = 0;

    for (index, action) in record.actions.iter().enumerate() {
        match action.apply(&mut flow) {
            Ok(_) => actions_replayed += 1,
            Err(e) => {
                warn!(index, error = %e, "recorded action rejected during replay");
                completed = false;
                break;
            }
        }
    }

    let replayed = flow.events().events();
    let replayed_digest = stream_digest(replayed).context("digesting replayed stream")?;
    let first_divergence = first_divergence(&record.events, replayed);
    debug!(
        seed = record.seed,
        actions_replayed,
        ?first_divergence,
        "replay finished"
    );

    Ok(ReplayResult {
        completed,
        actions_replayed,
        first_divergence,
        digest_matches: replayed_digest == record.digest,
        replayed_digest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_json_shape() {
        let json = serde_json::to_string(&Action::Pat {
            choice: PatChoice::TwoPoint,
        })
        .unwrap();
        assert!(json.contains(r#""action":"pat""#), "{json}");

        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(
            back,
            Action::Pat {
                choice: PatChoice::TwoPoint
            }
        );
    }

    #[test]
    fn rejected_actions_are_not_recorded() {
        let tables = Arc::new(TableRepository::builtin().unwrap());
        let mut flow = GameFlow::new(1, EngineConfig::default(), tables);
        let mut recorder = GameRecorder::new(1, EngineConfig::default());
        let err = recorder
            .apply(&mut flow, Action::Snap(PlayInput::new("", "Draw", "Blitz")))
            .unwrap_err();
        assert_eq!(err, FlowError::GameNotStarted);
        assert!(recorder.actions().is_empty());
    }
}
