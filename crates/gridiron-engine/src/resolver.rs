//! The snap resolver chosen by [`EngineKind`], and the play input that
//! drives it.

use std::sync::Arc;

use gridiron_rules::chart::resolve_chart;
use gridiron_rules::clock::Tempo;
use gridiron_rules::dice::{resolve_cards, DiceOutcome};
use gridiron_rules::outcome::PlayOutcome;
use gridiron_rules::rng::GameRng;
use gridiron_rules::state::GameState;
use gridiron_rules::tables::TableRepository;
use gridiron_rules::RulesError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineKind;

/// Play label that calls a punt.
pub const PUNT_LABEL: &str = "Punt";
/// Play label that calls a field goal attempt.
pub const FIELD_GOAL_LABEL: &str = "Field Goal";

/// One snap's selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayInput {
    /// Chart deck. Ignored by the dice engine.
    pub deck_name: String,
    /// Offensive play label (chart) or offensive card id (dice).
    pub play_label: String,
    /// Defensive call (chart) or defensive card id (dice).
    pub defense_label: String,
    #[serde(default)]
    pub tempo: Option<Tempo>,
}

impl PlayInput {
    pub fn new(deck_name: impl Into<String>, play_label: impl Into<String>, defense_label: impl Into<String>) -> Self {
        Self {
            deck_name: deck_name.into(),
            play_label: play_label.into(),
            defense_label: defense_label.into(),
            tempo: None,
        }
    }

    pub fn punt(deck_name: impl Into<String>) -> Self {
        Self::new(deck_name, PUNT_LABEL, "")
    }

    pub fn field_goal(deck_name: impl Into<String>) -> Self {
        Self::new(deck_name, FIELD_GOAL_LABEL, "")
    }

    pub fn with_tempo(mut self, tempo: Tempo) -> Self {
        self.tempo = Some(tempo);
        self
    }
}

/// What a scrimmage snap produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapResolution {
    pub outcome: PlayOutcome,
    /// Play-shape runoff from the dice engine, replacing the category table.
    pub runoff: Option<u32>,
    /// Full dice detail, when the dice engine resolved the snap.
    pub dice: Option<DiceOutcome>,
}

/// Resolves scrimmage snaps against the shared tables.
#[derive(Debug, Clone)]
pub struct Resolver {
    kind: EngineKind,
    tables: Arc<TableRepository>,
}

impl Resolver {
    pub fn new(kind: EngineKind, tables: Arc<TableRepository>) -> Self {
        Self { kind, tables }
    }

    pub fn kind(&self) -> EngineKind {
        self.kind
    }

    pub fn tables(&self) -> &Arc<TableRepository> {
        &self.tables
    }

    /// Resolve one scrimmage snap. Never mutates `state`.
    pub fn resolve(
        &self,
        input: &PlayInput,
        state: &GameState,
        rng: &mut GameRng,
    ) -> Result<SnapResolution, RulesError> {
        match self.kind {
            EngineKind::Chart => {
                let outcome = resolve_chart(
                    self.tables.chart.as_ref(),
                    &input.deck_name,
                    &input.play_label,
                    &input.defense_label,
                    rng,
                );
                debug!(
                    play = %input.play_label,
                    defense = %input.defense_label,
                    category = ?outcome.category,
                    yards = outcome.yards,
                    "chart snap"
                );
                Ok(SnapResolution {
                    outcome,
                    runoff: None,
                    dice: None,
                })
            }
            EngineKind::Dice => {
                let dice = resolve_cards(
                    &input.play_label,
                    &input.defense_label,
                    self.tables.dice.as_ref(),
                    state,
                    rng,
                )?;
                debug!(
                    play = %input.play_label,
                    defense = %input.defense_label,
                    roll = ?dice.roll,
                    kind = ?dice.kind,
                    yards = dice.play.yards,
                    "dice snap"
                );
                Ok(SnapResolution {
                    outcome: dice.play.clone(),
                    runoff: Some(dice.runoff),
                    dice: Some(dice),
                })
            }
        }
    }
}
