//! Seeded coaches that play whole games without a caller.
//!
//! The [`Autopilot`] picks plays and defenses from its own random source,
//! derived from the game seed but never shared with the game, so the game's
//! draw sequence depends only on the inputs it receives. Decisions that
//! halt the flow are answered the way an AI side would answer them.

use std::sync::Arc;

use anyhow::Context;
use gridiron_events::audit::{audit_stream, AuditViolation};
use gridiron_events::event::FlowEvent;
use gridiron_rules::rng::GameRng;
use gridiron_rules::state::GameState;
use gridiron_rules::tables::TableRepository;

use crate::config::{EngineConfig, EngineKind};
use crate::drive::DriveSummary;
use crate::flow::GameFlow;
use crate::policy::{FourthDownChoice, Situation};
use crate::replay::{Action, GameRecord, GameRecorder};
use crate::resolver::PlayInput;

/// Mixed into the game seed for the coaches' random source.
pub const AUTOPILOT_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Upper bound on actions in one simulated game.
pub const MAX_ACTIONS: usize = 5_000;

/// Defensive calls used when no chart deck lists any.
pub const DEFAULT_DEFENSES: [&str; 5] = ["Run Defense", "Pass Defense", "Blitz", "Prevent", "Goal Line"];

/// Play caller for both sides.
#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: GameRng,
    deck: String,
    plays: Vec<String>,
    defenses: Vec<String>,
}

impl Autopilot {
    pub fn new(seed: u64, config: &EngineConfig, tables: &TableRepository) -> Self {
        let deck = config.deck.clone();
        let plays: Vec<String> = match config.engine {
            EngineKind::Chart => tables
                .chart
                .as_ref()
                .map(|chart| chart.plays(&deck).into_iter().map(str::to_owned).collect())
                .unwrap_or_default(),
            EngineKind::Dice => tables
                .dice
                .as_ref()
                .map(|dice| dice.offense_cards().into_iter().map(str::to_owned).collect())
                .unwrap_or_default(),
        };
        let mut defenses: Vec<String> = tables
            .chart
            .as_ref()
            .map(|chart| chart.defenses(&deck).into_iter().map(str::to_owned).collect())
            .unwrap_or_default();
        if defenses.is_empty() {
            defenses = DEFAULT_DEFENSES.iter().map(|d| (*d).to_owned()).collect();
        }

        Self {
            rng: GameRng::from_seed(seed ^ AUTOPILOT_SEED_SALT),
            deck,
            plays,
            defenses,
        }
    }

    pub fn plays(&self) -> &[String] {
        &self.plays
    }

    pub fn defenses(&self) -> &[String] {
        &self.defenses
    }

    /// The next call to make on `flow`.
    pub fn next_action(&mut self, flow: &GameFlow) -> Action {
        if let Some(admin) = flow.pending_penalty() {
            return Action::PenaltyDecision {
                decision: admin.hint.recommendation.as_decision(),
            };
        }
        if let Some(side) = flow.pending_pat() {
            let choice = flow.policy().choose_pat(&Situation::new(flow.state(), side));
            return Action::Pat { choice };
        }
        Action::Snap(self.call_play(flow.state(), flow))
    }

    fn call_play(&mut self, state: &GameState, flow: &GameFlow) -> PlayInput {
        if state.down >= 4 {
            let situation = Situation::new(state, state.possession);
            match flow.policy().choose_fourth_down(&situation) {
                FourthDownChoice::Punt => return PlayInput::punt(self.deck.clone()),
                FourthDownChoice::FieldGoal => return PlayInput::field_goal(self.deck.clone()),
                FourthDownChoice::GoForIt => {}
            }
        }
        let play = pick(&mut self.rng, &self.plays).unwrap_or("Stub");
        let defense = pick(&mut self.rng, &self.defenses).unwrap_or("Stub");
        PlayInput::new(self.deck.clone(), play, defense)
    }
}

fn pick<'a>(rng: &mut GameRng, options: &'a [String]) -> Option<&'a str> {
    if options.is_empty() {
        return None;
    }
    let index = rng.roll(options.len() as u32) as usize - 1;
    options.get(index).map(String::as_str)
}

// ---------------------------------------------------------------------------
// Whole-game simulation
// ---------------------------------------------------------------------------

/// A finished autopilot game.
#[derive(Debug, Clone)]
pub struct SimulatedGame {
    pub seed: u64,
    pub state: GameState,
    pub events: Vec<FlowEvent>,
    pub drives: Vec<DriveSummary>,
    /// Stream audit failures; empty for a legal game.
    pub violations: Vec<AuditViolation>,
    pub record: GameRecord,
}

/// Play one game from kickoff to final with both coaches on autopilot.
pub fn simulate_game(
    seed: u64,
    config: &EngineConfig,
    tables: Arc<TableRepository>,
) -> anyhow::Result<SimulatedGame> {
    let mut pilot = Autopilot::new(seed, config, &tables);
    let mut flow = GameFlow::new(seed, config.clone(), tables);
    let mut recorder = GameRecorder::new(seed, config.clone());

    recorder
        .apply(&mut flow, Action::StartGame)
        .with_context(|| format!("seed {seed}: opening kickoff"))?;
    let mut actions = 1;
    while !flow.is_over() {
        if actions >= MAX_ACTIONS {
            anyhow::bail!("seed {seed}: no final after {MAX_ACTIONS} actions");
        }
        let action = pilot.next_action(&flow);
        recorder
            .apply(&mut flow, action)
            .with_context(|| format!("seed {seed}: action {actions}"))?;
        actions += 1;
    }

    let events = flow.events().events().to_vec();
    let violations = audit_stream(&events, config.score_kickoff_window);
    let record = recorder
        .finish(&events)
        .with_context(|| format!("seed {seed}: sealing record"))?;

    Ok(SimulatedGame {
        seed,
        state: flow.state().clone(),
        events,
        drives: flow.completed_drives().to_vec(),
        violations,
        record,
    })
}
