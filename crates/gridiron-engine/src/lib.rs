//! Gridiron Engine -- the game-flow orchestrator and its drivers.
//!
//! This crate builds on [`gridiron_rules`] and [`gridiron_events`] to run
//! whole games: [`GameFlow`](flow::GameFlow) owns one game's state and
//! random source and turns play inputs into an ordered event stream. Around
//! it sit the decision [`Policy`](policy::Policy) for AI sides, drive
//! bookkeeping, record/replay verification, seeded autopilot coaches and
//! parallel batch validation.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use gridiron_engine::prelude::*;
//!
//! let tables = Arc::new(TableRepository::builtin().unwrap());
//! let config = EngineConfig::default().with_controllers(Controllers::all_ai());
//!
//! let game = simulate_game(2024, &config, tables).unwrap();
//! assert!(game.state.game_over);
//! assert!(game.violations.is_empty());
//! ```

#![deny(unsafe_code)]

pub mod autopilot;
pub mod batch;
pub mod config;
pub mod drive;
pub mod flow;
pub mod policy;
pub mod replay;
pub mod resolver;

use gridiron_rules::RulesError;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the rules crate for convenience.
pub use gridiron_rules;

/// Re-export the events crate for convenience.
pub use gridiron_events;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors returned by orchestrator calls made in the wrong phase, or by a
/// resolver contract violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("the game is over")]
    GameOver,

    #[error("the game has not been started")]
    GameNotStarted,

    #[error("the game has already been started")]
    AlreadyStarted,

    /// A snap was requested while a penalty decision is outstanding.
    #[error("a penalty decision is pending")]
    PenaltyDecisionPending,

    #[error("no penalty decision is pending")]
    NoPendingPenalty,

    /// A snap was requested while the try after a touchdown is outstanding.
    #[error("a PAT choice is pending")]
    PatPending,

    #[error("no PAT choice is pending")]
    NoPendingPat,

    #[error("punts are only allowed on fourth down, not down {down}")]
    PuntNotAllowed { down: u8 },

    #[error("invalid engine configuration: {details}")]
    InvalidConfig { details: String },

    #[error(transparent)]
    Rules(#[from] RulesError),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use gridiron_events::prelude::*;
    pub use gridiron_rules::prelude::*;

    pub use crate::autopilot::{simulate_game, Autopilot, SimulatedGame};
    pub use crate::batch::{validate_batch, BatchOptions, BatchProgress, BatchReport, SeedReport};
    pub use crate::config::{Controller, Controllers, EngineConfig, EngineKind};
    pub use crate::drive::{DriveResult, DriveSummary, DriveTracker};
    pub use crate::flow::{FlowStep, GameFlow};
    pub use crate::policy::{DefaultPolicy, FourthDownChoice, Policy, Situation};
    pub use crate::replay::{replay, Action, GameRecord, GameRecorder, ReplayResult};
    pub use crate::resolver::{PlayInput, Resolver, SnapResolution};
    pub use crate::FlowError;
}
