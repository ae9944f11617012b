//! Parallel validation of many independent games.
//!
//! Seeds are split into chunks and the chunks run on the rayon pool. Games
//! share only the read-only tables. Progress is reported at chunk
//! boundaries and cancellation is cooperative: the flag is checked between
//! seeds, never inside a game.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use gridiron_rules::state::Score;
use gridiron_rules::tables::TableRepository;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::autopilot::simulate_game;
use crate::config::{Controllers, EngineConfig};
use crate::replay::replay;

/// Default number of seeds per work unit.
pub const DEFAULT_CHUNK_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOptions {
    /// Configuration for every game. Controllers are forced to AI.
    pub config: EngineConfig,
    pub chunk_size: usize,
    /// Replay each game from its record and require an identical stream.
    pub verify_replay: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            config: EngineConfig::default().with_controllers(Controllers::all_ai()),
            chunk_size: DEFAULT_CHUNK_SIZE,
            verify_replay: true,
        }
    }
}

/// Running totals, reported after each chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProgress {
    pub done: usize,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

/// One seed's verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    pub seed: u64,
    pub passed: bool,
    /// Audit violations and replay mismatches, rendered.
    pub problems: Vec<String>,
    pub final_score: Option<Score>,
    pub digest: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// The cancel flag was raised before every seed ran.
    pub cancelled: bool,
    /// Reports for the seeds that ran, in seed-list order.
    pub seeds: Vec<SeedReport>,
}

/// Run every seed and audit its game.
pub fn validate_batch(
    seeds: &[u64],
    tables: Arc<TableRepository>,
    options: &BatchOptions,
    progress: &(dyn Fn(BatchProgress) + Sync),
    cancel: &AtomicBool,
) -> BatchReport {
    let total = seeds.len();
    let config = options
        .config
        .clone()
        .with_controllers(Controllers::all_ai());
    let done = AtomicUsize::new(0);
    let passed = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    info!(total, chunk_size = options.chunk_size, "batch start");

    let reports: Vec<SeedReport> = seeds
        .par_chunks(options.chunk_size.max(1))
        .flat_map_iter(|chunk| {
            let mut reports = Vec::with_capacity(chunk.len());
            for &seed in chunk {
                if cancel.load(Ordering::Relaxed) {
                    break;
                }
                let report = validate_seed(seed, &config, &tables, options.verify_replay);
                if report.passed {
                    passed.fetch_add(1, Ordering::Relaxed);
                } else {
                    failed.fetch_add(1, Ordering::Relaxed);
                }
                done.fetch_add(1, Ordering::Relaxed);
                reports.push(report);
            }
            progress(BatchProgress {
                done: done.load(Ordering::Relaxed),
                total,
                passed: passed.load(Ordering::Relaxed),
                failed: failed.load(Ordering::Relaxed),
            });
            reports
        })
        .collect();

    let report = BatchReport {
        total,
        passed: passed.into_inner(),
        failed: failed.into_inner(),
        cancelled: reports.len() < total,
        seeds: reports,
    };
    info!(
        total,
        passed = report.passed,
        failed = report.failed,
        cancelled = report.cancelled,
        "batch finished"
    );
    report
}

fn validate_seed(
    seed: u64,
    config: &EngineConfig,
    tables: &Arc<TableRepository>,
    verify_replay: bool,
) -> SeedReport {
    let game = match simulate_game(seed, config, Arc::clone(tables)) {
        Ok(game) => game,
        Err(e) => {
            warn!(seed, error = %format!("{e:#}"), "game failed");
            return SeedReport {
                seed,
                passed: false,
                problems: vec![format!("{e:#}")],
                final_score: None,
                digest: None,
            };
        }
    };

    let mut problems: Vec<String> = game.violations.iter().map(ToString::to_string).collect();
    if verify_replay {
        match replay(&game.record, Arc::clone(tables)) {
            Ok(result) if result.completed && result.digest_matches => {}
            Ok(result) => problems.push(format!(
                "replay diverged at event {:?} after {} actions",
                result.first_divergence, result.actions_replayed
            )),
            Err(e) => problems.push(format!("replay failed: {e:#}")),
        }
    }
    if !problems.is_empty() {
        warn!(seed, problems = problems.len(), "seed failed validation");
    }

    SeedReport {
        seed,
        passed: problems.is_empty(),
        problems,
        final_score: Some(game.state.score),
        digest: Some(game.record.digest),
    }
}
