//! Batch validation driver -- plays many seeded games on autopilot and audits
//! every event stream.
//!
//! Run with:
//!   cargo run --example batch_validate -p gridiron-engine -- [games] [chart|dice] [tables_dir]
//!
//! `RUST_LOG=info` shows per-chunk progress.

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Context;
use gridiron_engine::prelude::*;

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let games: u64 = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("bad game count '{raw}'"))?,
        None => 200,
    };
    let engine = match args.next().as_deref() {
        None | Some("dice") => EngineKind::Dice,
        Some("chart") => EngineKind::Chart,
        Some(other) => anyhow::bail!("unknown engine '{other}', expected chart or dice"),
    };
    let tables = match args.next() {
        Some(dir) => TableRepository::load_or_degrade(Path::new(&dir)),
        None => TableRepository::builtin().context("loading built-in tables")?,
    };

    let options = BatchOptions {
        config: EngineConfig::default().with_engine(engine),
        ..BatchOptions::default()
    };
    let seeds: Vec<u64> = (1..=games).collect();
    let cancel = AtomicBool::new(false);

    let report = validate_batch(
        &seeds,
        Arc::new(tables),
        &options,
        &|p| tracing::info!(done = p.done, total = p.total, failed = p.failed, "progress"),
        &cancel,
    );

    for seed in report.seeds.iter().filter(|s| !s.passed) {
        println!("seed {}: {}", seed.seed, seed.problems.join("; "));
    }
    println!(
        "{} games, {} passed, {} failed{}",
        report.total,
        report.passed,
        report.failed,
        if report.cancelled { " (cancelled)" } else { "" }
    );

    if report.failed > 0 {
        anyhow::bail!("{} games failed validation", report.failed);
    }
    Ok(())
}
