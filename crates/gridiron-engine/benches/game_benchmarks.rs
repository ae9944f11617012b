//! Game simulation benchmarks.
//!
//! - Single scrimmage snap through each resolver.
//! - Full autopilot game for each engine.
//! - Batch validation scaling across seed counts.
//!
//! Run with: `cargo bench --bench game_benchmarks`

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use gridiron_engine::prelude::*;

fn tables() -> Arc<TableRepository> {
    Arc::new(TableRepository::builtin().expect("built-in tables load"))
}

// ---------------------------------------------------------------------------
// Benchmark 1: one scrimmage snap per resolver
// ---------------------------------------------------------------------------

fn bench_single_snap(c: &mut Criterion) {
    let tables = tables();
    let state = GameState::new(1);
    let input = PlayInput::new("Pro Style", "Sideline Pass", "Blitz");

    let mut group = c.benchmark_group("single_snap");
    for kind in [EngineKind::Chart, EngineKind::Dice] {
        let resolver = Resolver::new(kind, Arc::clone(&tables));
        let mut rng = GameRng::from_seed(1);
        group.bench_function(format!("{kind:?}").to_lowercase(), |b| {
            b.iter(|| {
                let res = resolver.resolve(&input, &state, &mut rng);
                black_box(res)
            });
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark 2: full game on autopilot
// ---------------------------------------------------------------------------

fn bench_full_game(c: &mut Criterion) {
    let tables = tables();
    let mut group = c.benchmark_group("full_game");
    for kind in [EngineKind::Chart, EngineKind::Dice] {
        let config = EngineConfig::default()
            .with_engine(kind)
            .with_controllers(Controllers::all_ai());
        let mut seed = 0u64;
        group.bench_function(format!("{kind:?}").to_lowercase(), |b| {
            b.iter(|| {
                seed += 1;
                let game = simulate_game(seed, &config, Arc::clone(&tables));
                black_box(game.map(|g| g.events.len()).unwrap_or(0))
            });
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark 3: batch validation scaling
// ---------------------------------------------------------------------------

fn bench_batch_scaling(c: &mut Criterion) {
    let tables = tables();
    let options = BatchOptions::default();
    let cancel = AtomicBool::new(false);

    let mut group = c.benchmark_group("batch_validate");
    group.sample_size(10);
    for &count in &[8usize, 32, 128] {
        let seeds: Vec<u64> = (0..count as u64).collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), &seeds, |b, seeds| {
            b.iter(|| {
                let report = validate_batch(seeds, Arc::clone(&tables), &options, &|_| {}, &cancel);
                black_box(report.passed)
            });
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Criterion groups and main
// ---------------------------------------------------------------------------

criterion_group!(benches, bench_single_snap, bench_full_game, bench_batch_scaling);
criterion_main!(benches);
