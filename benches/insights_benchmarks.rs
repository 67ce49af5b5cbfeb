//! # music-insights Performance Benchmarks
//!
//! Benchmarks for the relational primitives and the analysis stages over
//! generated datasets of increasing size.
//!
//! ## Benchmark Categories
//!
//! - **Relational**: join, group-by aggregation and window ranking
//! - **Analysis**: each stage on a shared joined input
//! - **Pipeline**: all stages in parallel and sequentially, including CSV output
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run specific benchmark group
//! cargo bench relational
//! cargo bench analysis
//! ```

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use music_insights::analysis::{join_events, run_task, AnalysisInput, Task};
use music_insights::config::{AnalysisConfig, RuntimeConfig};
use music_insights::generate::{generate, GeneratorConfig};
use music_insights::pipeline;
use music_insights::relational::{group_aggregate, par_group_aggregate, top_n_within, Average, Count, SortOrder};
use music_insights::schema::{ListeningEvent, Song};
use std::hint::black_box;
use tempfile::TempDir;

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

/// Helper producing a reproducible dataset with `records` events
fn dataset(records: usize) -> (Vec<ListeningEvent>, Vec<Song>) {
    let config = GeneratorConfig {
        users: 500,
        songs: 200,
        records,
        seed: Some(42),
        ..GeneratorConfig::default()
    };
    generate(&config).expect("Failed to generate dataset")
}

fn benchmark_relational(c: &mut Criterion) {
    let mut group = c.benchmark_group("relational");

    for size in SIZES {
        let (events, songs) = dataset(size);

        group.bench_with_input(BenchmarkId::new("inner_join", size), &size, |b, _| {
            b.iter(|| join_events(black_box(&events), black_box(&songs)))
        });

        group.bench_with_input(BenchmarkId::new("group_count", size), &size, |b, _| {
            b.iter(|| group_aggregate(black_box(&events), |e| e.user_id.as_str(), Count))
        });

        group.bench_with_input(BenchmarkId::new("group_average", size), &size, |b, _| {
            b.iter(|| {
                group_aggregate(
                    black_box(&events),
                    |e| e.song_id.as_str(),
                    Average(|e: &ListeningEvent| e.duration_sec),
                )
            })
        });

        group.bench_with_input(BenchmarkId::new("par_group_average", size), &size, |b, _| {
            b.iter(|| {
                par_group_aggregate(
                    black_box(&events),
                    |e| e.song_id.as_str(),
                    Average(|e: &ListeningEvent| e.duration_sec),
                )
            })
        });

        group.bench_with_input(BenchmarkId::new("top_3_per_user", size), &size, |b, _| {
            b.iter_batched(
                || events.iter().collect::<Vec<_>>(),
                |rows| top_n_within(rows, |e| e.user_id.clone(), |e| e.duration_sec, SortOrder::Descending, 3),
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

fn benchmark_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");
    let config = AnalysisConfig::default();
    let (events, songs) = dataset(10_000);
    let input = AnalysisInput::new(&events, &songs);

    for task in Task::ALL {
        group.bench_function(task.output_name(), |b| {
            b.iter(|| run_task(black_box(task), black_box(&input), &config))
        });
    }

    group.finish();
}

fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);
    let config = AnalysisConfig::default();
    let (events, songs) = dataset(10_000);
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for parallel in [true, false] {
        let runtime = RuntimeConfig {
            parallel,
            ..RuntimeConfig::with_paths(
                temp_dir.path().join("unused_logs.csv"),
                temp_dir.path().join("unused_songs.csv"),
                temp_dir.path().join(if parallel { "parallel" } else { "sequential" }),
            )
        };
        let name = if parallel { "all_tasks_parallel" } else { "all_tasks_sequential" };
        group.bench_function(name, |b| {
            b.iter(|| pipeline::analyze(black_box(&events), black_box(&songs), &runtime, &config))
        });
    }

    group.finish();
}

// Group all benchmarks
criterion_group!(benches, benchmark_relational, benchmark_analysis, benchmark_pipeline);

criterion_main!(benches);
