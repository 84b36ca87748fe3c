//! Performance benchmarks for impactrun.
//!
//! Run with: cargo bench
//!
//! These benchmarks measure key performance metrics:
//! - Status-line classification and increment parsing
//! - Kinetic-energy tracking over long sample runs
//! - Study expansion with growing parameter grids

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::BTreeMap;

use impactrun::config::ParameterDef;
use impactrun::monitor::{classify, parse_increment, KineticEnergyTracker};
use impactrun::study::parameter_combinations;

const DATA_LINE: &str = "125  1.25E-04  1.25E-04  00:00:35  2.03E-06  1.0  3.456E+01  9.876E+01";

/// Build a synthetic status file with `rows` increment lines.
fn status_lines(rows: usize) -> Vec<String> {
    let mut lines = vec![
        "Summary of job".to_string(),
        "SOLUTION PROGRESS".to_string(),
        "STEP     TOTAL       WALL".to_string(),
        "INCREMENT     TIME      TIME".to_string(),
    ];
    for i in 0..rows {
        lines.push(format!(
            "{i}  {:.2}E-05  {:.2}E-05  00:00:{:02}  2.0E-06  1.0  {:.3}E+01  9.876E+01",
            i as f64,
            i as f64,
            i % 60,
            5.0 + (i as f64 * 0.1).sin()
        ));
    }
    lines
}

fn bench_classification(c: &mut Criterion) {
    c.bench_function("classify_data_line", |b| {
        b.iter(|| classify(black_box(DATA_LINE)))
    });

    c.bench_function("parse_increment", |b| {
        b.iter(|| parse_increment(black_box(DATA_LINE)))
    });

    let mut group = c.benchmark_group("classify_status_file");
    for rows in [100, 1_000, 10_000] {
        let lines = status_lines(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &lines, |b, lines| {
            b.iter(|| {
                lines
                    .iter()
                    .map(|l| classify(black_box(l.trim())))
                    .count()
            })
        });
    }
    group.finish();
}

fn bench_ke_tracking(c: &mut Criterion) {
    // Rise, peak, decay toward a plateau; no early stop fires
    let samples: Vec<f64> = (0..10_000)
        .map(|i| 50.0 + 40.0 * (i as f64 * 0.01).sin())
        .collect();

    c.bench_function("ke_tracker_10k_samples", |b| {
        b.iter(|| {
            let mut tracker = KineticEnergyTracker::new();
            for &ke in &samples {
                black_box(tracker.observe(ke));
            }
            tracker.minimum()
        })
    });
}

fn bench_study_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("parameter_combinations");
    for n_params in [2usize, 4, 6] {
        // Each parameter carries 4 values, so the grid is 4^n combinations
        let mut parameters = BTreeMap::new();
        for p in 0..n_params {
            parameters.insert(
                format!("param_{p}"),
                ParameterDef {
                    values: (0..4).map(|v| serde_json::json!(v as f64)).collect(),
                },
            );
        }
        group.bench_with_input(
            BenchmarkId::from_parameter(n_params),
            &parameters,
            |b, parameters| b.iter(|| parameter_combinations(black_box(parameters))),
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_classification,
    bench_ke_tracking,
    bench_study_expansion
);
criterion_main!(benches);
