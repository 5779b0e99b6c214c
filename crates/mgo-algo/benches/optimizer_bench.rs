//! Benchmarks for the planning pipeline on synthetic villages
//!
//! This suite measures:
//! - Building and directing the candidate tree from scattered buildings
//! - Greedy NPV pruning (quadratic in the number of arcs)
//! - Coverage-targeted pruning down to half the arcs
//!
//! ## Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p mgo-algo
//!
//! # Serial scoring only
//! cargo bench -p mgo-algo --no-default-features -- optimize
//! ```
//!
//! | Operation | 50 buildings | 200 buildings | 500 buildings |
//! |-----------|--------------|---------------|---------------|
//! | Create network | <1ms | <10ms | <50ms |
//! | NPV pruning | <5ms | <100ms | <1s |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mgo_algo::{create_network, optimize, EconomicConfig, OptimizerConfig};
use mgo_core::{Meters, Point, SquareMeters};

const SIZES: &[usize] = &[50, 200, 500];

/// Buildings on a jittered grid, 15 m apart, with areas between 20 and 120 m².
fn village(buildings: usize) -> Vec<(Point, SquareMeters)> {
    let side = (buildings as f64).sqrt().ceil() as usize;
    (0..buildings)
        .map(|i| {
            let (row, col) = (i / side, i % side);
            let jitter = ((i * 7919) % 11) as f64;
            let position = Point::new(
                (col * 15) as f64 + jitter + 1.0,
                (row * 15) as f64 + (10.0 - jitter) + 1.0,
            );
            let area = 20.0 + ((i * 104_729) % 100) as f64;
            (position, SquareMeters(area))
        })
        .collect()
}

fn economics() -> EconomicConfig {
    EconomicConfig::default()
        .with_demand(6.0)
        .with_tariff(0.3)
        .with_costs(3_000.0, 12.0, 80.0)
}

fn bench_create_network(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_network");
    for &size in SIZES {
        let buildings = village(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &buildings, |b, buildings| {
            b.iter(|| {
                create_network(Point::new(0.0, 0.0), black_box(buildings), Meters(2_000.0))
            })
        });
    }
    group.finish();
}

fn bench_optimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize");
    group.sample_size(10);
    for &size in SIZES {
        let Ok(network) = create_network(Point::new(0.0, 0.0), &village(size), Meters(2_000.0))
        else {
            continue;
        };

        let npv = economics();
        group.bench_with_input(BenchmarkId::new("npv", size), &network, |b, network| {
            b.iter(|| {
                let mut network = network.clone();
                optimize(&mut network, black_box(&npv), &OptimizerConfig::default())
            })
        });

        let coverage = economics().with_target_coverage(0.5);
        group.bench_with_input(BenchmarkId::new("coverage", size), &network, |b, network| {
            b.iter(|| {
                let mut network = network.clone();
                optimize(&mut network, black_box(&coverage), &OptimizerConfig::default())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_create_network, bench_optimize);
criterion_main!(benches);
