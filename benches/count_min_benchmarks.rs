//! Benchmarks for Count-Min Sketch frequency estimation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sketch_forge::frequency::CountMinSketch;

const ERROR_BOUNDS: [(f64, f64); 3] = [(0.1, 0.1), (0.01, 0.01), (0.001, 0.001)];

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_min_construction");

    for &(epsilon, delta) in &ERROR_BOUNDS {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("eps={epsilon},delta={delta}")),
            &(epsilon, delta),
            |b, &(eps, dlt)| {
                b.iter(|| black_box(CountMinSketch::new_with_error(eps, dlt).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_min_update");
    group.throughput(Throughput::Elements(1));

    for &(epsilon, delta) in &ERROR_BOUNDS {
        let mut cms = CountMinSketch::new_with_error(epsilon, delta).unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("eps={epsilon},delta={delta}")),
            &epsilon,
            |b, _| {
                let mut counter = 0u64;
                b.iter(|| {
                    cms.update(&counter.to_le_bytes());
                    counter = counter.wrapping_add(1);
                });
            },
        );
    }

    group.finish();
}

fn bench_update_by(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_min_update_by");
    group.throughput(Throughput::Elements(1));

    let mut cms = CountMinSketch::new_with_error(0.01, 0.01).unwrap();
    let strings: Vec<String> = (0..1000).map(|i| format!("item_{i}")).collect();

    group.bench_function("string_keys", |b| {
        let mut idx = 0;
        b.iter(|| {
            cms.update_by(strings[idx % strings.len()].as_bytes(), 5);
            idx = idx.wrapping_add(1);
        });
    });

    group.finish();
}

fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_min_estimate");
    group.throughput(Throughput::Elements(1));

    for &(epsilon, delta) in &ERROR_BOUNDS {
        let mut cms = CountMinSketch::new_with_error(epsilon, delta).unwrap();
        for i in 0..1000u64 {
            cms.update(&i.to_le_bytes());
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("eps={epsilon},delta={delta}")),
            &epsilon,
            |b, _| {
                let mut counter = 0u64;
                b.iter(|| {
                    let estimate = cms.estimate(&counter.to_le_bytes());
                    counter = (counter + 1) % 1000;
                    black_box(estimate);
                });
            },
        );
    }

    group.finish();
}

fn bench_update_and_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_min_update_and_estimate");
    group.throughput(Throughput::Elements(2));

    let mut cms = CountMinSketch::new_with_error(0.01, 0.01).unwrap();

    group.bench_function("interleaved", |b| {
        let mut counter = 0u64;
        b.iter(|| {
            let key = counter.to_le_bytes();
            cms.update(&key);
            let estimate = cms.estimate(&key);
            counter = counter.wrapping_add(1);
            black_box(estimate);
        });
    });

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_min_merge");

    for &(epsilon, delta) in &ERROR_BOUNDS {
        let mut cms1 = CountMinSketch::new_with_error(epsilon, delta).unwrap();
        let mut cms2 = CountMinSketch::new_with_error(epsilon, delta).unwrap();

        for i in 0..1000u64 {
            cms1.update(&i.to_le_bytes());
            cms2.update(&(i + 1000).to_le_bytes());
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("eps={epsilon},delta={delta}")),
            &epsilon,
            |b, _| {
                b.iter(|| {
                    let mut merged = cms1.clone();
                    merged.merge(&cms2).unwrap();
                    black_box(merged);
                });
            },
        );
    }

    group.finish();
}

fn bench_heavy_hitter_workload(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_min_heavy_hitter");
    group.throughput(Throughput::Elements(100));

    let mut cms = CountMinSketch::new_with_error(0.01, 0.01).unwrap();

    group.bench_function("80_20_distribution", |b| {
        b.iter(|| {
            for i in 0u64..100 {
                let item = if i < 80 { i % 20 } else { 20 + i };
                cms.update(&item.to_le_bytes());
            }
        });
    });

    group.finish();
}

fn bench_realistic_workload(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_min_realistic");
    group.throughput(Throughput::Elements(1000));

    let mut cms = CountMinSketch::new_with_error(0.01, 0.01).unwrap();

    group.bench_function("mixed_updates_queries", |b| {
        b.iter(|| {
            for i in 0u64..1000 {
                if i % 10 == 0 {
                    let estimate = cms.estimate(&(i / 10).to_le_bytes());
                    black_box(estimate);
                } else {
                    cms.update(&i.to_le_bytes());
                }
            }
        });
    });

    group.finish();
}

fn bench_memory_footprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_min_memory");

    for &(epsilon, delta) in &ERROR_BOUNDS {
        let cms = CountMinSketch::new_with_error(epsilon, delta).unwrap();
        let width = cms.width();
        let depth = cms.depth();
        let bytes = cms.memory_usage();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!(
                "eps={epsilon},delta={delta} ({width}x{depth}, {} KB)",
                bytes / 1024
            )),
            &epsilon,
            |b, _| {
                b.iter(|| black_box(cms.memory_usage()));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_construction,
    bench_update,
    bench_update_by,
    bench_estimate,
    bench_update_and_estimate,
    bench_merge,
    bench_heavy_hitter_workload,
    bench_realistic_workload,
    bench_memory_footprint,
);
criterion_main!(benches);
