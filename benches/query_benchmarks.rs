use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use geotempo::PointIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn populated_index(n: usize) -> PointIndex {
    let mut rng = StdRng::seed_from_u64(0xBE4C);
    let mut index = PointIndex::new();
    for i in 0..n {
        index.insert(
            rng.gen_range(-60.0f32..60.0),
            rng.gen_range(-179.0f32..179.0),
            i as f64,
        );
    }
    index
}

fn benchmark_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("insertion");

    group.bench_function("single_insert", |b| {
        let mut index = PointIndex::new();
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| {
            let lat = rng.gen_range(-60.0f32..60.0);
            let lon = rng.gen_range(-179.0f32..179.0);
            index.insert(black_box(lat), black_box(lon), black_box(1.0))
        })
    });

    group.bench_function("bulk_insert_1000", |b| {
        let mut rng = StdRng::seed_from_u64(2);
        let batch: Vec<(f32, f32, f64)> = (0..1000)
            .map(|i| {
                (
                    rng.gen_range(-60.0f32..60.0),
                    rng.gen_range(-179.0f32..179.0),
                    i as f64,
                )
            })
            .collect();
        b.iter(|| {
            let mut index = PointIndex::new();
            index.bulk_insert(black_box(&batch))
        })
    });

    group.finish();
}

fn benchmark_spatial_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial_queries");
    let index = populated_index(10_000);

    for radius_km in [50.0, 500.0] {
        group.bench_with_input(
            BenchmarkId::new("radius", radius_km as u64),
            &radius_km,
            |b, &radius_km| {
                b.iter(|| index.query_radius(black_box(40.0), black_box(-74.0), radius_km))
            },
        );
    }

    group.bench_function("box_5x5_deg", |b| {
        b.iter(|| index.query_box(black_box(38.0), black_box(-76.0), 43.0, -71.0))
    });

    for k in [10usize, 100] {
        group.bench_with_input(BenchmarkId::new("knn", k), &k, |b, &k| {
            b.iter(|| index.query_knn(black_box(40.0), black_box(-74.0), k))
        });
    }

    group.finish();
}

fn benchmark_combined_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("combined_queries");
    let index = populated_index(10_000);

    group.bench_function("radius_time_mid_window", |b| {
        b.iter(|| {
            index.query_radius_time(
                black_box(40.0),
                black_box(-74.0),
                500.0,
                black_box(2_000.0),
                black_box(8_000.0),
            )
        })
    });

    group.bench_function("radius_time_envelope_miss", |b| {
        b.iter(|| {
            index.query_radius_time(
                black_box(40.0),
                black_box(-74.0),
                500.0,
                black_box(20_000.0),
                black_box(30_000.0),
            )
        })
    });

    group.bench_function("knn_time", |b| {
        b.iter(|| {
            index.query_knn_time(
                black_box(40.0),
                black_box(-74.0),
                10,
                black_box(2_000.0),
                black_box(8_000.0),
            )
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_insertion,
    benchmark_spatial_queries,
    benchmark_combined_queries
);
criterion_main!(benches);
