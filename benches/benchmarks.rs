use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use delaunay2d::{DelaunayTriangulation, Point2};
use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;

const SEED: &[u8; 32] = b"KVm9iSeyF2lJ3dqYBw7CTxnhNRAupEoM";

fn random_points(size: usize) -> Vec<Point2<f64>> {
    let mut rng = rand::rngs::StdRng::from_seed(*SEED);
    let range = Uniform::new(-100.0, 100.0);
    (0..size)
        .map(|_| Point2::new(range.sample(&mut rng), range.sample(&mut rng)))
        .collect()
}

fn grid_points(width: usize) -> Vec<Point2<f64>> {
    let mut points = Vec::with_capacity(width * width);
    for y in 0..width {
        for x in 0..width {
            points.push(Point2::new(x as f64 * 20.0, y as f64 * 20.0));
        }
    }
    points
}

fn triangulation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("triangulation (uniform)");
    for size in [100, 1_000, 10_000] {
        let points = random_points(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &points, |b, points| {
            b.iter(|| DelaunayTriangulation::from_points(points));
        });
    }
    group.finish();

    let mut group = c.benchmark_group("triangulation (grid)");
    for width in [10, 32, 100] {
        let points = grid_points(width);
        group.bench_with_input(
            BenchmarkId::from_parameter(width * width),
            &points,
            |b, points| {
                b.iter(|| DelaunayTriangulation::from_points(points));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, triangulation_benchmark);
criterion_main!(benches);
