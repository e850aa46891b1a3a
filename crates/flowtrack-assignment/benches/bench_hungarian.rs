use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use faer::Mat;
use rand::{Rng, SeedableRng};

use flowtrack_assignment::{row_greedy_cost, HungarianSolver};

fn random_costs(rows: usize, cols: usize, seed: u64) -> Mat<f64> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let values: Vec<f64> = (0..rows * cols).map(|_| rng.random::<f64>()).collect();
    Mat::from_fn(rows, cols, |i, j| values[i * cols + j])
}

fn bench_hungarian(c: &mut Criterion) {
    let mut group = c.benchmark_group("Hungarian");
    let solver = HungarianSolver::default();

    for size in [8, 32, 64].iter() {
        group.throughput(criterion::Throughput::Elements((*size * *size) as u64));

        let cost = random_costs(*size, *size, 42);
        group.bench_with_input(BenchmarkId::new("solve", size), &cost, |b, cost| {
            b.iter(|| black_box(solver.solve(cost)))
        });

        group.bench_with_input(BenchmarkId::new("row_greedy", size), &cost, |b, cost| {
            b.iter(|| black_box(row_greedy_cost(cost)))
        });

        let wide = random_costs(*size, *size * 2, 7);
        group.bench_with_input(BenchmarkId::new("solve_wide", size), &wide, |b, cost| {
            b.iter(|| black_box(solver.solve(cost)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_hungarian);
criterion_main!(benches);
