//! Benchmarks for the state-space kernel hot paths

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use simvec_state::StateSpace;

fn bench_uniform_init(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_state_uniform");

    for &num_qubits in &[16usize, 20] {
        let space: StateSpace<f32, _> = StateSpace::sequential(num_qubits);
        let mut state = space.create_state().unwrap();

        group.bench_with_input(
            BenchmarkId::new("sequential", num_qubits),
            &num_qubits,
            |b, _| {
                b.iter(|| space.set_state_uniform(black_box(&mut state)).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_inner_product(c: &mut Criterion) {
    let mut group = c.benchmark_group("inner_product");

    for &threads in &[1usize, 4] {
        let space: StateSpace<f32, _> = StateSpace::with_threads(20, threads).unwrap();
        let mut state = space.create_state().unwrap();
        space.set_state_uniform(&mut state).unwrap();

        group.bench_with_input(BenchmarkId::new("threads", threads), &threads, |b, _| {
            b.iter(|| space.inner_product(black_box(&state), black_box(&state)).unwrap());
        });
    }

    group.finish();
}

fn bench_sample(c: &mut Criterion) {
    let space: StateSpace<f32, _> = StateSpace::sequential(16);
    let mut state = space.create_state().unwrap();
    space.set_state_uniform(&mut state).unwrap();

    c.bench_function("sample_1k", |b| {
        b.iter(|| space.sample(black_box(&state), 1000, 42).unwrap());
    });
}

criterion_group!(benches, bench_uniform_init, bench_inner_product, bench_sample);
criterion_main!(benches);
