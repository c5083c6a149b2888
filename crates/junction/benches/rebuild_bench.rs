//! Criterion benchmark for the per-cycle priority rebuild: clear, insert n
//! scores, find_maximum, for n in {4, 64, 1024}.
//!
//! Run with: cargo bench -p junction --bench rebuild_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use junction::priority_tree::PriorityTree;

// ---------------------------------------------------------------------------
// Benchmark: rebuild + maximum
// ---------------------------------------------------------------------------

fn bench_rebuild_max(c: &mut Criterion) {
    let mut group = c.benchmark_group("priority_rebuild_max");

    for &n in &[4usize, 64, 1024] {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        // Coarse scores so ties occur, like real lane scores.
        let scores: Vec<f64> = (0..n)
            .map(|_| f64::from(rng.gen_range(0u32..200)) * 0.5)
            .collect();
        let mut tree = PriorityTree::with_capacity(n);

        group.bench_with_input(BenchmarkId::from_parameter(n), &scores, |b, scores| {
            b.iter(|| {
                tree.clear();
                for (i, &s) in scores.iter().enumerate() {
                    tree.insert(s, i);
                }
                black_box(tree.find_maximum());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rebuild_max);
criterion_main!(benches);
