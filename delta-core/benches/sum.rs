//! Incremental `Sum` versus recomputing the total from scratch.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use delta_core::push::{Diffs, Sum};

fn single_edit(c: &mut Criterion) {
    let mut group = c.benchmark_group("sum_single_edit");

    for len in [1_000usize, 100_000] {
        let entries: Vec<i64> = (0..len as i64).collect();

        group.bench_with_input(BenchmarkId::new("update", len), &entries, |b, entries| {
            let mut sum = Sum::new();
            sum.compute(entries.clone()).expect("compute");
            let mut step = 0i64;
            b.iter(|| {
                step += 1;
                black_box(sum.update(vec![(len / 2, step)]).expect("update"))
            });
        });

        group.bench_with_input(BenchmarkId::new("recompute", len), &entries, |b, entries| {
            let mut entries = entries.clone();
            let mut step = 0i64;
            b.iter(|| {
                step += 1;
                entries[len / 2] = step;
                black_box(entries.iter().sum::<i64>())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, single_edit);
criterion_main!(benches);
