//! Performance benchmarks for board moves and persistence.
//!
//! Run with: `cargo bench --bench board_moves`
//!
//! ## Performance Targets
//!
//! | Operation | Target | Notes |
//! |-----------|--------|-------|
//! | Single move | <50us | Clones the model, ~300 readings |
//! | Initialize | <1ms | 300 readings, all ranked |
//! | Fingerprint | <200us | Flatten + xxh64 |

use criterion::{
    black_box, criterion_group, criterion_main,
    BenchmarkId, Criterion, Throughput,
};

use tier_board::{
    apply_move, fingerprint, flatten, initialize,
    Bucket, DropTarget, ReadingId, Tier, TierModel, Unlocked,
};

fn reading_ids(n: usize) -> Vec<ReadingId> {
    (0..n).map(|i| ReadingId::new(format!("reading-{:04}", i))).collect()
}

/// Spread `ids` round-robin across the six tiers.
fn ranked_model(ids: &[ReadingId]) -> TierModel {
    let mut model = TierModel::new();
    for (t, tier) in Tier::ALL.iter().enumerate() {
        let items: Vec<ReadingId> = ids.iter().skip(t).step_by(Tier::ALL.len()).cloned().collect();
        model = model.with_bucket(*tier, items);
    }
    model
}

/// Benchmark single moves of each shape.
fn bench_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_move");

    for size in [30, 120, 300] {
        let ids = reading_ids(size);
        let model = ranked_model(&ids);
        let first_s = model.items(Tier::S)[0].clone();
        let last_s = model.items(Tier::S).last().cloned().unwrap_or_else(|| first_s.clone());
        let first_f = model.items(Tier::F)[0].clone();

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("container", size), &model, |b, model| {
            let target = DropTarget::Container(Bucket::Unrated);
            b.iter(|| apply_move(black_box(model), &first_s, &target, &Unlocked))
        });
        group.bench_with_input(BenchmarkId::new("reorder", size), &model, |b, model| {
            let target = DropTarget::Item(last_s.clone());
            b.iter(|| apply_move(black_box(model), &first_s, &target, &Unlocked))
        });
        group.bench_with_input(BenchmarkId::new("cross_bucket", size), &model, |b, model| {
            let target = DropTarget::Item(first_f.clone());
            b.iter(|| apply_move(black_box(model), &first_s, &target, &Unlocked))
        });
    }

    group.finish();
}

/// Benchmark a drag sequence that walks one reading through every tier.
fn bench_move_sequence(c: &mut Criterion) {
    let ids = reading_ids(300);
    let model = ranked_model(&ids);
    let active = ids[0].clone();

    c.bench_function("walk_all_tiers_300", |b| {
        b.iter(|| {
            let mut current = model.clone();
            for tier in Tier::ALL {
                current = apply_move(&current, &active, &DropTarget::container(tier), &Unlocked);
            }
            black_box(current)
        })
    });
}

/// Benchmark load and save translation.
fn bench_persistence(c: &mut Criterion) {
    let mut group = c.benchmark_group("persistence");

    for size in [30, 300] {
        let ids = reading_ids(size);
        let model = ranked_model(&ids);
        let rows = flatten(&model);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("initialize", size), &rows, |b, rows| {
            b.iter(|| initialize(black_box(&ids), black_box(rows)))
        });
        group.bench_with_input(BenchmarkId::new("flatten", size), &model, |b, model| {
            b.iter(|| flatten(black_box(model)))
        });
        group.bench_with_input(BenchmarkId::new("fingerprint", size), &model, |b, model| {
            b.iter(|| fingerprint(black_box(model)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_moves,
    bench_move_sequence,
    bench_persistence,
);

criterion_main!(benches);
