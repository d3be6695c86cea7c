//! Benchmarks for tether-core
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tether_core::reactive::{effect, watch, watch_effect, EffectOptions, Ref, WatchOptions, WatchSource};

fn bench_ref_get_outside_effect(c: &mut Criterion) {
    let r = Ref::new(42i32);
    c.bench_function("ref_get_outside_effect", |b| b.iter(|| black_box(r.get())));
}

fn bench_ref_set_no_subscribers(c: &mut Criterion) {
    let r = Ref::new(0i32);
    c.bench_function("ref_set_no_subscribers", |b| b.iter(|| r.set(black_box(1))));
}

fn bench_tracked_reads(c: &mut Criterion) {
    let r = Ref::new(1i32);
    let reader = r.clone();
    let runner = effect(
        move || (0..100).map(|_| reader.get()).sum::<i32>(),
        EffectOptions::new(),
    );
    c.bench_function("effect_100_tracked_reads", |b| b.iter(|| black_box(runner.run())));
}

fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("trigger_fan_out");

    for subscribers in [1, 10, 100] {
        let source = Ref::new(0i32);
        for _ in 0..subscribers {
            let s = source.clone();
            watch_effect(
                WatchSource::computation(move || {
                    black_box(s.get());
                }),
                WatchOptions::new(),
            );
        }

        group.bench_with_input(
            BenchmarkId::new("subscribers", subscribers),
            &subscribers,
            |b, _| {
                let mut n = 0;
                b.iter(|| {
                    n += 1;
                    source.set(n);
                })
            },
        );
    }

    group.finish();
}

fn bench_watch_change_detection(c: &mut Criterion) {
    let source = Ref::new(0i32);
    watch(
        &source,
        |new, old| {
            black_box((new, old));
        },
        WatchOptions::new(),
    );

    c.bench_function("watch_unchanged_write", |b| b.iter(|| source.set(black_box(0))));
}

criterion_group!(
    benches,
    bench_ref_get_outside_effect,
    bench_ref_set_no_subscribers,
    bench_tracked_reads,
    bench_fan_out,
    bench_watch_change_detection,
);
criterion_main!(benches);
