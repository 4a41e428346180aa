use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use recycle_pool::prelude::*;
use recycle_pool::IdleList;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn benchmark_pool_lifecycle(c: &mut Criterion) {
    c.bench_function("pool_start_stop", |b| {
        b.iter(|| {
            let pool = WorkerPool::new(4, Duration::from_secs(10)).expect("Failed to create pool");
            pool.start();
            pool.stop();
        });
    });
}

fn benchmark_wait_spawn(c: &mut Criterion) {
    let mut group = c.benchmark_group("wait_spawn");

    for max_workers in [1usize, 4, 16] {
        group.bench_function(format!("lightweight_jobs_100_max_{}", max_workers), |b| {
            b.iter_batched(
                || {
                    let pool = WorkerPool::new(max_workers, Duration::from_secs(10))
                        .expect("Failed to create pool");
                    pool.start();
                    pool
                },
                |pool| {
                    let counter = Arc::new(AtomicU64::new(0));
                    for _ in 0..100 {
                        let counter = Arc::clone(&counter);
                        pool.wait_spawn(move || {
                            counter.fetch_add(black_box(1), Ordering::Relaxed);
                            Ok(())
                        })
                        .expect("Failed to submit job");
                    }
                    pool.stop();
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn benchmark_spawn_reuse(c: &mut Criterion) {
    let pool = WorkerPool::new(64, Duration::from_secs(10)).expect("Failed to create pool");
    pool.start();

    c.bench_function("spawn_with_warm_workers", |b| {
        b.iter(|| {
            while !pool.spawn(|| {
                black_box(1 + 1);
                Ok(())
            }) {
                std::hint::spin_loop();
            }
        });
    });

    pool.stop();
}

fn benchmark_idle_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("idle_list");

    group.bench_function("push_pop_1000", |b| {
        let mut list = IdleList::new();
        b.iter(|| {
            for i in 0..1000u64 {
                list.push_back(i);
            }
            while let Some(v) = list.pop_back() {
                black_box(v);
            }
        });
    });

    group.bench_function("reset_front_half_of_1000", |b| {
        b.iter_batched(
            || {
                let mut list = IdleList::new();
                for i in 0..1000u64 {
                    list.push_back(i);
                }
                list
            },
            |mut list| {
                let middle = list.iter().nth(500).map(|(entry, _)| entry);
                black_box(list.reset_front(middle));
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_pool_lifecycle,
    benchmark_wait_spawn,
    benchmark_spawn_reuse,
    benchmark_idle_list
);
criterion_main!(benches);
