//! Basic worker pool usage example
//!
//! Demonstrates bounded admission, worker reuse and idle reaping.
//!
//! Run with: cargo run --example basic_usage

use recycle_pool::prelude::*;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    env_logger::init();

    println!("=== Recycle Pool - Basic Usage Example ===\n");

    let pool = WorkerPool::new(4, Duration::from_millis(200))?;
    println!("1. Starting pool with at most {} workers", pool.max_workers());
    pool.start();

    println!("\n2. Submitting jobs with wait_spawn:");
    for i in 0..10 {
        pool.wait_spawn(move || {
            println!(
                "  Job {} executing on {}",
                i,
                thread::current().name().unwrap_or("?")
            );
            thread::sleep(Duration::from_millis(20));
            Ok(())
        })?;
    }

    println!("\n3. Submitting jobs with spawn (rejects at capacity):");
    let mut rejected = 0;
    for _ in 0..10 {
        if !pool.spawn(|| {
            thread::sleep(Duration::from_millis(50));
            Ok(())
        }) {
            rejected += 1;
        }
    }
    println!("   {} of 10 jobs rejected", rejected);

    thread::sleep(Duration::from_millis(100));
    let stats = pool.stats();
    println!("\n4. Statistics:");
    println!("   Workers created: {}", stats.workers_created);
    println!("   Live workers: {} ({} idle)", stats.worker_count, stats.idle_count);
    println!("   Jobs processed: {}", stats.jobs_processed());

    println!("\n5. Waiting for the reaper...");
    thread::sleep(Duration::from_millis(500));
    let stats = pool.stats();
    println!("   Workers reaped: {}", stats.workers_reaped);
    println!("   Live workers: {}", stats.worker_count);

    println!("\n6. Stopping pool...");
    pool.stop();

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
