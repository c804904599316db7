//! Basic usage example for syncset
//!
//! A small service registry: worker threads register themselves under a derived key, a
//! duplicate registration is rejected, and a supervisor walks a snapshot of the registry while
//! workers keep deregistering.

use std::sync::Arc;
use std::thread;
use syncset::{ConcurrentSet, Error, MetricsCollector, SetBuilder};

#[derive(Debug, Clone)]
struct Worker {
    pool: &'static str,
    id: usize,
}

impl Worker {
    fn key(&self) -> impl Fn() -> String + '_ {
        move || format!("{}-{}", self.pool, self.id)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("syncset Usage Example");
    println!("=====================");

    // Basic operations
    println!("\n1. Basic Operations:");
    let set = ConcurrentSet::new();
    set.add(|| "alpha", 1)?;
    set.add(|| "beta", 2)?;
    println!("   Added alpha, beta (count: {})", set.count());
    println!("   Peek alpha: {}", set.peek(|| "alpha")?);
    println!("   Pop beta: {}", set.pop(|| "beta")?);

    match set.add(|| "alpha", 3) {
        Err(Error::AlreadyExists { key }) => println!("   Second add of {key} rejected"),
        other => println!("   Unexpected result: {other:?}"),
    }

    // Concurrent registration
    println!("\n2. Concurrent Registration:");
    let registry: Arc<ConcurrentSet<Worker>> =
        Arc::new(SetBuilder::new().shard_count(8).capacity(64).build());

    let handles: Vec<_> = (0..4)
        .map(|pool_id| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let pool = if pool_id % 2 == 0 { "io" } else { "cpu" };
                let mut registered = 0;
                for id in 0..16 {
                    let worker = Worker { pool, id };
                    // Pools sharing a name race for the same keys
                    if registry.add(worker.key(), worker.clone()).is_ok() {
                        registered += 1;
                    }
                }
                println!("   Pool thread {pool_id} ({pool}) registered {registered} workers");
                registered
            })
        })
        .collect();

    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    println!("   Total registered: {total} (count: {})", registry.count());

    // Snapshot while mutating
    println!("\n3. Snapshot Iteration:");
    let mut next = registry.iterator().into_producer();
    let deregister = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for id in 0..16 {
                let _ = registry.pop(move || format!("io-{id}"));
            }
        })
    };

    let mut walked = 0;
    loop {
        let (worker, last) = next();
        if worker.is_some() {
            walked += 1;
        }
        if last {
            break;
        }
    }
    deregister.join().unwrap();
    println!("   Snapshot walked {walked} workers, registry now holds {}", registry.count());

    // Metrics
    println!("\n4. Metrics:");
    let metrics = registry.metrics();
    println!("   Operations: {}", metrics.total_operations);
    println!("   Success rate: {:.1}%", metrics.success_rate());
    println!("   Contention rate: {:.1}%", metrics.contention_rate());
    println!("   Peak entries: {}", metrics.peak_entries);

    Ok(())
}
