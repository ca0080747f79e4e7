use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use pincache::builder::PinnedLruBuilder;

fn main() {
    let evictions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&evictions);
    let cache = PinnedLruBuilder::new(100)
        .on_evict(move |_: &u64| {
            counter.fetch_add(1, Ordering::Relaxed);
        })
        .build_concurrent::<String>();

    cache.insert(0, "root".to_string());
    cache.pin(&0);

    let handles: Vec<_> = (1..=4u64)
        .map(|t| {
            let cache = cache.clone();
            thread::spawn(move || {
                for i in 0..1_000u64 {
                    let key = t * 10_000 + i;
                    cache.insert(key, format!("worker {t} item {i}"));
                }
            })
        })
        .collect();

    for handle in handles {
        let _ = handle.join();
    }

    println!("root still cached? {}", cache.contains(&0));
    println!("len {}", cache.len());
    println!("evictions {}", evictions.load(Ordering::Relaxed));
}

// Expected output:
// root still cached? true
// len 101
// evictions 3900
//
// Explanation: 4000 unpinned inserts into a size=100 cache leave 100 queued
// entries plus the pinned root.
