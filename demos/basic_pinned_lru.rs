use pincache::policy::pinned_lru::PinnedLruCore;

fn main() {
    let mut cache = PinnedLruCore::with_listener(2, |key: &&str| println!("evicted {key}"));

    cache.insert("config", "v1");
    cache.insert("alpha", "a");
    cache.pin(&"config");

    cache.insert("beta", "b");
    cache.insert("gamma", "c");

    println!("config pinned? {:?}", cache.is_pinned(&"config"));
    println!("len {} (size {})", cache.len(), cache.size());

    cache.unpin(&"config");
    println!("{}", cache.stats());
}

// Expected output:
// evicted alpha
// config pinned? Ok(true)
// len 3 (size 2)
// evicted beta
// 2 records, 2 in queue, 0 pinned (hits=0 misses=0 evictions=2)
//
// Explanation: size=2 counts only unpinned entries. With "config" pinned,
// "beta" and "gamma" fill the queue and "alpha" is evicted. Unpinning
// "config" puts it back at MRU, which pushes "beta" out.
