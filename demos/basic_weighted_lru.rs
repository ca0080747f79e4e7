use pincache::policy::weighted_lru::WeightedLruCore;

fn main() {
    let mut cache = WeightedLruCore::with_listener(100, |key: &String| {
        println!("evicted {key}");
    });

    for (name, bytes) in [("seg-a", 40u64), ("seg-b", 40), ("seg-c", 20)] {
        cache.insert(name.to_string(), vec![0u8; bytes as usize], bytes);
    }
    println!("used {} of {}", cache.used_capacity(), cache.capacity());

    cache.get(&"seg-a".to_string());
    cache.insert("seg-d".to_string(), vec![0u8; 50], 50);
    println!("{}", cache.stats());
}

// Expected output:
// used 100 of 100
// evicted seg-b
// evicted seg-c
// LRU used capacity: 90 of 100 across 2 records (hits=1 misses=0 evictions=2)
//
// Explanation: capacity=100 in bytes. After get("seg-a"), "seg-b" and "seg-c"
// are least recently used; both must go to make room for 50 more bytes.
