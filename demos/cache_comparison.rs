//! Eviction Strategy Comparison
//!
//! Runs the same access pattern against one cache, first under LRU and then
//! under LFU after switching with `clear_with`, and shows which key each
//! strategy evicts.
//!
//! Run with: cargo run --example cache_comparison

use unified_cache::{ClearOptions, Strategy, UnifiedCache, UnifiedCacheConfig};

const KEYS: [&str; 4] = ["apple", "banana", "cherry", "date"];

fn print_contents(cache: &UnifiedCache<&'static str, i32>) {
    let mut present: Vec<_> = KEYS
        .iter()
        .chain(["elderberry"].iter())
        .filter(|k| cache.get_value_and_meta(*k).is_some())
        .collect();
    present.sort();
    println!("   Cache contains: {present:?}");
}

fn run(cache: &UnifiedCache<&'static str, i32>) {
    for (value, key) in KEYS.iter().enumerate() {
        cache.set(*key, value as i32 + 1).unwrap();
        println!("   Added: {key} -> {}", value + 1);
    }
    print_contents(cache);

    println!("   Accessing 'cherry' three times, then 'date' and 'banana' once...");
    for _ in 0..3 {
        cache.get(&"cherry");
    }
    cache.get(&"date");
    cache.get(&"banana");

    cache.set("elderberry", 5).unwrap();
    println!("   Added: elderberry -> 5");
    print_contents(cache);
}

fn main() {
    println!("Eviction Strategy Comparison");
    println!("============================");
    println!("The cache holds 3 items. We add 4, access some of them, then add");
    println!("'elderberry' to see which entry each strategy evicts.\n");

    let config = UnifiedCacheConfig::try_new(3, u64::MAX)
        .unwrap()
        .with_strategy(Strategy::Lru);
    let cache = UnifiedCache::init(config, Default::default());

    println!("1. {} (least recently used):", cache.strategy());
    run(&cache);

    // Same instance, same limits, new strategy
    cache.clear_with(ClearOptions::new().strategy(Strategy::Lfu));
    println!("\n2. {} (least frequently used):", cache.strategy());
    run(&cache);

    println!("\nLRU drops the entry touched longest ago ('cherry' after its run of hits");
    println!("was followed by newer accesses); LFU drops the entry with the fewest hits.");
}
