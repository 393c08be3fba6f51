//! Concurrent Cache Usage Examples
//!
//! This example shares one cache between threads: a read-heavy workload, a
//! writer racing a metadata-based invalidation, and a throughput comparison
//! of the two strategies.
//!
//! Run with: cargo run --example concurrent_usage

use serde_json::json;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use unified_cache::meta::metadata;
use unified_cache::{Strategy, UnifiedCache, UnifiedCacheConfig};

fn make_cache(
    capacity: usize,
    max_memory: u64,
    strategy: Strategy,
) -> UnifiedCache<String, String> {
    let config = UnifiedCacheConfig::try_new(capacity, max_memory)
        .unwrap()
        .with_strategy(strategy);
    UnifiedCache::init(config, Default::default())
}

fn main() {
    println!("Concurrent Cache Usage Examples");
    println!("================================\n");

    read_heavy_workload();
    invalidation_by_metadata();
    strategy_throughput();
}

fn read_heavy_workload() {
    println!("1. Read-heavy workload (4 readers, 1 writer)");

    let cache = Arc::new(make_cache(1_000, 1 << 20, Strategy::Lru));
    for i in 0..500 {
        cache.set(format!("user:{i}"), format!("profile-{i}")).unwrap();
    }

    let mut handles = Vec::new();
    for t in 0..4 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..10_000 {
                cache.get(format!("user:{}", (i * 7 + t) % 600).as_str());
            }
        }));
    }
    {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 500..1_500 {
                cache.set(format!("user:{i}"), format!("profile-{i}")).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let stats = cache.stats();
    println!(
        "   entries: {}/{}  memory: {}/{} bytes  hit rate: {:.2} (window {:.2})\n",
        stats.current_nodes,
        stats.max_nodes,
        stats.current_memory,
        stats.max_memory,
        stats.abs_hit_rate,
        stats.rel_hit_rate
    );
}

fn invalidation_by_metadata() {
    println!("2. Invalidating a tenant while another thread writes");

    let cache = Arc::new(make_cache(10_000, 1 << 22, Strategy::Lfu));
    let writer = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            for i in 0..2_000 {
                let tenant = if i % 4 == 0 { "acme" } else { "globex" };
                cache
                    .set_with_meta(
                        format!("doc:{i}"),
                        format!("body of document {i}"),
                        metadata([("tenant", json!(tenant))]),
                    )
                    .unwrap();
            }
        })
    };

    let mut removed = 0;
    while !writer.is_finished() {
        removed += cache.remove_by_meta(|m| m["tenant"] == "acme");
        thread::yield_now();
    }
    writer.join().unwrap();
    removed += cache.remove_by_meta(|m| m["tenant"] == "acme");

    let remaining = cache.get_by_meta(|m| m["tenant"] == "acme").len();
    println!("   removed {removed} acme documents, {remaining} remain");
    println!("   {} globex documents cached\n", cache.len());
}

fn strategy_throughput() {
    println!("3. Throughput by strategy (8 threads, mixed get/set)");

    for strategy in [Strategy::Lru, Strategy::Lfu] {
        let cache = Arc::new(make_cache(1_000, 1 << 20, strategy));
        let start = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..20_000 {
                        let key = format!("k{}", (i * 31 + t * 17) % 2_000);
                        if cache.get(key.as_str()).is_none() {
                            cache.set(key, "v".repeat(16)).unwrap();
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        println!(
            "   {strategy}: {:?} for 160k operations, hit rate {:.2}",
            start.elapsed(),
            cache.stats().abs_hit_rate
        );
    }
}
