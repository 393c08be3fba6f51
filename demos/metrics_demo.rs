//! Cache Metrics Demonstration
//!
//! Runs the same workload against an LRU and an LFU cache and prints the
//! `stats()` snapshot, the full `CacheMetrics` report, and a diagnostic dump.
//!
//! Run with `RUST_LOG=unified_cache=debug` to also see eviction events.

use std::collections::BTreeMap;
use tracing_subscriber::EnvFilter;
use unified_cache::{CacheMetrics, Strategy, UnifiedCache, UnifiedCacheConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Cache Metrics - Demonstration");
    println!("=============================\n");
    println!("   • Capacity: 3 items, max memory: 64 bytes");
    println!("   • Workload: insert 5 items, access some, insert 2 more\n");

    let lru = run_workload(Strategy::Lru);
    let lfu = run_workload(Strategy::Lfu);

    let caches: [&dyn CacheMetrics; 2] = [&lru, &lfu];
    display_metrics_comparison(&caches);

    println!("\nLRU dump:");
    match lru.dump() {
        Ok(dump) => println!("{dump}"),
        Err(e) => println!("   dump failed: {e}"),
    }
}

fn run_workload(strategy: Strategy) -> UnifiedCache<&'static str, String> {
    let config = UnifiedCacheConfig::try_new(3, 64)
        .unwrap()
        .with_strategy(strategy);
    let cache = UnifiedCache::init(config, Default::default());

    for (key, value) in [
        ("apple", "red"),
        ("banana", "yellow"),
        ("cherry", "dark red"),
        ("date", "brown"),
        ("elderberry", "purple"),
    ] {
        cache.set(key, value.to_string()).unwrap();
    }
    for key in ["elderberry", "date", "elderberry", "apple", "cherry"] {
        cache.get(&key);
    }
    cache.set("fig", "green".to_string()).unwrap();
    cache.set("grape", "a long description of a grape".to_string()).unwrap();

    let stats = cache.stats();
    println!(
        "🔄 {}: {} entries, {} bytes, hit rate {:.2}",
        stats.strategy, stats.current_nodes, stats.current_memory, stats.abs_hit_rate
    );
    cache
}

fn display_metrics_comparison(caches: &[&dyn CacheMetrics]) {
    let reports: Vec<(&str, BTreeMap<String, f64>)> = caches
        .iter()
        .map(|c| (c.algorithm_name(), c.metrics()))
        .collect();

    print!("\n{:<22}", "metric");
    for (name, _) in &reports {
        print!("{name:>12}");
    }
    println!();

    // BTreeMap keeps both reports in the same key order
    for key in reports[0].1.keys() {
        print!("{key:<22}");
        for (_, report) in &reports {
            print!("{:>12.2}", report.get(key).copied().unwrap_or_default());
        }
        println!();
    }
}
