//! Concurrent Cache Correctness Tests
//!
//! These tests validate that the cache keeps its limits and accounting while
//! being accessed from multiple threads.
//!
//! ## Test Strategy
//!
//! Unlike single-threaded tests, exact eviction order cannot be predicted
//! here. These tests instead check:
//! - Limits hold at every observation point
//! - Counters add up once all threads are done
//! - State is consistent after concurrent clears and metadata removals
//!
//! ## Segments
//!
//! 1. **Limits Under Concurrency**: entry and memory limits
//! 2. **Accounting**: hit counters and memory sums
//! 3. **Mixed Operations**: clears and metadata removal racing with writes

use scoped_threadpool::Pool;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use unified_cache::meta::metadata;
use unified_cache::{CacheMetrics, ClearOptions, Strategy, UnifiedCache, UnifiedCacheConfig};

const THREADS: u32 = 8;
const OPS_PER_THREAD: usize = 500;

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

// ============================================================================
// SEGMENT 1: LIMITS UNDER CONCURRENCY
// ============================================================================

#[test]
fn test_concurrent_writes_respect_capacity() {
    for strategy in [Strategy::Lru, Strategy::Lfu] {
        let cache = make_cache(50, 1 << 20, strategy);
        let mut pool = Pool::new(THREADS);

        pool.scoped(|scope| {
            for t in 0..THREADS {
                let cache = &cache;
                scope.execute(move || {
                    for i in 0..OPS_PER_THREAD {
                        cache.set(format!("t{t}_k{i}"), "value".into()).unwrap();
                        assert!(cache.len() <= 50);
                    }
                });
            }
        });

        assert_eq!(cache.len(), 50);
        assert_eq!(cache.current_memory(), 50 * 10);
    }
}

#[test]
fn test_concurrent_writes_respect_memory_limit() {
    // 100-character values cost 200 bytes; at most 10 fit.
    let cache = make_cache(1000, 2000, Strategy::Lru);
    let value = "x".repeat(100);
    let mut pool = Pool::new(THREADS);

    pool.scoped(|scope| {
        for t in 0..THREADS {
            let cache = &cache;
            let value = &value;
            scope.execute(move || {
                for i in 0..OPS_PER_THREAD / 5 {
                    cache.set(format!("t{t}_k{i}"), value.clone()).unwrap();
                    assert!(cache.current_memory() <= 2000);
                }
            });
        }
    });

    let stats = cache.stats();
    assert_eq!(stats.current_nodes, 10);
    assert_eq!(stats.current_memory, 2000);
}

#[test]
fn test_hot_keys_survive_lfu_churn() {
    let cache = Arc::new(make_cache(20, 1 << 20, Strategy::Lfu));
    for i in 0..5 {
        cache.set(format!("hot{i}"), "v".into()).unwrap();
        for _ in 0..100 {
            cache.get(format!("hot{i}").as_str());
        }
    }

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    cache.set(format!("cold_{t}_{i}"), "v".into()).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for i in 0..5 {
        assert!(cache.get(format!("hot{i}").as_str()).is_some(), "hot{i} was evicted");
    }
}

// ============================================================================
// SEGMENT 2: ACCOUNTING
// ============================================================================

#[test]
fn test_concurrent_hit_counting_is_exact() {
    let cache = make_cache(100, 1 << 20, Strategy::Lru);
    for i in 0..10 {
        cache.set(format!("k{i}"), "v".into()).unwrap();
    }
    let hits = AtomicUsize::new(0);
    let mut pool = Pool::new(THREADS);

    pool.scoped(|scope| {
        for _ in 0..THREADS {
            let cache = &cache;
            let hits = &hits;
            scope.execute(move || {
                for i in 0..OPS_PER_THREAD {
                    // Keys k0..k19: half exist
                    if cache.get(format!("k{}", i % 20).as_str()).is_some() {
                        hits.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    let total = THREADS as usize * OPS_PER_THREAD;
    let metrics = cache.metrics();
    assert_eq!(metrics["requests"], total as f64);
    assert_eq!(metrics["cache_hits"], hits.load(Ordering::Relaxed) as f64);
    assert_eq!(hits.load(Ordering::Relaxed), total / 2);
    assert_eq!(cache.stats().abs_hit_rate, 0.5);
}

#[test]
fn test_concurrent_updates_keep_memory_consistent() {
    let cache = make_cache(10, 1 << 20, Strategy::Lfu);
    let mut pool = Pool::new(THREADS);

    pool.scoped(|scope| {
        for t in 0..THREADS {
            let cache = &cache;
            scope.execute(move || {
                for i in 0..OPS_PER_THREAD {
                    let len = (t as usize + i) % 7 + 1;
                    cache.set(format!("k{}", i % 5), "y".repeat(len)).unwrap();
                }
            });
        }
    });

    let expected: u64 = (0..5)
        .map(|i| cache.get_with(format!("k{i}").as_str(), |v| v.len() as u64 * 2).unwrap())
        .sum();
    assert_eq!(cache.len(), 5);
    assert_eq!(cache.current_memory(), expected);
}

// ============================================================================
// SEGMENT 3: MIXED OPERATIONS
// ============================================================================

#[test]
fn test_remove_by_meta_races_with_writes() {
    let cache = Arc::new(make_cache(200, 1 << 20, Strategy::Lru));
    let writers: Vec<_> = (0..4)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..OPS_PER_THREAD {
                    let tenant = if i % 2 == 0 { "even" } else { "odd" };
                    cache
                        .set_with_meta(
                            format!("t{t}_k{i}"),
                            "v".into(),
                            metadata([("tenant", json!(tenant))]),
                        )
                        .unwrap();
                }
            })
        })
        .collect();

    let remover = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            let mut removed = 0;
            for _ in 0..50 {
                removed += cache.remove_by_meta(|m| m["tenant"] == "odd");
                thread::yield_now();
            }
            removed
        })
    };

    for writer in writers {
        writer.join().unwrap();
    }
    remover.join().unwrap();
    cache.remove_by_meta(|m| m["tenant"] == "odd");

    assert!(cache.get_by_meta(|m| m["tenant"] == "odd").is_empty());
    assert_eq!(cache.get_by_meta(|_| true).len(), cache.len());
    assert_eq!(cache.current_memory(), cache.len() as u64 * 2);
}

#[test]
fn test_clear_with_races_with_reads_and_writes() {
    let cache = make_cache(100, 1 << 20, Strategy::Lru);
    let mut pool = Pool::new(THREADS);

    pool.scoped(|scope| {
        for t in 0..THREADS {
            let cache = &cache;
            scope.execute(move || {
                for i in 0..OPS_PER_THREAD {
                    let key = format!("k{}", i % 150);
                    match (t, i % 100) {
                        (0, 0) => cache.clear_with(ClearOptions::new().strategy(Strategy::Lfu)),
                        (1, 50) => cache.clear_with(
                            ClearOptions::new().try_capacity(40).unwrap(),
                        ),
                        _ if i % 3 == 0 => {
                            cache.get(key.as_str());
                        }
                        _ => cache.set(key, "value".into()).unwrap(),
                    }
                }
            });
        }
    });

    assert_eq!(cache.strategy(), Strategy::Lfu);
    assert_eq!(cache.capacity(), 40);
    assert!(cache.len() <= 40);
    assert_eq!(cache.current_memory(), cache.len() as u64 * 10);
}
