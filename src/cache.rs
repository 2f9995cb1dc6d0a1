use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Default time-to-live for cached fetches, in days.
pub const DEFAULT_TTL_DAYS: u64 = 7;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

// Upper bound for absurd TTLs, which would overflow `Instant`.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * SECS_PER_DAY);

/// Trait for a cache implementation keyed by opaque strings (usually URLs).
#[async_trait]
pub trait Cache<V>: Send + Sync {
    /// Returns the value stored under `key` if it has not expired yet.
    async fn get(&self, key: &str) -> Option<V>;
    async fn insert(&self, key: String, value: V, ttl: Duration);
    async fn remove(&self, key: &str);
    /// Removes every expired entry and returns how many were dropped.
    async fn clear_expired(&self) -> usize;
    async fn stats(&self) -> CacheStats;
}

/// A cached value together with the instant it stops being fresh.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

/// In-memory TTL cache. Entries are only dropped by an explicit
/// [`TtlCache::clear_cache`] or [`TtlCache::clear_expired_cache`].
#[derive(Debug, Clone)]
pub struct TtlCache<V> {
    entries: Arc<RwLock<HashMap<String, CacheEntry<V>>>>,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the fresh cached value for `key`, or runs `fetcher` once and
    /// caches its result for `ttl_days`.
    ///
    /// A failing fetcher leaves the cache untouched and its error is returned
    /// as is. Concurrent misses on the same key are not coalesced.
    pub async fn fetch_with_cache<F, Fut, E>(
        &self,
        key: &str,
        fetcher: F,
        ttl_days: u64,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: Display,
    {
        if let Some(value) = self.get(key).await {
            tracing::info!("Cache hit for key: {}", key);
            return Ok(value);
        }

        tracing::info!("Cache miss for key: {}, fetching fresh data...", key);
        match fetcher().await {
            Ok(value) => {
                self.insert(key.to_string(), value.clone(), ttl_from_days(ttl_days))
                    .await;
                tracing::info!("Cached data for key: {} (ttl {} days)", key, ttl_days);
                Ok(value)
            }
            Err(err) => {
                tracing::error!("Failed to fetch data for key: {}: {}", key, err);
                Err(err)
            }
        }
    }

    pub async fn clear_cache(&self, key: &str) {
        self.remove(key).await;
        tracing::info!("Cleared cache for key: {}", key);
    }

    pub async fn clear_expired_cache(&self) -> usize {
        let cleared = self.clear_expired().await;
        if cleared > 0 {
            tracing::info!("Cleared {} expired cache entries", cleared);
        }
        cleared
    }

    pub async fn get_cache_stats(&self) -> CacheStats {
        self.stats().await
    }
}

#[async_trait]
impl<V> Cache<V> for TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.value.clone())
    }

    async fn insert(&self, key: String, value: V, ttl: Duration) {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl).unwrap_or(now + MAX_TTL);
        let entry = CacheEntry { value, expires_at };
        self.entries.write().await.insert(key, entry);
    }

    async fn remove(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    async fn clear_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now));
        before - entries.len()
    }

    async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        CacheStats {
            size: entries.len(),
            keys,
        }
    }
}

fn ttl_from_days(ttl_days: u64) -> Duration {
    Duration::from_secs(ttl_days.saturating_mul(SECS_PER_DAY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time;

    const DAY: Duration = Duration::from_secs(SECS_PER_DAY);

    async fn counted_fetch(
        cache: &TtlCache<String>,
        key: &str,
        calls: &AtomicUsize,
    ) -> Result<String, String> {
        cache
            .fetch_with_cache(
                key,
                || async {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    Ok::<_, String>(format!("value-{n}"))
                },
                DEFAULT_TTL_DAYS,
            )
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_fetch_within_ttl_is_a_hit() {
        let cache = TtlCache::new();
        let calls = AtomicUsize::new(0);

        let first = counted_fetch(&cache, "https://example.com/all.json", &calls).await;
        time::advance(DAY).await;
        let second = counted_fetch(&cache, "https://example.com/all.json", &calls).await;

        assert_eq!(first.unwrap(), "value-1");
        assert_eq!(second.unwrap(), "value-1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_after_ttl_refetches() {
        let cache = TtlCache::new();
        let calls = AtomicUsize::new(0);

        counted_fetch(&cache, "key", &calls).await.unwrap();
        counted_fetch(&cache, "key", &calls).await.unwrap();
        time::advance(DAY * DEFAULT_TTL_DAYS as u32).await;
        let third = counted_fetch(&cache, "key", &calls).await.unwrap();

        assert_eq!(third, "value-2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get_cache_stats().await.size, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_exactly_at_deadline() {
        let cache: TtlCache<String> = TtlCache::new();
        cache.insert("key".to_string(), "v".to_string(), DAY).await;

        time::advance(DAY - Duration::from_millis(1)).await;
        assert_eq!(cache.get("key").await.as_deref(), Some("v"));

        time::advance(Duration::from_millis(1)).await;
        assert!(cache.get("key").await.is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_no_entry() {
        let cache: TtlCache<String> = TtlCache::new();
        let before = cache.get_cache_stats().await.size;

        let result = cache
            .fetch_with_cache("key", || async { Err::<String, _>("boom".to_string()) }, 7)
            .await;

        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(cache.get_cache_stats().await.size, before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refetch_keeps_nothing_stale() {
        let cache: TtlCache<String> = TtlCache::new();
        cache
            .fetch_with_cache("key", || async { Ok::<_, String>("old".to_string()) }, 1)
            .await
            .unwrap();
        time::advance(DAY).await;

        let result = cache
            .fetch_with_cache("key", || async { Err::<String, _>("down".to_string()) }, 1)
            .await;

        assert!(result.is_err());
        assert!(cache.get("key").await.is_none());
    }

    #[tokio::test]
    async fn test_clear_cache_removes_one_key() {
        let cache: Arc<TtlCache<String>> = Arc::new(TtlCache::new());
        cache.insert("a".to_string(), "1".to_string(), DAY).await;
        cache.insert("b".to_string(), "2".to_string(), DAY).await;

        cache.clear_cache("a").await;

        assert!(cache.get("a").await.is_none());
        assert_eq!(cache.get("b").await.as_deref(), Some("2"));
        cache.clear_cache("missing").await;
        assert_eq!(cache.get_cache_stats().await.size, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_expired_cache_sweeps_only_expired() {
        let cache: Arc<dyn Cache<String>> = Arc::new(TtlCache::new());
        cache.insert("short".to_string(), "s".to_string(), DAY).await;
        cache.insert("long".to_string(), "l".to_string(), DAY * 7).await;

        time::advance(DAY * 2).await;
        let cleared = cache.clear_expired().await;

        assert_eq!(cleared, 1);
        assert_eq!(
            cache.stats().await,
            CacheStats {
                size: 1,
                keys: vec!["long".to_string()],
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_expired_cache_then_refetch() {
        let cache = TtlCache::new();
        let calls = AtomicUsize::new(0);
        counted_fetch(&cache, "key", &calls).await.unwrap();

        assert_eq!(cache.clear_expired_cache().await, 0);
        time::advance(DAY * 8).await;
        assert_eq!(cache.clear_expired_cache().await, 1);
        assert_eq!(cache.get_cache_stats().await.size, 0);

        assert_eq!(counted_fetch(&cache, "key", &calls).await.unwrap(), "value-2");
    }

    #[tokio::test]
    async fn test_stats_lists_sorted_keys() {
        let cache: TtlCache<u32> = TtlCache::new();
        cache.insert("b".to_string(), 2, DAY).await;
        cache.insert("a".to_string(), 1, DAY).await;
        cache.insert("a".to_string(), 3, DAY).await;

        let stats = cache.get_cache_stats().await;
        assert_eq!(stats.size, 2);
        assert_eq!(stats.keys, vec!["a", "b"]);
        assert_eq!(cache.get("a").await, Some(3));
    }
}
