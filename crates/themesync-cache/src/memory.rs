//! In-memory TTL cache using moka
//!
//! Every entry carries its own expiry. Expiry is evaluated lazily on read:
//! an entry past its deadline is evicted and reported as a miss. Sweeping is
//! only memory hygiene and never changes what a read returns.

use moka::future::Cache;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// A cached value and its deadline
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// Cached value
    pub data: T,
    /// Instant after which the entry is stale
    pub expires_at: Instant,
}

impl<T> CacheEntry<T> {
    /// Create entry expiring `ttl` from now
    #[inline]
    #[must_use]
    pub fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    /// Strictly past the deadline
    #[inline]
    #[must_use]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

/// String-keyed cache with per-entry TTL
#[derive(Clone)]
pub struct MemoryCache<T> {
    inner: Cache<String, CacheEntry<T>>,
    default_ttl: Duration,
}

impl<T> fmt::Debug for MemoryCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl<T> MemoryCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create cache with max capacity and default TTL
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64, default_ttl: Duration) -> Self {
        Self {
            inner: Cache::new(max_capacity),
            default_ttl,
        }
    }

    /// Default TTL applied by [`set`](Self::set) when none is given
    #[inline]
    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Get a live value; stale entries are evicted
    pub async fn get(&self, key: &str) -> Option<T> {
        let entry = self.inner.get(key).await?;
        if entry.is_expired_at(Instant::now()) {
            tracing::debug!(key, "memory cache entry expired");
            self.inner.invalidate(key).await;
            return None;
        }
        Some(entry.data)
    }

    /// Insert, replacing any previous entry
    pub async fn set(&self, key: impl Into<String>, data: T, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        self.inner.insert(key.into(), CacheEntry::new(data, ttl)).await;
    }

    /// Whether a live value exists
    pub async fn has(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }

    /// Remove one entry
    pub async fn delete(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    /// Number of live entries
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.inner
            .iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .count()
    }

    /// Whether no live entry exists
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry
    #[inline]
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }

    /// Evict every stale entry, returning how many were removed
    pub async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let stale: Vec<_> = self
            .inner
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key)
            .collect();

        for key in &stale {
            self.inner.invalidate(key.as_str()).await;
        }
        if !stale.is_empty() {
            tracing::debug!(evicted = stale.len(), "swept expired memory cache entries");
        }
        stale.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn set_and_get() {
        let cache = MemoryCache::new(16, TTL);
        cache.set("config", 7_u32, None).await;

        assert_eq!(cache.get("config").await, Some(7));
        assert!(cache.has("config").await);
        assert_eq!(cache.get("missing").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn expires_lazily_after_ttl() {
        let cache = MemoryCache::new(16, TTL);
        cache.set("config", "doc".to_string(), None).await;

        tokio::time::advance(TTL).await;
        // Exactly at the deadline is still live
        assert!(cache.has("config").await);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(cache.get("config").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_ttl_overrides_default() {
        let cache = MemoryCache::new(16, TTL);
        cache
            .set("short", 1_u8, Some(Duration::from_secs(1)))
            .await;
        cache.set("long", 2_u8, None).await;

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get("short").await, None);
        assert_eq!(cache.get("long").await, Some(2));
    }

    #[tokio::test]
    async fn delete_and_clear() {
        let cache = MemoryCache::new(16, TTL);
        cache.set("a", 1_u8, None).await;
        cache.set("b", 2_u8, None).await;

        cache.delete("a").await;
        assert!(!cache.has("a").await);
        assert!(cache.has("b").await);

        cache.clear();
        assert!(!cache.has("b").await);
    }

    #[test]
    fn debug_does_not_require_debug_values() {
        #[derive(Clone)]
        struct Opaque;

        let cache: MemoryCache<Opaque> = MemoryCache::new(4, TTL);
        assert!(format!("{cache:?}").starts_with("MemoryCache"));
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_removes_only_stale_entries() {
        let cache = MemoryCache::new(16, TTL);
        cache.set("old", 1_u8, Some(Duration::from_secs(1))).await;
        cache.set("fresh", 2_u8, None).await;

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.sweep_expired().await, 1);
        assert_eq!(cache.get("fresh").await, Some(2));
    }
}
