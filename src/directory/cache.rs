//! TTL cache in front of directory lookups

use crate::directory::UserRecord;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Default time-to-live for cached lookups
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Cache key for a point lookup by user ID
pub fn user_key(user_id: &str) -> String {
    format!("user_{user_id}")
}

/// Cache key for a username scan
pub fn username_key(username: &str) -> String {
    format!("username_{}", username.to_lowercase())
}

/// A cached lookup outcome; `None` records that nobody matched
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Option<UserRecord>,
    pub fetched_at: Instant,
}

impl CacheEntry {
    /// Check if this cache entry is stale (older than TTL)
    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() >= ttl
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stale: u64,
    pub writes: u64,
}

/// Lookup cache with logical expiry
///
/// Entries are never evicted in the background. A read of an entry older
/// than the TTL is a miss, and the next write overwrites it.
pub struct LookupCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
    stats: Arc<RwLock<CacheStats>>,
}

impl Default for LookupCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Create a new lookup cache with custom TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        tracing::info!(ttl_secs = ttl.as_secs(), "Creating lookup cache");

        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
            stats: Arc::new(RwLock::new(CacheStats::default())),
        }
    }

    /// Fresh entry for `key`, if any
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.get(key).map(|e| e.value().clone());

        match entry {
            Some(entry) if !entry.is_stale(self.ttl) => {
                self.stats.write().await.hits += 1;
                tracing::trace!(key = %key, "Lookup cache hit");
                Some(entry)
            }
            Some(entry) => {
                let mut stats = self.stats.write().await;
                stats.misses += 1;
                stats.stale += 1;
                tracing::debug!(
                    key = %key,
                    age_secs = entry.fetched_at.elapsed().as_secs(),
                    "Lookup cache entry stale"
                );
                None
            }
            None => {
                self.stats.write().await.misses += 1;
                tracing::trace!(key = %key, "Lookup cache miss");
                None
            }
        }
    }

    /// Store a lookup outcome, overwriting any previous entry
    pub async fn put(&self, key: impl Into<String>, value: Option<UserRecord>) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                fetched_at: Instant::now(),
            },
        );
        self.stats.write().await.writes += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&self) {
        let removed = self.entries.len();
        self.entries.clear();
        tracing::info!(removed = removed, "Lookup cache cleared");
    }

    /// Get cache statistics
    pub async fn get_stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    /// Log cache statistics
    pub async fn log_stats(&self) {
        let stats = self.get_stats().await;

        let hit_rate = if stats.hits + stats.misses > 0 {
            (stats.hits as f32 / (stats.hits + stats.misses) as f32 * 100.0) as u32
        } else {
            0
        };

        tracing::info!(
            entries = self.len(),
            hits = stats.hits,
            misses = stats.misses,
            stale = stats.stale,
            writes = stats.writes,
            hit_rate = hit_rate,
            "Lookup cache statistics"
        );
    }
}
