//! Read Cache
//!
//! Cache-aside storage for the serialized goods list page. The cache holds
//! whole-page snapshots under one fixed key: every list request shares the
//! cached page regardless of `limit`/`offset`, and every mutation deletes
//! the key (write-through invalidation, not read-repair).
//!
//! A missing key is signalled as [`CacheError::Miss`] so callers can
//! distinguish control flow (fall back to the repository) from real backend
//! failures (the list read path fails closed on those).

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use stockroom_core::CacheError;
use tokio::sync::Mutex;

/// Fixed key under which the serialized list page is stored.
pub const LIST_CACHE_KEY: &str = "goods:list";

// ============================================================================
// CACHE STORE TRAIT
// ============================================================================

/// Backend seam for the read cache.
///
/// Implementations must be thread-safe. `get` returns `CacheError::Miss`
/// for an absent or expired key; any other error is a backend failure.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get the bytes stored under `key`, or `CacheError::Miss`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, CacheError>;

    /// Store bytes under `key` with the given time-to-live.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// Delete the entry under `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

// ============================================================================
// IN-MEMORY BACKEND
// ============================================================================

/// In-memory cache store with per-entry expiry.
///
/// Expiry is checked on read; expired entries report a miss and are dropped.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                Err(CacheError::Miss)
            }
            None => Err(CacheError::Miss),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn absent_key_is_a_miss() {
        let cache = MemoryCacheStore::new();
        assert_eq!(cache.get("nope").await, Err(CacheError::Miss));
    }

    #[tokio::test]
    async fn set_then_get_roundtrips() {
        let cache = MemoryCacheStore::new();
        cache
            .set(LIST_CACHE_KEY, b"page".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get(LIST_CACHE_KEY).await.unwrap(), b"page".to_vec());
    }

    #[tokio::test]
    async fn expired_entry_reports_miss() {
        let cache = MemoryCacheStore::new();
        cache
            .set(LIST_CACHE_KEY, b"stale".to_vec(), Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get(LIST_CACHE_KEY).await, Err(CacheError::Miss));
    }

    #[tokio::test]
    async fn delete_invalidates_and_tolerates_absent_keys() {
        let cache = MemoryCacheStore::new();
        cache
            .set(LIST_CACHE_KEY, b"page".to_vec(), Duration::from_secs(60))
            .await
            .unwrap();
        cache.delete(LIST_CACHE_KEY).await.unwrap();
        assert_eq!(cache.get(LIST_CACHE_KEY).await, Err(CacheError::Miss));

        // Deleting again is fine.
        cache.delete(LIST_CACHE_KEY).await.unwrap();
    }
}
