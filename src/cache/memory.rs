//! In-memory response cache using moka
//!
//! Values are stored as JSON so any serializable backend payload can be kept.
//! Entries expire after the configured TTL and can be dropped by key prefix
//! when a write makes them stale.

use anyhow::{Context, Result};
use moka::future::Cache;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_MAX_CAPACITY: u64 = 1_000;
const DEFAULT_TTL: Duration = Duration::from_secs(60);

#[derive(Clone)]
struct CacheEntry {
    data: Arc<String>,
}

impl CacheEntry {
    fn new<T: Serialize>(value: &T) -> Result<Self> {
        let json = serde_json::to_string(value).context("Failed to serialize cache value")?;
        Ok(Self {
            data: Arc::new(json),
        })
    }

    fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.data).context("Failed to deserialize cache value")
    }
}

pub struct MemoryCache {
    cache: Cache<String, CacheEntry>,
    ttl: Duration,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.cache.entry_count())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_capacity_and_ttl(DEFAULT_MAX_CAPACITY, DEFAULT_TTL)
    }

    pub fn with_capacity_and_ttl(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { cache, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// `Ok(None)` on a miss or an expired entry
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.cache.get(key).await {
            Some(entry) => Ok(Some(entry.deserialize()?)),
            None => Ok(None),
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let entry = CacheEntry::new(value)?;
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    /// Drop every entry whose key starts with `prefix`
    pub async fn delete_prefix(&self, prefix: &str) -> usize {
        let keys: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| (*key).clone())
            .collect();

        for key in &keys {
            self.cache.invalidate(key).await;
        }
        keys.len()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new();
        cache.set("evenements:list", &vec![1, 2, 3]).await.unwrap();

        let hit: Option<Vec<i32>> = cache.get("evenements:list").await.unwrap();
        assert_eq!(hit, Some(vec![1, 2, 3]));

        let miss: Option<Vec<i32>> = cache.get("annonces:list").await.unwrap();
        assert_eq!(miss, None);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_an_error() {
        let cache = MemoryCache::new();
        cache.set("key", &"text").await.unwrap();
        assert!(cache.get::<Vec<i32>>("key").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_prefix_only_touches_matching_keys() {
        let cache = MemoryCache::new();
        cache.set("evenements:list", &1).await.unwrap();
        cache.set("evenements:7", &2).await.unwrap();
        cache.set("publicites:list", &3).await.unwrap();

        assert_eq!(cache.delete_prefix("evenements:").await, 2);

        assert_eq!(cache.get::<i32>("evenements:list").await.unwrap(), None);
        assert_eq!(cache.get::<i32>("evenements:7").await.unwrap(), None);
        assert_eq!(cache.get::<i32>("publicites:list").await.unwrap(), Some(3));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(10))]

            /// Entries disappear once the TTL has elapsed
            #[test]
            fn cache_entries_expire_after_ttl(
                key in "[a-z]{1,10}",
                value in "[a-z]{1,50}"
            ) {
                let rt = tokio::runtime::Runtime::new().unwrap();
                rt.block_on(async {
                    let cache = MemoryCache::with_capacity_and_ttl(100, Duration::from_millis(10));
                    cache.set(&key, &value).await.unwrap();

                    let hit: Option<String> = cache.get(&key).await.unwrap();
                    prop_assert_eq!(hit, Some(value.clone()));

                    tokio::time::sleep(Duration::from_millis(50)).await;
                    cache.cache.run_pending_tasks().await;

                    let expired: Option<String> = cache.get(&key).await.unwrap();
                    prop_assert_eq!(expired, None);
                    Ok(())
                })?;
            }
        }
    }
}
