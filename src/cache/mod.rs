//! Command cache keyed by account API key.
//!
//! Each entry holds an account's full command map so one store read warms
//! every command of that account until the entry expires. `MemoryCache`
//! serves a single instance; `RedisCache` is shared across instances.

mod redis_cache;

pub use redis_cache::RedisCache;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::errors::AppError;
use crate::models::CommandMap;

/// Key/value cache with per-entry TTL.
#[async_trait]
pub trait CommandCache: Send + Sync {
    /// The cached map for `api_key`, or `None` on a miss or expired entry.
    async fn get(&self, api_key: &str) -> Result<Option<CommandMap>, AppError>;

    /// Store `cmds` for `api_key`, replacing any previous entry.
    async fn set(&self, api_key: &str, cmds: CommandMap, ttl: Duration) -> Result<(), AppError>;
}

struct CacheEntry {
    cmds: CommandMap,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-process cache shared by all request tasks.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    /// Number of entries currently held, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl CommandCache for MemoryCache {
    async fn get(&self, api_key: &str) -> Result<Option<CommandMap>, AppError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(api_key) {
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.cmds.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: remove unless a concurrent writer refreshed it meanwhile.
        let mut entries = self.entries.write().await;
        if entries
            .get(api_key)
            .is_some_and(|entry| !entry.is_live(now))
        {
            entries.remove(api_key);
        }
        Ok(None)
    }

    async fn set(&self, api_key: &str, cmds: CommandMap, ttl: Duration) -> Result<(), AppError> {
        let entry = CacheEntry {
            cmds,
            expires_at: Instant::now().checked_add(ttl),
        };
        self.entries.write().await.insert(api_key.to_string(), entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmds(pairs: &[(&str, &str)]) -> CommandMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_get_returns_stored_map() {
        let cache = MemoryCache::new();
        cache
            .set("key", cmds(&[("gh", "https://github.com")]), Duration::from_secs(60))
            .await
            .unwrap();

        let cached = cache.get("key").await.unwrap().unwrap();
        assert_eq!(cached["gh"], "https://github.com");
        assert!(cache.get("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = MemoryCache::new();
        cache
            .set("key", cmds(&[("gh", "https://github.com")]), Duration::from_millis(20))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(cache.get("key").await.unwrap().is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_unrepresentable_ttl_never_expires() {
        let cache = MemoryCache::new();
        cache
            .set("key", cmds(&[("gh", "https://github.com")]), Duration::MAX)
            .await
            .unwrap();

        assert!(cache.get("key").await.unwrap().is_some());
        assert_eq!(cache.purge_expired().await, 0);
    }

    #[tokio::test]
    async fn test_purge_expired_keeps_live_entries() {
        let cache = MemoryCache::new();
        cache
            .set("short", CommandMap::new(), Duration::from_millis(10))
            .await
            .unwrap();
        cache
            .set("long", CommandMap::new(), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.purge_expired().await, 1);
        assert!(cache.get("long").await.unwrap().is_some());
    }
}
