use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct CachedEntry {
    value: Value,
    stored_at: Instant,
}

/// In-memory cache of upstream payloads with a fixed time-to-live.
///
/// Each provider client owns its own cache, so entries never leak
/// between adapters. A zero TTL turns every lookup into a miss.
#[derive(Clone)]
pub struct ResponseCache {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<String, CachedEntry>>>,
}

impl ResponseCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        if self.ttl.is_zero() {
            return None;
        }

        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop it so the map does not grow with dead keys.
        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.stored_at.elapsed() >= self.ttl)
        {
            entries.remove(key);
        }
        None
    }

    pub async fn insert(&self, key: String, value: Value) {
        if self.ttl.is_zero() {
            return;
        }

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        entries.insert(
            key,
            CachedEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_hit_within_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("trending".to_string(), json!([1, 2, 3])).await;

        assert_eq!(cache.get("trending").await, Some(json!([1, 2, 3])));
        assert_eq!(cache.get("popular").await, None);
    }

    #[tokio::test]
    async fn test_expired_entry_is_evicted() {
        let cache = ResponseCache::new(Duration::from_millis(20));
        cache.insert("trending".to_string(), json!({"id": 1})).await;

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(cache.get("trending").await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_disabled_cache_never_stores() {
        let cache = ResponseCache::disabled();
        cache.insert("trending".to_string(), json!([])).await;

        assert_eq!(cache.get("trending").await, None);
        assert_eq!(cache.len().await, 0);
    }
}
