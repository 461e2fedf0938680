//! Time-boxed cache-or-fetch building blocks.
//!
//! The same shape backs both caches in instructgen: the durable listing
//! cache (libSQL, 30 minute TTL) and the in-memory content cache (no
//! expiry). Stores only hold entries; expiry is decided by [`is_expired`].

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;

/// How long a cached value stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Never expires (process-lifetime caches).
    Infinite,
    /// Valid while `now - timestamp <= ttl`.
    Within(TimeDelta),
}

/// A cached value together with the moment it was stored.
///
/// Serializes as `{ "data": ..., "timestamp": <epoch-ms> }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    #[serde(rename = "data")]
    pub value: V,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, timestamp: DateTime<Utc>) -> Self {
        Self { value, timestamp }
    }
}

/// Whether `entry` must be treated as absent at `now`.
pub fn is_expired<V>(entry: &CacheEntry<V>, now: DateTime<Utc>, ttl: Ttl) -> bool {
    match ttl {
        Ttl::Infinite => false,
        Ttl::Within(limit) => now - entry.timestamp > limit,
    }
}

/// Key-value backend for a cache namespace.
#[allow(async_fn_in_trait)]
pub trait CacheStore<V> {
    /// Look up an entry. Unreadable entries are reported as absent.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry<V>>>;
    /// Store `value` under `key`, replacing any previous entry.
    async fn put(&self, key: &str, value: V, timestamp: DateTime<Utc>) -> Result<()>;
    /// Remove the entry under `key`, if any.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Read `key` from `store`, returning the value only while it is fresh.
///
/// Expired entries are removed from the store as a side effect.
pub async fn get_fresh<V, S>(store: &S, key: &str, now: DateTime<Utc>, ttl: Ttl) -> Result<Option<V>>
where
    S: CacheStore<V>,
{
    match store.get(key).await? {
        Some(entry) if !is_expired(&entry, now, ttl) => Ok(Some(entry.value)),
        Some(entry) => {
            debug!(key, stored_at = %entry.timestamp, "cache entry expired");
            store.remove(key).await?;
            Ok(None)
        }
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Process-lifetime, in-memory cache store.
#[derive(Debug)]
pub struct MemoryStore<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

impl<V: Clone> CacheStore<V> for MemoryStore<V> {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry<V>>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: V, timestamp: DateTime<Utc>) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), CacheEntry::new(value, timestamp));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_ttl_never_expires() {
        let entry = CacheEntry::new("x", Utc::now() - TimeDelta::days(365));
        assert!(!is_expired(&entry, Utc::now(), Ttl::Infinite));
    }

    #[test]
    fn ttl_boundary_is_inclusive() {
        let now = Utc::now();
        let ttl = Ttl::Within(TimeDelta::minutes(30));

        let at_limit = CacheEntry::new(1, now - TimeDelta::minutes(30));
        assert!(!is_expired(&at_limit, now, ttl));

        let past_limit = CacheEntry::new(1, now - TimeDelta::minutes(30) - TimeDelta::milliseconds(1));
        assert!(is_expired(&past_limit, now, ttl));
    }

    #[test]
    fn entry_serializes_as_data_and_epoch_ms() {
        let ts = DateTime::from_timestamp_millis(1_700_000_000_123).expect("valid ts");
        let entry = CacheEntry::new(vec!["a".to_string()], ts);

        let json = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(json["data"][0], "a");
        assert_eq!(json["timestamp"], 1_700_000_000_123_i64);

        let parsed: CacheEntry<Vec<String>> = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed, entry);
    }

    #[tokio::test]
    async fn memory_store_crud() {
        let store = MemoryStore::<String>::new();
        assert!(store.get("python").await.unwrap().is_none());

        store.put("python", "body".into(), Utc::now()).await.unwrap();
        store.put("go", "body".into(), Utc::now()).await.unwrap();
        assert_eq!(store.len().await, 2);
        assert_eq!(store.keys().await, vec!["go", "python"]);

        let entry = store.get("python").await.unwrap().expect("present");
        assert_eq!(entry.value, "body");

        store.remove("python").await.unwrap();
        assert!(store.get("python").await.unwrap().is_none());

        store.clear().await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn get_fresh_evicts_expired_entries() {
        let store = MemoryStore::<u32>::new();
        let now = Utc::now();
        let ttl = Ttl::Within(TimeDelta::minutes(30));

        store.put("fresh", 1, now - TimeDelta::minutes(5)).await.unwrap();
        store.put("stale", 2, now - TimeDelta::minutes(31)).await.unwrap();

        assert_eq!(get_fresh(&store, "fresh", now, ttl).await.unwrap(), Some(1));
        assert_eq!(get_fresh(&store, "stale", now, ttl).await.unwrap(), None);
        assert_eq!(store.keys().await, vec!["fresh"]);
    }
}
