//! Versioned TTL cache on top of [`LocalStore`].
//!
//! Entries live under `cache:<policy>:<key>` and carry the write timestamp and
//! the cache version. A read classifies the entry as fresh, stale (inside the
//! stale-while-revalidate window) or a miss. Each policy keeps at most
//! `max_entries` entries; the oldest go first.
use std::collections::{BTreeMap, HashSet};

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{Result, ToolError};
use crate::storage::{LocalStore, Storage};

const CACHE_NAMESPACE: &str = "cache";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachePolicy {
    pub max_age_ms: u64,
    /// Extra window after `max_age_ms` during which the stale value is still
    /// served while the caller refreshes it.
    #[serde(default)]
    pub stale_while_revalidate_ms: u64,
    pub max_entries: usize,
}

impl CachePolicy {
    pub const fn new(max_age_ms: u64, stale_while_revalidate_ms: u64, max_entries: usize) -> Self {
        Self {
            max_age_ms,
            stale_while_revalidate_ms,
            max_entries,
        }
    }

    fn expires_after(&self) -> u64 {
        self.max_age_ms.saturating_add(self.stale_while_revalidate_ms)
    }
}

/// Built-in policies: `short`, `default`, `long` and `static`.
pub fn default_policies() -> BTreeMap<String, CachePolicy> {
    const MINUTE: u64 = 60 * 1000;
    let mut map = BTreeMap::new();
    map.insert("short".into(), CachePolicy::new(MINUTE, 30 * 1000, 50));
    map.insert("default".into(), CachePolicy::new(5 * MINUTE, MINUTE, 100));
    map.insert("long".into(), CachePolicy::new(60 * MINUTE, 10 * MINUTE, 200));
    map.insert(
        "static".into(),
        CachePolicy::new(24 * 60 * MINUTE, 60 * MINUTE, 500),
    );
    map
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: u64,
    pub version: u32,
}

/// Only the bookkeeping fields, for eviction scans.
#[derive(Deserialize)]
struct EntryStamp {
    timestamp: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<T> {
    Fresh(T),
    /// Past `max_age` but inside the revalidation window.
    Stale(T),
    Miss,
}

impl<T> CacheLookup<T> {
    pub fn into_value(self) -> Option<T> {
        match self {
            CacheLookup::Fresh(value) | CacheLookup::Stale(value) => Some(value),
            CacheLookup::Miss => None,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, CacheLookup::Fresh(_))
    }

    pub fn needs_refresh(&self) -> bool {
        !self.is_fresh()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub stale_hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

pub struct ClientCache<S, C> {
    store: LocalStore<S>,
    clock: C,
    version: u32,
    policies: BTreeMap<String, CachePolicy>,
    revalidating: HashSet<String>,
    stats: CacheStats,
}

impl<S: Storage, C: Clock> ClientCache<S, C> {
    pub fn new(store: LocalStore<S>, clock: C, version: u32) -> Self {
        Self::with_policies(store, clock, version, default_policies())
    }

    pub fn with_policies(
        store: LocalStore<S>,
        clock: C,
        version: u32,
        policies: BTreeMap<String, CachePolicy>,
    ) -> Self {
        Self {
            store,
            clock,
            version,
            policies,
            revalidating: HashSet::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn store(&self) -> &LocalStore<S> {
        &self.store
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    fn policy(&self, name: &str) -> Result<CachePolicy> {
        self.policies
            .get(name)
            .copied()
            .ok_or_else(|| ToolError::invalid(format!("unknown cache policy {name}")))
    }

    fn entry_key(policy: &str, key: &str) -> String {
        format!("{CACHE_NAMESPACE}:{policy}:{key}")
    }

    fn policy_keys(&self, policy: &str) -> Result<Vec<String>> {
        let marker = format!("{CACHE_NAMESPACE}:{policy}:");
        Ok(self
            .store
            .keys()?
            .into_iter()
            .filter(|key| key.starts_with(&marker))
            .collect())
    }

    pub fn get<T: DeserializeOwned>(&mut self, policy: &str, key: &str) -> Result<CacheLookup<T>> {
        let rules = self.policy(policy)?;
        let entry_key = Self::entry_key(policy, key);
        let entry = match self.store.get::<CacheEntry<T>>(&entry_key) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                self.stats.misses += 1;
                debug!("cache miss {entry_key}");
                return Ok(CacheLookup::Miss);
            }
            Err(ToolError::Storage(message)) => return Err(ToolError::Storage(message)),
            Err(err) => {
                debug!("cache entry {entry_key} unreadable: {err}");
                self.store.remove(&entry_key)?;
                self.stats.misses += 1;
                return Ok(CacheLookup::Miss);
            }
        };

        if entry.version != self.version {
            debug!(
                "cache entry {entry_key} has version {} (want {})",
                entry.version, self.version
            );
            self.store.remove(&entry_key)?;
            self.stats.misses += 1;
            return Ok(CacheLookup::Miss);
        }

        let age = self.clock.now_millis().saturating_sub(entry.timestamp);
        if age < rules.max_age_ms {
            self.stats.hits += 1;
            debug!("cache hit {entry_key} age={age}ms");
            Ok(CacheLookup::Fresh(entry.data))
        } else if age < rules.expires_after() {
            self.stats.stale_hits += 1;
            debug!("cache stale {entry_key} age={age}ms");
            Ok(CacheLookup::Stale(entry.data))
        } else {
            self.store.remove(&entry_key)?;
            self.stats.misses += 1;
            debug!("cache expired {entry_key} age={age}ms");
            Ok(CacheLookup::Miss)
        }
    }

    /// Writes `data`, clears any pending revalidation for the key and trims
    /// the policy down to `max_entries`.
    pub fn set<T: Serialize>(&mut self, policy: &str, key: &str, data: &T) -> Result<()> {
        let rules = self.policy(policy)?;
        let entry_key = Self::entry_key(policy, key);
        let entry = CacheEntry {
            data,
            timestamp: self.clock.now_millis(),
            version: self.version,
        };
        self.store.set(&entry_key, &entry)?;
        self.revalidating.remove(&entry_key);
        self.evict(policy, rules.max_entries)?;
        Ok(())
    }

    fn evict(&mut self, policy: &str, max_entries: usize) -> Result<usize> {
        let keys = self.policy_keys(policy)?;
        if keys.len() <= max_entries {
            return Ok(0);
        }
        let mut stamped: Vec<(u64, String)> = keys
            .into_iter()
            .map(|key| {
                // Unreadable entries sort first and are evicted before real data.
                let ts = self
                    .store
                    .get::<EntryStamp>(&key)
                    .ok()
                    .flatten()
                    .map(|stamp| stamp.timestamp)
                    .unwrap_or(0);
                (ts, key)
            })
            .collect();
        stamped.sort();
        let excess = stamped.len() - max_entries;
        for (_, key) in stamped.iter().take(excess) {
            self.store.remove(key)?;
            self.revalidating.remove(key);
        }
        self.stats.evictions += excess as u64;
        debug!("evicted {excess} entries from cache policy {policy}");
        Ok(excess)
    }

    /// Marks a key as being refreshed. Returns `false` when a refresh is
    /// already in flight so the caller does not start a second one.
    pub fn begin_revalidation(&mut self, policy: &str, key: &str) -> bool {
        self.revalidating.insert(Self::entry_key(policy, key))
    }

    pub fn end_revalidation(&mut self, policy: &str, key: &str) {
        self.revalidating.remove(&Self::entry_key(policy, key));
    }

    pub fn is_revalidating(&self, policy: &str, key: &str) -> bool {
        self.revalidating.contains(&Self::entry_key(policy, key))
    }

    pub fn invalidate(&mut self, policy: &str, key: &str) -> Result<()> {
        let entry_key = Self::entry_key(policy, key);
        self.revalidating.remove(&entry_key);
        self.store.remove(&entry_key)
    }

    /// Drops every entry of one policy.
    pub fn clear(&mut self, policy: &str) -> Result<usize> {
        let keys = self.policy_keys(policy)?;
        for key in &keys {
            self.store.remove(key)?;
            self.revalidating.remove(key);
        }
        Ok(keys.len())
    }

    pub fn clear_all(&mut self) -> Result<usize> {
        let names: Vec<String> = self.policies.keys().cloned().collect();
        let mut removed = 0;
        for name in names {
            removed += self.clear(&name)?;
        }
        Ok(removed)
    }

    /// Removes entries past their revalidation window, unreadable entries and
    /// entries written by another cache version.
    pub fn purge_expired(&mut self) -> Result<usize> {
        let now = self.clock.now_millis();
        let mut removed = 0;
        let policies: Vec<(String, CachePolicy)> = self
            .policies
            .iter()
            .map(|(name, policy)| (name.clone(), *policy))
            .collect();
        for (name, rules) in policies {
            for key in self.policy_keys(&name)? {
                let keep = match self.store.get::<CacheEntry<serde_json::Value>>(&key) {
                    Ok(Some(entry)) => {
                        entry.version == self.version
                            && now.saturating_sub(entry.timestamp) < rules.expires_after()
                    }
                    Ok(None) => true,
                    Err(_) => false,
                };
                if !keep {
                    self.store.remove(&key)?;
                    self.revalidating.remove(&key);
                    removed += 1;
                }
            }
        }
        if removed > 0 {
            debug!("purged {removed} expired cache entries");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStorage;

    const POLICY: &str = "test";

    fn cache_with(policy: CachePolicy) -> (ClientCache<MemoryStorage, ManualClock>, ManualClock) {
        let clock = ManualClock::new(1_000_000);
        let mut policies = BTreeMap::new();
        policies.insert(POLICY.to_string(), policy);
        let store = LocalStore::new(MemoryStorage::new(), "toolbox");
        (
            ClientCache::with_policies(store, clock.clone(), 1, policies),
            clock,
        )
    }

    #[test]
    fn fresh_then_stale_then_miss() {
        let (mut cache, clock) = cache_with(CachePolicy::new(1_000, 500, 10));
        cache.set(POLICY, "rates", &vec![1, 2, 3]).unwrap();

        let hit: CacheLookup<Vec<i32>> = cache.get(POLICY, "rates").unwrap();
        assert_eq!(hit, CacheLookup::Fresh(vec![1, 2, 3]));

        clock.advance(1_000);
        let stale: CacheLookup<Vec<i32>> = cache.get(POLICY, "rates").unwrap();
        assert_eq!(stale, CacheLookup::Stale(vec![1, 2, 3]));
        assert!(stale.needs_refresh());

        clock.advance(500);
        let miss: CacheLookup<Vec<i32>> = cache.get(POLICY, "rates").unwrap();
        assert_eq!(miss, CacheLookup::Miss);
        assert!(cache.store().keys().unwrap().is_empty());

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.stale_hits, stats.misses), (1, 1, 1));
    }

    #[test]
    fn entry_older_than_max_age_without_swr_is_a_miss() {
        let (mut cache, clock) = cache_with(CachePolicy::new(100, 0, 10));
        cache.set(POLICY, "k", &"v").unwrap();
        clock.advance(100);
        let lookup: CacheLookup<String> = cache.get(POLICY, "k").unwrap();
        assert_eq!(lookup, CacheLookup::Miss);
    }

    #[test]
    fn eviction_keeps_at_most_max_entries_oldest_first() {
        let (mut cache, clock) = cache_with(CachePolicy::new(60_000, 0, 3));
        for idx in 0..5 {
            cache.set(POLICY, &format!("k{idx}"), &idx).unwrap();
            clock.advance(10);
        }
        let keys = cache.store().keys().unwrap();
        assert_eq!(keys.len(), 3);
        for evicted in ["k0", "k1"] {
            let lookup: CacheLookup<i32> = cache.get(POLICY, evicted).unwrap();
            assert_eq!(lookup, CacheLookup::Miss);
        }
        let kept: CacheLookup<i32> = cache.get(POLICY, "k4").unwrap();
        assert_eq!(kept, CacheLookup::Fresh(4));
        assert_eq!(cache.stats().evictions, 2);
    }

    #[test]
    fn version_mismatch_is_a_miss() {
        let clock = ManualClock::new(0);
        let mut storage = MemoryStorage::new();
        storage
            .set_item(
                "toolbox:cache:default:k",
                r#"{"data":1,"timestamp":0,"version":1}"#,
            )
            .unwrap();
        let mut cache = ClientCache::new(LocalStore::new(storage, "toolbox"), clock, 2);
        let lookup: CacheLookup<i32> = cache.get("default", "k").unwrap();
        assert_eq!(lookup, CacheLookup::Miss);
        assert!(cache.store().keys().unwrap().is_empty());
    }

    #[test]
    fn corrupt_entry_is_a_miss_not_an_error() {
        let mut storage = MemoryStorage::new();
        storage
            .set_item("toolbox:cache:default:k", "garbage")
            .unwrap();
        let mut cache = ClientCache::new(
            LocalStore::new(storage, "toolbox"),
            ManualClock::new(0),
            1,
        );
        let lookup: CacheLookup<i32> = cache.get("default", "k").unwrap();
        assert_eq!(lookup, CacheLookup::Miss);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let (mut cache, _) = cache_with(CachePolicy::new(1, 0, 1));
        let err = cache.get::<i32>("nope", "k").unwrap_err();
        assert!(err.to_string().contains("unknown cache policy"));
    }

    #[test]
    fn revalidation_is_deduplicated_until_set() {
        let (mut cache, _) = cache_with(CachePolicy::new(1_000, 1_000, 10));
        assert!(cache.begin_revalidation(POLICY, "k"));
        assert!(!cache.begin_revalidation(POLICY, "k"));
        assert!(cache.is_revalidating(POLICY, "k"));
        cache.set(POLICY, "k", &1).unwrap();
        assert!(!cache.is_revalidating(POLICY, "k"));
        assert!(cache.begin_revalidation(POLICY, "k"));
        cache.end_revalidation(POLICY, "k");
        assert!(!cache.is_revalidating(POLICY, "k"));
    }

    #[test]
    fn purge_and_clear() {
        let (mut cache, clock) = cache_with(CachePolicy::new(100, 0, 10));
        cache.set(POLICY, "old", &1).unwrap();
        clock.advance(200);
        cache.set(POLICY, "new", &2).unwrap();
        assert_eq!(cache.purge_expired().unwrap(), 1);
        cache.invalidate(POLICY, "missing").unwrap();
        assert_eq!(cache.clear(POLICY).unwrap(), 1);
        assert_eq!(cache.clear_all().unwrap(), 0);
    }
}
