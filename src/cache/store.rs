//! Fixed-capacity object store keyed by request URL.
//!
//! # Responsibilities
//! - Serve lookups concurrently under the shared side of the lock
//! - Serialize inserts and evictions under the exclusive side
//! - Evict the least recently used slot when full
//!
//! # Design Decisions
//! - Linear scan over at most `capacity` entries; capacities are small
//! - Every slot is usable: the store fills all `capacity` entries before evicting
//! - One entry per URL: storing an existing URL replaces it in place
//! - Objects are `Bytes`, so a hit hands out a reference-counted view instead
//!   of copying under the read lock

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;

use crate::cache::clock::LogicalClock;
use crate::cache::lock::ReaderPreferringLock;
use crate::observability::metrics;

#[derive(Debug)]
struct CacheEntry {
    url: String,
    object: Bytes,
    recency: AtomicU64,
}

impl CacheEntry {
    fn recency(&self) -> u64 {
        self.recency.load(Ordering::Relaxed)
    }
}

/// Shared response cache. Clone an `Arc<ObjectCache>` into every connection.
#[derive(Debug)]
pub struct ObjectCache {
    entries: ReaderPreferringLock<Vec<CacheEntry>>,
    clock: LogicalClock,
    capacity: usize,
    max_object_size: usize,
}

impl ObjectCache {
    /// Create an empty cache with `capacity` slots holding objects of at most
    /// `max_object_size` bytes.
    pub fn new(capacity: usize, max_object_size: usize) -> Self {
        Self {
            entries: ReaderPreferringLock::new(Vec::with_capacity(capacity)),
            clock: LogicalClock::new(),
            capacity,
            max_object_size,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn max_object_size(&self) -> usize {
        self.max_object_size
    }

    /// Find the object cached for `url`. A hit refreshes the entry's recency.
    pub async fn lookup(&self, url: &str) -> Option<Bytes> {
        let entries = self.entries.acquire_read().await;

        let hit = entries.iter().find(|entry| entry.url == url).map(|entry| {
            self.clock.stamp(&entry.recency);
            entry.object.clone()
        });

        entries.release();

        metrics::record_cache_lookup(hit.is_some());
        tracing::debug!(url = %url, hit = hit.is_some(), "Cache lookup");
        hit
    }

    /// Cache `object` under `url`, evicting the least recently used entry if
    /// every slot is taken. Oversized objects are ignored.
    pub async fn store(&self, url: &str, object: Bytes) {
        if object.len() > self.max_object_size {
            tracing::debug!(
                url = %url,
                size = object.len(),
                max_object_size = self.max_object_size,
                "Object too large to cache"
            );
            return;
        }
        let size = object.len();

        let mut entries = self.entries.acquire_write().await;

        if let Some(existing) = entries.iter_mut().find(|entry| entry.url == url) {
            existing.object = object;
            self.clock.stamp(&existing.recency);
            tracing::debug!(url = %url, size, "Cache entry replaced");
        } else if entries.len() < self.capacity {
            let entry = CacheEntry {
                url: url.to_string(),
                object,
                recency: AtomicU64::new(0),
            };
            self.clock.stamp(&entry.recency);
            entries.push(entry);
            tracing::debug!(url = %url, size, occupied = entries.len(), "Cache entry inserted");
        } else if let Some(victim) = entries.iter_mut().min_by_key(|entry| entry.recency()) {
            let evicted = std::mem::replace(&mut victim.url, url.to_string());
            victim.object = object;
            self.clock.stamp(&victim.recency);
            metrics::record_cache_eviction();
            tracing::debug!(url = %url, evicted = %evicted, size, "Cache entry evicted");
        }

        entries.release();
        metrics::record_cache_store();
    }

    /// Whether `url` is cached. Unlike `lookup`, recency is left untouched.
    pub async fn contains(&self, url: &str) -> bool {
        self.entries
            .acquire_read()
            .await
            .iter()
            .any(|entry| entry.url == url)
    }

    /// Number of occupied slots.
    pub async fn len(&self) -> usize {
        self.entries.acquire_read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
