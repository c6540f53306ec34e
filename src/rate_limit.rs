//! Fixed-window attempt counter.
//!
//! Each identifier gets `limit` attempts per window. The window starts on the
//! first attempt and is replaced by a fresh one on the first attempt after it
//! expires, so up to `2 * limit` attempts can land around a window boundary.
//! State is per process and does not survive a restart.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::error::RateLimitError;

// Rate limit entry - tracks attempts per identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    // ms since epoch
    pub reset_time: i64,
}

impl RateLimitEntry {
    fn fresh(now: i64, window_ms: i64) -> Self {
        Self {
            count: 1,
            reset_time: now.saturating_add(window_ms),
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now > self.reset_time
    }
}

/// Backing storage for rate limit entries.
///
/// `increment` counts one attempt. The provided version is built on `get`
/// and `set`; [`RateLimiter`] serializes calls per key within the process,
/// so a store only needs to override it to stay exact across processes.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<RateLimitEntry>, RateLimitError>;

    async fn set(&self, key: &str, entry: RateLimitEntry) -> Result<(), RateLimitError>;

    async fn delete(&self, key: &str) -> Result<(), RateLimitError>;

    /// Drops entries whose window ended before `now`, returning how many.
    async fn sweep(&self, now: i64) -> Result<usize, RateLimitError>;

    async fn increment(
        &self,
        key: &str,
        now: i64,
        window_ms: i64,
    ) -> Result<RateLimitEntry, RateLimitError> {
        let entry = match self.get(key).await? {
            Some(e) if !e.is_expired(now) => RateLimitEntry {
                count: e.count.saturating_add(1),
                ..e
            },
            _ => RateLimitEntry::fresh(now, window_ms),
        };
        self.set(key, entry).await?;
        Ok(entry)
    }
}

#[derive(Default)]
pub struct MemoryRateLimitStore {
    entries: DashMap<String, RateLimitEntry>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn get(&self, key: &str) -> Result<Option<RateLimitEntry>, RateLimitError> {
        Ok(self.entries.get(key).map(|e| *e.value()))
    }

    async fn set(&self, key: &str, entry: RateLimitEntry) -> Result<(), RateLimitError> {
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RateLimitError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn sweep(&self, now: i64) -> Result<usize, RateLimitError> {
        let mut removed = 0;
        // Entries created after `now` was taken end in the future and stay
        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }

    async fn increment(
        &self,
        key: &str,
        now: i64,
        window_ms: i64,
    ) -> Result<RateLimitEntry, RateLimitError> {
        // The entry guard keeps the shard locked across read-modify-write
        let updated = match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if entry.is_expired(now) {
                    *entry = RateLimitEntry::fresh(now, window_ms);
                } else {
                    entry.count = entry.count.saturating_add(1);
                }
                *entry
            }
            Entry::Vacant(vacant) => *vacant.insert(RateLimitEntry::fresh(now, window_ms)),
        };
        Ok(updated)
    }
}

/// Outcome of one counted attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub limited: bool,
    pub remaining: u32,
    pub reset_time: i64,
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    // One lock per identifier, held across the store's read-modify-write
    key_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>) -> Self {
        Self {
            store,
            key_locks: Arc::new(DashMap::new()),
        }
    }

    fn key_lock(&self, identifier: &str) -> Arc<Mutex<()>> {
        self.key_locks
            .entry(identifier.to_string())
            .or_default()
            .clone()
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryRateLimitStore::new()))
    }

    /// Counts one attempt for `identifier`.
    pub async fn check(
        &self,
        identifier: &str,
        limit: u32,
        window: Duration,
    ) -> Result<RateLimitDecision, RateLimitError> {
        self.check_at(identifier, limit, window, Utc::now().timestamp_millis())
            .await
    }

    pub async fn check_at(
        &self,
        identifier: &str,
        limit: u32,
        window: Duration,
        now: i64,
    ) -> Result<RateLimitDecision, RateLimitError> {
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        let lock = self.key_lock(identifier);
        let entry = {
            let _guard = lock.lock().await;
            self.store
                .increment(identifier, now, window_ms.max(1))
                .await?
        };

        let decision = if entry.count > limit {
            tracing::debug!(
                identifier_hash = %fingerprint(identifier),
                count = entry.count,
                limit,
                "Attempt over limit"
            );
            RateLimitDecision {
                limited: true,
                remaining: 0,
                reset_time: entry.reset_time,
            }
        } else {
            RateLimitDecision {
                limited: false,
                remaining: limit - entry.count,
                reset_time: entry.reset_time,
            }
        };
        Ok(decision)
    }

    /// Forgets `identifier`, e.g. after a successful login.
    pub async fn reset(&self, identifier: &str) -> Result<(), RateLimitError> {
        self.store.delete(identifier).await
    }

    pub async fn sweep(&self) -> Result<usize, RateLimitError> {
        self.sweep_at(Utc::now().timestamp_millis()).await
    }

    pub async fn sweep_at(&self, now: i64) -> Result<usize, RateLimitError> {
        // A lock only referenced by the map has no waiter or holder
        self.key_locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        self.store.sweep(now).await
    }
}

// Identifiers carry client IPs; logs get a hash instead
pub fn fingerprint(identifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identifier.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}
