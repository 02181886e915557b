//! Cache Store Module
//!
//! Main cache engine: sanitizes keys, encodes values, computes deadlines and
//! writes through a storage gateway. Expired rows are removed lazily when read.
//!
//! No locking happens at this layer. `get` reads and then conditionally
//! deletes, so a concurrent `save` of the same key can be deleted right after
//! it lands; the gateway's own isolation decides the outcome of such races.

use std::sync::{Mutex, MutexGuard};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::cache::codec::{self, NULL_VALUE};
use crate::cache::expiry::{self, Ttl};
use crate::cache::key::sanitize;
use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock};
use crate::error::Result;
use crate::storage::{Predicate, StorageGateway};

// == Cache Store ==
/// Table-backed cache with per-entry expiry.
pub struct CacheStore<G, C = SystemClock> {
    /// Persistence for rows
    gateway: G,
    /// Source of "now" for deadlines and expiry checks
    clock: C,
    /// Read and write counters
    stats: Mutex<CacheStats>,
}

impl<G: StorageGateway> CacheStore<G> {
    // == Constructor ==
    /// Creates a store over `gateway` using wall time at +03:00.
    pub fn new(gateway: G) -> Self {
        Self::with_clock(gateway, SystemClock::default())
    }
}

impl<G: StorageGateway, C: Clock> CacheStore<G, C> {
    /// Creates a store reading time from `clock`.
    pub fn with_clock(gateway: G, clock: C) -> Self {
        Self {
            gateway,
            clock,
            stats: Mutex::new(CacheStats::new()),
        }
    }

    /// Returns the underlying gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    // == Ensure Table ==
    /// Provisions the backing table if it does not exist yet.
    ///
    /// Returns true if the table was created by this call.
    pub fn ensure_table(&self) -> Result<bool> {
        if self.gateway.table_exists()? {
            return Ok(false);
        }
        self.gateway.create_table()?;
        info!("Cache table provisioned");
        Ok(true)
    }

    // == Save ==
    /// Stores `value` under `key`, replacing any existing row in full.
    ///
    /// Returns `Ok(false)` when the storage write fails. Only an unencodable
    /// value is an error, and in that case storage is not touched.
    pub fn save<T>(&self, key: &str, value: &T, ttl: Ttl, owner: Option<u64>) -> Result<bool>
    where
        T: Serialize + ?Sized,
    {
        let key = sanitize(key);
        let text = codec::encode(value)?;
        let expires_at = expiry::expiry_at(ttl, self.clock.now());

        let entry = CacheEntry {
            key,
            value: Some(text),
            expires_at,
            owner_id: owner,
        };

        match self.gateway.upsert(&entry) {
            Ok(written) => {
                debug!(key = %entry.key, ?ttl, ?owner, written, "Cache save");
                Ok(written)
            }
            Err(e) => {
                warn!(key = %entry.key, error = %e, "Cache save failed");
                self.counters().record_storage_failure();
                Ok(false)
            }
        }
    }

    // == Get ==
    /// Retrieves and decodes the value stored under `key`.
    ///
    /// Returns `Ok(None)` on a miss, including a row found past its deadline,
    /// which is deleted on the way out. `owner` is accepted but the lookup is
    /// by key alone.
    pub fn get<T>(&self, key: &str, owner: Option<u64>) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let key = sanitize(key);
        let Some(entry) = self.gateway.find_by_key(&key)? else {
            debug!(key = %key, "Cache miss");
            self.counters().record_miss();
            return Ok(None);
        };

        if entry.is_expired(self.clock.now()) {
            debug!(key = %key, expires_at = ?entry.expires_at, "Cache entry expired");
            match self.gateway.delete_where(Predicate::Key(&key)) {
                Ok(removed) => self.counters().record_expirations(removed),
                Err(e) => {
                    warn!(key = %key, error = %e, "Failed to delete expired entry");
                    self.counters().record_storage_failure();
                }
            }
            self.counters().record_miss();
            return Ok(None);
        }

        let text = entry.value.as_deref().unwrap_or(NULL_VALUE);
        let value = codec::decode(&key, text)?;
        debug!(key = %key, ?owner, "Cache hit");
        self.counters().record_hit();
        Ok(Some(value))
    }

    // == Delete ==
    /// Removes the row for `key`. Returns the number of rows removed (0 or 1).
    pub fn delete(&self, key: &str) -> usize {
        let key = sanitize(key);
        self.delete_matching(Predicate::Key(&key))
    }

    // == Delete By Owner ==
    /// Removes every row tagged with `owner`. Returns the number removed.
    pub fn delete_by_owner(&self, owner: u64) -> usize {
        self.delete_matching(Predicate::Owner(owner))
    }

    // == Delete All ==
    /// Removes every row.
    pub fn delete_all(&self) {
        match self.gateway.truncate() {
            Ok(()) => info!("Cache truncated"),
            Err(e) => {
                warn!(error = %e, "Cache truncate failed");
                self.counters().record_storage_failure();
            }
        }
    }

    // == Purge Expired ==
    /// Removes every row whose deadline has passed.
    ///
    /// Reads never depend on this; it only bounds how long expired rows stay
    /// on disk. Returns the number of rows removed.
    pub fn purge_expired(&self) -> usize {
        let cutoff = self.clock.now().naive_local();
        let removed = self.delete_matching(Predicate::ExpiredAt(cutoff));
        self.counters().record_expirations(removed);
        removed
    }

    // == Stats ==
    /// Returns a snapshot of the store's counters.
    pub fn stats(&self) -> CacheStats {
        self.counters().clone()
    }

    fn delete_matching(&self, predicate: Predicate<'_>) -> usize {
        match self.gateway.delete_where(predicate) {
            Ok(removed) => {
                debug!(?predicate, removed, "Cache delete");
                removed
            }
            Err(e) => {
                warn!(?predicate, error = %e, "Cache delete failed");
                self.counters().record_storage_failure();
                0
            }
        }
    }

    fn counters(&self) -> MutexGuard<'_, CacheStats> {
        self.stats.lock().unwrap_or_else(|e| e.into_inner())
    }
}
