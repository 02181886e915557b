//! Cache Entry Module
//!
//! Row types exchanged with the storage gateway.

use chrono::{DateTime, FixedOffset, NaiveDateTime};

use crate::cache::expiry;

// == Cache Entry ==
/// One stored row, unique by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Sanitized key
    pub key: String,
    /// Encoded value; `None` when the column is null
    pub value: Option<String>,
    /// Absolute deadline in the cache's time zone, None = no expiration
    pub expires_at: Option<NaiveDateTime>,
    /// Owner tag used for bulk deletion
    pub owner_id: Option<u64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry from its parts.
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        expires_at: Option<NaiveDateTime>,
        owner_id: Option<u64>,
    ) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            expires_at,
            owner_id,
        }
    }

    // == Is Expired ==
    /// Checks the entry's deadline against `now`.
    ///
    /// Entries without a deadline never expire.
    pub fn is_expired(&self, now: DateTime<FixedOffset>) -> bool {
        match self.expires_at {
            Some(deadline) => expiry::is_expired(deadline, now),
            None => false,
        }
    }

    /// Returns the fields a `save` overwrites.
    pub fn as_update(&self) -> EntryUpdate<'_> {
        EntryUpdate {
            value: self.value.as_deref(),
            expires_at: self.expires_at,
            owner_id: self.owner_id,
        }
    }
}

// == Entry Update ==
/// The full set of non-key fields written on overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryUpdate<'a> {
    pub value: Option<&'a str>,
    pub expires_at: Option<NaiveDateTime>,
    pub owner_id: Option<u64>,
}
