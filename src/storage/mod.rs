//! Storage Module
//!
//! The persistence interface the cache store writes through, with a SQLite
//! implementation and an in-process one.

mod memory;
mod sqlite;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::cache::{CacheEntry, EntryUpdate};

pub use memory::MemoryGateway;
pub use sqlite::{SqliteGateway, DEFAULT_TABLE};

// == Storage Error ==
/// Failures reported by a storage gateway.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid stored timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid stored owner id: {0}")]
    InvalidOwner(i64),

    #[error("Owner id {0} does not fit the owner column")]
    OwnerOutOfRange(u64),

    #[error("Invalid table name: {0:?}")]
    InvalidTableName(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

// == Predicate ==
/// Row selection for bulk deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate<'a> {
    /// The row with this sanitized key
    Key(&'a str),
    /// Every row tagged with this owner
    Owner(u64),
    /// Every row whose deadline is at or before this instant
    ExpiredAt(NaiveDateTime),
}

impl Predicate<'_> {
    /// Evaluates the predicate against a row.
    pub fn matches(&self, entry: &CacheEntry) -> bool {
        match *self {
            Predicate::Key(key) => entry.key == key,
            Predicate::Owner(owner) => entry.owner_id == Some(owner),
            Predicate::ExpiredAt(cutoff) => entry.expires_at.is_some_and(|at| at <= cutoff),
        }
    }
}

// == Storage Gateway Trait ==
/// Table-backed persistence consumed by [`CacheStore`](crate::cache::CacheStore).
///
/// Calls are blocking. Implementations are shared across threads and must do
/// their own locking.
pub trait StorageGateway: Send + Sync {
    /// Looks up the row with this key.
    fn find_by_key(&self, key: &str) -> StorageResult<Option<CacheEntry>>;

    /// Inserts a new row. Fails if the key is already present.
    fn insert(&self, entry: &CacheEntry) -> StorageResult<bool>;

    /// Overwrites every non-key field of the row with this key.
    fn update_by_key(&self, key: &str, fields: EntryUpdate<'_>) -> StorageResult<bool>;

    /// Inserts the row, or overwrites it if the key exists.
    ///
    /// The default is a lookup followed by an insert or update. The two calls
    /// are not atomic: concurrent writers of the same key can both see it
    /// missing, and the loser gets a uniqueness error. Gateways with a native
    /// upsert should override this.
    fn upsert(&self, entry: &CacheEntry) -> StorageResult<bool> {
        match self.find_by_key(&entry.key)? {
            Some(_) => self.update_by_key(&entry.key, entry.as_update()),
            None => self.insert(entry),
        }
    }

    /// Deletes matching rows and returns how many were removed.
    fn delete_where(&self, predicate: Predicate<'_>) -> StorageResult<usize>;

    /// Removes every row.
    fn truncate(&self) -> StorageResult<()>;

    /// Whether the backing table has been provisioned.
    fn table_exists(&self) -> StorageResult<bool>;

    /// Provisions the backing table and its unique key index.
    fn create_table(&self) -> StorageResult<()>;
}
