//! In-process storage gateway backed by a `HashMap`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::cache::{CacheEntry, EntryUpdate};
use crate::storage::{Predicate, StorageError, StorageGateway, StorageResult};

// == Memory Gateway ==
/// A gateway that keeps rows in memory.
///
/// Behaves like a provisioned table with a unique key index. Useful for tests
/// and for hosts without a database; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    rows: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held, expired or not.
    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }

    fn rows(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StorageGateway for MemoryGateway {
    fn find_by_key(&self, key: &str) -> StorageResult<Option<CacheEntry>> {
        Ok(self.rows().get(key).cloned())
    }

    fn insert(&self, entry: &CacheEntry) -> StorageResult<bool> {
        let mut rows = self.rows();
        if rows.contains_key(&entry.key) {
            return Err(StorageError::DuplicateKey(entry.key.clone()));
        }
        rows.insert(entry.key.clone(), entry.clone());
        Ok(true)
    }

    fn update_by_key(&self, key: &str, fields: EntryUpdate<'_>) -> StorageResult<bool> {
        match self.rows().get_mut(key) {
            Some(row) => {
                row.value = fields.value.map(str::to_string);
                row.expires_at = fields.expires_at;
                row.owner_id = fields.owner_id;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // A single lock makes the upsert atomic here.
    fn upsert(&self, entry: &CacheEntry) -> StorageResult<bool> {
        self.rows().insert(entry.key.clone(), entry.clone());
        Ok(true)
    }

    fn delete_where(&self, predicate: Predicate<'_>) -> StorageResult<usize> {
        let mut rows = self.rows();
        let before = rows.len();
        rows.retain(|_, entry| !predicate.matches(entry));
        Ok(before - rows.len())
    }

    fn truncate(&self) -> StorageResult<()> {
        self.rows().clear();
        Ok(())
    }

    fn table_exists(&self) -> StorageResult<bool> {
        Ok(true)
    }

    fn create_table(&self) -> StorageResult<()> {
        Ok(())
    }
}
