//! SQLite storage gateway

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use crate::cache::expiry::{format_timestamp, parse_timestamp};
use crate::cache::key::sanitize;
use crate::cache::{CacheEntry, EntryUpdate};
use crate::storage::{Predicate, StorageError, StorageGateway, StorageResult};

/// Default name of the cache table.
pub const DEFAULT_TABLE: &str = "cache_entries";

/// Raw column values as read from a row.
type RawRow = (String, Option<String>, Option<String>, Option<i64>);

// == SQLite Gateway ==
/// Stores cache rows in a single SQLite table.
///
/// Columns: `cache_key` (unique), `cache_value`, `expires_at` (text in
/// `TIMESTAMP_FORMAT`, null = never) and `owner_id`.
pub struct SqliteGateway {
    conn: Mutex<Connection>,
    table: String,
}

impl SqliteGateway {
    /// Open or create a database file.
    pub fn open(path: impl AsRef<Path>, table: &str, wal_mode: bool) -> StorageResult<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), table, "Opening cache database");

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrency
        if wal_mode {
            conn.pragma_update(None, "journal_mode", "WAL")?;
        }

        Self::from_connection(conn, table)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory(table: &str) -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?, table)
    }

    /// Wrap an existing connection.
    ///
    /// The table name may only contain ASCII letters, digits, `_` and `-`.
    pub fn from_connection(conn: Connection, table: &str) -> StorageResult<Self> {
        if table.is_empty() || sanitize(table) != table {
            return Err(StorageError::InvalidTableName(table.to_string()));
        }

        Ok(Self {
            conn: Mutex::new(conn),
            table: table.to_string(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn owner_to_sql(owner: Option<u64>) -> StorageResult<Option<i64>> {
    owner
        .map(|id| i64::try_from(id).map_err(|_| StorageError::OwnerOutOfRange(id)))
        .transpose()
}

fn row_to_entry((key, value, expires_at, owner_id): RawRow) -> StorageResult<CacheEntry> {
    let expires_at = expires_at
        .map(|text| parse_timestamp(&text).map_err(|_| StorageError::InvalidTimestamp(text)))
        .transpose()?;
    let owner_id = owner_id
        .map(|id| u64::try_from(id).map_err(|_| StorageError::InvalidOwner(id)))
        .transpose()?;

    Ok(CacheEntry {
        key,
        value,
        expires_at,
        owner_id,
    })
}

impl StorageGateway for SqliteGateway {
    fn find_by_key(&self, key: &str) -> StorageResult<Option<CacheEntry>> {
        let sql = format!(
            r#"SELECT cache_key, cache_value, expires_at, owner_id FROM "{}" WHERE cache_key = ?1"#,
            self.table
        );

        let raw: Option<RawRow> = self
            .conn()
            .query_row(&sql, params![key], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })
            .optional()?;

        raw.map(row_to_entry).transpose()
    }

    fn insert(&self, entry: &CacheEntry) -> StorageResult<bool> {
        let sql = format!(
            r#"
            INSERT INTO "{}" (cache_key, cache_value, expires_at, owner_id)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            self.table
        );

        let changed = self.conn().execute(
            &sql,
            params![
                &entry.key,
                entry.value.as_deref(),
                entry.expires_at.map(format_timestamp),
                owner_to_sql(entry.owner_id)?,
            ],
        )?;

        Ok(changed > 0)
    }

    fn update_by_key(&self, key: &str, fields: EntryUpdate<'_>) -> StorageResult<bool> {
        let sql = format!(
            r#"
            UPDATE "{}" SET cache_value = ?2, expires_at = ?3, owner_id = ?4
            WHERE cache_key = ?1
            "#,
            self.table
        );

        let changed = self.conn().execute(
            &sql,
            params![
                key,
                fields.value,
                fields.expires_at.map(format_timestamp),
                owner_to_sql(fields.owner_id)?,
            ],
        )?;

        Ok(changed > 0)
    }

    fn upsert(&self, entry: &CacheEntry) -> StorageResult<bool> {
        let sql = format!(
            r#"
            INSERT INTO "{}" (cache_key, cache_value, expires_at, owner_id)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(cache_key) DO UPDATE SET
                cache_value = excluded.cache_value,
                expires_at = excluded.expires_at,
                owner_id = excluded.owner_id
            "#,
            self.table
        );

        let changed = self.conn().execute(
            &sql,
            params![
                &entry.key,
                entry.value.as_deref(),
                entry.expires_at.map(format_timestamp),
                owner_to_sql(entry.owner_id)?,
            ],
        )?;

        Ok(changed > 0)
    }

    fn delete_where(&self, predicate: Predicate<'_>) -> StorageResult<usize> {
        let conn = self.conn();
        let removed = match predicate {
            Predicate::Key(key) => conn.execute(
                &format!(r#"DELETE FROM "{}" WHERE cache_key = ?1"#, self.table),
                params![key],
            )?,
            Predicate::Owner(owner) => conn.execute(
                &format!(r#"DELETE FROM "{}" WHERE owner_id = ?1"#, self.table),
                params![owner_to_sql(Some(owner))?],
            )?,
            // Stored timestamps sort lexically in chronological order.
            Predicate::ExpiredAt(cutoff) => conn.execute(
                &format!(
                    r#"DELETE FROM "{}" WHERE expires_at IS NOT NULL AND expires_at <= ?1"#,
                    self.table
                ),
                params![format_timestamp(cutoff)],
            )?,
        };

        Ok(removed)
    }

    fn truncate(&self) -> StorageResult<()> {
        // No WHERE clause lets SQLite use its truncate optimization.
        self.conn()
            .execute(&format!(r#"DELETE FROM "{}""#, self.table), [])?;
        Ok(())
    }

    fn table_exists(&self) -> StorageResult<bool> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![&self.table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn create_table(&self) -> StorageResult<()> {
        tracing::info!(table = %self.table, "Creating cache table");

        self.conn().execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS "{table}" (
                cache_key TEXT NOT NULL,
                cache_value TEXT,
                expires_at TEXT,
                owner_id INTEGER
            );

            CREATE UNIQUE INDEX IF NOT EXISTS "{table}_key_unique" ON "{table}" (cache_key);
            CREATE INDEX IF NOT EXISTS "{table}_owner" ON "{table}" (owner_id);
            CREATE INDEX IF NOT EXISTS "{table}_expires" ON "{table}" (expires_at);
            "#,
            table = self.table
        ))?;

        Ok(())
    }
}
