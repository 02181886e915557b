//! Configuration Module
//!
//! Handles loading cache and sweeper configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::FixedOffset;

use crate::cache::{SystemClock, DEFAULT_UTC_OFFSET_SECS};
use crate::storage::DEFAULT_TABLE;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database file
    pub database_path: PathBuf,
    /// Name of the cache table
    pub table_name: String,
    /// Offset of the cache's time zone from UTC, in minutes
    pub utc_offset_minutes: i32,
    /// Interval in seconds between expiry sweeps
    pub sweep_interval: u64,
    /// Enable WAL journal mode
    pub wal_mode: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DATABASE_PATH` - SQLite database file (default: cache.db)
    /// - `CACHE_TABLE` - Cache table name (default: cache_entries)
    /// - `CACHE_UTC_OFFSET_MINUTES` - Time zone offset in minutes (default: 180)
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `CACHE_WAL_MODE` - Use WAL journal mode (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_path: env::var("CACHE_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            table_name: env::var("CACHE_TABLE").unwrap_or(defaults.table_name),
            utc_offset_minutes: env_or("CACHE_UTC_OFFSET_MINUTES", defaults.utc_offset_minutes),
            sweep_interval: env_or("SWEEP_INTERVAL", defaults.sweep_interval),
            wal_mode: env_or("CACHE_WAL_MODE", defaults.wal_mode),
        }
    }

    /// Returns the configured time zone, or the default when out of range.
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| SystemClock::default().offset())
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("cache.db"),
            table_name: DEFAULT_TABLE.to_string(),
            utc_offset_minutes: DEFAULT_UTC_OFFSET_SECS / 60,
            sweep_interval: 60,
            wal_mode: true,
        }
    }
}
