//! Table Cache - A persisted key-value cache backed by a relational table
//!
//! Provides get-or-compute style caching of JSON-serializable values with
//! per-entry expiry, optional owner tagging and lazy eviction on read.

pub mod cache;
pub mod config;
pub mod error;
pub mod storage;
pub mod tasks;

pub use cache::{CacheStore, Clock, ManualClock, SystemClock, Ttl};
pub use config::Config;
pub use error::{CacheError, Result};
pub use storage::{MemoryGateway, SqliteGateway, StorageGateway};
pub use tasks::spawn_sweep_task;
