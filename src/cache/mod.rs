//! Cache Module
//!
//! Provides the table-backed cache: key sanitization, value encoding,
//! expiry computation and the store operations built on top of them.

mod clock;
pub mod codec;
mod entry;
pub mod expiry;
pub mod key;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock, DEFAULT_UTC_OFFSET_SECS};
pub use entry::{CacheEntry, EntryUpdate};
pub use expiry::{Ttl, TIMESTAMP_FORMAT};
pub use stats::CacheStats;
pub use store::CacheStore;
