//! Background Tasks Module
//!
//! Maintenance work that runs alongside the cache without being part of its
//! read/write contract.
//!
//! # Tasks
//! - Expiry sweep: removes rows past their deadline at a fixed interval

mod sweep;

pub use sweep::spawn_sweep_task;
