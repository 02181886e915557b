//! Expiry Sweep Task
//!
//! Background task that periodically deletes rows whose deadline has passed.
//! Reads already treat such rows as misses; the sweep only reclaims the space
//! of rows that are never read again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheStore, Clock};
use crate::storage::StorageGateway;

/// Spawns a background task that periodically purges expired cache rows.
///
/// Storage calls block, so each pass runs on tokio's blocking pool.
///
/// # Arguments
/// * `cache` - shared cache store
/// * `interval_secs` - seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(CacheStore::new(SqliteGateway::open("cache.db", "cache_entries", true)?));
/// let sweep_handle = spawn_sweep_task(cache.clone(), 60);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<G, C>(cache: Arc<CacheStore<G, C>>, interval_secs: u64) -> JoinHandle<()>
where
    G: StorageGateway + 'static,
    C: Clock + 'static,
{
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!("Starting expiry sweep task with interval of {} seconds", interval.as_secs());

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            let cache = Arc::clone(&cache);
            let removed = match tokio::task::spawn_blocking(move || cache.purge_expired()).await {
                Ok(removed) => removed,
                Err(e) => {
                    warn!("Expiry sweep pass failed: {}", e);
                    continue;
                }
            };

            // Log sweep statistics
            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ManualClock, Ttl};
    use crate::storage::MemoryGateway;
    use chrono::{FixedOffset, TimeZone};

    fn new_cache() -> (Arc<CacheStore<MemoryGateway, ManualClock>>, ManualClock) {
        let start = FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .unwrap();
        let clock = ManualClock::new(start);
        let cache = Arc::new(CacheStore::with_clock(MemoryGateway::new(), clock.clone()));
        (cache, clock)
    }

    #[tokio::test]
    async fn test_sweep_task_removes_expired_entries() {
        let (cache, clock) = new_cache();
        cache.save("expire_soon", "value", Ttl::Minutes(1), None).unwrap();
        clock.advance(chrono::Duration::minutes(2));

        let handle = spawn_sweep_task(cache.clone(), 1);

        // Wait for at least one sweep to run
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(cache.gateway().is_empty(), "Expired entry should have been swept");
        assert_eq!(cache.stats().expirations, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_preserves_valid_entries() {
        let (cache, _) = new_cache();
        cache.save("long_lived", "value", Ttl::Minutes(60), None).unwrap();
        cache.save("forever", "value", Ttl::Never, None).unwrap();

        let handle = spawn_sweep_task(cache.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.gateway().len(), 2, "Valid entries should not be removed");
        assert_eq!(
            cache.get::<String>("long_lived", None).unwrap(),
            Some("value".to_string())
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let (cache, _) = new_cache();

        let handle = spawn_sweep_task(cache, 1);

        // Abort immediately
        handle.abort();

        // Wait a bit and verify task is finished
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
