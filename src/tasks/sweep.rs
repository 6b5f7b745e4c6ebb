//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries, so
//! memory is reclaimed even for keys that are never read again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The task runs in an infinite loop, sleeping for `interval` between
/// sweeps. It holds the write lock only for the duration of one sweep.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(CacheStore::new(1000, Duration::from_secs(86_400))));
/// let sweep_handle = spawn_sweep_task(cache.clone(), Duration::from_secs(3600));
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<V>(cache: Arc<RwLock<CacheStore<V>>>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(
            "Starting cache sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let (removed, remaining) = {
                let mut cache_guard = cache.write().await;
                let removed = cache_guard.sweep();
                (removed, cache_guard.total_len())
            };

            if removed > 0 {
                info!(removed, remaining, "Cache sweep removed expired entries");
            } else {
                debug!(remaining, "Cache sweep found no expired entries");
            }
        }
    })
}
