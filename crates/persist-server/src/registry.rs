//! Connection registry: the map of live connections, their last-activity
//! timestamps, and the handles the reaper / shutdown path use to close
//! them. See SPEC_FULL.md §5 "Shared resources".

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use uuid::Uuid;

struct Entry {
    last_activity: Instant,
    abort: AbortHandle,
}

pub struct ConnectionRegistry {
    inner: Mutex<HashMap<Uuid, Entry>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub async fn register(&self, id: Uuid, abort: AbortHandle) {
        self.inner.lock().await.insert(
            id,
            Entry {
                last_activity: Instant::now(),
                abort,
            },
        );
    }

    pub async fn touch(&self, id: Uuid) {
        if let Some(entry) = self.inner.lock().await.get_mut(&id) {
            entry.last_activity = Instant::now();
        }
    }

    pub async fn remove(&self, id: Uuid) {
        self.inner.lock().await.remove(&id);
    }

    /// Aborts and removes every connection whose last activity is older
    /// than `max_idle`. Returns how many were reaped.
    pub async fn reap_stale(&self, max_idle: Duration) -> usize {
        let mut guard = self.inner.lock().await;
        let now = Instant::now();
        let stale: Vec<Uuid> = guard
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.last_activity) > max_idle)
            .map(|(id, _)| *id)
            .collect();

        for id in &stale {
            if let Some(entry) = guard.remove(id) {
                entry.abort.abort();
            }
        }
        stale.len()
    }

    /// Aborts and removes every known connection. Used during shutdown.
    pub async fn abort_all(&self) -> usize {
        let mut guard = self.inner.lock().await;
        let count = guard.len();
        for (_, entry) in guard.drain() {
            entry.abort.abort();
        }
        count
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_abort_handle() -> AbortHandle {
        tokio::spawn(std::future::pending::<()>()).abort_handle()
    }

    #[tokio::test]
    async fn reaps_only_connections_past_max_idle() {
        let registry = ConnectionRegistry::new();
        let fresh = Uuid::new_v4();
        let stale = Uuid::new_v4();

        registry.register(stale, dummy_abort_handle()).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        registry.register(fresh, dummy_abort_handle()).await;

        let reaped = registry.reap_stale(Duration::from_millis(15)).await;
        assert_eq!(reaped, 1);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn touch_resets_idle_clock() {
        let registry = ConnectionRegistry::new();
        let id = Uuid::new_v4();
        registry.register(id, dummy_abort_handle()).await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        registry.touch(id).await;

        let reaped = registry.reap_stale(Duration::from_millis(15)).await;
        assert_eq!(reaped, 0);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn abort_all_clears_the_registry() {
        let registry = ConnectionRegistry::new();
        registry.register(Uuid::new_v4(), dummy_abort_handle()).await;
        registry.register(Uuid::new_v4(), dummy_abort_handle()).await;

        let aborted = registry.abort_all().await;
        assert_eq!(aborted, 2);
        assert_eq!(registry.len().await, 0);
    }
}
