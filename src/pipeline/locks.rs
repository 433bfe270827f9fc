use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Per-user mutual exclusion for pipeline runs
///
/// Locks are created on first use and kept for the life of the registry,
/// so memory grows with the number of distinct users seen.
#[derive(Clone, Default)]
pub struct UserLockRegistry {
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl UserLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for `user_id`, created if this is the first sighting.
    ///
    /// Creation happens under the registry lock, so two first-use callers
    /// always get the same `Arc`.
    pub async fn lock_for(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(user_id.to_string())
            .or_insert_with(|| {
                debug!("Creating message lock for new user");
                Arc::new(Mutex::new(()))
            })
            .clone()
    }

    /// Wait until no other run holds `user_id`, then hold it until the
    /// guard is dropped.
    pub async fn acquire(&self, user_id: &str) -> OwnedMutexGuard<()> {
        self.lock_for(user_id).await.lock_owned().await
    }

    /// Number of users with a lock entry
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
