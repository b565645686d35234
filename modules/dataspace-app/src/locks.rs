//! Per-key advisory locks around lookup-then-create sequences.
//!
//! Two activities for the same consignment serialise here, so the second one
//! sees whatever the first created. Only covers this process; uniqueness
//! across processes is the store's job.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One lock plus the number of callers holding or awaiting it.
struct Slot {
    mutex: Arc<AsyncMutex<()>>,
    users: usize,
}

type LockMap = Arc<Mutex<HashMap<String, Slot>>>;

#[derive(Clone, Default)]
pub struct KeyLocks {
    inner: LockMap,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`. Released when the guard drops.
    ///
    /// Cancel-safe: dropping the returned future while it waits releases
    /// the caller's claim on the key.
    pub async fn lock(&self, key: &str) -> KeyGuard {
        let mutex = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let slot = map.entry(key.to_string()).or_insert_with(|| Slot {
                mutex: Arc::new(AsyncMutex::new(())),
                users: 0,
            });
            slot.users += 1;
            slot.mutex.clone()
        };
        let registration = Registration {
            key: key.to_string(),
            map: self.inner.clone(),
        };
        let guard = mutex.lock_owned().await;
        KeyGuard {
            _guard: guard,
            _registration: registration,
        }
    }

    /// Number of keys currently held or awaited.
    pub fn active_keys(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Fields drop in order: the mutex is unlocked before the claim is released.
pub struct KeyGuard {
    _guard: OwnedMutexGuard<()>,
    _registration: Registration,
}

/// A caller's claim on a key, held from before the wait until the guard drops.
struct Registration {
    key: String,
    map: LockMap,
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = map.get_mut(&self.key) {
            slot.users -= 1;
            if slot.users == 0 {
                map.remove(&self.key);
            }
        }
    }
}
