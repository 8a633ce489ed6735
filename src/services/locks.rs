use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::error::StoreError;
use crate::models::InventoryKey;

type Slots = Arc<Mutex<HashMap<InventoryKey, Arc<AsyncMutex<()>>>>>;

/// One async mutex per inventory key, created on demand.
///
/// A slot is dropped from the table once its last holder releases it and
/// nobody is queued behind, so the table only holds keys that are busy.
#[derive(Debug, Default, Clone)]
pub struct KeyedLocks {
    slots: Slots,
}

/// Exclusive access to one key until dropped.
#[derive(Debug)]
pub struct KeyGuard {
    key: InventoryKey,
    slots: Slots,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits at most `wait` for the key. The elapsed case is reported as a
    /// retryable store timeout.
    pub async fn acquire(&self, key: &InventoryKey, wait: Duration) -> Result<KeyGuard, StoreError> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(key.clone()).or_default().clone()
        };

        match tokio::time::timeout(wait, slot.lock_owned()).await {
            Ok(guard) => Ok(KeyGuard {
                key: key.clone(),
                slots: self.slots.clone(),
                guard: Some(guard),
            }),
            Err(_) => {
                // our clone of the slot was moved into the dropped future
                self.release_if_idle(key);
                Err(StoreError::Timeout {
                    operation: "inventory lock",
                    after: wait,
                })
            }
        }
    }

    /// Number of keys currently held or waited on.
    pub fn active_keys(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn release_if_idle(&self, key: &InventoryKey) {
        remove_idle(&self.slots, key);
    }
}

fn remove_idle(slots: &Slots, key: &InventoryKey) {
    let mut slots = slots.lock().unwrap_or_else(PoisonError::into_inner);
    let idle = slots
        .get(key)
        .map(|slot| Arc::strong_count(slot) == 1)
        .unwrap_or(false);
    if idle {
        slots.remove(key);
    }
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        // Release the mutex (and the Arc it holds) before checking for waiters.
        drop(self.guard.take());
        remove_idle(&self.slots, &self.key);
    }
}
