//! Per-order lock registry.
//!
//! Serializes the load → plan → settle → save sequence for one order while
//! letting distinct orders proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::OwnedMutexGuard;

use crate::domain::shared::OrderId;

/// Registry of async mutexes keyed by order id.
///
/// Entries are held weakly, so a lock disappears once no caller holds or
/// waits on it.
#[derive(Debug, Default)]
pub struct OrderLocks {
    locks: Mutex<HashMap<OrderId, Weak<tokio::sync::Mutex<()>>>>,
}

impl OrderLocks {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `order_id`.
    pub async fn acquire(&self, order_id: &OrderId) -> OwnedMutexGuard<()> {
        self.lock_for(order_id).lock_owned().await
    }

    /// Number of orders with a live lock.
    #[must_use]
    pub fn active(&self) -> usize {
        let locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.values().filter(|lock| lock.strong_count() > 0).count()
    }

    /// Callers holding or queued on the lock for `order_id`.
    #[must_use]
    pub fn holders(&self, order_id: &OrderId) -> usize {
        let locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.get(order_id).map_or(0, Weak::strong_count)
    }

    fn lock_for(&self, order_id: &OrderId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(lock) = locks.get(order_id).and_then(Weak::upgrade) {
            return lock;
        }
        locks.retain(|_, lock| lock.strong_count() > 0);
        let lock = Arc::new(tokio::sync::Mutex::new(()));
        locks.insert(order_id.clone(), Arc::downgrade(&lock));
        lock
    }
}
