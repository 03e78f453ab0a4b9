use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::BookingResult;

/// Metadata kept per held lock, for the admin inspection view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockEntry {
    pub locked_at: DateTime<Utc>,
}

/// Mutual-exclusion table over seat-lock keys. The only structure in the
/// engine mutated by unsynchronized concurrent callers; `try_lock` must
/// be an atomic compare-and-set across all of them.
///
/// There is no TTL in this contract. Release is always explicit, so the
/// coordinator must unlock on every exit path.
#[async_trait]
pub trait SeatLockTable: Send + Sync {
    /// Atomically lock `key`. Returns true iff the key was unlocked.
    async fn try_lock(&self, key: &str) -> BookingResult<bool>;

    async fn is_locked(&self, key: &str) -> BookingResult<bool>;

    /// Idempotent: unlocking an unheld key is a no-op.
    async fn unlock(&self, key: &str) -> BookingResult<()>;

    /// Admin view of every held lock.
    async fn list_locked(&self) -> BookingResult<HashMap<String, LockEntry>>;

    /// Admin escape hatch: drop every lock.
    async fn clear_all(&self) -> BookingResult<()>;
}

/// Process-local lock table for tests and single-node deployments. A
/// networked implementation with expiry lives in the store crate.
pub struct InMemorySeatLockTable {
    entries: Mutex<HashMap<String, LockEntry>>,
}

impl InMemorySeatLockTable {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, LockEntry>> {
        // A poisoned mutex only means a panicking holder; the map itself
        // stays consistent, so keep serving.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemorySeatLockTable {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SeatLockTable for InMemorySeatLockTable {
    async fn try_lock(&self, key: &str) -> BookingResult<bool> {
        let mut entries = self.entries();
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), LockEntry { locked_at: Utc::now() });
        Ok(true)
    }

    async fn is_locked(&self, key: &str) -> BookingResult<bool> {
        Ok(self.entries().contains_key(key))
    }

    async fn unlock(&self, key: &str) -> BookingResult<()> {
        self.entries().remove(key);
        Ok(())
    }

    async fn list_locked(&self) -> BookingResult<HashMap<String, LockEntry>> {
        Ok(self.entries().clone())
    }

    async fn clear_all(&self) -> BookingResult<()> {
        self.entries().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn try_lock_succeeds_only_once() {
        let locks = InMemorySeatLockTable::new();

        assert!(locks.try_lock("v1:S1:100").await.unwrap());
        assert!(!locks.try_lock("v1:S1:100").await.unwrap());
        assert!(locks.is_locked("v1:S1:100").await.unwrap());
    }

    #[tokio::test]
    async fn unlock_is_idempotent() {
        let locks = InMemorySeatLockTable::new();

        locks.try_lock("v1:S1:100").await.unwrap();
        locks.unlock("v1:S1:100").await.unwrap();
        locks.unlock("v1:S1:100").await.unwrap();

        assert!(!locks.is_locked("v1:S1:100").await.unwrap());
        assert!(locks.try_lock("v1:S1:100").await.unwrap());
    }

    #[tokio::test]
    async fn independent_keys_do_not_contend() {
        let locks = InMemorySeatLockTable::new();

        assert!(locks.try_lock("v1:S1:100").await.unwrap());
        assert!(locks.try_lock("v1:S2:100").await.unwrap());

        let held = locks.list_locked().await.unwrap();
        assert_eq!(held.len(), 2);
        assert!(held.contains_key("v1:S1:100"));
    }

    #[tokio::test]
    async fn clear_all_drops_every_lock() {
        let locks = InMemorySeatLockTable::new();
        locks.try_lock("a").await.unwrap();
        locks.try_lock("b").await.unwrap();

        locks.clear_all().await.unwrap();

        assert!(locks.list_locked().await.unwrap().is_empty());
    }
}
