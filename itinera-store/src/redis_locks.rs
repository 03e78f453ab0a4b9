use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use tracing::debug;

use itinera_core::{BookingError, BookingResult, LockEntry, SeatLockTable};

const KEY_PREFIX: &str = "seatlock:";

/// Networked seat-lock table over Redis. Acquisition is `SET NX EX`, so
/// the compare-and-set is atomic on the server; the TTL is a crash
/// safety net only, the booking protocol always releases explicitly.
#[derive(Clone)]
pub struct RedisSeatLockTable {
    client: redis::Client,
    ttl_seconds: u64,
}

impl RedisSeatLockTable {
    pub fn new(connection_string: &str, ttl_seconds: u64) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client, ttl_seconds })
    }

    async fn connection(&self) -> BookingResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(BookingError::downstream)
    }

    fn storage_key(key: &str) -> String {
        format!("{KEY_PREFIX}{key}")
    }
}

#[async_trait]
impl SeatLockTable for RedisSeatLockTable {
    async fn try_lock(&self, key: &str) -> BookingResult<bool> {
        let mut conn = self.connection().await?;

        // SET NX: only set if the key does not exist yet.
        let outcome: Option<String> = redis::cmd("SET")
            .arg(Self::storage_key(key))
            .arg(Utc::now().to_rfc3339())
            .arg("NX")
            .arg("EX")
            .arg(self.ttl_seconds)
            .query_async(&mut conn)
            .await
            .map_err(BookingError::downstream)?;

        let acquired = outcome.is_some();
        debug!(key, acquired, "seat lock attempt");
        Ok(acquired)
    }

    async fn is_locked(&self, key: &str) -> BookingResult<bool> {
        let mut conn = self.connection().await?;
        conn.exists(Self::storage_key(key))
            .await
            .map_err(BookingError::downstream)
    }

    async fn unlock(&self, key: &str) -> BookingResult<()> {
        let mut conn = self.connection().await?;
        let _: () = conn
            .del(Self::storage_key(key))
            .await
            .map_err(BookingError::downstream)?;
        Ok(())
    }

    async fn list_locked(&self) -> BookingResult<HashMap<String, LockEntry>> {
        let mut conn = self.connection().await?;
        let storage_keys: Vec<String> = conn
            .keys(format!("{KEY_PREFIX}*"))
            .await
            .map_err(BookingError::downstream)?;

        let mut held = HashMap::with_capacity(storage_keys.len());
        for storage_key in storage_keys {
            let value: Option<String> = conn
                .get(&storage_key)
                .await
                .map_err(BookingError::downstream)?;
            // A lock can expire between KEYS and GET; skip it.
            let Some(value) = value else { continue };

            let locked_at = DateTime::parse_from_rfc3339(&value)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now());
            let key = storage_key
                .strip_prefix(KEY_PREFIX)
                .unwrap_or(&storage_key)
                .to_string();
            held.insert(key, LockEntry { locked_at });
        }
        Ok(held)
    }

    async fn clear_all(&self) -> BookingResult<()> {
        let mut conn = self.connection().await?;
        let storage_keys: Vec<String> = conn
            .keys(format!("{KEY_PREFIX}*"))
            .await
            .map_err(BookingError::downstream)?;

        if !storage_keys.is_empty() {
            let _: () = conn
                .del(storage_keys)
                .await
                .map_err(BookingError::downstream)?;
        }
        Ok(())
    }
}
