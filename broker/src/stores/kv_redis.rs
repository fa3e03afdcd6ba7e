//! Redis-based key-value store implementation.
//!
//! Records are stored as plain `SET` values without a TTL. A refreshable
//! record has to stay readable after its access token expires, because the
//! stored refresh token is what brings it back to a fresh state.
//!
//! # Example
//!
//! ```no_run
//! use token_broker::stores::RedisKeyValueStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RedisKeyValueStore::new("redis://127.0.0.1:6379").await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{BrokerError, Result};
use crate::providers::KeyValueStore;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

/// Redis key-value store.
///
/// Connection pooling via `ConnectionManager`; clones share the same
/// underlying multiplexed connection.
#[derive(Clone)]
pub struct RedisKeyValueStore {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,
}

impl RedisKeyValueStore {
    /// Connect to Redis.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::StoreUnavailable`] if the URL is invalid or the
    /// connection cannot be established.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            BrokerError::StoreUnavailable(format!("Failed to create Redis client: {e}"))
        })?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            BrokerError::StoreUnavailable(format!("Failed to create Redis connection manager: {e}"))
        })?;

        tracing::info!("Connected to Redis token store");

        Ok(Self { conn_manager })
    }
}

impl std::fmt::Debug for RedisKeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisKeyValueStore").finish_non_exhaustive()
    }
}

impl KeyValueStore for RedisKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn_manager.clone();

        conn.get(key).await.map_err(|e| {
            BrokerError::StoreUnavailable(format!("Failed to get {key} from Redis: {e}"))
        })
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let _: () = conn.set(key, value).await.map_err(|e| {
            BrokerError::StoreUnavailable(format!("Failed to set {key} in Redis: {e}"))
        })?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let _: () = conn.del(key).await.map_err(|e| {
            BrokerError::StoreUnavailable(format!("Failed to delete {key} from Redis: {e}"))
        })?;

        Ok(())
    }
}
