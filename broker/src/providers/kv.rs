//! Key-value transport trait.

use crate::error::Result;

/// Shared key-value store holding serialized token records.
///
/// A missing key is a normal outcome (`Ok(None)`), distinct from a transport
/// failure, which implementations report as
/// [`BrokerError::StoreUnavailable`](crate::error::BrokerError::StoreUnavailable).
///
/// # Concurrency
///
/// Callers do not lock around `get`/`set`. Two requests for the same key may
/// interleave and the last `set` wins; implementations only need each single
/// operation to be atomic.
///
/// # Implementation Notes
///
/// **Production**:
/// - `Redis`: plain `GET`/`SET`/`DEL`, no TTL
///
/// **Testing**:
/// - In-memory map (see `mocks::MockKeyValueStore`)
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Some(value)` if found
    /// - `None` if the key does not exist
    ///
    /// # Errors
    ///
    /// Returns error if the transport fails.
    fn get(&self, key: &str) -> impl std::future::Future<Output = Result<Option<String>>> + Send;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns error if the transport fails.
    fn set(&self, key: &str, value: String)
    -> impl std::future::Future<Output = Result<()>> + Send;

    /// Remove `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns error if the transport fails.
    fn delete(&self, key: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}
