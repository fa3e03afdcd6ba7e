//! Per-user, per-provider token storage.
//!
//! Wraps a [`KeyValueStore`] with keying, JSON serialization and the
//! identity rule: nothing is ever written under an anonymous key.
//!
//! # Architecture
//!
//! - **Key**: `oauth_token:{user_id}:{provider}`
//! - **Value**: JSON-serialized record (RFC 3339 timestamps, nanosecond precision)

use crate::error::{BrokerError, Result};
use crate::providers::KeyValueStore;
use crate::state::{Provider, UserId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Token store over a shared key-value transport.
///
/// Cheap to clone; clones share the same transport.
#[derive(Debug)]
pub struct TokenStore<S> {
    kv: Arc<S>,
}

impl<S> Clone for TokenStore<S> {
    fn clone(&self) -> Self {
        Self {
            kv: Arc::clone(&self.kv),
        }
    }
}

impl<S: KeyValueStore> TokenStore<S> {
    /// Create a token store over `kv`.
    #[must_use]
    pub fn new(kv: S) -> Self {
        Self { kv: Arc::new(kv) }
    }

    /// Access the underlying transport.
    #[must_use]
    pub fn backend(&self) -> &S {
        &self.kv
    }

    /// Get the storage key for a user and provider.
    #[must_use]
    pub fn token_key(user_id: &UserId, provider: Provider) -> String {
        format!("oauth_token:{}:{}", user_id.as_str(), provider.as_str())
    }

    /// Store a record for `user_id` and `provider`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// - [`BrokerError::Unauthenticated`] if `user_id` is `None`
    /// - [`BrokerError::SerializationError`] if the record cannot be encoded
    /// - [`BrokerError::StoreUnavailable`] if the transport fails
    pub async fn put<T>(&self, user_id: Option<&UserId>, provider: Provider, record: &T) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let Some(user_id) = user_id else {
            tracing::warn!(provider = %provider, "Refused to store token without a user");
            return Err(BrokerError::Unauthenticated);
        };

        let value = serde_json::to_string(record)
            .map_err(|e| BrokerError::SerializationError(e.to_string()))?;

        self.kv.set(&Self::token_key(user_id, provider), value).await?;

        tracing::info!(user_id = %user_id, provider = %provider, "Stored OAuth token");

        Ok(())
    }

    /// Get the record stored for `user_id` and `provider`.
    ///
    /// # Returns
    ///
    /// - `Some(record)` if found
    /// - `None` if nothing is stored, or `user_id` is `None` (the store is not touched)
    ///
    /// # Errors
    ///
    /// - [`BrokerError::SerializationError`] if the stored value is corrupt
    /// - [`BrokerError::StoreUnavailable`] if the transport fails
    pub async fn get<T>(&self, user_id: Option<&UserId>, provider: Provider) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let Some(user_id) = user_id else {
            return Ok(None);
        };

        match self.kv.get(&Self::token_key(user_id, provider)).await? {
            Some(value) => serde_json::from_str(&value)
                .map(Some)
                .map_err(|e| BrokerError::SerializationError(e.to_string())),
            None => {
                tracing::debug!(user_id = %user_id, provider = %provider, "No OAuth token stored");
                Ok(None)
            }
        }
    }

    /// Delete the record for `user_id` and `provider`.
    ///
    /// # Errors
    ///
    /// - [`BrokerError::Unauthenticated`] if `user_id` is `None`
    /// - [`BrokerError::StoreUnavailable`] if the transport fails
    pub async fn delete(&self, user_id: Option<&UserId>, provider: Provider) -> Result<()> {
        let Some(user_id) = user_id else {
            return Err(BrokerError::Unauthenticated);
        };

        self.kv.delete(&Self::token_key(user_id, provider)).await?;

        tracing::info!(user_id = %user_id, provider = %provider, "Deleted OAuth token");

        Ok(())
    }
}
