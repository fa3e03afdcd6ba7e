//! Per-provider token managers.
//!
//! Both providers expose the same capability, [`TokenManager`], over
//! different token shapes:
//!
//! - [`ChatTokenManager`]: an opaque string with no expiry
//! - [`CrmTokenManager`]: a [`TokenRecord`](crate::state::TokenRecord) that
//!   is refreshed when a client is requested for a stale record

use crate::error::Result;
use crate::state::{Provider, UserId};

pub mod chat;
pub mod crm;

pub use chat::ChatTokenManager;
pub use crm::{CrmTokenManager, merge_refreshed};

/// Token read/write capability shared by every provider.
///
/// Reads never refresh and never fail for a missing record or a missing
/// user: both come back as `Ok(None)`. Writes without a user fail with
/// [`BrokerError::Unauthenticated`](crate::error::BrokerError::Unauthenticated).
pub trait TokenManager: Send + Sync {
    /// Token shape stored for this provider.
    type Token: Send + Sync;

    /// Provider this manager is responsible for.
    fn provider(&self) -> Provider;

    /// Store `token` for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns error if `user_id` is `None` or the store fails.
    fn set_token(
        &self,
        user_id: Option<&UserId>,
        token: Self::Token,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Read the stored token for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns error only if the store fails or holds a corrupt value.
    fn token_for_user(
        &self,
        user_id: Option<&UserId>,
    ) -> impl std::future::Future<Output = Result<Option<Self::Token>>> + Send;

    /// Remove the stored token for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns error if `user_id` is `None` or the store fails.
    fn delete_token(
        &self,
        user_id: Option<&UserId>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
