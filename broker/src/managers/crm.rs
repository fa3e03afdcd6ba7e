//! Refreshable-token manager for the CRM provider.
//!
//! # Lifecycle
//!
//! ```text
//!  Unset ──set_token──▶ Fresh ──expiry <= now──▶ Stale
//!                         ▲                        │
//!                         └──── refresh + put ◀────┘  (only via `client`)
//! ```
//!
//! Reading a token never refreshes it. Requesting a client does: a stale
//! record is exchanged at the provider's token endpoint, merged, written
//! back, and only then handed out.
//!
//! # Concurrency
//!
//! There is no lock around read → refresh → write. Two requests for the same
//! user may both refresh; the last write wins and each write is a complete
//! record. A lost write just means the next request refreshes again.

use crate::client::CrmClient;
use crate::error::{BrokerError, Result};
use crate::managers::TokenManager;
use crate::providers::{KeyValueStore, TokenExchanger, TokenResponse};
use crate::state::{Provider, TokenRecord, TokenState, UserId};
use crate::token_store::TokenStore;
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use token_broker_core::environment::Clock;

/// Manages the CRM provider's structured token per user.
#[derive(Debug)]
pub struct CrmTokenManager<S, X, C> {
    store: TokenStore<S>,
    exchanger: Arc<X>,
    clock: Arc<C>,
    timeout: Duration,
}

impl<S, X, C> Clone for CrmTokenManager<S, X, C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            exchanger: Arc::clone(&self.exchanger),
            clock: Arc::clone(&self.clock),
            timeout: self.timeout,
        }
    }
}

impl<S, X, C> CrmTokenManager<S, X, C>
where
    S: KeyValueStore,
    X: TokenExchanger,
    C: Clock,
{
    /// Create a manager.
    ///
    /// `timeout` bounds each token exchange and is also the lifetime given
    /// to a refreshed token whose response carried no expiry.
    #[must_use]
    pub const fn new(
        store: TokenStore<S>,
        exchanger: Arc<X>,
        clock: Arc<C>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            exchanger,
            clock,
            timeout,
        }
    }

    /// Replace the exchange timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Current exchange timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Lifecycle state of the stored record at the current time.
    ///
    /// # Errors
    ///
    /// Returns error if the store fails or holds a corrupt value.
    pub async fn state(&self, user_id: Option<&UserId>) -> Result<TokenState> {
        let current: Option<TokenRecord> = self.store.get(user_id, Provider::Crm).await?;
        Ok(TokenState::of(current.as_ref(), self.clock.now()))
    }

    /// Build a client for `user_id`, refreshing a stale token first.
    ///
    /// With no stored record (or no user) the client carries no credentials.
    ///
    /// # Errors
    ///
    /// - [`BrokerError::RefreshFailed`] / [`BrokerError::RefreshTimedOut`] if
    ///   the exchange fails; the stored record is left as it was
    /// - [`BrokerError::StoreUnavailable`] if the store fails
    pub async fn client(&self, user_id: Option<&UserId>, http: reqwest::Client) -> Result<CrmClient> {
        let token = self.usable_token(user_id).await?;
        Ok(CrmClient::new(http, token))
    }

    /// Read the record and refresh it if it is stale.
    ///
    /// # Errors
    ///
    /// Same as [`CrmTokenManager::client`].
    pub async fn usable_token(&self, user_id: Option<&UserId>) -> Result<Option<TokenRecord>> {
        let Some(user_id) = user_id else {
            return Ok(None);
        };

        let current: Option<TokenRecord> = self.store.get(Some(user_id), Provider::Crm).await?;
        let state = TokenState::of(current.as_ref(), self.clock.now());

        match (state, current) {
            (TokenState::Stale, Some(previous)) => self.refresh(user_id, previous).await.map(Some),
            (state, current) => {
                tracing::debug!(user_id = %user_id, state = state.as_str(), "Using stored CRM token");
                Ok(current)
            }
        }
    }

    async fn refresh(&self, user_id: &UserId, previous: TokenRecord) -> Result<TokenRecord> {
        if previous.refresh_token.is_empty() {
            tracing::error!(user_id = %user_id, "Stale CRM token has no refresh token");
            return Err(BrokerError::RefreshFailed(
                "No refresh token stored".to_string(),
            ));
        }

        tracing::info!(
            user_id = %user_id,
            provider = %Provider::Crm,
            state = TokenState::Stale.as_str(),
            "Refreshing OAuth token"
        );

        let exchange = self.exchanger.refresh(&previous.refresh_token, self.timeout);
        let response = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::error!(user_id = %user_id, provider = %Provider::Crm, "Token refresh failed: {e}");
                return Err(e);
            }
            Err(_) => {
                tracing::error!(
                    user_id = %user_id,
                    provider = %Provider::Crm,
                    timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    "Token refresh timed out"
                );
                return Err(BrokerError::RefreshTimedOut(self.timeout));
            }
        };

        let rotated = response.refresh_token.as_deref().is_some_and(|t| !t.is_empty());
        let merged = merge_refreshed(previous, response, self.clock.now(), self.timeout);
        self.store.put(Some(user_id), Provider::Crm, &merged).await?;

        tracing::info!(
            user_id = %user_id,
            provider = %Provider::Crm,
            refresh_token_rotated = rotated,
            "Refreshed OAuth token"
        );

        Ok(merged)
    }
}

/// Merge a refresh response into the previous record.
///
/// - Access token, type and expiry always come from the response.
/// - The refresh token is replaced only by a non-empty one.
/// - A response without an expiry gets `now + fallback_lifetime`, whole seconds,
///   and never at or before `now`.
#[must_use]
pub fn merge_refreshed(
    previous: TokenRecord,
    response: TokenResponse,
    now: DateTime<Utc>,
    fallback_lifetime: Duration,
) -> TokenRecord {
    let expiry = response.expiry.unwrap_or_else(|| {
        let expiry = TimeDelta::from_std(fallback_lifetime)
            .ok()
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
            .trunc_subsecs(0);
        if expiry > now {
            expiry
        } else {
            // Sub-second lifetimes still yield a record that is fresh right after the write.
            now.checked_add_signed(TimeDelta::seconds(1))
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
                .trunc_subsecs(0)
        }
    });

    TokenRecord {
        access_token: response.access_token,
        refresh_token: response
            .refresh_token
            .filter(|token| !token.is_empty())
            .unwrap_or(previous.refresh_token),
        token_type: response.token_type,
        expiry: Some(expiry),
    }
}

impl<S, X, C> TokenManager for CrmTokenManager<S, X, C>
where
    S: KeyValueStore,
    X: TokenExchanger,
    C: Clock,
{
    type Token = TokenRecord;

    fn provider(&self) -> Provider {
        Provider::Crm
    }

    async fn set_token(&self, user_id: Option<&UserId>, token: TokenRecord) -> Result<()> {
        self.store.put(user_id, self.provider(), &token).await
    }

    async fn token_for_user(&self, user_id: Option<&UserId>) -> Result<Option<TokenRecord>> {
        self.store.get(user_id, self.provider()).await
    }

    async fn delete_token(&self, user_id: Option<&UserId>) -> Result<()> {
        self.store.delete(user_id, self.provider()).await
    }
}
