//! Per-request façade over URLs and token managers.
//!
//! A [`Context`] binds one user identity and one timeout for the lifetime of
//! a request. It caches nothing: every token read goes back to the store.

use crate::client::CrmClient;
use crate::error::Result;
use crate::managers::{ChatTokenManager, CrmTokenManager, TokenManager};
use crate::providers::{KeyValueStore, TokenExchanger};
use crate::state::{Provider, TokenRecord, UserId};
use crate::urls::UrlBuilder;
use std::time::Duration;
use token_broker_core::environment::Clock;

/// Request-scoped broker façade.
///
/// Created by [`App::create_context`](crate::app::App::create_context).
pub struct Context<S, X, C> {
    user_id: Option<UserId>,
    urls: UrlBuilder,
    chat: ChatTokenManager<S>,
    crm: CrmTokenManager<S, X, C>,
    http: reqwest::Client,
}

impl<S, X, C> Context<S, X, C>
where
    S: KeyValueStore,
    X: TokenExchanger,
    C: Clock,
{
    pub(crate) const fn new(
        urls: UrlBuilder,
        chat: ChatTokenManager<S>,
        crm: CrmTokenManager<S, X, C>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            user_id: None,
            urls,
            chat,
            crm,
            http,
        }
    }

    /// Bind the acting user.
    #[must_use]
    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Override the refresh timeout for this request.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.crm = self.crm.with_timeout(timeout);
        self
    }

    /// Replace (or clear) the acting user.
    pub fn set_user(&mut self, user_id: Option<UserId>) {
        self.user_id = user_id;
    }

    /// The acting user, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Upper bound for outbound refresh calls.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.crm.timeout()
    }

    // ═══════════════════════════════════════════════════════════
    // URLs
    // ═══════════════════════════════════════════════════════════

    /// `{base_url}/oauth/crm/callback`
    #[must_use]
    pub fn crm_callback_url(&self) -> String {
        self.urls.callback_url(Provider::Crm)
    }

    /// `{base_url}/oauth/crm/authenticate/{segments...}`
    #[must_use]
    pub fn crm_authenticate_url<T: AsRef<str>>(&self, segments: &[T]) -> String {
        self.urls.authenticate_url(Provider::Crm, segments)
    }

    /// `{base_url}/oauth/chat/callback`
    #[must_use]
    pub fn chat_callback_url(&self) -> String {
        self.urls.callback_url(Provider::Chat)
    }

    /// `{base_url}/oauth/chat/authenticate/{segments...}`
    #[must_use]
    pub fn chat_authenticate_url<T: AsRef<str>>(&self, segments: &[T]) -> String {
        self.urls.authenticate_url(Provider::Chat, segments)
    }

    // ═══════════════════════════════════════════════════════════
    // CRM Tokens
    // ═══════════════════════════════════════════════════════════

    /// Store the CRM token for the acting user.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Unauthenticated`](crate::error::BrokerError::Unauthenticated)
    /// without a user, or a store error.
    pub async fn set_crm_token(&self, token: TokenRecord) -> Result<()> {
        self.crm.set_token(self.user_id(), token).await
    }

    /// Read the acting user's CRM token without refreshing it.
    ///
    /// # Errors
    ///
    /// Returns error only if the store fails.
    pub async fn crm_token_for_user(&self) -> Result<Option<TokenRecord>> {
        self.crm.token_for_user(self.user_id()).await
    }

    /// Client for CRM API calls, refreshing an expired token first.
    ///
    /// # Errors
    ///
    /// Returns a refresh or store error; see [`CrmTokenManager::client`].
    pub async fn crm_client(&self) -> Result<CrmClient> {
        self.crm.client(self.user_id(), self.http.clone()).await
    }

    /// Remove the acting user's CRM token.
    ///
    /// # Errors
    ///
    /// Returns error without a user, or if the store fails.
    pub async fn delete_crm_token(&self) -> Result<()> {
        self.crm.delete_token(self.user_id()).await
    }

    // ═══════════════════════════════════════════════════════════
    // Chat Tokens
    // ═══════════════════════════════════════════════════════════

    /// Store the chat token for the acting user.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Unauthenticated`](crate::error::BrokerError::Unauthenticated)
    /// without a user, or a store error.
    pub async fn set_chat_token(&self, token: impl Into<String>) -> Result<()> {
        self.chat.set_token(self.user_id(), token.into()).await
    }

    /// The acting user's chat token, or an empty string if none is stored.
    ///
    /// # Errors
    ///
    /// Returns error only if the store fails.
    pub async fn chat_token_for_user(&self) -> Result<String> {
        Ok(self.chat.token_for_user(self.user_id()).await?.unwrap_or_default())
    }

    /// Remove the acting user's chat token.
    ///
    /// # Errors
    ///
    /// Returns error without a user, or if the store fails.
    pub async fn delete_chat_token(&self) -> Result<()> {
        self.chat.delete_token(self.user_id()).await
    }
}

impl<S, X, C> std::fmt::Debug for Context<S, X, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("user_id", &self.user_id)
            .field("urls", &self.urls)
            .finish_non_exhaustive()
    }
}
