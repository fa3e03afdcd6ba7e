//! Application-wide shared state and context creation.

use crate::config::BrokerConfig;
use crate::context::Context;
use crate::error::Result;
use crate::managers::{ChatTokenManager, CrmTokenManager};
use crate::providers::{HttpTokenExchanger, KeyValueStore, TokenExchanger};
use crate::stores::RedisKeyValueStore;
use crate::token_store::TokenStore;
use crate::urls::UrlBuilder;
use std::sync::Arc;
use token_broker_core::environment::{Clock, SystemClock};

/// Long-lived pieces shared by every request.
///
/// Holds no per-user state. Each inbound request gets its own [`Context`]
/// from [`App::create_context`].
///
/// # Type Parameters
///
/// - `S`: key-value store
/// - `X`: CRM token exchanger
/// - `C`: clock
pub struct App<S, X, C> {
    config: Arc<BrokerConfig>,
    store: TokenStore<S>,
    exchanger: Arc<X>,
    clock: Arc<C>,
    http: reqwest::Client,
}

impl<S, X, C> Clone for App<S, X, C> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            store: self.store.clone(),
            exchanger: Arc::clone(&self.exchanger),
            clock: Arc::clone(&self.clock),
            http: self.http.clone(),
        }
    }
}

impl App<RedisKeyValueStore, HttpTokenExchanger, SystemClock> {
    /// Build the production application: Redis store, HTTP token exchange,
    /// system clock.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::StoreUnavailable`](crate::error::BrokerError::StoreUnavailable)
    /// if Redis cannot be reached.
    pub async fn connect(config: BrokerConfig) -> Result<Self> {
        let kv = RedisKeyValueStore::new(&config.redis_url).await?;
        let http = reqwest::Client::new();
        let exchanger = HttpTokenExchanger::new(config.crm.clone()).with_http_client(http.clone());

        tracing::info!(
            base_url = %config.base_url,
            timeout_secs = config.timeout.as_secs(),
            "Token broker ready"
        );

        Ok(Self::new(config, kv, exchanger, SystemClock).with_http_client(http))
    }
}

impl<S, X, C> App<S, X, C>
where
    S: KeyValueStore,
    X: TokenExchanger,
    C: Clock,
{
    /// Assemble an application from its parts.
    #[must_use]
    pub fn new(config: BrokerConfig, kv: S, exchanger: X, clock: C) -> Self {
        Self {
            config: Arc::new(config),
            store: TokenStore::new(kv),
            exchanger: Arc::new(exchanger),
            clock: Arc::new(clock),
            http: reqwest::Client::new(),
        }
    }

    /// Use a specific HTTP client for outbound CRM calls.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Application configuration.
    #[must_use]
    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    /// Shared token store.
    #[must_use]
    pub const fn store(&self) -> &TokenStore<S> {
        &self.store
    }

    /// Create a context for one inbound request.
    ///
    /// The context starts without a user and with the configured timeout.
    /// Nothing is read from the store until an operation needs it.
    #[must_use]
    pub fn create_context(&self) -> Context<S, X, C> {
        let crm = CrmTokenManager::new(
            self.store.clone(),
            Arc::clone(&self.exchanger),
            Arc::clone(&self.clock),
            self.config.timeout,
        );

        Context::new(
            UrlBuilder::new(self.config.base_url.clone()),
            ChatTokenManager::new(self.store.clone()),
            crm,
            self.http.clone(),
        )
    }
}
