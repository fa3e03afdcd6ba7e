//! Broker configuration.
//!
//! Values come from the application (or the environment via
//! [`BrokerConfig::from_env`]) and are never hardcoded at call sites.

use crate::error::{BrokerError, Result};
use std::time::Duration;

/// Default upper bound for an outbound token exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default Redis endpoint.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Default CRM token endpoint.
pub const DEFAULT_CRM_TOKEN_URL: &str = "https://login.salesforce.com/services/oauth2/token";

/// OAuth client credentials for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCredentials {
    /// OAuth client ID.
    pub client_id: String,

    /// OAuth client secret (keep confidential).
    pub client_secret: String,

    /// Token endpoint used for refresh exchanges.
    pub token_url: String,
}

impl ProviderCredentials {
    /// Create credentials for a provider token endpoint.
    #[must_use]
    pub const fn new(client_id: String, client_secret: String, token_url: String) -> Self {
        Self {
            client_id,
            client_secret,
            token_url,
        }
    }
}

/// Token broker configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    /// Externally visible base URL (e.g., "https://app.example.com").
    ///
    /// OAuth links are formatted as `{base_url}/oauth/{provider}/...`.
    pub base_url: String,

    /// Redis connection URL for the shared token store.
    pub redis_url: String,

    /// Upper bound for any outbound refresh call made during a request.
    ///
    /// Default: 30 seconds
    pub timeout: Duration,

    /// CRM client credentials.
    ///
    /// The chat provider's token never expires, so only the CRM needs them.
    pub crm: ProviderCredentials,
}

impl BrokerConfig {
    /// Create new configuration with defaults for everything but the base URL.
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// `BASE_URL` is required; everything else falls back to a default.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::ConfigurationError`] if `BASE_URL` is missing or
    /// `REFRESH_TIMEOUT_SECS` is not a positive whole number of seconds.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup("BASE_URL")
            .filter(|url| !url.is_empty())
            .ok_or_else(|| BrokerError::ConfigurationError("BASE_URL is required".to_string()))?;

        let timeout = match lookup("REFRESH_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) => {
                    return Err(BrokerError::ConfigurationError(
                        "REFRESH_TIMEOUT_SECS must be at least 1".to_string(),
                    ));
                }
                Ok(secs) => Duration::from_secs(secs),
                Err(e) => {
                    return Err(BrokerError::ConfigurationError(format!(
                        "Invalid REFRESH_TIMEOUT_SECS {raw:?}: {e}"
                    )));
                }
            },
            None => DEFAULT_TIMEOUT,
        };

        let crm = ProviderCredentials::new(
            lookup("CRM_CLIENT_ID").unwrap_or_default(),
            lookup("CRM_CLIENT_SECRET").unwrap_or_default(),
            lookup("CRM_TOKEN_URL").unwrap_or_else(|| DEFAULT_CRM_TOKEN_URL.to_string()),
        );

        Ok(Self {
            base_url,
            redis_url: lookup("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            timeout,
            crm,
        })
    }

    /// Set Redis URL.
    #[must_use]
    pub fn with_redis_url(mut self, redis_url: String) -> Self {
        self.redis_url = redis_url;
        self
    }

    /// Set the refresh timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set CRM credentials.
    #[must_use]
    pub fn with_crm(mut self, crm: ProviderCredentials) -> Self {
        self.crm = crm;
        self
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            crm: ProviderCredentials::new(
                String::new(),
                String::new(),
                DEFAULT_CRM_TOKEN_URL.to_string(),
            ),
        }
    }
}
