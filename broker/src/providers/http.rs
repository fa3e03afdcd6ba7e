//! OAuth 2.0 refresh-token exchange over HTTP.

use crate::config::ProviderCredentials;
use crate::error::{BrokerError, Result};
use crate::providers::{TokenExchanger, TokenResponse};
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use token_broker_core::environment::{Clock, SystemClock};

/// Token exchanger that talks to a provider's OAuth 2.0 token endpoint.
///
/// # Example
///
/// ```no_run
/// use token_broker::{HttpTokenExchanger, ProviderCredentials};
///
/// let crm = HttpTokenExchanger::new(ProviderCredentials::new(
///     "your-client-id".to_string(),
///     "your-client-secret".to_string(),
///     "https://login.salesforce.com/services/oauth2/token".to_string(),
/// ));
/// ```
#[derive(Clone)]
pub struct HttpTokenExchanger {
    /// Client ID, secret and token endpoint.
    credentials: ProviderCredentials,

    /// HTTP client for making requests.
    http_client: Client,

    /// Clock used to turn `expires_in` into an absolute expiry.
    clock: Arc<dyn Clock>,
}

impl HttpTokenExchanger {
    /// Create an exchanger for the given provider credentials.
    #[must_use]
    pub fn new(credentials: ProviderCredentials) -> Self {
        Self {
            credentials,
            http_client: Client::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Share an existing HTTP client (connection pool).
    #[must_use]
    pub fn with_http_client(mut self, http_client: Client) -> Self {
        self.http_client = http_client;
        self
    }

    /// Use a specific clock for `expires_in` conversion.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn map_send_error(error: &reqwest::Error, timeout: Duration) -> BrokerError {
        if error.is_timeout() {
            BrokerError::RefreshTimedOut(timeout)
        } else {
            BrokerError::RefreshFailed(error.to_string())
        }
    }
}

impl std::fmt::Debug for HttpTokenExchanger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTokenExchanger")
            .field("client_id", &self.credentials.client_id)
            .field("token_url", &self.credentials.token_url)
            .finish_non_exhaustive()
    }
}

impl TokenExchanger for HttpTokenExchanger {
    async fn refresh(&self, refresh_token: &str, timeout: Duration) -> Result<TokenResponse> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.credentials.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&params)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Self::map_send_error(&e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.describe())
                .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
            tracing::error!(
                status = status.as_u16(),
                token_url = %self.credentials.token_url,
                "Token refresh rejected: {}",
                reason
            );
            return Err(BrokerError::RefreshFailed(reason));
        }

        let raw: RawTokenResponse = response
            .json()
            .await
            .map_err(|e| BrokerError::RefreshFailed(format!("Malformed token response: {e}")))?;

        raw.into_response(self.clock.now())
    }
}

/// Token endpoint response.
///
/// Providers report lifetime either as `expires_in` (seconds) or as an
/// absolute `expiry`. A zero-valued `expiry` (at or before the Unix epoch)
/// means the field was left unset.
#[derive(Debug, Deserialize)]
struct RawTokenResponse {
    access_token: String,

    #[serde(default)]
    refresh_token: Option<String>,

    #[serde(default)]
    token_type: Option<String>,

    #[serde(default)]
    expires_in: Option<i64>,

    #[serde(default)]
    expiry: Option<DateTime<Utc>>,
}

impl RawTokenResponse {
    fn into_response(self, now: DateTime<Utc>) -> Result<TokenResponse> {
        let expiry = match self.expires_in.filter(|secs| *secs > 0) {
            Some(secs) => Some(
                TimeDelta::try_seconds(secs)
                    .and_then(|lifetime| now.checked_add_signed(lifetime))
                    .ok_or_else(|| {
                        BrokerError::RefreshFailed(format!("expires_in out of range: {secs}"))
                    })?,
            ),
            None => self.expiry.filter(|t| t.timestamp() > 0),
        };

        Ok(TokenResponse {
            access_token: self.access_token,
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
            token_type: self
                .token_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Bearer".to_string()),
            expiry,
        })
    }
}

/// OAuth 2.0 error body (RFC 6749 §5.2).
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,

    #[serde(default)]
    error_description: Option<String>,
}

impl ErrorResponse {
    fn describe(self) -> String {
        match self.error_description {
            Some(description) => format!("{}: {description}", self.error),
            None => self.error,
        }
    }
}
