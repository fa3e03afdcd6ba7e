//! Token-exchange trait for the refreshable provider.

use crate::error::Result;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Result of a refresh-token exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    /// New access token.
    pub access_token: String,

    /// New refresh token, if the provider rotated it.
    pub refresh_token: Option<String>,

    /// Token type, e.g. `Bearer`.
    pub token_type: String,

    /// Expiration timestamp (if provided).
    pub expiry: Option<DateTime<Utc>>,
}

/// Outbound call to a provider's token endpoint.
///
/// # Implementation Notes
///
/// - Send `grant_type=refresh_token` with the client credentials
/// - Honour `timeout`; callers also enforce it, but an implementation
///   should not keep a connection open past it
/// - Report a missing or empty refresh token in the response as `None`
pub trait TokenExchanger: Send + Sync {
    /// Exchange a refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network request fails or exceeds `timeout`
    /// - Provider rejects the refresh token
    /// - Response is malformed
    fn refresh(
        &self,
        refresh_token: &str,
        timeout: Duration,
    ) -> impl std::future::Future<Output = Result<TokenResponse>> + Send;
}
