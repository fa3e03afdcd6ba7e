//! Error types for token broker operations.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for token broker operations.
pub type Result<T> = std::result::Result<T, BrokerError>;

/// Error taxonomy for the token broker.
///
/// A read miss is not an error: stores and managers return `None` (or an
/// empty string for the chat token) when nothing has been stored yet.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrokerError {
    // ═══════════════════════════════════════════════════════════
    // Identity Errors
    // ═══════════════════════════════════════════════════════════

    /// A write was attempted without a user identity.
    #[error("Authentication required: no user bound to this request")]
    Unauthenticated,

    // ═══════════════════════════════════════════════════════════
    // Token Exchange Errors
    // ═══════════════════════════════════════════════════════════

    /// The token-exchange call failed (network, provider error, bad response).
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// The token-exchange call did not finish within the request timeout.
    #[error("Token refresh timed out after {0:?}")]
    RefreshTimedOut(Duration),

    // ═══════════════════════════════════════════════════════════
    // Storage Errors
    // ═══════════════════════════════════════════════════════════

    /// The key-value transport failed.
    #[error("Token store unavailable: {0}")]
    StoreUnavailable(String),

    /// A stored value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ═══════════════════════════════════════════════════════════
    // Configuration Errors
    // ═══════════════════════════════════════════════════════════

    /// Configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl BrokerError {
    /// Returns `true` if the token exchange failed or timed out.
    ///
    /// # Examples
    ///
    /// ```
    /// # use token_broker::BrokerError;
    /// # use std::time::Duration;
    /// assert!(BrokerError::RefreshTimedOut(Duration::from_secs(5)).is_refresh_failure());
    /// assert!(!BrokerError::Unauthenticated.is_refresh_failure());
    /// ```
    #[must_use]
    pub const fn is_refresh_failure(&self) -> bool {
        matches!(self, Self::RefreshFailed(_) | Self::RefreshTimedOut(_))
    }

    /// Returns `true` if a later request may succeed without any change.
    ///
    /// A failed refresh leaves the stored record intact, so retrying is safe.
    /// A missing identity will fail the same way every time.
    ///
    /// # Examples
    ///
    /// ```
    /// # use token_broker::BrokerError;
    /// assert!(BrokerError::StoreUnavailable("down".into()).is_retryable());
    /// assert!(!BrokerError::Unauthenticated.is_retryable());
    /// ```
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RefreshFailed(_) | Self::RefreshTimedOut(_) | Self::StoreUnavailable(_)
        )
    }
}
