//! Domain types: user identity, providers and token records.

use crate::error::{BrokerError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// Identity
// ═══════════════════════════════════════════════════════════════════════

/// Identity of the acting user, as supplied by the request-authentication layer.
///
/// Never empty. A request without an identity carries `Option<UserId>::None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Wrap a user identifier.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Unauthenticated`] if `id` is empty or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(BrokerError::Unauthenticated);
        }
        Ok(Self(id))
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Providers
// ═══════════════════════════════════════════════════════════════════════

/// External OAuth integrations handled by the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// CRM provider (structured, refreshable token).
    Crm,
    /// Team-chat provider (opaque token, no expiry).
    Chat,
}

impl Provider {
    /// Get the provider name as used in URLs and storage keys.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Crm => "crm",
            Self::Chat => "chat",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Token Records
// ═══════════════════════════════════════════════════════════════════════

/// Structured token for the refreshable provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Short-lived credential for API calls.
    pub access_token: String,

    /// Long-lived credential used to obtain a new access token.
    pub refresh_token: String,

    /// Token type, e.g. `Bearer`.
    pub token_type: String,

    /// When the access token stops being valid. `None` means it never expires.
    pub expiry: Option<DateTime<Utc>>,
}

impl TokenRecord {
    /// Whether the access token has expired at `now`.
    ///
    /// An expiry equal to `now` counts as expired.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expiry, Some(expiry) if expiry <= now)
    }
}

/// Lifecycle of the refreshable provider's record for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// No record stored.
    Unset,
    /// Record present and usable.
    Fresh,
    /// Record present but its access token has expired.
    Stale,
}

impl TokenState {
    /// Classify a (possibly absent) record at `now`.
    #[must_use]
    pub fn of(record: Option<&TokenRecord>, now: DateTime<Utc>) -> Self {
        match record {
            None => Self::Unset,
            Some(record) if record.is_stale(now) => Self::Stale,
            Some(_) => Self::Fresh,
        }
    }

    /// Name used in log fields.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Fresh => "fresh",
            Self::Stale => "stale",
        }
    }
}
