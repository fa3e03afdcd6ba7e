//! Mock token exchanger.

use crate::error::{BrokerError, Result};
use crate::providers::{TokenExchanger, TokenResponse};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock token exchanger.
///
/// Returns a predefined response, optionally after a delay, and records
/// every refresh token it is handed.
#[derive(Clone)]
pub struct MockTokenExchanger {
    outcome: Result<TokenResponse>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl MockTokenExchanger {
    /// Create a mock that answers every refresh with `response`.
    #[must_use]
    pub fn new(response: TokenResponse) -> Self {
        Self {
            outcome: Ok(response),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that will fail requests.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            outcome: Err(BrokerError::RefreshFailed("invalid_grant".to_string())),
            ..Self::new(TokenResponse {
                access_token: String::new(),
                refresh_token: None,
                token_type: String::new(),
                expiry: None,
            })
        }
    }

    /// Sleep for `delay` before answering.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of refresh calls received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Refresh tokens received, in call order.
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    #[must_use]
    pub fn refresh_tokens_seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl TokenExchanger for MockTokenExchanger {
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    async fn refresh(&self, refresh_token: &str, _timeout: Duration) -> Result<TokenResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(refresh_token.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.outcome.clone()
    }
}
