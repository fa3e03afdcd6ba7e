//! Authorized HTTP client for the CRM provider.

use crate::state::TokenRecord;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, IntoUrl, Method, RequestBuilder};

/// HTTP client carrying the user's CRM credentials, if any.
///
/// A client built for a user with no stored token is still usable; its
/// requests simply go out without an `Authorization` header.
#[derive(Clone)]
pub struct CrmClient {
    http: Client,
    token: Option<TokenRecord>,
}

impl CrmClient {
    /// Wrap `http` with an optional token.
    #[must_use]
    pub const fn new(http: Client, token: Option<TokenRecord>) -> Self {
        Self { http, token }
    }

    /// Whether requests will carry credentials.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The token backing this client.
    #[must_use]
    pub const fn token(&self) -> Option<&TokenRecord> {
        self.token.as_ref()
    }

    /// `Authorization` header value, e.g. `Bearer abc`.
    #[must_use]
    pub fn authorization_header(&self) -> Option<String> {
        self.token
            .as_ref()
            .map(|token| format!("{} {}", token.token_type, token.access_token))
    }

    /// Start a request, attaching credentials when present.
    pub fn request<U: IntoUrl>(&self, method: Method, url: U) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match self.authorization_header() {
            Some(header) => builder.header(AUTHORIZATION, header),
            None => builder,
        }
    }
}

impl std::fmt::Debug for CrmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrmClient")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
