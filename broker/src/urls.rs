//! OAuth link building.
//!
//! Pure functions over the application's base URL. Segments passed to
//! [`UrlBuilder::authenticate_url`] are opaque and joined as given.

use crate::state::Provider;

/// Builds the broker's own OAuth URLs for upstream routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    base_url: String,
}

impl UrlBuilder {
    /// Create a builder for `base_url` (e.g., "https://app.example.com").
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// `{base_url}/oauth/{provider}/callback`
    ///
    /// # Examples
    ///
    /// ```
    /// use token_broker::{Provider, UrlBuilder};
    ///
    /// let urls = UrlBuilder::new("https://example.com");
    /// assert_eq!(urls.callback_url(Provider::Crm), "https://example.com/oauth/crm/callback");
    /// ```
    #[must_use]
    pub fn callback_url(&self, provider: Provider) -> String {
        format!("{}/oauth/{}/callback", self.base_url, provider.as_str())
    }

    /// `{base_url}/oauth/{provider}/authenticate/{seg1}/{seg2}/...`
    ///
    /// # Examples
    ///
    /// ```
    /// use token_broker::{Provider, UrlBuilder};
    ///
    /// let urls = UrlBuilder::new("https://example.com");
    /// assert_eq!(
    ///     urls.authenticate_url(Provider::Chat, &["foo", "bar"]),
    ///     "https://example.com/oauth/chat/authenticate/foo/bar"
    /// );
    /// ```
    #[must_use]
    pub fn authenticate_url<S: AsRef<str>>(&self, provider: Provider, segments: &[S]) -> String {
        let mut url = format!("{}/oauth/{}/authenticate", self.base_url, provider.as_str());
        for segment in segments {
            url.push('/');
            url.push_str(segment.as_ref());
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_callback_urls() {
        let urls = UrlBuilder::new("https://example.com");
        assert_eq!(urls.callback_url(Provider::Crm), "https://example.com/oauth/crm/callback");
        assert_eq!(urls.callback_url(Provider::Chat), "https://example.com/oauth/chat/callback");
    }

    #[test]
    fn test_authenticate_urls() {
        let urls = UrlBuilder::new("https://example.com");
        assert_eq!(
            urls.authenticate_url(Provider::Crm, &["foo"]),
            "https://example.com/oauth/crm/authenticate/foo"
        );
        assert_eq!(
            urls.authenticate_url(Provider::Chat, &["foo", "bar"]),
            "https://example.com/oauth/chat/authenticate/foo/bar"
        );
    }

    #[test]
    fn test_authenticate_url_without_segments() {
        let urls = UrlBuilder::new("https://example.com");
        let empty: [&str; 0] = [];
        assert_eq!(
            urls.authenticate_url(Provider::Crm, &empty),
            "https://example.com/oauth/crm/authenticate"
        );
    }

    proptest! {
        #[test]
        fn prop_segments_kept_in_order(segments in proptest::collection::vec("[A-Za-z0-9_.-]{1,12}", 0..6)) {
            let urls = UrlBuilder::new("https://example.com");
            let url = urls.authenticate_url(Provider::Chat, &segments);
            let tail = url
                .strip_prefix("https://example.com/oauth/chat/authenticate")
                .unwrap_or_default();
            let parsed: Vec<&str> = tail.split('/').skip(1).collect();
            prop_assert_eq!(parsed, segments.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }
}
