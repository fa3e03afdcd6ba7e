//! Opaque-token manager for the chat provider.

use crate::error::Result;
use crate::managers::TokenManager;
use crate::providers::KeyValueStore;
use crate::state::{Provider, UserId};
use crate::token_store::TokenStore;

/// Manages the chat provider's single opaque token per user.
#[derive(Debug)]
pub struct ChatTokenManager<S> {
    store: TokenStore<S>,
}

impl<S> Clone for ChatTokenManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: KeyValueStore> ChatTokenManager<S> {
    /// Create a manager over `store`.
    #[must_use]
    pub const fn new(store: TokenStore<S>) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> TokenManager for ChatTokenManager<S> {
    type Token = String;

    fn provider(&self) -> Provider {
        Provider::Chat
    }

    async fn set_token(&self, user_id: Option<&UserId>, token: String) -> Result<()> {
        self.store.put(user_id, self.provider(), &token).await
    }

    async fn token_for_user(&self, user_id: Option<&UserId>) -> Result<Option<String>> {
        self.store.get(user_id, self.provider()).await
    }

    async fn delete_token(&self, user_id: Option<&UserId>) -> Result<()> {
        self.store.delete(user_id, self.provider()).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::BrokerError;
    use crate::mocks::MockKeyValueStore;

    fn manager() -> ChatTokenManager<MockKeyValueStore> {
        ChatTokenManager::new(TokenStore::new(MockKeyValueStore::new()))
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let chat = manager();
        let foo = UserId::new("FOO").unwrap();

        chat.set_token(Some(&foo), "foo".to_string()).await.unwrap();

        assert_eq!(chat.token_for_user(Some(&foo)).await.unwrap().as_deref(), Some("foo"));
        assert_eq!(chat.provider(), Provider::Chat);
    }

    #[tokio::test]
    async fn test_set_without_user_fails() {
        let chat = manager();
        let result = chat.set_token(None, "foo".to_string()).await;
        assert_eq!(result, Err(BrokerError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_get_for_unknown_or_missing_user_is_absent() {
        let chat = manager();
        let bar = UserId::new("BAR").unwrap();

        assert_eq!(chat.token_for_user(Some(&bar)).await.unwrap(), None);
        assert_eq!(chat.token_for_user(None).await.unwrap(), None);
    }
}
