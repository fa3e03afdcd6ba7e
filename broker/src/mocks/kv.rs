//! Mock key-value store.

use crate::error::{BrokerError, Result};
use crate::providers::KeyValueStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock key-value store.
///
/// In-memory implementation for testing. Clones share the same map, so a
/// test can keep a handle and inspect what the broker wrote.
#[derive(Clone, Default)]
pub struct MockKeyValueStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    writes: Arc<AtomicUsize>,
    should_fail: bool,
}

impl MockKeyValueStore {
    /// Create a new, empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose every operation fails with `StoreUnavailable`.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Number of successful `set` calls so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw value under `key`, bypassing the trait.
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    /// Insert a raw value, bypassing the trait and the write counter.
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn check(&self) -> Result<()> {
        if self.should_fail {
            return Err(BrokerError::StoreUnavailable(
                "mock store is unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl KeyValueStore for MockKeyValueStore {
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.check()?;
        self.values.lock().unwrap().insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    async fn delete(&self, key: &str) -> Result<()> {
        self.check()?;
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MockKeyValueStore::new();

        store.set("k", "v".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(store.write_count(), 1);

        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MockKeyValueStore::new();
        let handle = store.clone();

        store.set("k", "v".to_string()).await.unwrap();
        assert_eq!(handle.raw("k"), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_failing_store() {
        let store = MockKeyValueStore::failing();
        assert!(matches!(store.get("k").await, Err(BrokerError::StoreUnavailable(_))));
        assert!(matches!(
            store.set("k", String::new()).await,
            Err(BrokerError::StoreUnavailable(_))
        ));
    }
}
