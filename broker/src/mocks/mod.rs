//! Mock provider implementations for testing.
//!
//! This module provides simple, in-memory implementations of the provider
//! traits for use in unit and integration tests.

pub mod exchange;
pub mod kv;

pub use exchange::MockTokenExchanger;
pub use kv::MockKeyValueStore;
