//! Storage implementations for the broker.
//!
//! - **Key-Value Store** (Redis) - Shared token records, one key per user and provider

pub mod kv_redis;

// Re-exports
pub use kv_redis::RedisKeyValueStore;
