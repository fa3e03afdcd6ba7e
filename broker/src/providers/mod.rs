//! External collaborators of the broker.
//!
//! This module defines traits for the two outbound dependencies: the shared
//! key-value store and the provider's token-exchange endpoint. Managers
//! depend on these traits, and the application injects concrete
//! implementations.
//!
//! This enables:
//! - **Testing**: Use mocks (in-memory, deterministic)
//! - **Production**: Use Redis and the provider's real token endpoint

pub mod exchange;
pub mod http;
pub mod kv;

// Re-export provider traits
pub use exchange::{TokenExchanger, TokenResponse};
pub use http::HttpTokenExchanger;
pub use kv::KeyValueStore;
