//! # Token Broker
//!
//! Request-scoped OAuth token broker for two providers: a CRM that issues
//! refresh tokens and a team-chat service that issues a single opaque token.
//!
//! ## Features
//!
//! - **Per-user storage**: one record per `(user, provider)` in a shared key-value store
//! - **Refresh on demand**: a stale CRM token is exchanged and written back when a client is requested
//! - **Link building**: callback and authenticate URLs under `/oauth/{provider}/...`
//! - **Testable**: store, token exchange and clock are all injected
//!
//! ## Architecture
//!
//! ```text
//! Request → App::create_context() → Context (user, timeout)
//!                                      ├── UrlBuilder
//!                                      ├── ChatTokenManager ──┐
//!                                      └── CrmTokenManager ───┼── TokenStore → KeyValueStore (Redis)
//!                                              └── TokenExchanger (provider token endpoint)
//! ```
//!
//! ## Example: refreshing a CRM token
//!
//! ```rust,no_run
//! use token_broker::{App, BrokerConfig, UserId};
//!
//! # async fn handle() -> Result<(), Box<dyn std::error::Error>> {
//! let app = App::connect(BrokerConfig::from_env()?).await?;
//! let ctx = app.create_context().with_user(UserId::new("U123")?);
//!
//! // Refreshes and persists the record first if it has expired.
//! let client = ctx.crm_client().await?;
//! let response = client
//!     .request(reqwest::Method::GET, "https://crm.example.com/services/data")
//!     .send()
//!     .await?;
//! # drop(response);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod app;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod managers;
pub mod providers;
pub mod state;
pub mod stores;
pub mod telemetry;
pub mod token_store;
pub mod urls;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use app::App;
pub use client::CrmClient;
pub use config::{BrokerConfig, ProviderCredentials};
pub use context::Context;
pub use error::{BrokerError, Result};
pub use managers::{ChatTokenManager, CrmTokenManager, TokenManager};
pub use providers::{HttpTokenExchanger, KeyValueStore, TokenExchanger, TokenResponse};
pub use state::{Provider, TokenRecord, TokenState, UserId};
pub use token_store::TokenStore;
pub use urls::UrlBuilder;
