//! Token gate: authenticates inbound HTTP requests against a remote
//! identity authority before they reach the protected handler.
//!
//! - [`services::auth::AuthGate`] validates every request remotely.
//! - [`services::auth::CachingAuthGate`] remembers accepted tokens in a
//!   [`services::cache::TokenCache`].
//! - [`middleware::auth::gate::apply`] puts an axum `Router` behind a gate.
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
