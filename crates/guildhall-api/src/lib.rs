//! HTTP API for the Guildhall backend.
//!
//! Serves the level-for-token exchange, the token ledger view, and the
//! cross-partition item ownership report over Axum. Handlers are generic
//! over the [`auth::Backend`] bound so the same router runs against the
//! Postgres backend in production and the in-memory backend in tests.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, start_server};
pub use state::AppState;
