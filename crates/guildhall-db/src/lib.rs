//! Data layer for the Guildhall backend.
//!
//! Two backends implement the domain's storage and auth traits:
//!
//! - [`PgBackend`]: PostgreSQL via `sqlx` for accounts, the token ledger,
//!   and the per-character inventory partitions, plus a Dragonfly session
//!   cache via `fred`. This is the production backend.
//! - [`MemoryBackend`]: lock-guarded maps for tests and local development.
//!
//! Connection pooling, partition discovery, and the atomic exchange commit
//! all live here; the domain crates stay storage-free.

pub mod accounts;
pub mod bank;
pub mod error;
pub mod inventory_store;
pub mod memory;
pub mod postgres;
pub mod sessions;

pub use error::DbError;
pub use memory::MemoryBackend;
pub use postgres::{PgBackend, PostgresConfig};
pub use sessions::SessionCache;
