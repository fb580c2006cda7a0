//! Shared application state for the API server.
//!
//! [`AppState`] carries the storage backend plus a per-user exchange lock
//! map. The lock serializes exchange commits for the same user inside one
//! process; the storage-level compare-and-set on the exchange watermark
//! covers races across processes.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use guildhall_types::UserId;

use crate::auth::Backend;

/// Shared state for the Axum application.
///
/// Cheap to clone; the backend and lock map are shared behind `Arc`s.
#[derive(Debug, Clone)]
pub struct AppState<B: Backend> {
    /// The storage and auth backend.
    pub backend: B,
    exchange_locks: Arc<Mutex<HashMap<UserId, Arc<Mutex<()>>>>>,
}

impl<B: Backend> AppState<B> {
    /// Wrap a backend in fresh application state.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            exchange_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The exchange lock for one user, created on first use.
    ///
    /// Entries are never removed; the map grows with the set of users who
    /// have ever exchanged in this process, which is bounded and small.
    pub async fn exchange_lock(&self, user_id: UserId) -> Arc<Mutex<()>> {
        let mut locks = self.exchange_locks.lock().await;
        Arc::clone(
            locks
                .entry(user_id)
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }
}
