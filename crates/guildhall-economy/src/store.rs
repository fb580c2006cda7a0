//! Storage traits for user accounts and the token bank.
//!
//! Traits use `impl Future + Send` return types so implementations stay
//! object-free and handler futures remain `Send`. The Postgres backend in
//! `guildhall-db` is the production implementation; the in-memory backend
//! serves tests and local development.

use core::future::Future;

use guildhall_types::{LevelingState, TokenTransaction, User, UserId};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by storage implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The exchange watermark moved between read and commit. The losing
    /// writer's levels were already credited by the winner, so callers
    /// decline rather than retry.
    #[error("exchange watermark conflict for user {user_id}: expected {expected}")]
    WatermarkConflict {
        /// The user whose exchange lost the race.
        user_id: UserId,
        /// The watermark value the commit expected to find.
        expected: u32,
    },

    /// A ledger entry failed validation before persisting.
    #[error("ledger entry rejected: {0}")]
    InvalidEntry(#[from] crate::EconomyError),

    /// The underlying storage failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

// ---------------------------------------------------------------------------
// Commit request / receipt
// ---------------------------------------------------------------------------

/// A settled exchange ready to be persisted atomically.
///
/// `expected_watermark` is the `last_exchanged_level` the settlement was
/// computed from; the store must compare-and-set against it so a concurrent
/// exchange cannot double-credit.
#[derive(Debug, Clone)]
pub struct ExchangeCommit {
    /// The user exchanging levels.
    pub user_id: UserId,
    /// The watermark value the settlement read. The commit fails with
    /// [`StoreError::WatermarkConflict`] if the stored value differs.
    pub expected_watermark: u32,
    /// The leveling state to write.
    pub new_state: LevelingState,
    /// Levels converted.
    pub levels_exchanged: u32,
    /// Tokens to credit.
    pub tokens_received: i64,
}

/// What a committed exchange actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeReceipt {
    /// Levels converted.
    pub levels_exchanged: u32,
    /// Tokens credited.
    pub tokens_received: i64,
    /// The user's level after the commit.
    pub new_level: u32,
    /// Balance before the credit.
    pub balance_before: i64,
    /// Balance after the credit.
    pub balance_after: i64,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Read access to user accounts.
pub trait UserStore: Send + Sync {
    /// Fetch a user by id, or `None` if no such account exists.
    fn fetch_user(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;
}

/// Token balance and ledger persistence.
pub trait BankStore: Send + Sync {
    /// Atomically persist a settled exchange: compare-and-set the leveling
    /// watermark, credit the balance, and append the ledger entry -- all in
    /// one storage transaction. Either everything applies or nothing does.
    fn commit_exchange(
        &self,
        commit: ExchangeCommit,
    ) -> impl Future<Output = Result<ExchangeReceipt, StoreError>> + Send;

    /// All persisted ledger entries for a user, oldest first.
    fn transactions_for_user(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Vec<TokenTransaction>, StoreError>> + Send;
}
