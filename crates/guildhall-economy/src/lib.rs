//! XP progression, level-to-token exchange, and the token ledger for the
//! Guildhall backend.
//!
//! Tokens are never minted casually: every balance change flows through a
//! validated, append-only [`TokenTransaction`](guildhall_types::TokenTransaction)
//! with bracketing balances, and level exchanges move a watermark
//! (`last_exchanged_level`) that makes the operation idempotent.
//!
//! # Architecture
//!
//! - [`curve`] -- The quadratic XP curve and progress-within-level math.
//! - [`exchange`] -- Pure exchange state transitions (preview / settle).
//! - [`ledger`] -- Transaction builder, summaries, legacy reconciliation.
//! - [`store`] -- Async storage traits ([`UserStore`], [`BankStore`]).
//!
//! # Invariants
//!
//! 1. `last_exchanged_level <= level` for every user.
//! 2. Ledger amounts are strictly positive; the kind carries the sign.
//! 3. `balance_after` always brackets correctly against `balance_before`.
//! 4. After legacy reconciliation, the ledger's net equals the
//!    authoritative balance exactly.
//!
//! # Usage
//!
//! ```
//! use guildhall_economy::exchange::{preview, settle};
//! use guildhall_types::LevelingState;
//!
//! let state = LevelingState {
//!     level: 12,
//!     last_exchanged_level: 10,
//!     ..LevelingState::default()
//! };
//!
//! assert_eq!(preview(&state).potential_tokens, 200);
//!
//! let settlement = settle(&state);
//! assert!(settlement.is_ok());
//! ```

pub mod curve;
pub mod exchange;
pub mod ledger;
pub mod store;

// Re-export primary types at crate root.
pub use curve::{LevelProgress, level_progress, xp_consumed_through, xp_required_for_level};
pub use exchange::{EXCHANGE_CATEGORY, ExchangePreview, ExchangeSettlement, TOKENS_PER_LEVEL};
pub use ledger::{LEGACY_CATEGORY, LedgerSummary, LedgerView, TransactionBuilder};
pub use store::{BankStore, ExchangeCommit, ExchangeReceipt, StoreError, UserStore};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from the economy's pure operations.
#[derive(Debug, thiserror::Error)]
pub enum EconomyError {
    /// The exchange watermark already sits at the current level.
    ///
    /// A declined operation, not a failure: callers surface it as a 400
    /// with a declined payload rather than a crash.
    #[error("no exchangeable levels: level {level}, already exchanged through {last_exchanged_level}")]
    NoExchangeableLevels {
        /// The user's current level.
        level: u32,
        /// The exchange watermark.
        last_exchanged_level: u32,
    },

    /// Ledger amounts must be non-zero.
    #[error("transaction amount must be non-zero")]
    ZeroAmount,

    /// Ledger amounts must be positive; the kind carries the sign.
    #[error("transaction amount must be positive, got {amount}")]
    NegativeAmount {
        /// The invalid amount.
        amount: i64,
    },

    /// A required field was not set on the builder.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A spend would drive the balance negative.
    #[error("spend of {amount} exceeds balance {balance_before}")]
    BalanceUnderflow {
        /// The attempted spend.
        amount: i64,
        /// The balance before the spend.
        balance_before: i64,
    },
}
