//! Level-to-token exchange: pure state transitions over [`LevelingState`].
//!
//! The exchange converts unredeemed whole levels into tokens at a fixed
//! rate. `last_exchanged_level` is the watermark: it only ever moves up to
//! the current level, which is what makes the operation idempotent --
//! settling twice without new XP declines the second time instead of
//! double-crediting.
//!
//! These functions never touch storage. Persisting a settlement atomically
//! (compare-and-set on the watermark, balance credit, ledger append) is the
//! store's job; see [`crate::store::BankStore::commit_exchange`].

use guildhall_types::LevelingState;
use serde::{Deserialize, Serialize};

use crate::EconomyError;

/// Tokens credited per exchanged level.
pub const TOKENS_PER_LEVEL: i64 = 100;

/// Ledger category tag for exchange credits.
pub const EXCHANGE_CATEGORY: &str = "level_exchange";

/// Read-only view of what an exchange would yield right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangePreview {
    /// Whole levels above the watermark, available to exchange.
    pub exchangeable_levels: u32,
    /// Tokens those levels would yield.
    pub potential_tokens: i64,
}

/// The result of settling an exchange: the new leveling state plus the
/// figures to credit and record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeSettlement {
    /// Levels converted by this settlement.
    pub levels_exchanged: u32,
    /// Tokens to credit.
    pub tokens_received: i64,
    /// The leveling state after the watermark moves up.
    pub new_state: LevelingState,
}

/// Compute the exchangeable levels and potential tokens for a user.
///
/// Side-effect free. The subtraction is clamped at zero so a state that
/// somehow violates the `last_exchanged_level <= level` invariant previews
/// as "nothing to exchange" rather than underflowing.
pub const fn preview(state: &LevelingState) -> ExchangePreview {
    let exchangeable = state.level.saturating_sub(state.last_exchanged_level);
    ExchangePreview {
        exchangeable_levels: exchangeable,
        potential_tokens: (exchangeable as i64).saturating_mul(TOKENS_PER_LEVEL),
    }
}

/// Settle an exchange: move the watermark up to the current level.
///
/// # Errors
///
/// Returns [`EconomyError::NoExchangeableLevels`] when the watermark already
/// sits at the current level. This is a declined operation, not a crash --
/// callers surface it as a 400 with a declined payload.
pub fn settle(state: &LevelingState) -> Result<ExchangeSettlement, EconomyError> {
    let offer = preview(state);
    if offer.exchangeable_levels == 0 {
        return Err(EconomyError::NoExchangeableLevels {
            level: state.level,
            last_exchanged_level: state.last_exchanged_level,
        });
    }

    let new_state = LevelingState {
        last_exchanged_level: state.level,
        total_levels_exchanged: state
            .total_levels_exchanged
            .saturating_add(offer.exchangeable_levels),
        ..*state
    };

    Ok(ExchangeSettlement {
        levels_exchanged: offer.exchangeable_levels,
        tokens_received: offer.potential_tokens,
        new_state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(level: u32, last_exchanged: u32) -> LevelingState {
        LevelingState {
            level,
            xp: 50_000,
            total_messages: 1_000,
            last_exchanged_level: last_exchanged,
            total_levels_exchanged: last_exchanged,
            has_imported_history: false,
            imported_level: None,
        }
    }

    #[test]
    fn preview_counts_levels_above_watermark() {
        let offer = preview(&state(12, 10));
        assert_eq!(offer.exchangeable_levels, 2);
        assert_eq!(offer.potential_tokens, 200);
    }

    #[test]
    fn preview_at_watermark_is_zero() {
        let offer = preview(&state(10, 10));
        assert_eq!(offer.exchangeable_levels, 0);
        assert_eq!(offer.potential_tokens, 0);
    }

    #[test]
    fn preview_clamps_inverted_watermark() {
        // Should be impossible, but must not underflow.
        let offer = preview(&state(5, 9));
        assert_eq!(offer.exchangeable_levels, 0);
    }

    #[test]
    fn settle_moves_watermark_and_credits() {
        let result = settle(&state(12, 10));
        assert!(result.is_ok());
        if let Ok(settlement) = result {
            assert_eq!(settlement.levels_exchanged, 2);
            assert_eq!(settlement.tokens_received, 200);
            assert_eq!(settlement.new_state.last_exchanged_level, 12);
            assert_eq!(settlement.new_state.total_levels_exchanged, 12);
            // Untouched fields carry over.
            assert_eq!(settlement.new_state.xp, 50_000);
        }
    }

    #[test]
    fn settle_twice_declines_the_second_time() {
        let first = settle(&state(10, 8));
        assert!(first.is_ok());
        if let Ok(settlement) = first {
            let second = settle(&settlement.new_state);
            assert!(matches!(
                second,
                Err(EconomyError::NoExchangeableLevels { .. })
            ));
        }
    }

    #[test]
    fn settle_with_nothing_exchangeable_declines() {
        let result = settle(&state(10, 10));
        assert!(matches!(
            result,
            Err(EconomyError::NoExchangeableLevels {
                level: 10,
                last_exchanged_level: 10,
            })
        ));
    }
}
