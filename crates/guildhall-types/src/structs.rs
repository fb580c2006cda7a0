//! Core entity structs for the Guildhall backend.
//!
//! Covers the user account with its leveling state, the append-only token
//! transaction record, and the inventory/ownership row shapes used by the
//! cross-partition aggregator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::TransactionKind;
use crate::ids::{CharacterId, TransactionId, UserId};

// ---------------------------------------------------------------------------
// Leveling state
// ---------------------------------------------------------------------------

/// Per-user leveling state.
///
/// `xp` is cumulative and monotonic non-decreasing; `level` is derived from
/// it by the XP curve. `last_exchanged_level` is the exchange watermark:
/// levels at or below it have already been converted to tokens.
///
/// Invariant: `last_exchanged_level <= level`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LevelingState {
    /// Current level, derived from cumulative XP.
    pub level: u32,
    /// Cumulative experience points. Never decreases.
    pub xp: u64,
    /// Total chat messages that contributed XP.
    pub total_messages: u64,
    /// Highest level already converted to tokens.
    pub last_exchanged_level: u32,
    /// Running count of levels ever exchanged.
    pub total_levels_exchanged: u32,
    /// Whether this account imported progression from an external bot.
    pub has_imported_history: bool,
    /// The level carried over by the import, if any.
    pub imported_level: Option<u32>,
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A user account.
///
/// `tokens` is the authoritative current balance; the transaction ledger
/// records how it got there. The two are reconciled at read time (see the
/// legacy reconciliation in `guildhall-economy`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct User {
    /// Account identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Authoritative token balance. Never negative.
    pub tokens: i64,
    /// Leveling and exchange-watermark state.
    pub leveling: LevelingState,
    /// Account creation time. Synthesized legacy ledger entries are dated
    /// to this instant.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Token transaction
// ---------------------------------------------------------------------------

/// An immutable record of a token balance change.
///
/// Append-only: entries are never updated or deleted. `balance_before` and
/// `balance_after` bracket the change so the ledger can be audited against
/// the authoritative balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TokenTransaction {
    /// Entry identifier.
    pub id: TransactionId,
    /// The account whose balance changed.
    pub user_id: UserId,
    /// Magnitude of the change. Always positive; `kind` carries the sign.
    pub amount: i64,
    /// Whether the tokens were earned or spent.
    pub kind: TransactionKind,
    /// Category tag (e.g. `"level_exchange"`, `"legacy"`).
    pub category: String,
    /// Human-readable description.
    pub description: String,
    /// Optional link to the thing that caused the change.
    pub link: Option<String>,
    /// Balance immediately before the change was applied.
    pub balance_before: i64,
    /// Balance immediately after the change was applied.
    pub balance_after: i64,
    /// When the change happened.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Inventory / ownership
// ---------------------------------------------------------------------------

/// A single row in a character's inventory partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InventoryRow {
    /// Owning character.
    pub character_id: CharacterId,
    /// Item name as stored. Matched case-insensitively by the aggregator.
    pub item_name: String,
    /// Quantity held. Never negative.
    pub quantity: i64,
}

/// A character reference from the character directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CharacterRef {
    /// Character identifier.
    pub id: CharacterId,
    /// Display name. The character's inventory partition is named after the
    /// lowercased form of this.
    pub name: String,
}

/// One character's total holding of an item, produced by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CharacterOwnership {
    /// The owning character.
    pub character_id: CharacterId,
    /// Resolved display name, or `"unknown"` when the directory has no entry.
    pub character_name: String,
    /// Total quantity held across all partitions that mention the character.
    pub quantity: i64,
}

/// The full ownership report for one item across the whole world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OwnershipReport {
    /// The item as queried.
    pub item_name: String,
    /// Sum of every character's quantity.
    pub total_in_world: i64,
    /// Per-character holdings, quantity descending.
    pub characters: Vec<CharacterOwnership>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leveling_state_default_is_zeroed() {
        let state = LevelingState::default();
        assert_eq!(state.level, 0);
        assert_eq!(state.xp, 0);
        assert_eq!(state.last_exchanged_level, 0);
        assert!(!state.has_imported_history);
        assert!(state.imported_level.is_none());
    }

    #[test]
    fn token_transaction_roundtrip_serde() {
        let tx = TokenTransaction {
            id: TransactionId::new(),
            user_id: UserId::new(),
            amount: 200,
            kind: TransactionKind::Earned,
            category: String::from("level_exchange"),
            description: String::from("Exchanged 2 levels"),
            link: None,
            balance_before: 100,
            balance_after: 300,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&tx).unwrap_or_default();
        let restored: Result<TokenTransaction, _> = serde_json::from_str(&json);
        assert_eq!(restored.ok().as_ref(), Some(&tx));
    }
}
