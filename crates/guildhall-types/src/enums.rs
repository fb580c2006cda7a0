//! Enumeration types for the Guildhall backend.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Transaction kind
// ---------------------------------------------------------------------------

/// Direction of a token balance change.
///
/// Every ledger entry either credits (`Earned`) or debits (`Spent`) the
/// user's authoritative balance. The amount itself is always positive; the
/// kind carries the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum TransactionKind {
    /// Tokens were added to the balance.
    Earned,
    /// Tokens were removed from the balance.
    Spent,
}

impl TransactionKind {
    /// Database/wire string for this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Earned => "earned",
            Self::Spent => "spent",
        }
    }
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Staff role attached to a user account.
///
/// Plain members have no role row at all; only elevated roles are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum StaffRole {
    /// Can moderate game content (inventory reports, marketplace audits).
    Moderator,
    /// Full administrative access.
    Admin,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_kind_serializes_lowercase() {
        let json = serde_json::to_string(&TransactionKind::Earned).unwrap_or_default();
        assert_eq!(json, "\"earned\"");
        let json = serde_json::to_string(&TransactionKind::Spent).unwrap_or_default();
        assert_eq!(json, "\"spent\"");
    }

    #[test]
    fn transaction_kind_as_str_matches_serde() {
        for kind in [TransactionKind::Earned, TransactionKind::Spent] {
            let json = serde_json::to_string(&kind).unwrap_or_default();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
