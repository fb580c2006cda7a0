//! Shared type definitions for the Guildhall game backend.
//!
//! This crate is the single source of truth for all types used across the
//! Guildhall workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the admin dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Enumeration types (transaction kinds, staff roles)
//! - [`structs`] -- Core entity structs (users, ledger entries, inventory)

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{StaffRole, TransactionKind};
pub use ids::{CharacterId, TransactionId, UserId};
pub use structs::{
    CharacterOwnership, CharacterRef, InventoryRow, LevelingState, OwnershipReport,
    TokenTransaction, User,
};

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. Importing them here triggers generation.
        // The actual files are written to the `bindings/` directory
        // relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::UserId::export_all();
        let _ = crate::ids::CharacterId::export_all();
        let _ = crate::ids::TransactionId::export_all();
        let _ = crate::enums::TransactionKind::export_all();
        let _ = crate::enums::StaffRole::export_all();
        let _ = crate::structs::User::export_all();
        let _ = crate::structs::LevelingState::export_all();
        let _ = crate::structs::TokenTransaction::export_all();
        let _ = crate::structs::InventoryRow::export_all();
        let _ = crate::structs::OwnershipReport::export_all();
    }
}
