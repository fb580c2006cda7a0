//! Repository traits over the per-character inventory partitions.
//!
//! Character inventories live in one physical partition per character
//! (partition name = lowercased character name). The set is open-ended and
//! loosely governed: partitions appear when characters are created and are
//! discovered by listing the storage backend, never enumerated from code.

use core::future::Future;
use std::collections::BTreeMap;

use guildhall_types::CharacterId;

/// Errors from the partition layer.
#[derive(Debug, thiserror::Error)]
pub enum PartitionError {
    /// A single partition could not be queried. The aggregator skips these.
    #[error("partition {partition} failed: {message}")]
    Partition {
        /// The partition that failed.
        partition: String,
        /// What went wrong.
        message: String,
    },

    /// The underlying storage failed in a way that is not scoped to one
    /// partition (listing failed, directory unreachable).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Discovery and per-partition aggregation over character inventories.
pub trait InventoryPartitions: Send + Sync {
    /// List every existing inventory partition name.
    fn list_partitions(&self) -> impl Future<Output = Result<Vec<String>, PartitionError>> + Send;

    /// Sum the quantity of `item_name` (case-insensitive exact match) per
    /// character within one partition. Backends perform the grouping so the
    /// aggregator only merges partials.
    fn sum_item_by_character(
        &self,
        partition: &str,
        item_name: &str,
    ) -> impl Future<Output = Result<Vec<(CharacterId, i64)>, PartitionError>> + Send;
}

/// Batched character-id to display-name resolution.
pub trait CharacterDirectory: Send + Sync {
    /// Resolve display names for a set of character ids in one lookup.
    /// Ids with no directory entry are simply absent from the result.
    fn resolve_names(
        &self,
        ids: &[CharacterId],
    ) -> impl Future<Output = Result<BTreeMap<CharacterId, String>, PartitionError>> + Send;
}
