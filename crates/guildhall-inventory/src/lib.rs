//! Cross-partition inventory ownership aggregation for the Guildhall
//! backend.
//!
//! Every character's inventory lives in its own physical partition (an
//! external storage convention this crate honors, not one it controls).
//! Answering "who owns how many of item X, world-wide?" therefore means
//! discovering the partition set, querying each, and merging partials.
//!
//! # Architecture
//!
//! - [`partition`] -- The [`InventoryPartitions`] and [`CharacterDirectory`]
//!   repository traits, so storage technology can vary.
//! - [`aggregate`] -- [`aggregate_ownership`]: concurrent fan-out,
//!   skip-and-log failure policy, duplicate-summing merge, one batched name
//!   lookup.

pub mod aggregate;
pub mod partition;

// Re-export primary items at crate root.
pub use aggregate::{UNKNOWN_CHARACTER, aggregate_ownership, merge_partials};
pub use partition::{CharacterDirectory, InventoryPartitions, PartitionError};
