//! World-wide ownership aggregation for a single item.
//!
//! Fans one grouping query out to every inventory partition, merges the
//! partial results, resolves character names in one batched lookup, and
//! totals the world supply. A partition that errors is skipped and logged,
//! never fatal -- the partition set is dynamic and loosely governed, so
//! partial results are expected.

use std::collections::BTreeMap;

use futures::future::join_all;

use guildhall_types::{CharacterId, CharacterOwnership, OwnershipReport};

use crate::partition::{CharacterDirectory, InventoryPartitions, PartitionError};

/// Display name used when the character directory has no entry for an id.
pub const UNKNOWN_CHARACTER: &str = "unknown";

/// Merge per-partition partial results into totals by character.
///
/// A character should appear in at most one partition, but the merge
/// tolerates duplicates by summing quantities, never overwriting.
pub fn merge_partials<I>(partials: I) -> BTreeMap<CharacterId, i64>
where
    I: IntoIterator<Item = Vec<(CharacterId, i64)>>,
{
    let mut merged: BTreeMap<CharacterId, i64> = BTreeMap::new();
    for partial in partials {
        for (character_id, quantity) in partial {
            let total = merged.entry(character_id).or_insert(0);
            *total = total.saturating_add(quantity);
        }
    }
    merged
}

/// Aggregate the total quantity of `item_name` held by every character
/// across all inventory partitions.
///
/// # Errors
///
/// Returns [`PartitionError`] only when partition discovery or the batched
/// name lookup fails outright. Individual partition query failures are
/// logged at WARN and skipped.
pub async fn aggregate_ownership<B>(
    backend: &B,
    item_name: &str,
) -> Result<OwnershipReport, PartitionError>
where
    B: InventoryPartitions + CharacterDirectory,
{
    let partitions = backend.list_partitions().await?;

    let queries = partitions.iter().map(|partition| async move {
        (
            partition.as_str(),
            backend.sum_item_by_character(partition, item_name).await,
        )
    });

    let mut partials: Vec<Vec<(CharacterId, i64)>> = Vec::with_capacity(partitions.len());
    for (partition, result) in join_all(queries).await {
        match result {
            Ok(rows) => partials.push(rows),
            Err(error) => {
                tracing::warn!(partition, %error, "skipping failed inventory partition");
            }
        }
    }

    let merged = merge_partials(partials);

    let ids: Vec<CharacterId> = merged.keys().copied().collect();
    let names = backend.resolve_names(&ids).await?;

    let mut characters: Vec<CharacterOwnership> = merged
        .into_iter()
        .map(|(character_id, quantity)| CharacterOwnership {
            character_id,
            character_name: names
                .get(&character_id)
                .cloned()
                .unwrap_or_else(|| String::from(UNKNOWN_CHARACTER)),
            quantity,
        })
        .collect();

    // Quantity descending; name ascending breaks ties deterministically.
    characters.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| a.character_name.cmp(&b.character_name))
    });

    let total_in_world = characters
        .iter()
        .fold(0i64, |total, c| total.saturating_add(c.quantity));

    Ok(OwnershipReport {
        item_name: item_name.to_owned(),
        total_in_world,
        characters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::future::Future;

    /// Test backend: fixed partitions, of which some can be marked broken.
    struct FixtureBackend {
        partitions: Vec<(String, Vec<(CharacterId, i64)>)>,
        broken: Vec<String>,
        names: BTreeMap<CharacterId, String>,
    }

    impl InventoryPartitions for FixtureBackend {
        fn list_partitions(
            &self,
        ) -> impl Future<Output = Result<Vec<String>, PartitionError>> + Send {
            let mut all: Vec<String> =
                self.partitions.iter().map(|(name, _)| name.clone()).collect();
            all.extend(self.broken.iter().cloned());
            async move { Ok(all) }
        }

        fn sum_item_by_character(
            &self,
            partition: &str,
            _item_name: &str,
        ) -> impl Future<Output = Result<Vec<(CharacterId, i64)>, PartitionError>> + Send {
            let result = if self.broken.iter().any(|b| b == partition) {
                Err(PartitionError::Partition {
                    partition: partition.to_owned(),
                    message: String::from("simulated failure"),
                })
            } else {
                Ok(self
                    .partitions
                    .iter()
                    .find(|(name, _)| name == partition)
                    .map(|(_, rows)| rows.clone())
                    .unwrap_or_default())
            };
            async move { result }
        }
    }

    impl CharacterDirectory for FixtureBackend {
        fn resolve_names(
            &self,
            ids: &[CharacterId],
        ) -> impl Future<Output = Result<BTreeMap<CharacterId, String>, PartitionError>> + Send
        {
            let resolved: BTreeMap<CharacterId, String> = ids
                .iter()
                .filter_map(|id| self.names.get(id).map(|name| (*id, name.clone())))
                .collect();
            async move { Ok(resolved) }
        }
    }

    #[test]
    fn merge_sums_duplicate_characters() {
        let anna = CharacterId::new();
        let merged = merge_partials(vec![vec![(anna, 3)], vec![(anna, 2)]]);
        assert_eq!(merged.get(&anna).copied(), Some(5));
    }

    #[test]
    fn merge_keeps_distinct_characters_separate() {
        let anna = CharacterId::new();
        let bertram = CharacterId::new();
        let merged = merge_partials(vec![vec![(anna, 3), (bertram, 7)]]);
        assert_eq!(merged.get(&anna).copied(), Some(3));
        assert_eq!(merged.get(&bertram).copied(), Some(7));
    }

    #[tokio::test]
    async fn aggregates_across_partitions() {
        let anna = CharacterId::new();
        let bertram = CharacterId::new();
        let mut names = BTreeMap::new();
        names.insert(anna, String::from("Anna"));
        names.insert(bertram, String::from("Bertram"));

        let backend = FixtureBackend {
            partitions: vec![
                (String::from("anna"), vec![(anna, 3)]),
                (String::from("bertram"), vec![(bertram, 9)]),
            ],
            broken: Vec::new(),
            names,
        };

        let report = aggregate_ownership(&backend, "Apple").await;
        assert!(report.is_ok());
        if let Ok(report) = report {
            assert_eq!(report.total_in_world, 12);
            assert_eq!(report.characters.len(), 2);
            // Sorted quantity descending.
            assert_eq!(
                report.characters.first().map(|c| c.character_name.clone()),
                Some(String::from("Bertram"))
            );
        }
    }

    #[tokio::test]
    async fn duplicate_character_across_partitions_sums() {
        let anna = CharacterId::new();
        let mut names = BTreeMap::new();
        names.insert(anna, String::from("Anna"));

        let backend = FixtureBackend {
            partitions: vec![
                (String::from("anna"), vec![(anna, 3)]),
                (String::from("anna_old"), vec![(anna, 4)]),
            ],
            broken: Vec::new(),
            names,
        };

        let report = aggregate_ownership(&backend, "Apple").await;
        assert!(report.is_ok());
        if let Ok(report) = report {
            assert_eq!(report.characters.len(), 1);
            assert_eq!(report.total_in_world, 7);
            assert_eq!(
                report.characters.first().map(|c| c.quantity),
                Some(7)
            );
        }
    }

    #[tokio::test]
    async fn failing_partition_is_skipped_not_fatal() {
        let anna = CharacterId::new();
        let mut names = BTreeMap::new();
        names.insert(anna, String::from("Anna"));

        let backend = FixtureBackend {
            partitions: vec![(String::from("anna"), vec![(anna, 3)])],
            broken: vec![String::from("corrupted")],
            names,
        };

        let report = aggregate_ownership(&backend, "Apple").await;
        assert!(report.is_ok());
        if let Ok(report) = report {
            assert_eq!(report.total_in_world, 3);
            assert_eq!(report.characters.len(), 1);
        }
    }

    #[tokio::test]
    async fn unresolved_names_fall_back_to_unknown() {
        let ghost = CharacterId::new();
        let backend = FixtureBackend {
            partitions: vec![(String::from("ghost"), vec![(ghost, 1)])],
            broken: Vec::new(),
            names: BTreeMap::new(),
        };

        let report = aggregate_ownership(&backend, "Apple").await;
        assert!(report.is_ok());
        if let Ok(report) = report {
            assert_eq!(
                report.characters.first().map(|c| c.character_name.clone()),
                Some(String::from(UNKNOWN_CHARACTER))
            );
        }
    }

    #[tokio::test]
    async fn empty_partition_set_yields_empty_report() {
        let backend = FixtureBackend {
            partitions: Vec::new(),
            broken: Vec::new(),
            names: BTreeMap::new(),
        };

        let report = aggregate_ownership(&backend, "Apple").await;
        assert!(report.is_ok());
        if let Ok(report) = report {
            assert_eq!(report.total_in_world, 0);
            assert!(report.characters.is_empty());
        }
    }
}
