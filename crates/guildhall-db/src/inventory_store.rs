//! Inventory partition discovery and per-partition aggregation against
//! `PostgreSQL`.
//!
//! Each character's inventory is a physical table in the `inventory`
//! schema, named after the lowercased character name. The set is
//! discovered from `pg_tables`, never enumerated from code. Table names
//! are the only dynamic identifiers in the whole data layer, so they are
//! validated against a strict character set before being interpolated.

use std::collections::BTreeMap;

use guildhall_inventory::partition::{CharacterDirectory, InventoryPartitions, PartitionError};
use guildhall_types::CharacterId;
use uuid::Uuid;

use crate::postgres::PgBackend;

/// Schema holding the per-character inventory tables.
const INVENTORY_SCHEMA: &str = "inventory";

/// Validate a partition name discovered from the catalog.
///
/// Partition names are lowercased character names; anything outside
/// `[a-z0-9_]` is rejected so a hostile name can never reach the query
/// text.
fn validate_partition_name(partition: &str) -> Result<(), PartitionError> {
    let valid = !partition.is_empty()
        && partition
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(PartitionError::Partition {
            partition: partition.to_owned(),
            message: String::from("invalid partition name"),
        })
    }
}

impl InventoryPartitions for PgBackend {
    async fn list_partitions(&self) -> Result<Vec<String>, PartitionError> {
        let names: Vec<String> = sqlx::query_scalar(
            r"SELECT tablename FROM pg_tables WHERE schemaname = $1 ORDER BY tablename",
        )
        .bind(INVENTORY_SCHEMA)
        .fetch_all(self.pool())
        .await
        .map_err(|e| PartitionError::Backend(e.to_string()))?;

        Ok(names)
    }

    async fn sum_item_by_character(
        &self,
        partition: &str,
        item_name: &str,
    ) -> Result<Vec<(CharacterId, i64)>, PartitionError> {
        validate_partition_name(partition)?;

        // The table name cannot be bound as a parameter; it was validated
        // above and is double-quoted here.
        let query = format!(
            r#"SELECT character_id, SUM(quantity)::BIGINT AS total
               FROM {INVENTORY_SCHEMA}."{partition}"
               WHERE LOWER(item_name) = LOWER($1)
               GROUP BY character_id"#
        );

        let rows: Vec<(Uuid, i64)> = sqlx::query_as(&query)
            .bind(item_name)
            .fetch_all(self.pool())
            .await
            .map_err(|e| PartitionError::Partition {
                partition: partition.to_owned(),
                message: e.to_string(),
            })?;

        Ok(rows
            .into_iter()
            .map(|(id, total)| (CharacterId::from(id), total))
            .collect())
    }
}

impl CharacterDirectory for PgBackend {
    async fn resolve_names(
        &self,
        ids: &[CharacterId],
    ) -> Result<BTreeMap<CharacterId, String>, PartitionError> {
        if ids.is_empty() {
            return Ok(BTreeMap::new());
        }

        let raw: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        let rows: Vec<(Uuid, String)> =
            sqlx::query_as(r"SELECT id, name FROM characters WHERE id = ANY($1)")
                .bind(&raw)
                .fetch_all(self.pool())
                .await
                .map_err(|e| PartitionError::Backend(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| (CharacterId::from(id), name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_lowercase_names() {
        assert!(validate_partition_name("anna").is_ok());
        assert!(validate_partition_name("old_anna_2").is_ok());
    }

    #[test]
    fn rejects_hostile_names() {
        assert!(validate_partition_name("").is_err());
        assert!(validate_partition_name("Anna").is_err());
        assert!(validate_partition_name("anna\"; DROP TABLE users; --").is_err());
        assert!(validate_partition_name("anna bertram").is_err());
    }
}
