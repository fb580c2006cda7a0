//! In-memory backend for tests and local development.
//!
//! Implements every storage and auth trait against `tokio` `RwLock`-guarded
//! maps. The API integration tests run entirely against this backend, and
//! it supports marking partitions as broken to exercise the aggregator's
//! skip-and-log policy.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use guildhall_auth::{AuthError, RoleChecker, SessionProvider};
use guildhall_economy::exchange::EXCHANGE_CATEGORY;
use guildhall_economy::ledger::TransactionBuilder;
use guildhall_economy::store::{BankStore, ExchangeCommit, ExchangeReceipt, StoreError, UserStore};
use guildhall_inventory::partition::{CharacterDirectory, InventoryPartitions, PartitionError};
use guildhall_types::{
    CharacterId, InventoryRow, TokenTransaction, TransactionKind, User, UserId,
};

/// Mutable state behind the backend's lock.
#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<UserId, User>,
    transactions: Vec<TokenTransaction>,
    partitions: BTreeMap<String, Vec<InventoryRow>>,
    broken_partitions: BTreeSet<String>,
    characters: BTreeMap<CharacterId, String>,
    sessions: BTreeMap<String, UserId>,
    admins: BTreeSet<UserId>,
    moderators: BTreeSet<UserId>,
}

/// In-memory implementation of the full backend surface.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<RwLock<MemoryState>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user.
    pub async fn put_user(&self, user: User) {
        self.inner.write().await.users.insert(user.id, user);
    }

    /// Append a pre-built ledger entry.
    pub async fn put_transaction(&self, entry: TokenTransaction) {
        self.inner.write().await.transactions.push(entry);
    }

    /// Create or extend an inventory partition.
    pub async fn put_partition(&self, name: &str, rows: Vec<InventoryRow>) {
        self.inner
            .write()
            .await
            .partitions
            .entry(name.to_owned())
            .or_default()
            .extend(rows);
    }

    /// Mark a partition as broken: it appears in listings but every query
    /// against it fails.
    pub async fn break_partition(&self, name: &str) {
        let mut state = self.inner.write().await;
        state.partitions.entry(name.to_owned()).or_default();
        state.broken_partitions.insert(name.to_owned());
    }

    /// Register a character in the directory.
    pub async fn put_character(&self, id: CharacterId, name: &str) {
        self.inner.write().await.characters.insert(id, name.to_owned());
    }

    /// Register a session token for a user.
    pub async fn put_session(&self, token: &str, user_id: UserId) {
        self.inner.write().await.sessions.insert(token.to_owned(), user_id);
    }

    /// Grant the admin role.
    pub async fn grant_admin(&self, user_id: UserId) {
        self.inner.write().await.admins.insert(user_id);
    }

    /// Grant the moderator role.
    pub async fn grant_moderator(&self, user_id: UserId) {
        self.inner.write().await.moderators.insert(user_id);
    }

    /// Snapshot a user's current state (test helper).
    pub async fn user(&self, id: UserId) -> Option<User> {
        self.inner.read().await.users.get(&id).cloned()
    }

    /// Number of persisted ledger entries (test helper).
    pub async fn transaction_count(&self) -> usize {
        self.inner.read().await.transactions.len()
    }
}

impl UserStore for MemoryBackend {
    async fn fetch_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }
}

impl BankStore for MemoryBackend {
    async fn commit_exchange(
        &self,
        commit: ExchangeCommit,
    ) -> Result<ExchangeReceipt, StoreError> {
        let mut state = self.inner.write().await;

        let Some(user) = state.users.get_mut(&commit.user_id) else {
            return Err(StoreError::UserNotFound(commit.user_id));
        };

        if user.leveling.last_exchanged_level != commit.expected_watermark {
            return Err(StoreError::WatermarkConflict {
                user_id: commit.user_id,
                expected: commit.expected_watermark,
            });
        }

        let balance_before = user.tokens;
        user.leveling = commit.new_state;
        user.tokens = user.tokens.saturating_add(commit.tokens_received);
        let balance_after = user.tokens;

        let entry = TransactionBuilder::new(
            commit.user_id,
            TransactionKind::Earned,
            commit.tokens_received,
        )
        .category(String::from(EXCHANGE_CATEGORY))
        .description(format!(
            "Exchanged {} levels for {} tokens",
            commit.levels_exchanged, commit.tokens_received
        ))
        .balance_before(balance_before)
        .build()?;

        state.transactions.push(entry);

        Ok(ExchangeReceipt {
            levels_exchanged: commit.levels_exchanged,
            tokens_received: commit.tokens_received,
            new_level: commit.new_state.level,
            balance_before,
            balance_after,
        })
    }

    async fn transactions_for_user(
        &self,
        id: UserId,
    ) -> Result<Vec<TokenTransaction>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .transactions
            .iter()
            .filter(|t| t.user_id == id)
            .cloned()
            .collect())
    }
}

impl InventoryPartitions for MemoryBackend {
    async fn list_partitions(&self) -> Result<Vec<String>, PartitionError> {
        Ok(self.inner.read().await.partitions.keys().cloned().collect())
    }

    async fn sum_item_by_character(
        &self,
        partition: &str,
        item_name: &str,
    ) -> Result<Vec<(CharacterId, i64)>, PartitionError> {
        let state = self.inner.read().await;

        if state.broken_partitions.contains(partition) {
            return Err(PartitionError::Partition {
                partition: partition.to_owned(),
                message: String::from("partition marked broken"),
            });
        }

        let needle = item_name.to_lowercase();
        let mut totals: BTreeMap<CharacterId, i64> = BTreeMap::new();
        for row in state.partitions.get(partition).into_iter().flatten() {
            if row.item_name.to_lowercase() == needle {
                let total = totals.entry(row.character_id).or_insert(0);
                *total = total.saturating_add(row.quantity);
            }
        }

        Ok(totals.into_iter().collect())
    }
}

impl CharacterDirectory for MemoryBackend {
    async fn resolve_names(
        &self,
        ids: &[CharacterId],
    ) -> Result<BTreeMap<CharacterId, String>, PartitionError> {
        let state = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.characters.get(id).map(|name| (*id, name.clone())))
            .collect())
    }
}

impl SessionProvider for MemoryBackend {
    async fn current_user(&self, token: &str) -> Result<Option<UserId>, AuthError> {
        Ok(self.inner.read().await.sessions.get(token).copied())
    }
}

impl RoleChecker for MemoryBackend {
    async fn is_admin(&self, id: UserId) -> Result<bool, AuthError> {
        Ok(self.inner.read().await.admins.contains(&id))
    }

    async fn is_moderator(&self, id: UserId) -> Result<bool, AuthError> {
        let state = self.inner.read().await;
        Ok(state.moderators.contains(&id) || state.admins.contains(&id))
    }
}
