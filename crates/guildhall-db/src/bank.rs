//! Token balance and ledger persistence against `PostgreSQL`.
//!
//! [`commit_exchange`](BankStore::commit_exchange) is the one write path of
//! the exchange engine and runs as a single transaction: a compare-and-set
//! `UPDATE` on the leveling watermark that also credits the balance,
//! followed by the ledger `INSERT`. If the watermark moved since the caller
//! read it, zero rows match and nothing applies -- no partial application,
//! no double-credit.

use guildhall_economy::exchange::EXCHANGE_CATEGORY;
use guildhall_economy::ledger::TransactionBuilder;
use guildhall_economy::store::{BankStore, ExchangeCommit, ExchangeReceipt, StoreError};
use guildhall_types::{TokenTransaction, TransactionId, TransactionKind, UserId};
use uuid::Uuid;

use crate::postgres::PgBackend;

/// A row from the `token_transactions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransactionRow {
    /// Entry UUID.
    pub id: Uuid,
    /// Account UUID.
    pub user_id: Uuid,
    /// Positive amount.
    pub amount: i64,
    /// `"earned"` or `"spent"`.
    pub kind: String,
    /// Category tag.
    pub category: String,
    /// Human-readable description.
    pub description: String,
    /// Optional cause link.
    pub link: Option<String>,
    /// Balance before the change.
    pub balance_before: i64,
    /// Balance after the change.
    pub balance_after: i64,
    /// When the change happened.
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<TransactionRow> for TokenTransaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self, StoreError> {
        let kind = match row.kind.as_str() {
            "earned" => TransactionKind::Earned,
            "spent" => TransactionKind::Spent,
            other => {
                return Err(StoreError::Backend(format!(
                    "unknown transaction kind in ledger: {other}"
                )));
            }
        };
        Ok(Self {
            id: TransactionId::from(row.id),
            user_id: UserId::from(row.user_id),
            amount: row.amount,
            kind,
            category: row.category,
            description: row.description,
            link: row.link,
            balance_before: row.balance_before,
            balance_after: row.balance_after,
            created_at: row.created_at,
        })
    }
}

impl BankStore for PgBackend {
    async fn commit_exchange(
        &self,
        commit: ExchangeCommit,
    ) -> Result<ExchangeReceipt, StoreError> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        // CAS on the watermark; the same statement credits the balance so
        // the two writes can never apply separately.
        let balance_after: Option<i64> = sqlx::query_scalar(
            r"UPDATE users
              SET last_exchanged_level = $1,
                  total_levels_exchanged = $2,
                  tokens = tokens + $3
              WHERE id = $4 AND last_exchanged_level = $5
              RETURNING tokens",
        )
        .bind(i64::from(commit.new_state.last_exchanged_level))
        .bind(i64::from(commit.new_state.total_levels_exchanged))
        .bind(commit.tokens_received)
        .bind(commit.user_id.into_inner())
        .bind(i64::from(commit.expected_watermark))
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let Some(balance_after) = balance_after else {
            // Either the user vanished or the watermark moved; both mean
            // this settlement is stale.
            return Err(StoreError::WatermarkConflict {
                user_id: commit.user_id,
                expected: commit.expected_watermark,
            });
        };

        let balance_before = balance_after.saturating_sub(commit.tokens_received);

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

        insert_transaction(&mut tx, &entry).await?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        tracing::info!(
            user_id = %commit.user_id,
            levels = commit.levels_exchanged,
            tokens = commit.tokens_received,
            "exchange committed"
        );

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
        let rows = sqlx::query_as::<_, TransactionRow>(
            r"SELECT id, user_id, amount, kind, category, description, link,
                     balance_before, balance_after, created_at
              FROM token_transactions
              WHERE user_id = $1
              ORDER BY created_at",
        )
        .bind(id.into_inner())
        .fetch_all(self.pool())
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        rows.into_iter().map(TokenTransaction::try_from).collect()
    }
}

/// Append one ledger entry inside an open transaction.
async fn insert_transaction(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    entry: &TokenTransaction,
) -> Result<(), StoreError> {
    sqlx::query(
        r"INSERT INTO token_transactions
              (id, user_id, amount, kind, category, description, link,
               balance_before, balance_after, created_at)
          VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(entry.id.into_inner())
    .bind(entry.user_id.into_inner())
    .bind(entry.amount)
    .bind(entry.kind.as_str())
    .bind(&entry.category)
    .bind(&entry.description)
    .bind(&entry.link)
    .bind(entry.balance_before)
    .bind(entry.balance_after)
    .bind(entry.created_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| StoreError::Backend(e.to_string()))?;

    Ok(())
}
