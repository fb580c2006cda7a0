//! User account reads and staff role checks against `PostgreSQL`.

use guildhall_auth::{AuthError, RoleChecker};
use guildhall_economy::store::{StoreError, UserStore};
use guildhall_types::{LevelingState, User, UserId};
use uuid::Uuid;

use crate::postgres::PgBackend;

/// A row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    /// Account UUID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Authoritative token balance.
    pub tokens: i64,
    /// Current level.
    pub level: i32,
    /// Cumulative XP.
    pub xp: i64,
    /// Total XP-earning messages.
    pub total_messages: i64,
    /// Exchange watermark.
    pub last_exchanged_level: i32,
    /// Running count of exchanged levels.
    pub total_levels_exchanged: i32,
    /// Whether progression was imported from an external bot.
    pub has_imported_history: bool,
    /// Imported level, if any.
    pub imported_level: Option<i32>,
    /// Account creation time.
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from(row.id),
            name: row.name,
            tokens: row.tokens,
            leveling: LevelingState {
                level: u32::try_from(row.level).unwrap_or(0),
                xp: u64::try_from(row.xp).unwrap_or(0),
                total_messages: u64::try_from(row.total_messages).unwrap_or(0),
                last_exchanged_level: u32::try_from(row.last_exchanged_level).unwrap_or(0),
                total_levels_exchanged: u32::try_from(row.total_levels_exchanged).unwrap_or(0),
                has_imported_history: row.has_imported_history,
                imported_level: row.imported_level.and_then(|l| u32::try_from(l).ok()),
            },
            created_at: row.created_at,
        }
    }
}

impl UserStore for PgBackend {
    async fn fetch_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"SELECT id, name, tokens, level, xp, total_messages, last_exchanged_level,
                     total_levels_exchanged, has_imported_history, imported_level, created_at
              FROM users
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(row.map(User::from))
    }
}

impl RoleChecker for PgBackend {
    async fn is_admin(&self, id: UserId) -> Result<bool, AuthError> {
        role_exists(self, id, &["admin"]).await
    }

    async fn is_moderator(&self, id: UserId) -> Result<bool, AuthError> {
        // Admins hold every moderator privilege.
        role_exists(self, id, &["admin", "moderator"]).await
    }
}

/// Whether the user holds any of the given roles.
async fn role_exists(
    backend: &PgBackend,
    id: UserId,
    roles: &[&str],
) -> Result<bool, AuthError> {
    let roles: Vec<String> = roles.iter().map(|r| (*r).to_owned()).collect();
    let exists: bool = sqlx::query_scalar(
        r"SELECT EXISTS(SELECT 1 FROM staff_roles WHERE user_id = $1 AND role = ANY($2))",
    )
    .bind(id.into_inner())
    .bind(&roles)
    .fetch_one(backend.pool())
    .await
    .map_err(|e| AuthError::Backend(e.to_string()))?;

    Ok(exists)
}
