//! Session and role-check collaborator contracts for the Guildhall backend.
//!
//! Sessions are issued by an external service (the Discord OAuth flow lives
//! elsewhere); this backend only *consumes* them. The [`SessionProvider`]
//! trait resolves an opaque bearer token to a user, and [`RoleChecker`]
//! answers staff-role questions. Production implementations live in
//! `guildhall-db` (Dragonfly session keys, Postgres role table); the
//! in-memory backend implements both for tests.

use core::future::Future;

use guildhall_types::UserId;

/// Errors from session or role lookups.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The underlying session or role storage failed.
    #[error("auth backend error: {0}")]
    Backend(String),
}

/// Resolves opaque session tokens to user identities.
pub trait SessionProvider: Send + Sync {
    /// Return the user the token belongs to, or `None` for an unknown or
    /// expired token. Absence is not an error -- it maps to a 401, while
    /// an `Err` maps to a 500.
    fn current_user(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<UserId>, AuthError>> + Send;
}

/// Answers staff-role questions for a user.
pub trait RoleChecker: Send + Sync {
    /// Whether the user holds the admin role.
    fn is_admin(&self, id: UserId) -> impl Future<Output = Result<bool, AuthError>> + Send;

    /// Whether the user holds the moderator role (admins qualify too).
    fn is_moderator(&self, id: UserId) -> impl Future<Output = Result<bool, AuthError>> + Send;
}
