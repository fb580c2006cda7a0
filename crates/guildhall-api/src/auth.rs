//! Request authentication and role gating.
//!
//! Every `/api` endpoint expects a bearer token in the `Authorization`
//! header. The token is resolved to a user through the backend's session
//! provider; role-gated endpoints additionally check the staff role table.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

use guildhall_auth::{RoleChecker, SessionProvider};
use guildhall_economy::store::{BankStore, UserStore};
use guildhall_inventory::partition::{CharacterDirectory, InventoryPartitions};
use guildhall_types::UserId;

use crate::error::ApiError;

/// The full backend surface the API needs, as one bound.
///
/// Blanket-implemented for anything that implements all six traits, so
/// both the Postgres and in-memory backends qualify automatically.
pub trait Backend:
    UserStore
    + BankStore
    + InventoryPartitions
    + CharacterDirectory
    + SessionProvider
    + RoleChecker
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> Backend for T where
    T: UserStore
        + BankStore
        + InventoryPartitions
        + CharacterDirectory
        + SessionProvider
        + RoleChecker
        + Clone
        + Send
        + Sync
        + 'static
{
}

/// Extract the bearer token from the `Authorization` header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized(String::from("missing authorization header")))?;

    let value = value
        .to_str()
        .map_err(|_| ApiError::Unauthorized(String::from("malformed authorization header")))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized(String::from("expected a bearer token")))
}

/// Resolve the request's bearer token to a user id.
pub async fn authenticate<B: Backend>(
    backend: &B,
    headers: &HeaderMap,
) -> Result<UserId, ApiError> {
    let token = bearer_token(headers)?;
    backend
        .current_user(token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(String::from("invalid or expired session")))
}

/// Require the caller to hold the moderator role (admins qualify).
pub async fn require_moderator<B: Backend>(
    backend: &B,
    user_id: UserId,
) -> Result<(), ApiError> {
    if backend.is_moderator(user_id).await? {
        Ok(())
    } else {
        Err(ApiError::Forbidden(String::from(
            "moderator role required",
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers).ok(), Some("abc123"));
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn non_bearer_scheme_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert!(matches!(
            bearer_token(&headers),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn empty_token_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_err());
    }
}
