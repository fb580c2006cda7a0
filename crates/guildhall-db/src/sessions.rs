//! Dragonfly (Redis-compatible) session lookups.
//!
//! Sessions are written by the external auth service; this backend only
//! reads them. Key pattern:
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `session:{token}` | JSON | `{"user_id": "<uuid>"}` plus service fields |
//!
//! Expiry is handled by the auth service via key TTLs, so an expired
//! session simply stops existing.

use fred::prelude::*;
use guildhall_auth::{AuthError, SessionProvider};
use guildhall_types::UserId;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::DbError;
use crate::postgres::PgBackend;

/// The session payload fields this backend cares about. The auth service
/// stores more; unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct SessionRecord {
    /// The authenticated user.
    user_id: Uuid,
}

/// Connection handle to the Dragonfly instance holding sessions.
#[derive(Clone)]
pub struct SessionCache {
    client: Client,
}

impl SessionCache {
    /// Connect to Dragonfly at the given URL.
    ///
    /// The URL follows the Redis URL scheme: `redis://host:port` or
    /// `redis://host:port/db`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed.
    /// Returns [`DbError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let config = Config::from_url(url)
            .map_err(|e| DbError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to Dragonfly");
        Ok(Self { client })
    }

    /// Look up the session for an opaque token. `None` means unknown or
    /// expired.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the read fails, or
    /// [`DbError::Serialization`] if the stored payload is not valid JSON.
    pub async fn lookup(&self, token: &str) -> Result<Option<UserId>, DbError> {
        let key = format!("session:{token}");
        let value: Option<String> = self.client.get(&key).await?;
        let Some(json) = value else {
            return Ok(None);
        };
        let record: SessionRecord = serde_json::from_str(&json)?;
        Ok(Some(UserId::from(record.user_id)))
    }
}

impl SessionProvider for PgBackend {
    async fn current_user(&self, token: &str) -> Result<Option<UserId>, AuthError> {
        self.sessions()
            .lookup(token)
            .await
            .map_err(|e| AuthError::Backend(e.to_string()))
    }
}
