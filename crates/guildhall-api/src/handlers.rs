//! REST endpoint handlers for the Guildhall API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/health` | Liveness probe |
//! | `GET` | `/api/exchange` | Preview exchangeable levels |
//! | `POST` | `/api/exchange` | Exchange levels for tokens |
//! | `GET` | `/api/tokens` | Balance and transaction history |
//! | `GET` | `/api/items/{item_name}/ownership` | World ownership report (moderator) |
//!
//! All `/api` endpoints except the health probe require a bearer session
//! token; the ownership report additionally requires the moderator role.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse};

use guildhall_economy::exchange::{ExchangePreview, preview, settle};
use guildhall_economy::ledger::ledger_view;
use guildhall_economy::store::ExchangeCommit;
use guildhall_inventory::aggregate::aggregate_ownership;
use guildhall_types::{OwnershipReport, TokenTransaction, User, UserId};

use crate::auth::{Backend, authenticate, require_moderator};
use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

/// Body of `GET /api/exchange`.
#[derive(Debug, serde::Serialize)]
pub struct ExchangePreviewResponse {
    /// The user's current level.
    pub current_level: u32,
    /// Highest level already converted to tokens.
    pub last_exchanged_level: u32,
    /// Running count of levels ever exchanged.
    pub total_levels_exchanged: u32,
    /// Whole levels available to exchange right now.
    pub exchangeable_levels: u32,
    /// Tokens those levels would yield.
    pub potential_tokens: i64,
    /// Current token balance.
    pub current_token_balance: i64,
}

/// Body of a successful `POST /api/exchange`.
#[derive(Debug, serde::Serialize)]
pub struct ExchangeResponse {
    /// Always `true` here; declined exchanges respond through the error path.
    pub success: bool,
    /// Levels converted by this exchange.
    pub levels_exchanged: u32,
    /// Tokens credited.
    pub tokens_received: i64,
    /// The user's level after the exchange (unchanged; only the watermark moves).
    pub new_level: u32,
    /// Token balance after the credit.
    pub new_balance: i64,
}

/// Body of `GET /api/tokens`.
#[derive(Debug, serde::Serialize)]
pub struct TokensResponse {
    /// Authoritative current balance.
    pub current_balance: i64,
    /// Sum of earned amounts, including any synthesized legacy entry.
    pub total_earned: i64,
    /// Sum of spent amounts, including any synthesized legacy entry.
    pub total_spent: i64,
    /// Number of entries in `transactions`.
    pub total_transactions: u64,
    /// Full history, oldest first; the legacy entry (if any) is last.
    pub transactions: Vec<TokenTransaction>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn fetch_authenticated_user<B: Backend>(
    state: &AppState<B>,
    headers: &HeaderMap,
) -> Result<User, ApiError> {
    let user_id = authenticate(&state.backend, headers).await?;
    load_user(state, user_id).await
}

async fn load_user<B: Backend>(state: &AppState<B>, user_id: UserId) -> Result<User, ApiError> {
    state
        .backend
        .fetch_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user not found: {user_id}")))
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page listing the API surface.
pub async fn index() -> impl IntoResponse {
    Html(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Guildhall API</title>
    <style>
        body {
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }
        a { color: #58a6ff; }
        code { background: #161b22; padding: 0.1rem 0.3rem; border-radius: 4px; }
    </style>
</head>
<body>
    <h1>Guildhall API</h1>
    <p>Status: <strong>running</strong></p>
    <ul>
        <li><code>GET /api/health</code> &mdash; liveness probe</li>
        <li><code>GET /api/exchange</code> &mdash; preview exchangeable levels</li>
        <li><code>POST /api/exchange</code> &mdash; exchange levels for tokens</li>
        <li><code>GET /api/tokens</code> &mdash; balance and transaction history</li>
        <li><code>GET /api/items/{item_name}/ownership</code> &mdash; world ownership report</li>
    </ul>
</body>
</html>"#,
    )
}

// ---------------------------------------------------------------------------
// GET /api/health
// ---------------------------------------------------------------------------

/// Liveness probe. Always `200 { "status": "ok" }`.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// GET /api/exchange -- preview
// ---------------------------------------------------------------------------

/// Preview how many levels the caller could exchange and what they would
/// yield. Side-effect free.
pub async fn get_exchange<B: Backend>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
) -> Result<Json<ExchangePreviewResponse>, ApiError> {
    let user = fetch_authenticated_user(&state, &headers).await?;
    let ExchangePreview {
        exchangeable_levels,
        potential_tokens,
    } = preview(&user.leveling);

    Ok(Json(ExchangePreviewResponse {
        current_level: user.leveling.level,
        last_exchanged_level: user.leveling.last_exchanged_level,
        total_levels_exchanged: user.leveling.total_levels_exchanged,
        exchangeable_levels,
        potential_tokens,
        current_token_balance: user.tokens,
    }))
}

// ---------------------------------------------------------------------------
// POST /api/exchange -- commit
// ---------------------------------------------------------------------------

/// Exchange every whole level above the watermark for tokens.
///
/// Serialized per user by the in-process exchange lock; the storage layer's
/// watermark compare-and-set catches anything that slips past it. A request
/// with nothing to exchange, or one that loses a race, is declined with
/// `400 { "success": false, ... }` and changes nothing.
pub async fn post_exchange<B: Backend>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
) -> Result<Json<ExchangeResponse>, ApiError> {
    let user_id = authenticate(&state.backend, &headers).await?;

    let lock = state.exchange_lock(user_id).await;
    let _guard = lock.lock().await;

    let user = load_user(&state, user_id).await?;
    let settlement =
        settle(&user.leveling).map_err(|e| ApiError::ExchangeDeclined(e.to_string()))?;

    let receipt = state
        .backend
        .commit_exchange(ExchangeCommit {
            user_id,
            expected_watermark: user.leveling.last_exchanged_level,
            new_state: settlement.new_state,
            levels_exchanged: settlement.levels_exchanged,
            tokens_received: settlement.tokens_received,
        })
        .await?;

    tracing::info!(
        %user_id,
        levels = receipt.levels_exchanged,
        tokens = receipt.tokens_received,
        "exchange committed"
    );

    Ok(Json(ExchangeResponse {
        success: true,
        levels_exchanged: receipt.levels_exchanged,
        tokens_received: receipt.tokens_received,
        new_level: receipt.new_level,
        new_balance: receipt.balance_after,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/tokens -- balance and history
// ---------------------------------------------------------------------------

/// The caller's balance, ledger totals, and full transaction history.
///
/// The history is reconciled against the authoritative balance on every
/// read: when the persisted entries do not account for the balance, a
/// synthetic `legacy` entry dated to account creation closes the gap.
pub async fn get_tokens<B: Backend>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
) -> Result<Json<TokensResponse>, ApiError> {
    let user = fetch_authenticated_user(&state, &headers).await?;
    let entries = state.backend.transactions_for_user(user.id).await?;
    let view = ledger_view(&user, &entries);

    Ok(Json(TokensResponse {
        current_balance: user.tokens,
        total_earned: view.summary.total_earned,
        total_spent: view.summary.total_spent,
        total_transactions: view.summary.total_transactions,
        transactions: view.transactions,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/items/{item_name}/ownership -- world report
// ---------------------------------------------------------------------------

/// Who owns how much of an item, across every character partition.
///
/// Moderator-gated. Item names are matched case-insensitively; partitions
/// that fail to answer are skipped and logged rather than failing the
/// whole report.
pub async fn get_ownership<B: Backend>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
    Path(item_name): Path<String>,
) -> Result<Json<OwnershipReport>, ApiError> {
    let user_id = authenticate(&state.backend, &headers).await?;
    require_moderator(&state.backend, user_id).await?;

    let item_name = item_name.trim();
    if item_name.is_empty() {
        return Err(ApiError::InvalidInput(String::from(
            "item name must not be empty",
        )));
    }

    let report = aggregate_ownership(&state.backend, item_name).await?;
    Ok(Json(report))
}
