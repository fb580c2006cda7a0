//! Axum router construction for the Guildhall API.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled for cross-origin dashboard access.

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::Backend;
use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /api/health` -- liveness probe
/// - `GET /api/exchange` -- preview exchangeable levels
/// - `POST /api/exchange` -- exchange levels for tokens
/// - `GET /api/tokens` -- balance and transaction history
/// - `GET /api/items/{item_name}/ownership` -- world ownership report
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router<B: Backend>(state: AppState<B>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // REST API
        .route("/api/health", get(handlers::health))
        .route(
            "/api/exchange",
            get(handlers::get_exchange::<B>).post(handlers::post_exchange::<B>),
        )
        .route("/api/tokens", get(handlers::get_tokens::<B>))
        .route(
            "/api/items/{item_name}/ownership",
            get(handlers::get_ownership::<B>),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
