// crates/hireflow-api/src/lib.rs
// ============================================================================
// Crate: hireflow-api
// Description: The REST surface over `hireflow-pipeline` — public
//              candidate-facing endpoints, the voice-service webhook, and
//              the authenticated dashboard API.
// Dependencies: axum, hireflow-pipeline, hireflow-store-sqlite
// ============================================================================

//! ## Overview
//! [`router`] assembles every route group behind one [`state::AppState`].
//! Authentication for the dashboard group is expected to be applied by
//! whatever reverse proxy or `tower` layer the deployment wraps this
//! router with (mirrors how `decision-gate-mcp` leaves TLS termination to
//! its caller rather than baking it into `ServerState`); this crate does
//! not itself implement a login flow.

mod error;
mod routes;
mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::Router;

/// Builds the full HireFlow API router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::screening_public::router())
        .merge(routes::webhook::router())
        .merge(routes::jobs::router())
        .merge(routes::candidates::router())
        .merge(routes::applications::router())
        .merge(routes::screening_actions::router())
        .merge(routes::reports::router())
        .with_state(state)
}
