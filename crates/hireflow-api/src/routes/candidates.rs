// crates/hireflow-api/src/routes/candidates.rs
// ============================================================================
// Module: Candidates Dashboard Routes
// Description: Read-only candidate listing plus recruiter notes.
// Dependencies: axum, hireflow-core
// ============================================================================

use axum::extract::{Path, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use hireflow_core::model::Candidate;
use hireflow_core::CandidateId;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::error::ApiError;
use crate::state::AppState;

/// Builds the candidates route group.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/candidates", get(list_candidates))
        .route("/candidates/{id}", get(get_candidate))
        .route("/candidates/{id}/notes", patch(update_notes))
}

async fn list_candidates(State(state): State<AppState>) -> Result<Json<Vec<Candidate>>, ApiError> {
    Ok(Json(state.ctx.store.list_all_candidates()?))
}

async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Candidate>, ApiError> {
    let id = CandidateId::try_from(id)?;
    Ok(Json(state.ctx.store.get_candidate(id)?))
}

#[derive(Debug, Deserialize)]
struct UpdateNotesRequest {
    notes: String,
}

async fn update_notes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateNotesRequest>,
) -> Result<Json<Candidate>, ApiError> {
    let id = CandidateId::try_from(id)?;
    state.ctx.store.update_candidate_notes(id, &body.notes, OffsetDateTime::now_utc())?;
    Ok(Json(state.ctx.store.get_candidate(id)?))
}
