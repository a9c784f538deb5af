// crates/hireflow-api/src/routes/applications.rs
// ============================================================================
// Module: Applications Dashboard Routes
// Description: Read, stage change, bulk stage change, and CSV export over
//              the recruiting funnel.
// Dependencies: axum, csv, hireflow-core
// ============================================================================

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use hireflow_core::model::{Application, Stage};
use hireflow_core::ApplicationId;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::error::ApiError;
use crate::state::AppState;

/// Builds the applications route group.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/applications", get(list_applications))
        .route("/applications/export.csv", get(export_csv))
        .route("/applications/bulk-stage", post(bulk_set_stage))
        .route("/applications/{id}", get(get_application))
        .route("/applications/{id}/stage", patch(set_stage))
}

#[derive(Debug, Deserialize)]
struct ListFilter {
    job_id: Option<i64>,
    stage: Option<Stage>,
}

fn filtered_applications(state: &AppState, filter: &ListFilter) -> Result<Vec<Application>, ApiError> {
    if let Some(job_id) = filter.job_id {
        let job_id = hireflow_core::JobId::try_from(job_id)?;
        return Ok(state.ctx.store.list_applications_by_job(job_id)?);
    }
    if let Some(stage) = filter.stage {
        return Ok(state.ctx.store.list_applications_by_stage(stage)?);
    }
    Ok(state.ctx.store.list_all_applications()?)
}

async fn list_applications(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<Application>>, ApiError> {
    Ok(Json(filtered_applications(&state, &filter)?))
}

async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Application>, ApiError> {
    let id = ApplicationId::try_from(id)?;
    Ok(Json(state.ctx.store.get_application(id)?))
}

#[derive(Debug, Deserialize)]
struct SetStageRequest {
    stage: Stage,
}

async fn set_stage(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<SetStageRequest>,
) -> Result<Json<Application>, ApiError> {
    let id = ApplicationId::try_from(id)?;
    let now = OffsetDateTime::now_utc();
    state.ctx.store.set_application_stage_with_event(
        id,
        body.stage,
        "recruiter_stage_change",
        &serde_json::json!({ "stage": format!("{:?}", body.stage) }),
        now,
    )?;
    Ok(Json(state.ctx.store.get_application(id)?))
}

#[derive(Debug, Deserialize)]
struct BulkStageRequest {
    application_ids: Vec<i64>,
    stage: Stage,
}

#[derive(Debug, serde::Serialize)]
struct BulkStageResponse {
    updated: Vec<i64>,
    failed: Vec<i64>,
}

async fn bulk_set_stage(
    State(state): State<AppState>,
    Json(body): Json<BulkStageRequest>,
) -> Result<Json<BulkStageResponse>, ApiError> {
    let now = OffsetDateTime::now_utc();
    let mut updated = Vec::new();
    let mut failed = Vec::new();
    for raw_id in body.application_ids {
        let Ok(id) = ApplicationId::try_from(raw_id) else {
            failed.push(raw_id);
            continue;
        };
        let result = state.ctx.store.set_application_stage_with_event(
            id,
            body.stage,
            "recruiter_bulk_stage_change",
            &serde_json::json!({ "stage": format!("{:?}", body.stage) }),
            now,
        );
        if result.is_ok() {
            updated.push(raw_id);
        } else {
            failed.push(raw_id);
        }
    }
    Ok(Json(BulkStageResponse { updated, failed }))
}

async fn export_csv(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let applications = filtered_applications(&state, &filter)?;
    let mut writer = csv::Writer::from_writer(Vec::new());
    for app in &applications {
        writer
            .write_record([
                app.id.to_string(),
                app.candidate_id.to_string(),
                app.job_id.to_string(),
                format!("{:?}", app.stage),
                app.resume_score.map(|v| v.to_string()).unwrap_or_default(),
                app.interview_score.map(|v| v.to_string()).unwrap_or_default(),
                app.final_score.map(|v| v.to_string()).unwrap_or_default(),
                app.recommendation.map(|v| format!("{v:?}")).unwrap_or_default(),
                app.created_at.to_string(),
            ])
            .map_err(|err| ApiError::from(hireflow_core::PipelineError::invariant(err.to_string())))?;
    }
    let body = writer
        .into_inner()
        .map_err(|err| ApiError::from(hireflow_core::PipelineError::invariant(err.to_string())))?;
    Ok((
        [(header::CONTENT_TYPE, "text/csv")],
        body,
    ))
}
