// crates/hireflow-api/src/routes/jobs.rs
// ============================================================================
// Module: Jobs Dashboard Routes
// Description: CRUD for job requisitions.
// Dependencies: axum, hireflow-core, hireflow-store-sqlite
// ============================================================================

use std::num::NonZeroU64;

use axum::extract::{Path, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use hireflow_core::decision::Thresholds;
use hireflow_core::model::{Job, JobStatus};
use hireflow_core::JobId;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::error::ApiError;
use crate::state::AppState;

/// Builds the jobs route group.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(list_jobs).post(create_job))
        .route("/jobs/{id}", get(get_job))
        .route("/jobs/{id}/status", patch(set_job_status))
}

async fn list_jobs(State(state): State<AppState>) -> Result<Json<Vec<Job>>, ApiError> {
    Ok(Json(state.ctx.store.list_all_jobs()?))
}

async fn get_job(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Job>, ApiError> {
    let id = JobId::try_from(id)?;
    Ok(Json(state.ctx.store.get_job(id)?))
}

#[derive(Debug, Deserialize)]
struct CreateJobRequest {
    job_code: String,
    title: String,
    #[serde(default)]
    department: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    seniority: String,
    #[serde(default)]
    must_have_skills: Vec<String>,
    #[serde(default)]
    nice_to_have_skills: Vec<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    thresholds: Option<Thresholds>,
}

async fn create_job(
    State(state): State<AppState>,
    Json(body): Json<CreateJobRequest>,
) -> Result<Json<Job>, ApiError> {
    let now = OffsetDateTime::now_utc();
    let job = Job {
        // Placeholder, always overwritten by the id `create_job` assigns.
        id: JobId::new(NonZeroU64::MIN),
        job_code: body.job_code,
        title: body.title,
        department: body.department,
        location: body.location,
        seniority: body.seniority,
        must_have_skills: body.must_have_skills,
        nice_to_have_skills: body.nice_to_have_skills,
        description: body.description,
        thresholds: body.thresholds.unwrap_or(state.ctx.default_thresholds),
        status: JobStatus::Open,
        created_at: now,
        updated_at: now,
    };
    let id = state.ctx.store.create_job(&job)?;
    Ok(Json(Job { id, ..job }))
}

#[derive(Debug, Deserialize)]
struct SetJobStatusRequest {
    status: JobStatus,
}

async fn set_job_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<SetJobStatusRequest>,
) -> Result<Json<Job>, ApiError> {
    let id = JobId::try_from(id)?;
    state.ctx.store.set_job_status(id, body.status, OffsetDateTime::now_utc())?;
    Ok(Json(state.ctx.store.get_job(id)?))
}
