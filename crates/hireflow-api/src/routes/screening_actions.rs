// crates/hireflow-api/src/routes/screening_actions.rs
// ============================================================================
// Module: Screening Dashboard Actions
// Description: Recruiter-triggered actions against a single application's
//              screening flow — link issuance/delivery, manual scheduling,
//              re-evaluation, and outbound email.
// Dependencies: axum, hireflow-pipeline, tokio
// ============================================================================

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use hireflow_core::model::InterviewLink;
use hireflow_core::{ApplicationId, PipelineError};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::error::ApiError;
use crate::state::AppState;

/// Builds the screening-actions route group.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/applications/{id}/screening/generate-link", post(generate_link))
        .route("/applications/{id}/screening/send-link", post(send_link))
        .route("/applications/{id}/screening/book-slot", post(book_slot))
        .route(
            "/applications/{id}/screening/calculate-final-score",
            post(calculate_final_score),
        )
        .route("/applications/{id}/screening/send-rejection", post(send_rejection))
        .route("/applications/{id}/screening/send-draft", post(send_draft))
        .route("/applications/{id}/screening/send-custom-email", post(send_custom_email))
        .route("/applications/{id}/screening/audio-proxy", get(audio_proxy))
}

async fn generate_link(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<InterviewLink>, ApiError> {
    let id = ApplicationId::try_from(id)?;
    let now = OffsetDateTime::now_utc();
    let existing_round = state
        .ctx
        .store
        .get_latest_interview_link(id)?
        .map_or(0, |link| link.round);
    let link = hireflow_pipeline::issue_link(&state.ctx, id, existing_round.saturating_add(1), now).await?;
    Ok(Json(link))
}

#[derive(Debug, serde::Serialize)]
struct SendLinkResponse {
    sent: bool,
}

async fn send_link(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SendLinkResponse>, ApiError> {
    let id = ApplicationId::try_from(id)?;
    let now = OffsetDateTime::now_utc();
    let app = state.ctx.store.get_application(id)?;
    let job = state.ctx.store.get_job(app.job_id)?;
    let candidate = state.ctx.store.get_candidate(app.candidate_id)?;
    let link = state
        .ctx
        .store
        .get_latest_interview_link(id)?
        .ok_or_else(|| PipelineError::not_found(format!("no interview link issued for application {id}")))?;
    let sent =
        hireflow_pipeline::send_link(&state.ctx, &link, &job, &candidate.email, &candidate.name, now).await?;
    Ok(Json(SendLinkResponse { sent }))
}

#[derive(Debug, Deserialize)]
struct BookSlotRequest {
    slot: String,
}

async fn book_slot(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<BookSlotRequest>,
) -> Result<Json<hireflow_core::model::Application>, ApiError> {
    let id = ApplicationId::try_from(id)?;
    state.ctx.store.set_booked_slot(id, &body.slot, OffsetDateTime::now_utc())?;
    Ok(Json(state.ctx.store.get_application(id)?))
}

async fn calculate_final_score(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<hireflow_core::model::Application>, ApiError> {
    let id = ApplicationId::try_from(id)?;
    hireflow_pipeline::evaluation::evaluate(&state.ctx, id, OffsetDateTime::now_utc()).await?;
    Ok(Json(state.ctx.store.get_application(id)?))
}

#[derive(Debug, serde::Serialize)]
struct SendEmailResponse {
    sent: bool,
}

async fn send_rejection(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    let id = ApplicationId::try_from(id)?;
    let app = state.ctx.store.get_application(id)?;
    let job = state.ctx.store.get_job(app.job_id)?;
    let candidate = state.ctx.store.get_candidate(app.candidate_id)?;
    let message = hireflow_pipeline::OutboundEmail {
        to_address: candidate.email,
        to_name: candidate.name,
        subject: format!("Update on your {} application", job.title),
        body: app
            .interview_score_detail
            .as_ref()
            .map(|detail| detail.summary.clone())
            .unwrap_or_else(|| "Thank you for your interest; we will not be moving forward at this time.".to_owned()),
    };
    let sent = state.ctx.mail.send(&message).await;
    if sent {
        state.ctx.store.set_email_draft_sent(id, OffsetDateTime::now_utc())?;
    }
    Ok(Json(SendEmailResponse { sent }))
}

async fn send_draft(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    let id = ApplicationId::try_from(id)?;
    let app = state.ctx.store.get_application(id)?;
    let job = state.ctx.store.get_job(app.job_id)?;
    let candidate = state.ctx.store.get_candidate(app.candidate_id)?;
    let draft = app
        .interview_score_detail
        .as_ref()
        .map(|detail| detail.email_draft.clone())
        .ok_or_else(|| PipelineError::invariant(format!("application {id} has no interview evaluation yet")))?;
    let message = hireflow_pipeline::OutboundEmail {
        to_address: candidate.email,
        to_name: candidate.name,
        subject: format!("You're moving forward: {}", job.title),
        body: draft,
    };
    let sent = state.ctx.mail.send(&message).await;
    if sent {
        state.ctx.store.set_email_draft_sent(id, OffsetDateTime::now_utc())?;
    }
    Ok(Json(SendEmailResponse { sent }))
}

#[derive(Debug, Deserialize)]
struct CustomEmailRequest {
    subject: String,
    body: String,
}

async fn send_custom_email(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<CustomEmailRequest>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    let id = ApplicationId::try_from(id)?;
    let app = state.ctx.store.get_application(id)?;
    let candidate = state.ctx.store.get_candidate(app.candidate_id)?;
    let message = hireflow_pipeline::OutboundEmail {
        to_address: candidate.email,
        to_name: candidate.name,
        subject: body.subject,
        body: body.body,
    };
    let sent = state.ctx.mail.send(&message).await;
    Ok(Json(SendEmailResponse { sent }))
}

async fn audio_proxy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let id = ApplicationId::try_from(id)?;
    let app = state.ctx.store.get_application(id)?;
    let path = app
        .screening_audio_path
        .ok_or_else(|| PipelineError::not_found(format!("application {id} has no screening audio")))?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|err| PipelineError::transient_external(err.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], Bytes::from(bytes)))
}
