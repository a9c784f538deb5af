// crates/hireflow-api/src/routes/screening_public.rs
// ============================================================================
// Module: Public Candidate-Facing Routes
// Description: The token-authenticated endpoints the self-serve interview
//              widget calls directly — no other auth.
// Dependencies: axum, hireflow-core, hireflow-pipeline, time
// ============================================================================

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use hireflow_core::telemetry::TelemetrySnapshot;
use hireflow_core::LinkToken;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use hireflow_pipeline::interview_link::{self, TranscriptOutcome, ValidationOutcome};

use crate::error::ApiError;
use crate::state::AppState;

/// Builds the public, token-authenticated route group.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/screening/link/{token}", get(get_link))
        .route("/screening/link/{token}/status", post(post_status))
        .route("/screening/link/{token}/face-tracking", post(post_face_tracking))
        .route("/screening/link/{token}/transcript", post(post_transcript))
}

fn parse_token(raw: &str) -> Result<LinkToken, ApiError> {
    LinkToken::parse(raw).map_err(ApiError::from)
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Response body for `GET /screening/link/{token}`.
#[derive(Debug, Serialize)]
struct LinkDescriptor {
    is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidate_first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_agent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    screening_questions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
}

async fn get_link(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<LinkDescriptor>, ApiError> {
    let token = parse_token(&token)?;
    let outcome = interview_link::validate_link(&state.ctx, token, now()).await?;
    let descriptor = match outcome {
        ValidationOutcome::Valid {
            candidate_first_name,
            job_title,
            company_name,
            external_agent_id,
            screening_questions,
        } => LinkDescriptor {
            is_valid: true,
            candidate_first_name: Some(candidate_first_name),
            job_title: Some(job_title),
            company_name: Some(company_name),
            external_agent_id: Some(external_agent_id),
            screening_questions: Some(screening_questions),
            reason: None,
        },
        ValidationOutcome::Invalid => LinkDescriptor {
            is_valid: false,
            candidate_first_name: None,
            job_title: None,
            company_name: None,
            external_agent_id: None,
            screening_questions: None,
            reason: Some("invalid"),
        },
        ValidationOutcome::Expired => LinkDescriptor {
            is_valid: false,
            candidate_first_name: None,
            job_title: None,
            company_name: None,
            external_agent_id: None,
            screening_questions: None,
            reason: Some("expired"),
        },
        ValidationOutcome::InterviewCompleted => LinkDescriptor {
            is_valid: false,
            candidate_first_name: None,
            job_title: None,
            company_name: None,
            external_agent_id: None,
            screening_questions: None,
            reason: Some("interview_completed"),
        },
    };
    Ok(Json(descriptor))
}

/// Status values the candidate widget reports.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ReportedStatus {
    InterviewStarted,
    InterviewCompleted,
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: ReportedStatus,
    #[serde(default)]
    external_conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct Ack {
    ok: bool,
}

async fn post_status(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Ack>, ApiError> {
    let token = parse_token(&token)?;
    let now = now();
    match body.status {
        ReportedStatus::InterviewStarted => {
            interview_link::mark_interview_started(&state.ctx, token, now).await?;
            if let Some(conversation_id) = body.external_conversation_id.as_deref() {
                state.ctx.store.set_interview_link_conversation_id(token, conversation_id)?;
            }
        }
        ReportedStatus::InterviewCompleted => {
            // The transcript endpoint is the authoritative completion path
            // (it triggers the decision engine); this is advisory telemetry
            // from the widget that the call itself has ended.
            let link = state.ctx.store.get_interview_link(token)?;
            state.ctx.store.append_event(
                Some(link.app_id),
                "interview_status_reported",
                &serde_json::json!({
                    "token": token.to_string(),
                    "status": "interview_completed",
                    "external_conversation_id": body.external_conversation_id,
                }),
                now,
            )?;
        }
    }
    Ok(Json(Ack { ok: true }))
}

#[derive(Debug, Deserialize)]
struct FaceTrackingRequest {
    face_present: bool,
    attention_score: f64,
    #[allow(dead_code, reason = "carried for schema fidelity; not part of the aggregate")]
    timestamp: Option<String>,
    #[allow(dead_code, reason = "carried for schema fidelity; not part of the aggregate")]
    face_count: Option<u32>,
}

async fn post_face_tracking(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(body): Json<FaceTrackingRequest>,
) -> Result<Json<Ack>, ApiError> {
    let token = parse_token(&token)?;
    let snapshot = TelemetrySnapshot {
        attention: body.attention_score,
        face_present: body.face_present,
    };
    interview_link::record_telemetry(&state.ctx, token, snapshot, now()).await?;
    Ok(Json(Ack { ok: true }))
}

#[derive(Debug, Deserialize)]
struct TranscriptRequest {
    transcript: String,
    #[allow(dead_code, reason = "carried for schema fidelity; not persisted separately")]
    duration_seconds: Option<f64>,
    #[serde(default)]
    external_conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct TranscriptResponse {
    status: &'static str,
}

async fn post_transcript(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(body): Json<TranscriptRequest>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let token = parse_token(&token)?;
    if let Some(conversation_id) = body.external_conversation_id.as_deref() {
        state.ctx.store.set_interview_link_conversation_id(token, conversation_id)?;
    }
    let outcome = interview_link::submit_transcript(&state.ctx, token, &body.transcript, now()).await?;
    let status = match outcome {
        TranscriptOutcome::AlreadyRecorded => "already_recorded",
        TranscriptOutcome::EvaluatedSuccessfully => "evaluated_successfully",
        TranscriptOutcome::StoredPendingEvaluation => "stored_pending_evaluation",
    };
    Ok(Json(TranscriptResponse { status }))
}
