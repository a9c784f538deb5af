// crates/hireflow-api/src/routes/webhook.rs
// ============================================================================
// Module: Voice-Service Webhook
// Description: The signed, unauthenticated endpoint the external voice
//              provider posts call outcomes to.
// Dependencies: axum, hmac, sha2, hireflow-pipeline
// ============================================================================

//! ## Overview
//! The signature is HMAC-SHA256 of the raw request body, hex-encoded, in
//! the `X-Webhook-Signature` header. An empty configured secret disables
//! verification entirely (development mode). Per the propagation policy,
//! a transient failure evaluating a transcript is never surfaced as a 5xx
//! here — the transcript is already durably stored by the time evaluation
//! runs, so the sender has nothing left to retry.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use time::OffsetDateTime;
use tracing::warn;

use hireflow_pipeline::interview_link;

use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Builds the voice-service webhook route group.
pub fn router() -> Router<AppState> {
    Router::new().route("/screening/webhook/external", post(handle_webhook))
}

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct PostCallTranscription {
    conversation_id: String,
    transcript: Vec<TranscriptTurn>,
    #[serde(default)]
    #[allow(dead_code, reason = "carried for schema fidelity; not consumed downstream")]
    analysis: Option<serde_json::Value>,
    #[serde(default)]
    #[allow(dead_code, reason = "carried for schema fidelity; not consumed downstream")]
    metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TranscriptTurn {
    role: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct CallInitiationFailure {
    conversation_id: String,
    failure_reason: String,
}

#[derive(Debug, Serialize)]
struct WebhookAck {
    received: bool,
}

fn flatten_transcript(turns: &[TranscriptTurn]) -> String {
    turns
        .iter()
        .map(|turn| format!("{}: {}", turn.role, turn.message))
        .collect::<Vec<_>>()
        .join("\n")
}

fn verify_signature(secret: &str, body: &[u8], signature_hex: Option<&str>) -> bool {
    if secret.is_empty() {
        return true;
    }
    let Some(signature_hex) = signature_hex else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    let Ok(signature) = hex_decode(signature_hex) else {
        return false;
    };
    mac.verify_slice(&signature).is_ok()
}

fn hex_decode(s: &str) -> Result<Vec<u8>, ()> {
    if s.len() % 2 != 0 {
        return Err(());
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| ()))
        .collect()
}

async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<WebhookAck>) {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    if !verify_signature(&state.webhook_secret, &body, signature) {
        warn!("webhook signature verification failed");
        return (StatusCode::UNAUTHORIZED, Json(WebhookAck { received: false }));
    }

    let envelope: WebhookEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!(%err, "malformed webhook body");
            return (StatusCode::BAD_REQUEST, Json(WebhookAck { received: false }));
        }
    };

    match envelope.event_type.as_str() {
        "post_call_transcription" => handle_transcription(&state, envelope.data).await,
        "call_initiation_failure" => handle_failure(&state, envelope.data).await,
        other => {
            warn!(event_type = other, "unrecognized webhook event type");
            (StatusCode::OK, Json(WebhookAck { received: true }))
        }
    }
}

async fn handle_transcription(state: &AppState, data: serde_json::Value) -> (StatusCode, Json<WebhookAck>) {
    let payload: PostCallTranscription = match serde_json::from_value(data) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(%err, "malformed post_call_transcription payload");
            return (StatusCode::BAD_REQUEST, Json(WebhookAck { received: false }));
        }
    };

    let link = match state
        .ctx
        .store
        .find_interview_link_by_conversation_id(&payload.conversation_id)
    {
        Ok(link) => link,
        Err(err) => {
            warn!(%err, conversation_id = %payload.conversation_id, "no link for conversation");
            return (StatusCode::OK, Json(WebhookAck { received: true }));
        }
    };

    let transcript = flatten_transcript(&payload.transcript);
    if let Err(err) =
        interview_link::submit_transcript(&state.ctx, link.token, &transcript, OffsetDateTime::now_utc()).await
    {
        // Per the propagation policy, the sender must not retry a transcript
        // that is already durably stored; only persistence failures matter,
        // and those are logged, not surfaced as a 5xx.
        warn!(%err, token = %link.token, "transcript evaluation failed");
    }
    (StatusCode::OK, Json(WebhookAck { received: true }))
}

async fn handle_failure(state: &AppState, data: serde_json::Value) -> (StatusCode, Json<WebhookAck>) {
    let payload: CallInitiationFailure = match serde_json::from_value(data) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(%err, "malformed call_initiation_failure payload");
            return (StatusCode::BAD_REQUEST, Json(WebhookAck { received: false }));
        }
    };

    let link = match state
        .ctx
        .store
        .find_interview_link_by_conversation_id(&payload.conversation_id)
    {
        Ok(link) => link,
        Err(err) => {
            warn!(%err, conversation_id = %payload.conversation_id, "no link for conversation");
            return (StatusCode::OK, Json(WebhookAck { received: true }));
        }
    };

    if let Err(err) = state.ctx.store.append_event(
        Some(link.app_id),
        "call_initiation_failed",
        &serde_json::json!({
            "token": link.token.to_string(),
            "conversation_id": payload.conversation_id,
            "failure_reason": payload.failure_reason,
        }),
        OffsetDateTime::now_utc(),
    ) {
        warn!(%err, token = %link.token, "failed to record call initiation failure");
    }
    (StatusCode::OK, Json(WebhookAck { received: true }))
}
