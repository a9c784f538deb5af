// crates/hireflow-api/src/error.rs
// ============================================================================
// Module: API Error Mapping
// Description: Translates `PipelineError` (and the store error it wraps)
//              onto the HTTP status codes the error-handling design names.
// Dependencies: axum, hireflow-core, serde_json
// ============================================================================

//! ## Overview
//! One wrapper type, [`ApiError`], implements `IntoResponse` so every
//! handler can just propagate a [`hireflow_core::PipelineError`] with `?`.
//! The status mapping follows the taxonomy verbatim: `NotFound` → 404,
//! `Conflict` → 409, `InputValidation` → 400, `Invariant` → 500 (a bug,
//! not a client mistake), `TransientExternal`/`PermanentExternal` → 502.
//! Webhook handlers never let this type reach their response — they
//! intercept a transient failure before it would otherwise become one,
//! per the propagation policy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hireflow_core::PipelineError;
use serde::Serialize;

/// The typed JSON error body every handler returns on failure.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

/// Wraps a [`PipelineError`] for use as an axum handler's error type.
#[derive(Debug)]
pub struct ApiError(pub PipelineError);

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self(err)
    }
}

impl From<hireflow_store_sqlite::SqliteStoreError> for ApiError {
    fn from(err: hireflow_store_sqlite::SqliteStoreError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self.0 {
            PipelineError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            PipelineError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            PipelineError::InputValidation(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            PipelineError::Invariant(_) => (StatusCode::INTERNAL_SERVER_ERROR, "invariant_violation"),
            PipelineError::TransientExternal(_) => (StatusCode::BAD_GATEWAY, "transient_external"),
            PipelineError::PermanentExternal(_) => (StatusCode::BAD_GATEWAY, "permanent_external"),
        };
        let body = ErrorBody {
            error: kind,
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
