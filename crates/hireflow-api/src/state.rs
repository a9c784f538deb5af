// crates/hireflow-api/src/state.rs
// ============================================================================
// Module: Shared Router State
// Description: The one piece of shared state every handler extracts via
//              axum's `State` extractor.
// Dependencies: hireflow-pipeline
// ============================================================================

use std::sync::Arc;

use hireflow_pipeline::PipelineContext;

/// Shared dependencies for every route handler.
///
/// Mirrors `decision-gate-mcp`'s `ServerState` shape (one `Clone` struct
/// wrapping whatever the handlers need, passed to the router via
/// `with_state`) without the transport/rate-limit machinery that server
/// carries — HireFlow's dashboard and webhook surface is plain REST.
#[derive(Clone)]
pub struct AppState {
    /// The pipeline context every handler delegates business logic to.
    pub ctx: Arc<PipelineContext>,
    /// HMAC-SHA256 secret the voice-service webhook is verified against.
    /// An empty secret disables verification (development only).
    pub webhook_secret: Arc<str>,
}

impl AppState {
    /// Builds router state from a pipeline context and webhook secret.
    #[must_use]
    pub fn new(ctx: Arc<PipelineContext>, webhook_secret: impl Into<Arc<str>>) -> Self {
        Self {
            ctx,
            webhook_secret: webhook_secret.into(),
        }
    }
}
