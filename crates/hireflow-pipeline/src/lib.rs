// crates/hireflow-pipeline/src/lib.rs
// ============================================================================
// Crate: hireflow-pipeline
// Description: The recruiting pipeline itself — ingestion, the interview
//              link sub-engine, and the decision engine, wired together
//              through a single `PipelineContext`.
// Dependencies: hireflow-core, hireflow-oracles, hireflow-store-sqlite
// ============================================================================

//! ## Overview
//! `hireflow-api` and `hireflow-cli` both depend on this crate and neither
//! touches `hireflow-store-sqlite` directly — every state transition an
//! Application goes through is reachable only via [`context::PipelineContext`]
//! and the functions in [`ingest`], [`interview_link`], and [`evaluation`].

/// Shared dependencies every pipeline entry point borrows.
pub mod context;
/// Scores a submitted transcript and applies the advance/hold/reject
/// side effects.
pub mod evaluation;
/// Walks an inbound Email through classification, matching, and
/// auto-advance.
pub mod ingest;
/// Issues, validates, and tracks the candidate-facing interview token.
pub mod interview_link;
/// Best-effort outbound candidate email delivery.
pub mod mail;
mod matching;

pub use context::{PipelineContext, DEFAULT_LINK_EXPIRY};
pub use ingest::{run_email_workflow, IngestOutcome};
pub use interview_link::{
    issue_link, mark_interview_started, record_telemetry, send_link, submit_transcript,
    validate_link, TranscriptOutcome, ValidationOutcome,
};
pub use mail::{HttpMailTransport, LoggingMailTransport, MailTransport, OutboundEmail};
