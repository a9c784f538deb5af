// crates/hireflow-oracles/src/lib.rs
// ============================================================================
// Crate: hireflow-oracles
// Description: Live-backed external oracle clients with deterministic
//              fallbacks — the classifier, scorer, evaluator, and generator
//              clients the pipeline drives every email and application
//              through.
// Purpose: Each client implements `hireflow_core::oracle::Oracle<I, O>` and
//          never propagates a transport failure: a timeout, a non-success
//          status, or an unparsable response all collapse into the same
//          deterministic fallback path, reported via `OracleMode::Fallback`.
// Dependencies: hireflow-core, reqwest, serde, serde_json, thiserror, tokio,
//               tracing
// ============================================================================

//! ## Overview
//! `hireflow-oracles` wires five oracle clients against one shared
//! [`config::OracleClientConfig`] and [`usage::UsageSink`]. Construction
//! never fails; a missing API key or `force_mock` simply routes every call
//! straight to the deterministic fallback without attempting the network.

mod config;
mod email_classifier;
mod interview_evaluator;
mod job_generator;
mod resume_scorer;
mod summary_generator;
mod transport;
mod usage;

pub use config::OracleClientConfig;
pub use email_classifier::EmailClassifierOracle;
pub use interview_evaluator::InterviewEvaluatorOracle;
pub use job_generator::JobGeneratorOracle;
pub use resume_scorer::ResumeScorerOracle;
pub use summary_generator::SummaryGeneratorOracle;
pub use transport::TransportError;
pub use usage::{approximate_tokens, LoggingUsageSink, UsageRecord, UsageSink};
