// crates/hireflow-core/src/lib.rs
// ============================================================================
// Module: HireFlow Core
// Description: Shared domain types for the recruiting pipeline — entities,
//              identifiers, oracle interfaces, and decision-engine math.
// ============================================================================

//! ## Overview
//! `hireflow-core` has no I/O of its own. It defines the vocabulary every
//! other crate in the workspace shares: strongly typed identifiers, the
//! entity structs that mirror the durable schema, the oracle trait each
//! external classifier/scorer implements, and the decision-engine
//! thresholds and scoring law.

pub mod decision;
pub mod error;
pub mod identifiers;
pub mod model;
pub mod oracle;
pub mod telemetry;

pub use decision::{DecisionInput, DecisionOutcome, Thresholds, DEFAULT_THRESHOLDS};
pub use error::PipelineError;
pub use identifiers::{ApplicationId, CandidateId, EmailId, EventId, JobId, LinkToken};
pub use model::{
    Application, Candidate, Email, EmailProcessed, Event, InterviewLink, InterviewLinkStatus,
    Job, JobStatus, Recommendation, ScreeningStatus, Stage,
};
pub use oracle::{Oracle, OracleOutcome};
