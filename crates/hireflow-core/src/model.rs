// crates/hireflow-core/src/model.rs
// ============================================================================
// Module: HireFlow Entities
// Description: Domain structs mirroring the durable schema — Job, Email,
//              Candidate, Application, Event, InterviewLink, Setting.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! These structs are the in-memory shape of every row
//! `hireflow-store-sqlite` persists. Nested oracle results are modeled as
//! concrete structs (see [`crate::oracle`]) rather than raw JSON values, so
//! every field the pipeline reads has a compile-time-checked shape.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::decision::Thresholds;
use crate::identifiers::{ApplicationId, CandidateId, EmailId, EventId, JobId, LinkToken};
use crate::oracle::{EmailClassification, InterviewScoreDetail, ResumeScoreDetail};
use crate::telemetry::TelemetryAggregate;

/// Lifecycle status of a [`Job`] posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepting applications.
    Open,
    /// Not accepting applications but retained for reference.
    Closed,
    /// Temporarily not accepting applications.
    Paused,
}

/// An open requisition a candidate's application is matched against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Durable identifier.
    pub id: JobId,
    /// Human-facing code, e.g. `JOB-2026-014`.
    pub job_code: String,
    /// Role title.
    pub title: String,
    /// Owning department, empty string if unset.
    pub department: String,
    /// Work location, empty string if unset.
    pub location: String,
    /// Seniority band: junior/mid/senior/lead.
    pub seniority: String,
    /// Required and nice-to-have skills are both tracked in the job
    /// description generator's output; this is the must-have list used by
    /// the resume scorer.
    pub must_have_skills: Vec<String>,
    /// Skills that improve a candidate's score but are not required.
    pub nice_to_have_skills: Vec<String>,
    /// Free-text job description.
    pub description: String,
    /// Decision-engine thresholds for this job; falls back to
    /// [`crate::decision::DEFAULT_THRESHOLDS`] when a job is created
    /// without overriding them.
    pub thresholds: Thresholds,
    /// Current posting status.
    pub status: JobStatus,
    /// Creation timestamp.
    pub created_at: OffsetDateTime,
    /// Last-modified timestamp.
    pub updated_at: OffsetDateTime,
}

/// How far an inbound [`Email`] has progressed through ingestion.
///
/// # Invariants
/// - Monotonic: a value here is never decreased once advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(i64)]
pub enum EmailProcessed {
    /// Received, not yet classified.
    New = 0,
    /// Classified by the email classifier oracle.
    Classified = 1,
    /// A candidate and/or application has been materialized from it.
    Materialized = 2,
}

/// An inbound email observed by the mailbox listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    /// Durable identifier.
    pub id: EmailId,
    /// Transport-level message id, when the backend supplies one.
    pub message_id: Option<String>,
    /// Sender address.
    pub from_address: String,
    /// Sender display name, empty string if unset.
    pub from_name: String,
    /// Subject line.
    pub subject: String,
    /// Truncated preview of the body.
    pub body_snippet: String,
    /// Full plain-text body.
    pub body_full: String,
    /// Attachment filenames as observed on the message.
    pub attachments: Vec<String>,
    /// Full classifier output, once classified.
    pub classification: Option<EmailClassification>,
    /// Confidence the classifier assigned, once classified.
    pub confidence: Option<f64>,
    /// Ingestion progress.
    pub processed: EmailProcessed,
    /// Timestamp the mailbox backend reported for receipt.
    pub received_at: Option<OffsetDateTime>,
    /// Timestamp this row was written.
    pub created_at: OffsetDateTime,
}

/// A candidate materialized from an inbound email (or created directly by
/// a recruiter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Durable identifier.
    pub id: CandidateId,
    /// Display name.
    pub name: String,
    /// Contact email address.
    pub email: String,
    /// Contact phone number, empty string if unset.
    pub phone: String,
    /// Extracted resume text, empty string if none was found.
    pub resume_text: String,
    /// Original resume attachment filename, empty string if none.
    pub resume_filename: String,
    /// The email this candidate was materialized from, if any.
    pub source_email_id: Option<EmailId>,
    /// Recruiter free-text notes.
    pub notes: String,
    /// Creation timestamp.
    pub created_at: OffsetDateTime,
    /// Last-modified timestamp.
    pub updated_at: OffsetDateTime,
}

/// Where an [`Application`] sits in the recruiting funnel.
///
/// Ordered as the ingestion pipeline and decision engine walk it:
/// `new → classified → matched → interview_link_sent → screening_scheduled
/// → screened → shortlisted | rejected`. `interview_link_sent` is reachable
/// only via a dashboard-issued link prior to a screening being scheduled;
/// the auto-advance path goes straight from `matched` to
/// `screening_scheduled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Email received, not yet classified.
    New,
    /// Classified as a candidate application.
    Classified,
    /// Matched to a job and resume-scored.
    Matched,
    /// An interview link was issued by a recruiter, ahead of scheduling.
    InterviewLinkSent,
    /// An interview link is outstanding (auto- or manually-issued).
    ScreeningScheduled,
    /// The candidate's transcript has been submitted.
    Screened,
    /// Passed the decision engine's advance threshold.
    Shortlisted,
    /// Rejected by the decision engine or a recruiter.
    Rejected,
}

/// The decision engine's recommendation for an [`Application`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Advance to the next stage.
    Advance,
    /// Hold for manual review.
    Hold,
    /// Reject.
    Reject,
}

/// Status of the (optional) voice/phone screening attempt tracked on an
/// [`Application`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningStatus {
    /// Scheduled but not yet attempted.
    Scheduled,
    /// Currently underway.
    InProgress,
    /// Completed successfully.
    Completed,
    /// The candidate did not answer.
    NoAnswer,
    /// The attempt failed for a reason other than no-answer.
    Failed,
    /// The candidate's voicemail picked up.
    Voicemail,
}

/// Status of an [`InterviewLink`]'s single-use token lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewLinkStatus {
    /// Issued, not yet delivered.
    Generated,
    /// Delivered to the candidate.
    Sent,
    /// The candidate opened the link.
    Opened,
    /// The candidate began the interview.
    InterviewStarted,
    /// The candidate finished the interview.
    InterviewCompleted,
    /// No longer usable (superseded or past `expires_at`).
    Expired,
}

/// A candidate's application to a specific job — the aggregate the
/// ingestion pipeline, interview-link sub-engine, and decision engine all
/// operate on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// Durable identifier.
    pub id: ApplicationId,
    /// The applying candidate.
    pub candidate_id: CandidateId,
    /// The matched job.
    pub job_id: JobId,
    /// Current funnel stage.
    pub stage: Stage,
    /// Resume scorer's numeric score, once scored.
    pub resume_score: Option<f64>,
    /// Resume scorer's full structured output.
    pub resume_score_detail: Option<ResumeScoreDetail>,
    /// Interview evaluator's numeric score, once the interview is
    /// evaluated.
    pub interview_score: Option<f64>,
    /// Interview evaluator's full structured output.
    pub interview_score_detail: Option<InterviewScoreDetail>,
    /// Raw interview transcript text, once submitted.
    pub screening_transcript: Option<String>,
    /// Stored path to a screening audio recording, if any.
    pub screening_audio_path: Option<String>,
    /// Voice/phone screening attempt status.
    pub screening_status: Option<ScreeningStatus>,
    /// Number of screening attempts made so far.
    pub screening_attempts: u32,
    /// Maximum screening attempts before giving up.
    pub screening_max_attempts: u32,
    /// Timestamp of the most recent screening attempt.
    pub screening_last_attempt_at: Option<OffsetDateTime>,
    /// Why the most recent screening attempt failed, if it did.
    pub screening_failure_reason: Option<String>,
    /// The decision engine's most recent recommendation.
    pub recommendation: Option<Recommendation>,
    /// Free-text next action suggested by an oracle.
    pub ai_next_action: Option<String>,
    /// Short evidence snippets an oracle surfaced for this application.
    pub ai_snippets: Vec<String>,
    /// Creation timestamp.
    pub created_at: OffsetDateTime,
    /// Last-modified timestamp.
    pub updated_at: OffsetDateTime,
    /// Status of the most recently issued interview link.
    pub interview_link_status: Option<InterviewLinkStatus>,
    /// Aggregated face-tracking telemetry across the candidate's
    /// interview-link session.
    pub interview_face_tracking: Option<TelemetryAggregate>,
    /// The decision engine's combined score, once both resume and
    /// interview scores exist. Derived, not independently settable —
    /// always `round(0.4·resume_score + 0.6·interview_score, 1)`.
    pub final_score: Option<f64>,
    /// The candidate-preferred interview slot, parsed from a transcript's
    /// JSON trailer and kept only while the decision stands at `advance`.
    pub booked_slot: Option<String>,
    /// Whether the decision engine's outbound email (advance or reject)
    /// was confirmed sent.
    pub email_draft_sent: bool,
}

/// An append-only audit record attached to an [`Application`] (or
/// system-wide, when `app_id` is `None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Durable identifier.
    pub id: EventId,
    /// The application this event concerns, if any.
    pub app_id: Option<ApplicationId>,
    /// Machine-readable event name, e.g. `auto_workflow_matched`.
    pub event_type: String,
    /// Structured payload specific to `event_type`.
    pub payload: serde_json::Value,
    /// Timestamp this event was recorded.
    pub created_at: OffsetDateTime,
}

/// A single-use, expiring link granting a candidate access to the
/// self-serve interview flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewLink {
    /// Opaque token handed to the candidate.
    pub token: LinkToken,
    /// The application this link belongs to.
    pub app_id: ApplicationId,
    /// Current lifecycle status.
    pub status: InterviewLinkStatus,
    /// Round number; `1` for the initial link. See `DESIGN.md` for why
    /// this carries no branching semantics today.
    pub round: u8,
    /// Identifier of the voice-service conversation tied to this link,
    /// once one starts.
    pub voice_conversation_id: Option<String>,
    /// Per-snapshot face-tracking telemetry aggregated for this link.
    pub face_tracking: Option<TelemetryAggregate>,
    /// Timestamp after which the token is no longer valid.
    pub expires_at: OffsetDateTime,
    /// Timestamp the candidate first opened the link.
    pub opened_at: Option<OffsetDateTime>,
    /// Timestamp the candidate began the interview.
    pub interview_started_at: Option<OffsetDateTime>,
    /// Timestamp the candidate completed the interview.
    pub interview_completed_at: Option<OffsetDateTime>,
    /// Creation timestamp.
    pub created_at: OffsetDateTime,
}

/// A single opaque key/value row used for small persisted state
/// (mailbox credentials, watermark) that does not warrant its own table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    /// Lookup key.
    pub key: String,
    /// Opaque value, typically JSON-encoded by the caller.
    pub value: String,
}
