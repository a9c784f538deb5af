// crates/hireflow-pipeline/src/interview_link.rs
// ============================================================================
// Module: Interview Link Sub-Engine
// Description: Issues, validates, and tracks the single-use token that
//              grants a candidate access to the self-serve interview flow,
//              and hands a completed transcript off to the decision engine.
// Dependencies: hireflow-core, hireflow-store-sqlite, rand, time
// ============================================================================

//! ## Overview
//! Four entry points cover the whole link lifecycle: [`issue_link`] mints a
//! token and expires whatever the application had outstanding; [`send_link`]
//! attempts best-effort delivery; [`validate_link`] is what the public
//! `GET /screening/link/{token}` endpoint calls; [`record_telemetry`] and
//! [`submit_transcript`] are what the candidate-facing widget posts to as
//! the session progresses.

use rand::RngCore;
use time::OffsetDateTime;

use hireflow_core::model::{InterviewLink, InterviewLinkStatus, Job, ScreeningStatus};
use hireflow_core::telemetry::TelemetrySnapshot;
use hireflow_core::{ApplicationId, LinkToken, PipelineError};
use hireflow_store_sqlite::SqliteStoreError;

use crate::context::PipelineContext;
use crate::mail::OutboundEmail;

fn new_token() -> LinkToken {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    LinkToken::from_bytes(bytes)
}

/// Issues a new interview link for `app_id`, expiring whatever the
/// application had outstanding in `generated`/`sent`/`opened` status.
///
/// # Errors
/// Propagates any [`PipelineError`] the store raises.
pub async fn issue_link(
    ctx: &PipelineContext,
    app_id: ApplicationId,
    round: u8,
    now: OffsetDateTime,
) -> Result<InterviewLink, PipelineError> {
    let link = InterviewLink {
        token: new_token(),
        app_id,
        status: InterviewLinkStatus::Generated,
        round,
        voice_conversation_id: None,
        face_tracking: None,
        expires_at: now + ctx.link_expiry,
        opened_at: None,
        interview_started_at: None,
        interview_completed_at: None,
        created_at: now,
    };
    ctx.store.issue_interview_link(&link)?;
    ctx.store.set_application_interview_link_status(app_id, InterviewLinkStatus::Generated, now)?;
    Ok(link)
}

/// Attempts best-effort delivery of a newly issued link. Returns whether
/// the send is believed to have succeeded; a `false` result is not an
/// error — the link stays `generated` and is still retrievable from the
/// dashboard.
///
/// # Errors
/// Propagates any [`PipelineError`] the store raises while recording a
/// confirmed send; never returns an error for a failed or skipped send.
pub async fn send_link(
    ctx: &PipelineContext,
    link: &InterviewLink,
    job: &Job,
    recipient_email: &str,
    recipient_name: &str,
    now: OffsetDateTime,
) -> Result<bool, PipelineError> {
    let message = OutboundEmail {
        to_address: recipient_email.to_owned(),
        to_name: recipient_name.to_owned(),
        subject: format!("Next step: {} self-serve interview", job.title),
        body: format!(
            "Hi {recipient_name},\n\nThanks for applying to {}. Please complete your interview \
             using the link below before it expires:\n\n  https://hireflow.example/screening/link/{}\n\n\
             This link expires at {}.",
            job.title, link.token, link.expires_at
        ),
    };
    let sent = ctx.mail.send(&message).await;
    if sent {
        let payload = serde_json::json!({ "token": link.token.to_string(), "round": link.round });
        ctx.store.mark_link_sent_with_event(
            link.token,
            link.app_id,
            "auto_interview_link_emailed",
            &payload,
            now,
        )?;
    }
    Ok(sent)
}

/// The outcome of a candidate-facing link validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// The token is live; the candidate may proceed.
    Valid {
        /// First name of the applying candidate.
        candidate_first_name: String,
        /// Title of the matched job.
        job_title: String,
        /// Candidate-facing company name.
        company_name: String,
        /// Id of the external voice agent the widget should connect to.
        external_agent_id: String,
        /// Suggested screening questions, carried over from the resume
        /// scorer's output when available.
        screening_questions: Vec<String>,
    },
    /// The token does not exist.
    Invalid,
    /// The token existed but is past its expiry (or was superseded).
    Expired,
    /// The interview behind this token has already been completed.
    InterviewCompleted,
}

/// Validates a candidate-presented token, transitioning a fresh
/// `generated`/`sent` link to `opened` on its first successful check.
///
/// # Errors
/// Propagates any non-"unknown token" [`PipelineError`] the store raises.
pub async fn validate_link(
    ctx: &PipelineContext,
    token: LinkToken,
    now: OffsetDateTime,
) -> Result<ValidationOutcome, PipelineError> {
    let link = match ctx.store.get_interview_link(token) {
        Ok(link) => link,
        Err(SqliteStoreError::NotFound(_)) => return Ok(ValidationOutcome::Invalid),
        Err(err) => return Err(err.into()),
    };

    if link.status == InterviewLinkStatus::InterviewCompleted {
        return Ok(ValidationOutcome::InterviewCompleted);
    }
    if link.status == InterviewLinkStatus::Expired || link.expires_at <= now {
        if link.status != InterviewLinkStatus::Expired {
            ctx.store.set_interview_link_status(token, InterviewLinkStatus::Expired, now)?;
            ctx.store.set_application_interview_link_status(
                link.app_id,
                InterviewLinkStatus::Expired,
                now,
            )?;
        }
        return Ok(ValidationOutcome::Expired);
    }

    if matches!(link.status, InterviewLinkStatus::Generated | InterviewLinkStatus::Sent) {
        ctx.store.set_interview_link_status(token, InterviewLinkStatus::Opened, now)?;
        ctx.store.set_application_interview_link_status(link.app_id, InterviewLinkStatus::Opened, now)?;
    }

    let app = ctx.store.get_application(link.app_id)?;
    let job = ctx.store.get_job(app.job_id)?;
    let candidate = ctx.store.get_candidate(app.candidate_id)?;
    let candidate_first_name = candidate
        .name
        .split_whitespace()
        .next()
        .unwrap_or(&candidate.name)
        .to_owned();
    let screening_questions = app
        .resume_score_detail
        .as_ref()
        .map(|detail| detail.screening_questions.clone())
        .unwrap_or_default();

    Ok(ValidationOutcome::Valid {
        candidate_first_name,
        job_title: job.title,
        company_name: ctx.company_name.clone(),
        external_agent_id: ctx.external_agent_id.clone(),
        screening_questions,
    })
}

/// Marks a session as started: mirrors `interview_started` onto both the
/// link and the application, and sets `screening_status = in_progress`.
///
/// # Errors
/// Propagates any [`PipelineError`] the store raises.
pub async fn mark_interview_started(
    ctx: &PipelineContext,
    token: LinkToken,
    now: OffsetDateTime,
) -> Result<(), PipelineError> {
    let link = ctx.store.get_interview_link(token)?;
    ctx.store.set_interview_link_status(token, InterviewLinkStatus::InterviewStarted, now)?;
    ctx.store.set_application_interview_link_status(
        link.app_id,
        InterviewLinkStatus::InterviewStarted,
        now,
    )?;
    ctx.store.set_screening_status(link.app_id, ScreeningStatus::InProgress, now)?;
    Ok(())
}

/// Records one face-tracking snapshot, folding it into the link's and the
/// application's bounded telemetry aggregate.
///
/// # Errors
/// Propagates any [`PipelineError`] the store raises.
pub async fn record_telemetry(
    ctx: &PipelineContext,
    token: LinkToken,
    snapshot: TelemetrySnapshot,
    now: OffsetDateTime,
) -> Result<(), PipelineError> {
    let link = ctx.store.get_interview_link(token)?;
    let mut aggregate = link.face_tracking.unwrap_or_default();
    aggregate.record(snapshot);
    ctx.store.set_interview_link_face_tracking(token, &aggregate)?;
    ctx.store.set_interview_face_tracking(link.app_id, &aggregate, now)?;
    Ok(())
}

/// Outcome of submitting an interview transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptOutcome {
    /// A transcript was already on file; this submission was a no-op.
    AlreadyRecorded,
    /// The transcript was stored and the decision engine ran to
    /// completion.
    EvaluatedSuccessfully,
    /// The transcript was stored, but the decision engine failed; it can
    /// be re-triggered manually.
    StoredPendingEvaluation,
}

/// Stores a submitted transcript, marks the link and application
/// `interview_completed`/`completed`, and synchronously triggers the
/// decision engine.
///
/// Idempotent: replaying the same `post_call_transcription` (directly or
/// via the voice-service webhook) after a transcript is already on file
/// is a no-op that leaves the stored transcript unchanged, satisfying the
/// webhook-replay testable property.
///
/// Transcript persistence always succeeds independently of decision
/// engine evaluation: an evaluation failure is logged and swallowed so a
/// transient oracle outage never loses the candidate's submission.
///
/// # Errors
/// Propagates any [`PipelineError`] the store raises while persisting the
/// transcript itself.
pub async fn submit_transcript(
    ctx: &PipelineContext,
    token: LinkToken,
    transcript: &str,
    now: OffsetDateTime,
) -> Result<TranscriptOutcome, PipelineError> {
    let link = ctx.store.get_interview_link(token)?;
    let app = ctx.store.get_application(link.app_id)?;
    if app.screening_transcript.is_some() {
        return Ok(TranscriptOutcome::AlreadyRecorded);
    }

    ctx.store.record_screening_attempt(
        link.app_id,
        ScreeningStatus::Completed,
        Some(transcript),
        None,
        None,
        app.screening_attempts + 1,
        now,
    )?;
    ctx.store.set_interview_link_status(token, InterviewLinkStatus::InterviewCompleted, now)?;
    ctx.store.set_application_interview_link_status(
        link.app_id,
        InterviewLinkStatus::InterviewCompleted,
        now,
    )?;
    ctx.store.append_event(
        Some(link.app_id),
        "interview_transcript_received",
        &serde_json::json!({ "token": token.to_string() }),
        now,
    )?;

    match crate::evaluation::evaluate(ctx, link.app_id, now).await {
        Ok(()) => Ok(TranscriptOutcome::EvaluatedSuccessfully),
        Err(err) => {
            tracing::warn!(error = %err, app_id = %link.app_id, "decision engine failed after transcript submission");
            Ok(TranscriptOutcome::StoredPendingEvaluation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_sixteen_bytes_and_distinct() {
        let a = new_token();
        let b = new_token();
        assert_eq!(a.as_bytes().len(), 16);
        assert_ne!(a, b);
    }
}
