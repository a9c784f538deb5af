// crates/hireflow-pipeline/src/ingest.rs
// ============================================================================
// Module: Ingestion Pipeline
// Description: Walks a single inbound Email through classification,
//              candidate materialization, job matching, resume scoring,
//              and (on a strong match) auto-advance into the interview
//              link sub-engine.
// Dependencies: hireflow-core, hireflow-store-sqlite
// ============================================================================

//! ## Overview
//! [`run_email_workflow`] is the one entry point, grounded step-for-step in
//! `original_source/backend/services/workflow_service.py`'s
//! `process_email`: classify, short-circuit on non-applications,
//! materialize a Candidate, pick the best open Job, score the resume,
//! persist the Application, and auto-advance a strong match into a sent
//! interview link. Every step is idempotent, guarded by the Email's
//! `processed` level or by the `(candidate_id, job_id)` uniqueness of
//! Application.

use std::num::NonZeroU64;

use time::OffsetDateTime;

use hireflow_core::model::{
    Application, Candidate, Email, EmailProcessed, Recommendation, Stage,
};
use hireflow_core::oracle::{EmailCategory, EmailClassifierInput, Oracle, ResumeScorerInput};
use hireflow_core::{EmailId, PipelineError};

use crate::context::PipelineContext;
use crate::matching::{derive_candidate_name, parse_email_from_body, parse_phone_from_body, pick_best_job, pick_resume_attachment};

/// The result of running the ingestion pipeline against one Email.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// The email was not a candidate application; nothing further
    /// happened.
    NotAnApplication,
    /// The email looked like an application, but no open Job exists to
    /// match it against.
    NoOpenJob,
    /// A Candidate had already applied to the matched Job; the existing
    /// Application was left untouched.
    AlreadyApplied,
    /// A new Application was matched and scored.
    Matched {
        /// Whether a strong resume match triggered an interview link.
        auto_advanced: bool,
        /// Whether the auto-advance email was confirmed sent.
        link_sent: bool,
    },
}

fn recommendation_for_score(score: f64, resume_min: f64) -> Recommendation {
    if score >= resume_min {
        Recommendation::Advance
    } else {
        Recommendation::Hold
    }
}

/// Runs the seven-step ingestion pipeline against `email_id`.
///
/// # Errors
/// Propagates any [`PipelineError`] the store raises.
pub async fn run_email_workflow(
    ctx: &PipelineContext,
    email_id: EmailId,
    now: OffsetDateTime,
) -> Result<IngestOutcome, PipelineError> {
    let mut email = ctx.store.get_email(email_id)?;

    // Step 1: classify.
    if email.processed == EmailProcessed::New {
        let outcome = ctx
            .classifier
            .call(&EmailClassifierInput {
                subject: email.subject.clone(),
                from_name: email.from_name.clone(),
                from_address: email.from_address.clone(),
                attachment_names: email.attachments.clone(),
                body_text: email.body_full.clone(),
            })
            .await;
        ctx.store
            .mark_email_classified(email_id, &outcome.output, outcome.output.confidence)?;
        email = ctx.store.get_email(email_id)?;
    }

    // Step 2: short-circuit on non-applications.
    let classification = match email.classification.as_ref() {
        Some(classification) => classification,
        None => return Err(PipelineError::invariant(format!("email {email_id} was not classified"))),
    };
    if classification.category != EmailCategory::CandidateApplication {
        return Ok(IngestOutcome::NotAnApplication);
    }

    // Step 3: materialize a Candidate.
    let candidate = if email.processed < EmailProcessed::Materialized {
        let candidate = materialize_candidate(&email, ctx, now)?;
        ctx.store.mark_email_materialized(email_id)?;
        candidate
    } else {
        match ctx.store.find_candidate_by_email(&candidate_email(&email))? {
            Some(candidate) => candidate,
            None => materialize_candidate(&email, ctx, now)?,
        }
    };

    // Step 4: pick the best open Job.
    let open_jobs = ctx.store.list_open_jobs()?;
    let detected_role = classification.detected_role.as_deref().unwrap_or(&email.subject);
    let Some(job) = pick_best_job(&open_jobs, detected_role, &candidate.resume_text) else {
        return Ok(IngestOutcome::NoOpenJob);
    };

    // Step 5: skip scoring and stage transitions if already applied.
    if ctx.store.find_application(candidate.id, job.id)?.is_some() {
        return Ok(IngestOutcome::AlreadyApplied);
    }

    let score_outcome = ctx
        .resume_scorer
        .call(&ResumeScorerInput {
            resume_text: candidate.resume_text.clone(),
            job_title: job.title.clone(),
            job_description: job.description.clone(),
            must_have_skills: job.must_have_skills.clone(),
            nice_to_have_skills: job.nice_to_have_skills.clone(),
            seniority: job.seniority.clone(),
        })
        .await
        .output;
    let recommendation = recommendation_for_score(score_outcome.score, job.thresholds.resume_min);

    // Step 6: persist the Application at `matched`.
    let application = Application {
        id: hireflow_core::ApplicationId::new(NonZeroU64::MIN),
        candidate_id: candidate.id,
        job_id: job.id,
        stage: Stage::Matched,
        resume_score: None,
        resume_score_detail: None,
        interview_score: None,
        interview_score_detail: None,
        screening_transcript: None,
        screening_audio_path: None,
        screening_status: None,
        screening_attempts: 0,
        screening_max_attempts: 3,
        screening_last_attempt_at: None,
        screening_failure_reason: None,
        recommendation: None,
        ai_next_action: None,
        ai_snippets: Vec::new(),
        created_at: now,
        updated_at: now,
        interview_link_status: None,
        interview_face_tracking: None,
        final_score: None,
        booked_slot: None,
        email_draft_sent: false,
    };
    let app_id = ctx.store.create_application_with_event(
        &application,
        "auto_workflow_matched",
        &serde_json::json!({
            "candidate_id": candidate.id,
            "job_id": job.id,
            "resume_score": score_outcome.score,
            "recommendation": recommendation,
        }),
        now,
    )?;
    ctx.store.record_resume_score(
        app_id,
        score_outcome.score,
        &score_outcome,
        recommendation,
        Some(score_outcome.summary.as_str()),
        &score_outcome.why_shortlisted,
        now,
    )?;

    // Step 7: auto-advance on a strong match.
    if recommendation != Recommendation::Advance {
        return Ok(IngestOutcome::Matched {
            auto_advanced: false,
            link_sent: false,
        });
    }

    ctx.store.set_application_stage_with_event(
        app_id,
        Stage::ScreeningScheduled,
        "auto_interview_link_issued",
        &serde_json::json!({ "app_id": app_id }),
        now,
    )?;
    let link = crate::interview_link::issue_link(ctx, app_id, 1, now).await?;
    let link_sent = match crate::interview_link::send_link(
        ctx,
        &link,
        job,
        &candidate.email,
        &candidate.name,
        now,
    )
    .await
    {
        Ok(sent) => sent,
        Err(err) => {
            tracing::warn!(error = %err, app_id = %app_id, "failed to send auto-advance interview link");
            false
        }
    };

    Ok(IngestOutcome::Matched {
        auto_advanced: true,
        link_sent,
    })
}

fn candidate_email(email: &Email) -> String {
    parse_email_from_body(&email.body_full, &email.from_address)
}

fn materialize_candidate(
    email: &Email,
    ctx: &PipelineContext,
    now: OffsetDateTime,
) -> Result<Candidate, PipelineError> {
    let classification = email
        .classification
        .as_ref()
        .ok_or_else(|| PipelineError::invariant(format!("email {} has no classification", email.id)))?;

    let name = derive_candidate_name(email, classification);
    let contact_email = candidate_email(email);
    let phone = parse_phone_from_body(&email.body_full);
    let resume_filename = pick_resume_attachment(&email.attachments).cloned().unwrap_or_default();
    let resume_text = email.body_full.clone();

    if let Some(existing) = ctx.store.find_candidate_by_email(&contact_email)? {
        return Ok(existing);
    }

    let candidate = Candidate {
        id: hireflow_core::CandidateId::new(NonZeroU64::MIN),
        name,
        email: contact_email,
        phone,
        resume_text,
        resume_filename,
        source_email_id: Some(email.id),
        notes: String::new(),
        created_at: now,
        updated_at: now,
    };
    let candidate_id = ctx.store.create_candidate(&candidate)?;
    Ok(Candidate {
        id: candidate_id,
        ..candidate
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_recommendation_requires_meeting_resume_min() {
        assert_eq!(recommendation_for_score(85.0, 80.0), Recommendation::Advance);
        assert_eq!(recommendation_for_score(79.9, 80.0), Recommendation::Hold);
    }
}
