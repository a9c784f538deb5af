// crates/hireflow-pipeline/src/evaluation.rs
// ============================================================================
// Module: Decision Engine
// Description: Scores a submitted interview transcript, combines it with
//              the resume score, and applies the advance/hold/reject
//              side effects.
// Dependencies: hireflow-core, hireflow-store-sqlite
// ============================================================================

//! ## Overview
//! [`evaluate`] is the only entry point: given an application whose
//! transcript has just landed, it calls the interview evaluator oracle,
//! combines the result with the already-recorded resume score via
//! [`hireflow_core::decision::decide`], and applies whichever side effect
//! the verdict calls for — booking the candidate's preferred slot and
//! emailing them on `advance`, clearing a stale slot on `hold`, or sending
//! a rejection notice on `reject`. The whole thing runs once per
//! transcript submission; [`crate::interview_link::submit_transcript`] is
//! the only caller.

use time::OffsetDateTime;

use hireflow_core::decision::{self, DecisionInput, DecisionOutcome};
use hireflow_core::model::{Recommendation, Stage};
use hireflow_core::oracle::{InterviewEvaluatorInput, Oracle, SummaryGeneratorInput};
use hireflow_core::{ApplicationId, PipelineError};

use crate::context::PipelineContext;
use crate::mail::OutboundEmail;

fn recommendation_for(outcome: DecisionOutcome) -> Recommendation {
    match outcome {
        DecisionOutcome::Advance { .. } => Recommendation::Advance,
        DecisionOutcome::Hold { .. } => Recommendation::Hold,
        DecisionOutcome::Reject { .. } => Recommendation::Reject,
    }
}

fn stage_for(outcome: DecisionOutcome) -> Stage {
    match outcome {
        DecisionOutcome::Advance { .. } => Stage::Shortlisted,
        DecisionOutcome::Hold { .. } => Stage::Screened,
        DecisionOutcome::Reject { .. } => Stage::Rejected,
    }
}

/// Runs the decision engine for an application whose transcript has just
/// been recorded.
///
/// # Errors
/// Returns [`PipelineError::Invariant`] if the application has no resume
/// score yet (the interview evaluator is never called before one
/// exists), and propagates any [`PipelineError`] the store raises.
pub async fn evaluate(
    ctx: &PipelineContext,
    app_id: ApplicationId,
    now: OffsetDateTime,
) -> Result<(), PipelineError> {
    let app = ctx.store.get_application(app_id)?;
    let job = ctx.store.get_job(app.job_id)?;

    let resume_score = app
        .resume_score
        .ok_or_else(|| PipelineError::invariant(format!("application {app_id} has no resume score")))?;
    let resume_summary = app
        .resume_score_detail
        .as_ref()
        .map(|detail| detail.summary.clone())
        .unwrap_or_default();
    let transcript = app
        .screening_transcript
        .clone()
        .ok_or_else(|| PipelineError::invariant(format!("application {app_id} has no transcript")))?;

    let evaluation = ctx
        .interview_evaluator
        .call(&InterviewEvaluatorInput {
            transcript: transcript.clone(),
            job_title: job.title.clone(),
            job_description: job.description.clone(),
            required_skills: job.must_have_skills.clone(),
            resume_score,
            resume_summary,
        })
        .await
        .output;

    ctx.store.record_interview_score(
        app_id,
        evaluation.score,
        &evaluation,
        evaluation.decision,
        None,
        &[],
        now,
    )?;

    let outcome = decision::decide(
        DecisionInput {
            resume_score,
            interview_score: evaluation.score,
        },
        &job.thresholds,
    );

    let candidate = ctx.store.get_candidate(app.candidate_id)?;
    let summary = ctx
        .summary_generator
        .call(&SummaryGeneratorInput {
            candidate_name: candidate.name.clone(),
            job_title: job.title.clone(),
            resume_score,
            interview_score: Some(evaluation.score),
            decision: recommendation_for(outcome),
        })
        .await
        .output;

    let preferred_slot = decision::extract_preferred_slot(&transcript);
    let booked_slot = match outcome {
        DecisionOutcome::Advance { .. } => preferred_slot,
        DecisionOutcome::Hold { .. } | DecisionOutcome::Reject { .. } => None,
    };

    ctx.store.record_decision_outcome_with_event(
        app_id,
        Some(outcome.score()),
        stage_for(outcome),
        recommendation_for(outcome),
        booked_slot.as_deref(),
        "evaluated",
        &serde_json::json!({
            "outcome": recommendation_for(outcome),
            "final_score": outcome.score(),
            "resume_score": resume_score,
            "interview_score": evaluation.score,
            "summary": summary.narrative,
        }),
        now,
    )?;

    match outcome {
        DecisionOutcome::Advance { .. } => {
            let message = OutboundEmail {
                to_address: candidate.email.clone(),
                to_name: candidate.name.clone(),
                subject: format!("You're moving forward: {}", job.title),
                body: evaluation.email_draft.clone(),
            };
            if ctx.mail.send(&message).await {
                ctx.store.set_email_draft_sent(app_id, now)?;
            }
        }
        DecisionOutcome::Reject { .. } => {
            let message = OutboundEmail {
                to_address: candidate.email.clone(),
                to_name: candidate.name.clone(),
                subject: format!("Update on your {} application", job.title),
                body: summary.narrative.clone(),
            };
            if ctx.mail.send(&message).await {
                ctx.store.set_email_draft_sent(app_id, now)?;
            }
        }
        DecisionOutcome::Hold { .. } => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_and_recommendation_follow_the_outcome_variant() {
        let advance = DecisionOutcome::Advance { score: 90.0 };
        let hold = DecisionOutcome::Hold { score: 60.0 };
        let reject = DecisionOutcome::Reject { score: 20.0 };

        assert_eq!(stage_for(advance), Stage::Shortlisted);
        assert_eq!(stage_for(hold), Stage::Screened);
        assert_eq!(stage_for(reject), Stage::Rejected);

        assert_eq!(recommendation_for(advance), Recommendation::Advance);
        assert_eq!(recommendation_for(hold), Recommendation::Hold);
        assert_eq!(recommendation_for(reject), Recommendation::Reject);
    }
}
