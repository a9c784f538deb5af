// crates/hireflow-pipeline/tests/pipeline.rs
// ============================================================================
// Test: End-to-end pipeline scenarios
// Description: Drives ingestion, the interview-link sub-engine, and the
//              decision engine against a real (tempfile-backed) SQLite
//              store with every oracle client forced into deterministic
//              fallback mode.
// ============================================================================

use std::sync::Arc;

use time::OffsetDateTime;

use hireflow_core::decision::DEFAULT_THRESHOLDS;
use hireflow_core::model::{
    Candidate, Email, EmailProcessed, InterviewLinkStatus, Job, JobStatus, Recommendation, Stage,
};
use hireflow_core::{CandidateId, JobId};
use hireflow_oracles::{LoggingUsageSink, OracleClientConfig};
use hireflow_pipeline::{interview_link, ingest, PipelineContext};
use hireflow_store_sqlite::{Store, StoreConfig};

fn now() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_780_000_000).expect("valid timestamp")
}

fn test_context() -> (tempfile::TempDir, PipelineContext) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Store::open(&StoreConfig::new(dir.path().join("hireflow.db"))).expect("store opens");
    let ctx = PipelineContext::new(
        Arc::new(store),
        reqwest::Client::new(),
        OracleClientConfig::default(),
        Arc::new(LoggingUsageSink),
    );
    (dir, ctx)
}

fn seed_open_job(ctx: &PipelineContext, skills: &[&str]) -> JobId {
    let now = now();
    let job = Job {
        id: JobId::from_raw(1).expect("nonzero"),
        job_code: "JOB-1".to_owned(),
        title: "Backend Engineer".to_owned(),
        department: "Engineering".to_owned(),
        location: "Remote".to_owned(),
        seniority: "mid".to_owned(),
        must_have_skills: skills.iter().map(|s| (*s).to_owned()).collect(),
        nice_to_have_skills: Vec::new(),
        description: "Build and operate backend services.".to_owned(),
        thresholds: DEFAULT_THRESHOLDS,
        status: JobStatus::Open,
        created_at: now,
        updated_at: now,
    };
    ctx.store.create_job(&job).expect("job created")
}

fn seed_email(ctx: &PipelineContext, message_id: &str, body: &str) -> hireflow_core::EmailId {
    let now = now();
    let email = Email {
        id: hireflow_core::EmailId::from_raw(1).expect("nonzero"),
        message_id: Some(message_id.to_owned()),
        from_address: "priya.patel@example.com".to_owned(),
        from_name: "Priya Patel".to_owned(),
        subject: "Application for Backend Engineer".to_owned(),
        body_snippet: body.chars().take(200).collect(),
        body_full: body.to_owned(),
        attachments: vec!["priya_resume.pdf".to_owned()],
        classification: None,
        confidence: None,
        processed: EmailProcessed::New,
        received_at: None,
        created_at: now,
    };
    ctx.store.insert_email(&email).expect("email inserted")
}

fn seed_general_email(ctx: &PipelineContext, message_id: &str) -> hireflow_core::EmailId {
    let now = now();
    let email = Email {
        id: hireflow_core::EmailId::from_raw(1).expect("nonzero"),
        message_id: Some(message_id.to_owned()),
        from_address: "newsletter@example.com".to_owned(),
        from_name: "Weekly Digest".to_owned(),
        subject: "This week's digest".to_owned(),
        body_snippet: "Check out this week's newsletter and big sale!".to_owned(),
        body_full: "Check out this week's newsletter and big sale!".to_owned(),
        attachments: Vec::new(),
        classification: None,
        confidence: None,
        processed: EmailProcessed::New,
        received_at: None,
        created_at: now,
    };
    ctx.store.insert_email(&email).expect("email inserted")
}

#[tokio::test]
async fn strong_match_auto_advances_and_sends_interview_link() {
    let (_dir, ctx) = test_context();
    seed_open_job(&ctx, &["rust", "postgresql", "kubernetes"]);
    let email_id = seed_email(
        &ctx,
        "msg-strong",
        "Name: Priya Patel\n\
         I am applying for the Backend Engineer role. Please find my resume attached.\n\
         I have years of experience with rust, postgresql, and kubernetes in production.\n\
         Reach me at priya.patel@example.com or 555-201-3344.",
    );

    let outcome = ingest::run_email_workflow(&ctx, email_id, now()).await.expect("workflow runs");
    let (auto_advanced, link_sent) = match outcome {
        ingest::IngestOutcome::Matched { auto_advanced, link_sent } => (auto_advanced, link_sent),
        other => panic!("expected a match, got {other:?}"),
    };
    assert!(auto_advanced, "a resume hitting every required skill should auto-advance");
    assert!(link_sent, "the logging mail transport always reports success");

    let candidate = ctx
        .store
        .find_candidate_by_email("priya.patel@example.com")
        .expect("query ok")
        .expect("candidate materialized");
    let job_id = JobId::from_raw(1).expect("nonzero");
    let application = ctx
        .store
        .find_application(candidate.id, job_id)
        .expect("query ok")
        .expect("application exists");

    assert_eq!(application.stage, Stage::ScreeningScheduled);
    assert_eq!(application.recommendation, Some(Recommendation::Advance));
    assert_eq!(application.interview_link_status, Some(InterviewLinkStatus::Sent));

    let link = ctx
        .store
        .get_latest_interview_link(application.id)
        .expect("query ok")
        .expect("a link was issued");
    assert_eq!(link.status, InterviewLinkStatus::Sent);
}

#[tokio::test]
async fn weak_resume_match_is_held_without_issuing_a_link() {
    let (_dir, ctx) = test_context();
    seed_open_job(&ctx, &["rust", "postgresql", "kubernetes", "graphql", "terraform"]);
    let email_id = seed_email(
        &ctx,
        "msg-weak",
        "Name: Priya Patel\nI am applying for the Backend Engineer role, resume attached.\n\
         My background is mostly in spreadsheets and customer support.",
    );

    let outcome = ingest::run_email_workflow(&ctx, email_id, now()).await.expect("workflow runs");
    match outcome {
        ingest::IngestOutcome::Matched { auto_advanced, link_sent } => {
            assert!(!auto_advanced, "a resume with almost no skill overlap should not auto-advance");
            assert!(!link_sent);
        }
        other => panic!("expected a match, got {other:?}"),
    }

    let candidate = ctx
        .store
        .find_candidate_by_email("priya.patel@example.com")
        .expect("query ok")
        .expect("candidate materialized");
    let application = ctx
        .store
        .find_application(candidate.id, JobId::from_raw(1).expect("nonzero"))
        .expect("query ok")
        .expect("application exists");
    assert_eq!(application.stage, Stage::Matched);
    assert_eq!(application.interview_link_status, None);
}

#[tokio::test]
async fn non_application_email_is_short_circuited() {
    let (_dir, ctx) = test_context();
    seed_open_job(&ctx, &["rust"]);
    let email_id = seed_general_email(&ctx, "msg-spam");

    let outcome = ingest::run_email_workflow(&ctx, email_id, now()).await.expect("workflow runs");
    assert_eq!(outcome, ingest::IngestOutcome::NotAnApplication);

    let email = ctx.store.get_email(email_id).expect("email exists");
    assert_eq!(email.processed, EmailProcessed::Classified);
    assert!(ctx.store.list_applications_by_job(JobId::from_raw(1).expect("nonzero")).expect("query ok").is_empty());
}

#[tokio::test]
async fn repeat_application_to_the_same_job_is_skipped() {
    let (_dir, ctx) = test_context();
    seed_open_job(&ctx, &["rust", "postgresql", "kubernetes"]);
    let body = "Name: Priya Patel\nApplying for the Backend Engineer role, resume attached.\n\
                Skilled in rust, postgresql, and kubernetes.\nContact: priya.patel@example.com";
    let first = seed_email(&ctx, "msg-one", body);
    ingest::run_email_workflow(&ctx, first, now()).await.expect("first workflow runs");

    let second = seed_email(&ctx, "msg-two", body);
    let outcome = ingest::run_email_workflow(&ctx, second, now()).await.expect("second workflow runs");
    assert_eq!(outcome, ingest::IngestOutcome::AlreadyApplied);

    let job_id = JobId::from_raw(1).expect("nonzero");
    assert_eq!(ctx.store.list_applications_by_job(job_id).expect("query ok").len(), 1);
}

async fn seed_matched_application(ctx: &PipelineContext) -> hireflow_core::ApplicationId {
    seed_open_job(ctx, &["rust", "postgresql", "kubernetes"]);
    let email_id = seed_email(
        ctx,
        "msg-full",
        "Name: Priya Patel\nApplying for the Backend Engineer role, resume attached.\n\
         Skilled in rust, postgresql, and kubernetes.\nContact: priya.patel@example.com",
    );
    let outcome = ingest::run_email_workflow(ctx, email_id, now()).await.expect("workflow runs");
    assert!(matches!(outcome, ingest::IngestOutcome::Matched { auto_advanced: true, .. }));
    let candidate = ctx
        .store
        .find_candidate_by_email("priya.patel@example.com")
        .expect("query ok")
        .expect("candidate exists");
    ctx.store
        .find_application(candidate.id, JobId::from_raw(1).expect("nonzero"))
        .expect("query ok")
        .expect("application exists")
        .id
}

#[tokio::test]
async fn submitting_a_transcript_runs_the_decision_engine_and_advances() {
    let (_dir, ctx) = test_context();
    let app_id = seed_matched_application(&ctx).await;
    let link = ctx.store.get_latest_interview_link(app_id).expect("query ok").expect("link exists");

    let transcript = "Candidate walked through distributed systems experience, discussed on-call \
                       practices, and answered every technical follow-up in depth across the call.\n\
                       {\"candidate_name\": \"Priya Patel\", \"availability\": {\"candidate_preferred_slot\": \"Tuesday 2pm\"}}";
    let result = interview_link::submit_transcript(&ctx, link.token, transcript, now())
        .await
        .expect("transcript submission succeeds");
    assert_eq!(result, interview_link::TranscriptOutcome::EvaluatedSuccessfully);

    let application = ctx.store.get_application(app_id).expect("application exists");
    assert_eq!(application.stage, Stage::Shortlisted);
    assert_eq!(application.recommendation, Some(Recommendation::Advance));
    assert_eq!(application.booked_slot.as_deref(), Some("Tuesday 2pm"));
    assert!(application.email_draft_sent);
    assert!(application.final_score.is_some());

    let stored_link = ctx.store.get_interview_link(link.token).expect("link exists");
    assert_eq!(stored_link.status, InterviewLinkStatus::InterviewCompleted);
}

#[tokio::test]
async fn replaying_a_transcript_submission_is_idempotent() {
    let (_dir, ctx) = test_context();
    let app_id = seed_matched_application(&ctx).await;
    let link = ctx.store.get_latest_interview_link(app_id).expect("query ok").expect("link exists");

    let transcript = "Candidate discussed backend architecture and deployment pipelines at length \
                       across the full call, covering incident response and testing practices too.";
    let first = interview_link::submit_transcript(&ctx, link.token, transcript, now())
        .await
        .expect("first submission succeeds");
    assert_eq!(first, interview_link::TranscriptOutcome::EvaluatedSuccessfully);

    let second = interview_link::submit_transcript(&ctx, link.token, "a different transcript entirely", now())
        .await
        .expect("second submission succeeds");
    assert_eq!(second, interview_link::TranscriptOutcome::AlreadyRecorded);

    let application = ctx.store.get_application(app_id).expect("application exists");
    assert_eq!(application.screening_transcript.as_deref(), Some(transcript));
}

#[tokio::test]
async fn validating_a_link_transitions_it_to_opened_once() {
    let (_dir, ctx) = test_context();
    let app_id = seed_matched_application(&ctx).await;
    let link = ctx.store.get_latest_interview_link(app_id).expect("query ok").expect("link exists");

    let outcome = interview_link::validate_link(&ctx, link.token, now()).await.expect("validation succeeds");
    match outcome {
        interview_link::ValidationOutcome::Valid { candidate_first_name, job_title, company_name, external_agent_id, .. } => {
            assert_eq!(candidate_first_name, "Priya");
            assert_eq!(job_title, "Backend Engineer");
            assert_eq!(company_name, "HireFlow");
            assert_eq!(external_agent_id, "interview-evaluator");
        }
        other => panic!("expected a valid link, got {other:?}"),
    }

    let stored = ctx.store.get_interview_link(link.token).expect("link exists");
    assert_eq!(stored.status, InterviewLinkStatus::Opened);
}

#[tokio::test]
async fn validating_a_link_past_its_expiry_reports_expired() {
    let (_dir, ctx) = test_context();
    let app_id = seed_matched_application(&ctx).await;
    let link = ctx.store.get_latest_interview_link(app_id).expect("query ok").expect("link exists");

    let far_future = link.expires_at + std::time::Duration::from_secs(3600);
    let outcome = interview_link::validate_link(&ctx, link.token, far_future).await.expect("validation succeeds");
    assert_eq!(outcome, interview_link::ValidationOutcome::Expired);

    let stored = ctx.store.get_interview_link(link.token).expect("link exists");
    assert_eq!(stored.status, InterviewLinkStatus::Expired);
}

#[tokio::test]
async fn issuing_a_new_link_expires_the_prior_one() {
    let (_dir, ctx) = test_context();
    let app_id = seed_matched_application(&ctx).await;
    let first_link = ctx.store.get_latest_interview_link(app_id).expect("query ok").expect("link exists");

    let second_link = interview_link::issue_link(&ctx, app_id, 2, now()).await.expect("second link issued");
    assert_ne!(first_link.token, second_link.token);

    let stale = ctx.store.get_interview_link(first_link.token).expect("link exists");
    assert_eq!(stale.status, InterviewLinkStatus::Expired);
    let fresh = ctx.store.get_interview_link(second_link.token).expect("link exists");
    assert_eq!(fresh.status, InterviewLinkStatus::Generated);
}

// Keeps `Candidate`/`CandidateId` imports exercised without sprawling the
// seed helpers above into every test that only needs a job and an email.
#[tokio::test]
async fn materializing_a_candidate_directly_does_not_collide_with_ingestion() {
    let (_dir, ctx) = test_context();
    let now = now();
    let candidate = Candidate {
        id: CandidateId::from_raw(1).expect("nonzero"),
        name: "Dashboard-Added Candidate".to_owned(),
        email: "manual.entry@example.com".to_owned(),
        phone: String::new(),
        resume_text: "Added directly by a recruiter, no source email.".to_owned(),
        resume_filename: String::new(),
        source_email_id: None,
        notes: String::new(),
        created_at: now,
        updated_at: now,
    };
    let id = ctx.store.create_candidate(&candidate).expect("candidate created");
    assert!(ctx.store.get_candidate(id).is_ok());
}
