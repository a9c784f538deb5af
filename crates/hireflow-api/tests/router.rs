// crates/hireflow-api/tests/router.rs
// ============================================================================
// Test: Router integration
// Description: Drives the assembled axum router with `tower::ServiceExt::
//              oneshot` against a real tempfile-backed store, the same
//              harness shape `hireflow-pipeline/tests/pipeline.rs` uses one
//              layer down.
// ============================================================================

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use hireflow_core::decision::DEFAULT_THRESHOLDS;
use hireflow_core::model::{Candidate, Job, JobStatus, Stage};
use hireflow_core::{ApplicationId, CandidateId, JobId};
use hireflow_oracles::{LoggingUsageSink, OracleClientConfig};
use hireflow_pipeline::PipelineContext;
use hireflow_store_sqlite::{Store, StoreConfig};
use time::OffsetDateTime;
use tower::ServiceExt;

use hireflow_api::{router, AppState};

fn now() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_780_000_000).expect("valid timestamp")
}

fn test_state() -> (tempfile::TempDir, AppState) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Store::open(&StoreConfig::new(dir.path().join("hireflow.db"))).expect("store opens");
    let ctx = PipelineContext::new(
        Arc::new(store),
        reqwest::Client::new(),
        OracleClientConfig::default(),
        Arc::new(LoggingUsageSink),
    );
    (dir, AppState::new(Arc::new(ctx), ""))
}

fn seed_job(state: &AppState) -> JobId {
    let now = now();
    let job = Job {
        id: JobId::from_raw(1).expect("nonzero"),
        job_code: "JOB-1".to_owned(),
        title: "Backend Engineer".to_owned(),
        department: "Engineering".to_owned(),
        location: "Remote".to_owned(),
        seniority: "mid".to_owned(),
        must_have_skills: vec!["rust".to_owned()],
        nice_to_have_skills: Vec::new(),
        description: "Build and operate backend services.".to_owned(),
        thresholds: DEFAULT_THRESHOLDS,
        status: JobStatus::Open,
        created_at: now,
        updated_at: now,
    };
    state.ctx.store.create_job(&job).expect("job created")
}

fn seed_candidate(state: &AppState) -> CandidateId {
    let now = now();
    let candidate = Candidate {
        id: CandidateId::from_raw(1).expect("nonzero"),
        name: "Priya Patel".to_owned(),
        email: "priya.patel@example.com".to_owned(),
        phone: String::new(),
        resume_text: "Five years of Rust backend experience.".to_owned(),
        resume_filename: "priya_resume.pdf".to_owned(),
        source_email_id: None,
        notes: String::new(),
        created_at: now,
        updated_at: now,
    };
    state.ctx.store.create_candidate(&candidate).expect("candidate created")
}

fn seed_application(state: &AppState, candidate_id: CandidateId, job_id: JobId) -> ApplicationId {
    use hireflow_core::model::Application;
    let now = now();
    let app = Application {
        id: ApplicationId::from_raw(1).expect("nonzero"),
        candidate_id,
        job_id,
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
    state.ctx.store.create_application(&app).expect("application created")
}

#[tokio::test]
async fn get_link_returns_invalid_for_unknown_token() {
    let (_dir, state) = test_state();
    let app = router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/screening/link/{}", "0".repeat(32)))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body reads");
    let value: serde_json::Value = serde_json::from_slice(&body).expect("valid json");
    assert_eq!(value["is_valid"], serde_json::json!(false));
    assert_eq!(value["reason"], serde_json::json!("invalid"));
}

#[tokio::test]
async fn jobs_can_be_listed_after_creation() {
    let (_dir, state) = test_state();
    seed_job(&state);
    let app = router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/jobs")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body reads");
    let jobs: Vec<Job> = serde_json::from_slice(&body).expect("valid json");
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].job_code, "JOB-1");
}

#[tokio::test]
async fn application_stage_can_be_changed_through_the_dashboard_route() {
    let (_dir, state) = test_state();
    let job_id = seed_job(&state);
    let candidate_id = seed_candidate(&state);
    let app_id = seed_application(&state, candidate_id, job_id);
    let app = router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/applications/{app_id}/stage"))
                .header("content-type", "application/json")
                .body(Body::from(serde_json::json!({ "stage": "shortlisted" }).to_string()))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body reads");
    let updated: hireflow_core::model::Application = serde_json::from_slice(&body).expect("valid json");
    assert_eq!(updated.stage, Stage::Shortlisted);
}

#[tokio::test]
async fn webhook_rejects_an_unparseable_body_when_signing_is_disabled() {
    let (_dir, state) = test_state();
    let app = router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/screening/webhook/external")
                .header("content-type", "application/json")
                .body(Body::from("not json"))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reports_funnel_reflects_seeded_application_stage() {
    let (_dir, state) = test_state();
    let job_id = seed_job(&state);
    let candidate_id = seed_candidate(&state);
    seed_application(&state, candidate_id, job_id);
    let app = router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/reports/funnel")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body reads");
    let value: serde_json::Value = serde_json::from_slice(&body).expect("valid json");
    assert_eq!(value["counts"]["matched"], serde_json::json!(1));
}
