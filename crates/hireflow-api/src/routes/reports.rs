// crates/hireflow-api/src/routes/reports.rs
// ============================================================================
// Module: Reports Dashboard Routes
// Description: Read-only aggregates over the Store — funnel counts,
//              top-scoring candidates, a pipeline summary, and recent
//              activity. Each is derived in-handler from the existing
//              listing accessors; none warrant a dedicated query.
// Dependencies: axum, hireflow-core
// ============================================================================

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::{Json, Router};
use axum::routing::get;
use hireflow_core::model::{Application, Event, Recommendation, Stage};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Builds the reports route group.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports/funnel", get(funnel))
        .route("/reports/top-candidates", get(top_candidates))
        .route("/reports/summary", get(summary))
        .route("/reports/activity", get(activity))
}

fn stage_key(stage: Stage) -> &'static str {
    match stage {
        Stage::New => "new",
        Stage::Classified => "classified",
        Stage::Matched => "matched",
        Stage::InterviewLinkSent => "interview_link_sent",
        Stage::ScreeningScheduled => "screening_scheduled",
        Stage::Screened => "screened",
        Stage::Shortlisted => "shortlisted",
        Stage::Rejected => "rejected",
    }
}

#[derive(Debug, Serialize)]
struct FunnelReport {
    counts: BTreeMap<&'static str, usize>,
}

async fn funnel(State(state): State<AppState>) -> Result<Json<FunnelReport>, ApiError> {
    let applications = state.ctx.store.list_all_applications()?;
    let mut counts = BTreeMap::new();
    for app in &applications {
        *counts.entry(stage_key(app.stage)).or_insert(0) += 1;
    }
    Ok(Json(FunnelReport { counts }))
}

#[derive(Debug, Deserialize)]
struct TopCandidatesQuery {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    10
}

async fn top_candidates(
    State(state): State<AppState>,
    Query(query): Query<TopCandidatesQuery>,
) -> Result<Json<Vec<Application>>, ApiError> {
    let mut applications: Vec<Application> = state
        .ctx
        .store
        .list_all_applications()?
        .into_iter()
        .filter(|app| app.final_score.is_some())
        .collect();
    applications.sort_by(|a, b| {
        b.final_score
            .unwrap_or(0.0)
            .partial_cmp(&a.final_score.unwrap_or(0.0))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    applications.truncate(query.limit);
    Ok(Json(applications))
}

#[derive(Debug, Serialize)]
struct SummaryReport {
    total_applications: usize,
    advance_count: usize,
    hold_count: usize,
    reject_count: usize,
    avg_resume_score: Option<f64>,
    avg_interview_score: Option<f64>,
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    #[allow(
        clippy::cast_precision_loss,
        reason = "application counts stay far below f64's exact-integer range"
    )]
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

async fn summary(State(state): State<AppState>) -> Result<Json<SummaryReport>, ApiError> {
    let applications = state.ctx.store.list_all_applications()?;
    let mut advance_count = 0;
    let mut hold_count = 0;
    let mut reject_count = 0;
    for app in &applications {
        match app.recommendation {
            Some(Recommendation::Advance) => advance_count += 1,
            Some(Recommendation::Hold) => hold_count += 1,
            Some(Recommendation::Reject) => reject_count += 1,
            None => {}
        }
    }
    let resume_scores: Vec<f64> = applications.iter().filter_map(|app| app.resume_score).collect();
    let interview_scores: Vec<f64> = applications.iter().filter_map(|app| app.interview_score).collect();
    Ok(Json(SummaryReport {
        total_applications: applications.len(),
        advance_count,
        hold_count,
        reject_count,
        avg_resume_score: average(&resume_scores),
        avg_interview_score: average(&interview_scores),
    }))
}

#[derive(Debug, Deserialize)]
struct ActivityQuery {
    #[serde(default = "default_activity_limit")]
    limit: u32,
}

fn default_activity_limit() -> u32 {
    50
}

async fn activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(state.ctx.store.list_recent_events(query.limit)?))
}
