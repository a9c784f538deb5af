// crates/hireflow-store-sqlite/src/applications.rs
// ============================================================================
// Module: Application Accessors
// Description: CRUD for the `applications` table — the aggregate the
//              ingestion pipeline, interview-link sub-engine, and decision
//              engine all read and write through Store::with_txn.
// ============================================================================

use hireflow_core::model::{
    Application, InterviewLinkStatus, Recommendation, ScreeningStatus, Stage,
};
use hireflow_core::oracle::{InterviewScoreDetail, ResumeScoreDetail};
use hireflow_core::telemetry::TelemetryAggregate;
use hireflow_core::{ApplicationId, CandidateId, JobId};
use rusqlite::{params, OptionalExtension, Row};
use serde_json::Value;
use time::OffsetDateTime;

use crate::error::SqliteStoreError;
use crate::events::insert_event_row;
use crate::rows::{from_json, from_json_opt, from_unix, from_unix_opt, to_json, to_unix};
use crate::store::Store;

pub(crate) fn stage_str(stage: Stage) -> &'static str {
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

fn parse_stage(value: &str) -> Result<Stage, SqliteStoreError> {
    match value {
        "new" => Ok(Stage::New),
        "classified" => Ok(Stage::Classified),
        "matched" => Ok(Stage::Matched),
        "interview_link_sent" => Ok(Stage::InterviewLinkSent),
        "screening_scheduled" => Ok(Stage::ScreeningScheduled),
        "screened" => Ok(Stage::Screened),
        "shortlisted" => Ok(Stage::Shortlisted),
        "rejected" => Ok(Stage::Rejected),
        other => Err(SqliteStoreError::Corrupt(format!("unknown stage: {other}"))),
    }
}

pub(crate) fn recommendation_str(recommendation: Recommendation) -> &'static str {
    match recommendation {
        Recommendation::Advance => "advance",
        Recommendation::Hold => "hold",
        Recommendation::Reject => "reject",
    }
}

fn parse_recommendation(value: &str) -> Result<Recommendation, SqliteStoreError> {
    match value {
        "advance" => Ok(Recommendation::Advance),
        "hold" => Ok(Recommendation::Hold),
        "reject" => Ok(Recommendation::Reject),
        other => Err(SqliteStoreError::Corrupt(format!(
            "unknown recommendation: {other}"
        ))),
    }
}

fn screening_status_str(status: ScreeningStatus) -> &'static str {
    match status {
        ScreeningStatus::Scheduled => "scheduled",
        ScreeningStatus::InProgress => "in_progress",
        ScreeningStatus::Completed => "completed",
        ScreeningStatus::NoAnswer => "no_answer",
        ScreeningStatus::Failed => "failed",
        ScreeningStatus::Voicemail => "voicemail",
    }
}

fn parse_screening_status(value: &str) -> Result<ScreeningStatus, SqliteStoreError> {
    match value {
        "scheduled" => Ok(ScreeningStatus::Scheduled),
        "in_progress" => Ok(ScreeningStatus::InProgress),
        "completed" => Ok(ScreeningStatus::Completed),
        "no_answer" => Ok(ScreeningStatus::NoAnswer),
        "failed" => Ok(ScreeningStatus::Failed),
        "voicemail" => Ok(ScreeningStatus::Voicemail),
        other => Err(SqliteStoreError::Corrupt(format!(
            "unknown screening status: {other}"
        ))),
    }
}

fn interview_link_status_str(status: InterviewLinkStatus) -> &'static str {
    match status {
        InterviewLinkStatus::Generated => "generated",
        InterviewLinkStatus::Sent => "sent",
        InterviewLinkStatus::Opened => "opened",
        InterviewLinkStatus::InterviewStarted => "interview_started",
        InterviewLinkStatus::InterviewCompleted => "interview_completed",
        InterviewLinkStatus::Expired => "expired",
    }
}

fn parse_interview_link_status(value: &str) -> Result<InterviewLinkStatus, SqliteStoreError> {
    match value {
        "generated" => Ok(InterviewLinkStatus::Generated),
        "sent" => Ok(InterviewLinkStatus::Sent),
        "opened" => Ok(InterviewLinkStatus::Opened),
        "interview_started" => Ok(InterviewLinkStatus::InterviewStarted),
        "interview_completed" => Ok(InterviewLinkStatus::InterviewCompleted),
        "expired" => Ok(InterviewLinkStatus::Expired),
        other => Err(SqliteStoreError::Corrupt(format!(
            "unknown interview link status: {other}"
        ))),
    }
}

struct ApplicationRow {
    id: i64,
    candidate_id: i64,
    job_id: i64,
    stage: String,
    resume_score: Option<f64>,
    resume_score_detail: Option<String>,
    interview_score: Option<f64>,
    interview_score_detail: Option<String>,
    screening_transcript: Option<String>,
    screening_audio_path: Option<String>,
    screening_status: Option<String>,
    screening_attempts: i64,
    screening_max_attempts: i64,
    screening_last_attempt_at: Option<i64>,
    screening_failure_reason: Option<String>,
    recommendation: Option<String>,
    ai_next_action: Option<String>,
    ai_snippets: String,
    created_at: i64,
    updated_at: i64,
    interview_link_status: Option<String>,
    interview_face_tracking: Option<String>,
    final_score: Option<f64>,
    booked_slot: Option<String>,
    email_draft_sent: i64,
}

impl ApplicationRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            candidate_id: row.get("candidate_id")?,
            job_id: row.get("job_id")?,
            stage: row.get("stage")?,
            resume_score: row.get("resume_score")?,
            resume_score_detail: row.get("resume_score_detail")?,
            interview_score: row.get("interview_score")?,
            interview_score_detail: row.get("interview_score_detail")?,
            screening_transcript: row.get("screening_transcript")?,
            screening_audio_path: row.get("screening_audio_path")?,
            screening_status: row.get("screening_status")?,
            screening_attempts: row.get("screening_attempts")?,
            screening_max_attempts: row.get("screening_max_attempts")?,
            screening_last_attempt_at: row.get("screening_last_attempt_at")?,
            screening_failure_reason: row.get("screening_failure_reason")?,
            recommendation: row.get("recommendation")?,
            ai_next_action: row.get("ai_next_action")?,
            ai_snippets: row.get("ai_snippets")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
            interview_link_status: row.get("interview_link_status")?,
            interview_face_tracking: row.get("interview_face_tracking")?,
            final_score: row.get("final_score")?,
            booked_slot: row.get("booked_slot")?,
            email_draft_sent: row.get("email_draft_sent")?,
        })
    }

    fn into_application(self) -> Result<Application, SqliteStoreError> {
        Ok(Application {
            id: ApplicationId::try_from(self.id).map_err(|e| SqliteStoreError::Corrupt(e.to_string()))?,
            candidate_id: CandidateId::try_from(self.candidate_id)
                .map_err(|e| SqliteStoreError::Corrupt(e.to_string()))?,
            job_id: JobId::try_from(self.job_id).map_err(|e| SqliteStoreError::Corrupt(e.to_string()))?,
            stage: parse_stage(&self.stage)?,
            resume_score: self.resume_score,
            resume_score_detail: from_json_opt::<ResumeScoreDetail>(self.resume_score_detail)?,
            interview_score: self.interview_score,
            interview_score_detail: from_json_opt::<InterviewScoreDetail>(self.interview_score_detail)?,
            screening_transcript: self.screening_transcript,
            screening_audio_path: self.screening_audio_path,
            screening_status: self
                .screening_status
                .as_deref()
                .map(parse_screening_status)
                .transpose()?,
            screening_attempts: u32::try_from(self.screening_attempts)
                .map_err(|_| SqliteStoreError::Corrupt("negative screening_attempts".to_owned()))?,
            screening_max_attempts: u32::try_from(self.screening_max_attempts).map_err(|_| {
                SqliteStoreError::Corrupt("negative screening_max_attempts".to_owned())
            })?,
            screening_last_attempt_at: from_unix_opt(self.screening_last_attempt_at)?,
            screening_failure_reason: self.screening_failure_reason,
            recommendation: self
                .recommendation
                .as_deref()
                .map(parse_recommendation)
                .transpose()?,
            ai_next_action: self.ai_next_action,
            ai_snippets: from_json(&self.ai_snippets)?,
            created_at: from_unix(self.created_at)?,
            updated_at: from_unix(self.updated_at)?,
            interview_link_status: self
                .interview_link_status
                .as_deref()
                .map(parse_interview_link_status)
                .transpose()?,
            interview_face_tracking: from_json_opt::<TelemetryAggregate>(self.interview_face_tracking)?,
            final_score: self.final_score,
            booked_slot: self.booked_slot,
            email_draft_sent: self.email_draft_sent != 0,
        })
    }
}

impl Store {
    /// Inserts a new application at `app.stage` (the ingestion pipeline
    /// always passes [`Stage::Matched`]) and returns its assigned
    /// identifier.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::Conflict`] if this candidate already
    /// has an application to this job.
    pub fn create_application(&self, app: &Application) -> Result<ApplicationId, SqliteStoreError> {
        self.with_txn(None, |tx| {
            tx.execute(
                "INSERT INTO applications (candidate_id, job_id, stage, screening_max_attempts,
                    ai_snippets, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    app.candidate_id.as_i64(),
                    app.job_id.as_i64(),
                    stage_str(app.stage),
                    i64::from(app.screening_max_attempts),
                    to_json(&app.ai_snippets)?,
                    to_unix(app.created_at),
                    to_unix(app.updated_at),
                ],
            )
            .map_err(|err| match err.sqlite_error_code() {
                Some(rusqlite::ErrorCode::ConstraintViolation) => SqliteStoreError::Conflict(format!(
                    "candidate {} already applied to job {}",
                    app.candidate_id, app.job_id
                )),
                _ => SqliteStoreError::from(err),
            })?;
            let id = tx.last_insert_rowid();
            ApplicationId::try_from(id).map_err(|e| SqliteStoreError::Corrupt(e.to_string()))
        })
    }

    /// Inserts a new application and appends its `(none) -> matched` audit
    /// event in the same transaction — the ingestion pipeline's step-6
    /// requirement that the creation and its Event never diverge.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::Conflict`] if this candidate already
    /// has an application to this job.
    pub fn create_application_with_event(
        &self,
        app: &Application,
        event_type: &str,
        payload: &Value,
        now: OffsetDateTime,
    ) -> Result<ApplicationId, SqliteStoreError> {
        self.with_txn(None, |tx| {
            tx.execute(
                "INSERT INTO applications (candidate_id, job_id, stage, screening_max_attempts,
                    ai_snippets, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    app.candidate_id.as_i64(),
                    app.job_id.as_i64(),
                    stage_str(app.stage),
                    i64::from(app.screening_max_attempts),
                    to_json(&app.ai_snippets)?,
                    to_unix(app.created_at),
                    to_unix(app.updated_at),
                ],
            )
            .map_err(|err| match err.sqlite_error_code() {
                Some(rusqlite::ErrorCode::ConstraintViolation) => SqliteStoreError::Conflict(format!(
                    "candidate {} already applied to job {}",
                    app.candidate_id, app.job_id
                )),
                _ => SqliteStoreError::from(err),
            })?;
            let id = tx.last_insert_rowid();
            let app_id =
                ApplicationId::try_from(id).map_err(|e| SqliteStoreError::Corrupt(e.to_string()))?;
            insert_event_row(tx, Some(app_id), event_type, payload, now)?;
            Ok(app_id)
        })
    }

    /// Moves an application to a new funnel stage and appends the Event
    /// describing the transition, atomically.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such application
    /// exists.
    pub fn set_application_stage_with_event(
        &self,
        id: ApplicationId,
        stage: Stage,
        event_type: &str,
        payload: &Value,
        now: OffsetDateTime,
    ) -> Result<(), SqliteStoreError> {
        self.with_txn(Some(id), |tx| {
            let affected = tx.execute(
                "UPDATE applications SET stage = ?1, updated_at = ?2 WHERE id = ?3",
                params![stage_str(stage), to_unix(now), id.as_i64()],
            )?;
            if affected == 0 {
                return Err(SqliteStoreError::NotFound(format!("application {id}")));
            }
            insert_event_row(tx, Some(id), event_type, payload, now)?;
            Ok(())
        })
    }

    /// Records the decision engine's verdict and appends its single
    /// `evaluated` Event in the same transaction.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such application
    /// exists.
    #[allow(clippy::too_many_arguments, reason = "mirrors one atomic row update")]
    pub fn record_decision_outcome_with_event(
        &self,
        id: ApplicationId,
        final_score: Option<f64>,
        stage: Stage,
        recommendation: Recommendation,
        booked_slot: Option<&str>,
        event_type: &str,
        payload: &Value,
        now: OffsetDateTime,
    ) -> Result<(), SqliteStoreError> {
        self.with_txn(Some(id), |tx| {
            let affected = tx.execute(
                "UPDATE applications SET final_score = ?1, stage = ?2, recommendation = ?3,
                    booked_slot = ?4, updated_at = ?5
                 WHERE id = ?6",
                params![
                    final_score,
                    stage_str(stage),
                    recommendation_str(recommendation),
                    booked_slot,
                    to_unix(now),
                    id.as_i64(),
                ],
            )?;
            if affected == 0 {
                return Err(SqliteStoreError::NotFound(format!("application {id}")));
            }
            insert_event_row(tx, Some(id), event_type, payload, now)?;
            Ok(())
        })
    }

    /// Fetches an application by its durable identifier.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such application
    /// exists.
    pub fn get_application(&self, id: ApplicationId) -> Result<Application, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let row = tx
                .query_row(
                    "SELECT * FROM applications WHERE id = ?1",
                    params![id.as_i64()],
                    ApplicationRow::from_row,
                )
                .optional()?;
            row.ok_or_else(|| SqliteStoreError::NotFound(format!("application {id}")))?
                .into_application()
        })
    }

    /// Finds the application a candidate already has against a job, if
    /// any (the dedup check `run_email_workflow` consults before
    /// materializing a new one).
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] on a query or decode failure.
    pub fn find_application(
        &self,
        candidate_id: CandidateId,
        job_id: JobId,
    ) -> Result<Option<Application>, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let row = tx
                .query_row(
                    "SELECT * FROM applications WHERE candidate_id = ?1 AND job_id = ?2",
                    params![candidate_id.as_i64(), job_id.as_i64()],
                    ApplicationRow::from_row,
                )
                .optional()?;
            row.map(ApplicationRow::into_application).transpose()
        })
    }

    /// Lists every application against a job, newest first.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] on a query or decode failure.
    pub fn list_applications_by_job(
        &self,
        job_id: JobId,
    ) -> Result<Vec<Application>, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let mut stmt = tx.prepare(
                "SELECT * FROM applications WHERE job_id = ?1 ORDER BY created_at DESC",
            )?;
            let rows = stmt.query_map(params![job_id.as_i64()], ApplicationRow::from_row)?;
            let mut apps = Vec::new();
            for row in rows {
                apps.push(row?.into_application()?);
            }
            Ok(apps)
        })
    }

    /// Lists every application currently at a given stage, oldest first
    /// (the order the pipeline should work through them in).
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] on a query or decode failure.
    pub fn list_applications_by_stage(
        &self,
        stage: Stage,
    ) -> Result<Vec<Application>, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let mut stmt = tx.prepare(
                "SELECT * FROM applications WHERE stage = ?1 ORDER BY created_at ASC",
            )?;
            let rows = stmt.query_map(params![stage_str(stage)], ApplicationRow::from_row)?;
            let mut apps = Vec::new();
            for row in rows {
                apps.push(row?.into_application()?);
            }
            Ok(apps)
        })
    }

    /// Lists every application, newest first — the dashboard's funnel-wide
    /// view, as distinct from [`Store::list_applications_by_job`] and
    /// [`Store::list_applications_by_stage`].
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] on a query or decode failure.
    pub fn list_all_applications(&self) -> Result<Vec<Application>, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let mut stmt = tx.prepare("SELECT * FROM applications ORDER BY created_at DESC")?;
            let rows = stmt.query_map(params![], ApplicationRow::from_row)?;
            let mut apps = Vec::new();
            for row in rows {
                apps.push(row?.into_application()?);
            }
            Ok(apps)
        })
    }

    /// Sets a recruiter-booked interview slot directly, bypassing the
    /// decision engine (the dashboard's manual book-slot action).
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such application
    /// exists.
    pub fn set_booked_slot(
        &self,
        id: ApplicationId,
        slot: &str,
        now: OffsetDateTime,
    ) -> Result<(), SqliteStoreError> {
        self.with_txn(Some(id), |tx| {
            let affected = tx.execute(
                "UPDATE applications SET booked_slot = ?1, updated_at = ?2 WHERE id = ?3",
                params![slot, to_unix(now), id.as_i64()],
            )?;
            if affected == 0 {
                return Err(SqliteStoreError::NotFound(format!("application {id}")));
            }
            Ok(())
        })
    }

    /// Moves an application to a new funnel stage.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such application
    /// exists.
    pub fn set_application_stage(
        &self,
        id: ApplicationId,
        stage: Stage,
        now: OffsetDateTime,
    ) -> Result<(), SqliteStoreError> {
        self.with_txn(Some(id), |tx| {
            let affected = tx.execute(
                "UPDATE applications SET stage = ?1, updated_at = ?2 WHERE id = ?3",
                params![stage_str(stage), to_unix(now), id.as_i64()],
            )?;
            if affected == 0 {
                return Err(SqliteStoreError::NotFound(format!("application {id}")));
            }
            Ok(())
        })
    }

    /// Records the resume scorer's outcome, including the decision
    /// engine's recommendation derived from it.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such application
    /// exists.
    #[allow(clippy::too_many_arguments, reason = "mirrors one atomic row update")]
    pub fn record_resume_score(
        &self,
        id: ApplicationId,
        score: f64,
        detail: &ResumeScoreDetail,
        recommendation: Recommendation,
        ai_next_action: Option<&str>,
        ai_snippets: &[String],
        now: OffsetDateTime,
    ) -> Result<(), SqliteStoreError> {
        self.with_txn(Some(id), |tx| {
            let affected = tx.execute(
                "UPDATE applications SET resume_score = ?1, resume_score_detail = ?2,
                    recommendation = ?3, ai_next_action = ?4, ai_snippets = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![
                    score,
                    to_json(detail)?,
                    recommendation_str(recommendation),
                    ai_next_action,
                    to_json(ai_snippets)?,
                    to_unix(now),
                    id.as_i64(),
                ],
            )?;
            if affected == 0 {
                return Err(SqliteStoreError::NotFound(format!("application {id}")));
            }
            Ok(())
        })
    }

    /// Records the interview evaluator's outcome and the decision
    /// engine's resulting recommendation.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such application
    /// exists.
    #[allow(clippy::too_many_arguments, reason = "mirrors one atomic row update")]
    pub fn record_interview_score(
        &self,
        id: ApplicationId,
        score: f64,
        detail: &InterviewScoreDetail,
        recommendation: Recommendation,
        ai_next_action: Option<&str>,
        ai_snippets: &[String],
        now: OffsetDateTime,
    ) -> Result<(), SqliteStoreError> {
        self.with_txn(Some(id), |tx| {
            let affected = tx.execute(
                "UPDATE applications SET interview_score = ?1, interview_score_detail = ?2,
                    recommendation = ?3, ai_next_action = ?4, ai_snippets = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![
                    score,
                    to_json(detail)?,
                    recommendation_str(recommendation),
                    ai_next_action,
                    to_json(ai_snippets)?,
                    to_unix(now),
                    id.as_i64(),
                ],
            )?;
            if affected == 0 {
                return Err(SqliteStoreError::NotFound(format!("application {id}")));
            }
            Ok(())
        })
    }

    /// Records the outcome of a voice/phone screening attempt.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such application
    /// exists.
    #[allow(clippy::too_many_arguments, reason = "mirrors one atomic row update")]
    pub fn record_screening_attempt(
        &self,
        id: ApplicationId,
        status: ScreeningStatus,
        transcript: Option<&str>,
        audio_path: Option<&str>,
        failure_reason: Option<&str>,
        attempts: u32,
        now: OffsetDateTime,
    ) -> Result<(), SqliteStoreError> {
        self.with_txn(Some(id), |tx| {
            let affected = tx.execute(
                "UPDATE applications SET screening_status = ?1, screening_transcript = COALESCE(?2, screening_transcript),
                    screening_audio_path = COALESCE(?3, screening_audio_path), screening_failure_reason = ?4,
                    screening_attempts = ?5, screening_last_attempt_at = ?6, updated_at = ?6
                 WHERE id = ?7",
                params![
                    screening_status_str(status),
                    transcript,
                    audio_path,
                    failure_reason,
                    i64::from(attempts),
                    to_unix(now),
                    id.as_i64(),
                ],
            )?;
            if affected == 0 {
                return Err(SqliteStoreError::NotFound(format!("application {id}")));
            }
            Ok(())
        })
    }

    /// Mirrors the status of the application's most recently issued
    /// interview link onto the application row itself, so dashboard
    /// queries don't need to join `interview_links`.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such application
    /// exists.
    pub fn set_application_interview_link_status(
        &self,
        id: ApplicationId,
        status: InterviewLinkStatus,
        now: OffsetDateTime,
    ) -> Result<(), SqliteStoreError> {
        self.with_txn(Some(id), |tx| {
            let affected = tx.execute(
                "UPDATE applications SET interview_link_status = ?1, updated_at = ?2 WHERE id = ?3",
                params![interview_link_status_str(status), to_unix(now), id.as_i64()],
            )?;
            if affected == 0 {
                return Err(SqliteStoreError::NotFound(format!("application {id}")));
            }
            Ok(())
        })
    }

    /// Sets the voice/phone screening status alone, without touching any
    /// of the fields [`Store::record_screening_attempt`] also updates —
    /// the interview-link sub-engine's `interview_started` mirror only
    /// needs this much.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such application
    /// exists.
    pub fn set_screening_status(
        &self,
        id: ApplicationId,
        status: ScreeningStatus,
        now: OffsetDateTime,
    ) -> Result<(), SqliteStoreError> {
        self.with_txn(Some(id), |tx| {
            let affected = tx.execute(
                "UPDATE applications SET screening_status = ?1, updated_at = ?2 WHERE id = ?3",
                params![screening_status_str(status), to_unix(now), id.as_i64()],
            )?;
            if affected == 0 {
                return Err(SqliteStoreError::NotFound(format!("application {id}")));
            }
            Ok(())
        })
    }

    /// Overwrites the application's aggregated face-tracking telemetry.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such application
    /// exists.
    pub fn set_interview_face_tracking(
        &self,
        id: ApplicationId,
        aggregate: &TelemetryAggregate,
        now: OffsetDateTime,
    ) -> Result<(), SqliteStoreError> {
        self.with_txn(Some(id), |tx| {
            let affected = tx.execute(
                "UPDATE applications SET interview_face_tracking = ?1, updated_at = ?2 WHERE id = ?3",
                params![to_json(aggregate)?, to_unix(now), id.as_i64()],
            )?;
            if affected == 0 {
                return Err(SqliteStoreError::NotFound(format!("application {id}")));
            }
            Ok(())
        })
    }

    /// Records the decision engine's verdict: the combined `final_score`,
    /// the resulting stage and recommendation, and the booked slot (`None`
    /// clears a stale one, per the `hold` side effect).
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such application
    /// exists.
    #[allow(clippy::too_many_arguments, reason = "mirrors one atomic row update")]
    pub fn record_decision_outcome(
        &self,
        id: ApplicationId,
        final_score: Option<f64>,
        stage: Stage,
        recommendation: Recommendation,
        booked_slot: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<(), SqliteStoreError> {
        self.with_txn(Some(id), |tx| {
            let affected = tx.execute(
                "UPDATE applications SET final_score = ?1, stage = ?2, recommendation = ?3,
                    booked_slot = ?4, updated_at = ?5
                 WHERE id = ?6",
                params![
                    final_score,
                    stage_str(stage),
                    recommendation_str(recommendation),
                    booked_slot,
                    to_unix(now),
                    id.as_i64(),
                ],
            )?;
            if affected == 0 {
                return Err(SqliteStoreError::NotFound(format!("application {id}")));
            }
            Ok(())
        })
    }

    /// Marks the decision engine's outbound email (advance or reject) as
    /// confirmed sent. Only ever set on success; never reset.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such application
    /// exists.
    pub fn set_email_draft_sent(
        &self,
        id: ApplicationId,
        now: OffsetDateTime,
    ) -> Result<(), SqliteStoreError> {
        self.with_txn(Some(id), |tx| {
            let affected = tx.execute(
                "UPDATE applications SET email_draft_sent = 1, updated_at = ?1 WHERE id = ?2",
                params![to_unix(now), id.as_i64()],
            )?;
            if affected == 0 {
                return Err(SqliteStoreError::NotFound(format!("application {id}")));
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_round_trips() {
        for stage in [
            Stage::New,
            Stage::Classified,
            Stage::Matched,
            Stage::InterviewLinkSent,
            Stage::ScreeningScheduled,
            Stage::Screened,
            Stage::Shortlisted,
            Stage::Rejected,
        ] {
            assert_eq!(parse_stage(stage_str(stage)).expect("valid stage"), stage);
        }
    }

    #[test]
    fn recommendation_round_trips() {
        for recommendation in [
            Recommendation::Advance,
            Recommendation::Hold,
            Recommendation::Reject,
        ] {
            assert_eq!(
                parse_recommendation(recommendation_str(recommendation)).expect("valid"),
                recommendation
            );
        }
    }
}
