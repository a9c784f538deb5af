// crates/hireflow-store-sqlite/src/jobs.rs
// ============================================================================
// Module: Job Accessors
// Description: CRUD for the `jobs` table.
// ============================================================================

use hireflow_core::decision::Thresholds;
use hireflow_core::model::{Job, JobStatus};
use hireflow_core::JobId;
use rusqlite::{params, OptionalExtension, Row};
use time::OffsetDateTime;

use crate::error::SqliteStoreError;
use crate::rows::{from_json, from_unix, to_json, to_unix};
use crate::store::Store;

fn job_status_str(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Open => "open",
        JobStatus::Closed => "closed",
        JobStatus::Paused => "paused",
    }
}

fn parse_job_status(value: &str) -> Result<JobStatus, SqliteStoreError> {
    match value {
        "open" => Ok(JobStatus::Open),
        "closed" => Ok(JobStatus::Closed),
        "paused" => Ok(JobStatus::Paused),
        other => Err(SqliteStoreError::Corrupt(format!(
            "unknown job status: {other}"
        ))),
    }
}

/// The raw, untranslated columns of a `jobs` row.
struct JobRow {
    id: i64,
    job_code: String,
    title: String,
    department: String,
    location: String,
    seniority: String,
    must_have_skills: String,
    nice_to_have_skills: String,
    description: String,
    resume_min: f64,
    interview_min: f64,
    reject_below: f64,
    status: String,
    created_at: i64,
    updated_at: i64,
}

impl JobRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            job_code: row.get("job_code")?,
            title: row.get("title")?,
            department: row.get("department")?,
            location: row.get("location")?,
            seniority: row.get("seniority")?,
            must_have_skills: row.get("must_have_skills")?,
            nice_to_have_skills: row.get("nice_to_have_skills")?,
            description: row.get("description")?,
            resume_min: row.get("resume_min")?,
            interview_min: row.get("interview_min")?,
            reject_below: row.get("reject_below")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn into_job(self) -> Result<Job, SqliteStoreError> {
        Ok(Job {
            id: JobId::try_from(self.id).map_err(|e| SqliteStoreError::Corrupt(e.to_string()))?,
            job_code: self.job_code,
            title: self.title,
            department: self.department,
            location: self.location,
            seniority: self.seniority,
            must_have_skills: from_json(&self.must_have_skills)?,
            nice_to_have_skills: from_json(&self.nice_to_have_skills)?,
            description: self.description,
            thresholds: Thresholds {
                resume_min: self.resume_min,
                interview_min: self.interview_min,
                reject_below: self.reject_below,
            },
            status: parse_job_status(&self.status)?,
            created_at: from_unix(self.created_at)?,
            updated_at: from_unix(self.updated_at)?,
        })
    }
}

impl Store {
    /// Inserts a new job and returns its assigned identifier.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::Conflict`] if `job_code` is already
    /// taken.
    pub fn create_job(&self, job: &Job) -> Result<JobId, SqliteStoreError> {
        self.with_txn(None, |tx| {
            tx.execute(
                "INSERT INTO jobs (job_code, title, department, location, seniority,
                    must_have_skills, nice_to_have_skills, description,
                    resume_min, interview_min, reject_below, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    job.job_code,
                    job.title,
                    job.department,
                    job.location,
                    job.seniority,
                    to_json(&job.must_have_skills)?,
                    to_json(&job.nice_to_have_skills)?,
                    job.description,
                    job.thresholds.resume_min,
                    job.thresholds.interview_min,
                    job.thresholds.reject_below,
                    job_status_str(job.status),
                    to_unix(job.created_at),
                    to_unix(job.updated_at),
                ],
            )
            .map_err(|err| match err.sqlite_error_code() {
                Some(rusqlite::ErrorCode::ConstraintViolation) => {
                    SqliteStoreError::Conflict(format!("job code already exists: {}", job.job_code))
                }
                _ => SqliteStoreError::from(err),
            })?;
            let id = tx.last_insert_rowid();
            JobId::try_from(id).map_err(|e| SqliteStoreError::Corrupt(e.to_string()))
        })
    }

    /// Fetches a job by its durable identifier.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such job exists.
    pub fn get_job(&self, id: JobId) -> Result<Job, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let row = tx
                .query_row(
                    "SELECT * FROM jobs WHERE id = ?1",
                    params![id.as_i64()],
                    JobRow::from_row,
                )
                .optional()?;
            row.ok_or_else(|| SqliteStoreError::NotFound(format!("job {id}")))?
                .into_job()
        })
    }

    /// Fetches a job by its human-facing code.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such job exists.
    pub fn get_job_by_code(&self, job_code: &str) -> Result<Job, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let row = tx
                .query_row(
                    "SELECT * FROM jobs WHERE job_code = ?1",
                    params![job_code],
                    JobRow::from_row,
                )
                .optional()?;
            row.ok_or_else(|| SqliteStoreError::NotFound(format!("job with code {job_code}")))?
                .into_job()
        })
    }

    /// Lists every job with [`JobStatus::Open`], newest first.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] on a query or decode failure.
    pub fn list_open_jobs(&self) -> Result<Vec<Job>, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let mut stmt =
                tx.prepare("SELECT * FROM jobs WHERE status = 'open' ORDER BY created_at DESC")?;
            let rows = stmt.query_map(params![], JobRow::from_row)?;
            let mut jobs = Vec::new();
            for row in rows {
                jobs.push(row?.into_job()?);
            }
            Ok(jobs)
        })
    }

    /// Lists every job regardless of status, newest first — the dashboard's
    /// Jobs CRUD listing, as distinct from [`Store::list_open_jobs`] which
    /// the ingestion pipeline uses to pick a match.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] on a query or decode failure.
    pub fn list_all_jobs(&self) -> Result<Vec<Job>, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let mut stmt = tx.prepare("SELECT * FROM jobs ORDER BY created_at DESC")?;
            let rows = stmt.query_map(params![], JobRow::from_row)?;
            let mut jobs = Vec::new();
            for row in rows {
                jobs.push(row?.into_job()?);
            }
            Ok(jobs)
        })
    }

    /// Updates a job's status and bumps `updated_at`.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such job exists.
    pub fn set_job_status(
        &self,
        id: JobId,
        status: JobStatus,
        now: OffsetDateTime,
    ) -> Result<(), SqliteStoreError> {
        self.with_txn(None, |tx| {
            let affected = tx.execute(
                "UPDATE jobs SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![job_status_str(status), to_unix(now), id.as_i64()],
            )?;
            if affected == 0 {
                return Err(SqliteStoreError::NotFound(format!("job {id}")));
            }
            Ok(())
        })
    }
}
