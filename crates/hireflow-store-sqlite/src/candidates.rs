// crates/hireflow-store-sqlite/src/candidates.rs
// ============================================================================
// Module: Candidate Accessors
// Description: CRUD for the `candidates` table.
// ============================================================================

use hireflow_core::model::Candidate;
use hireflow_core::{CandidateId, EmailId};
use rusqlite::{params, OptionalExtension, Row};
use time::OffsetDateTime;

use crate::error::SqliteStoreError;
use crate::rows::{from_unix, to_unix};
use crate::store::Store;

struct CandidateRow {
    id: i64,
    name: String,
    email: String,
    phone: String,
    resume_text: String,
    resume_filename: String,
    source_email_id: Option<i64>,
    notes: String,
    created_at: i64,
    updated_at: i64,
}

impl CandidateRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            resume_text: row.get("resume_text")?,
            resume_filename: row.get("resume_filename")?,
            source_email_id: row.get("source_email_id")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn into_candidate(self) -> Result<Candidate, SqliteStoreError> {
        Ok(Candidate {
            id: CandidateId::try_from(self.id).map_err(|e| SqliteStoreError::Corrupt(e.to_string()))?,
            name: self.name,
            email: self.email,
            phone: self.phone,
            resume_text: self.resume_text,
            resume_filename: self.resume_filename,
            source_email_id: self
                .source_email_id
                .map(EmailId::try_from)
                .transpose()
                .map_err(|e| SqliteStoreError::Corrupt(e.to_string()))?,
            notes: self.notes,
            created_at: from_unix(self.created_at)?,
            updated_at: from_unix(self.updated_at)?,
        })
    }
}

impl Store {
    /// Inserts a new candidate and returns its assigned identifier.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] on a query failure.
    pub fn create_candidate(&self, candidate: &Candidate) -> Result<CandidateId, SqliteStoreError> {
        self.with_txn(None, |tx| {
            tx.execute(
                "INSERT INTO candidates (name, email, phone, resume_text, resume_filename,
                    source_email_id, notes, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    candidate.name,
                    candidate.email,
                    candidate.phone,
                    candidate.resume_text,
                    candidate.resume_filename,
                    candidate.source_email_id.map(EmailId::as_i64),
                    candidate.notes,
                    to_unix(candidate.created_at),
                    to_unix(candidate.updated_at),
                ],
            )?;
            let id = tx.last_insert_rowid();
            CandidateId::try_from(id).map_err(|e| SqliteStoreError::Corrupt(e.to_string()))
        })
    }

    /// Fetches a candidate by its durable identifier.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such candidate exists.
    pub fn get_candidate(&self, id: CandidateId) -> Result<Candidate, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let row = tx
                .query_row(
                    "SELECT * FROM candidates WHERE id = ?1",
                    params![id.as_i64()],
                    CandidateRow::from_row,
                )
                .optional()?;
            row.ok_or_else(|| SqliteStoreError::NotFound(format!("candidate {id}")))?
                .into_candidate()
        })
    }

    /// Finds a candidate by contact email address, if one is already on
    /// file (used to avoid creating duplicate candidates for repeat
    /// applicants).
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] on a query or decode failure.
    pub fn find_candidate_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Candidate>, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let row = tx
                .query_row(
                    "SELECT * FROM candidates WHERE email = ?1",
                    params![email],
                    CandidateRow::from_row,
                )
                .optional()?;
            row.map(CandidateRow::into_candidate).transpose()
        })
    }

    /// Lists every candidate, newest first.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] on a query or decode failure.
    pub fn list_all_candidates(&self) -> Result<Vec<Candidate>, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let mut stmt = tx.prepare("SELECT * FROM candidates ORDER BY created_at DESC")?;
            let rows = stmt.query_map(params![], CandidateRow::from_row)?;
            let mut candidates = Vec::new();
            for row in rows {
                candidates.push(row?.into_candidate()?);
            }
            Ok(candidates)
        })
    }

    /// Updates a candidate's recruiter-editable fields and bumps
    /// `updated_at`.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such candidate exists.
    pub fn update_candidate_notes(
        &self,
        id: CandidateId,
        notes: &str,
        now: OffsetDateTime,
    ) -> Result<(), SqliteStoreError> {
        self.with_txn(None, |tx| {
            let affected = tx.execute(
                "UPDATE candidates SET notes = ?1, updated_at = ?2 WHERE id = ?3",
                params![notes, to_unix(now), id.as_i64()],
            )?;
            if affected == 0 {
                return Err(SqliteStoreError::NotFound(format!("candidate {id}")));
            }
            Ok(())
        })
    }
}
