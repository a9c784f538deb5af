// crates/hireflow-store-sqlite/src/emails.rs
// ============================================================================
// Module: Email Accessors
// Description: CRUD for the `emails` table and the ingestion-pipeline's
//              idempotency guard (processed level never decreases).
// ============================================================================

use hireflow_core::model::{Email, EmailProcessed};
use hireflow_core::oracle::EmailClassification;
use hireflow_core::EmailId;
use rusqlite::{params, OptionalExtension, Row};
use time::OffsetDateTime;

use crate::error::SqliteStoreError;
use crate::rows::{from_json, from_json_opt, from_unix, from_unix_opt, to_json, to_unix};
use crate::store::Store;

fn processed_to_i64(processed: EmailProcessed) -> i64 {
    processed as i64
}

fn processed_from_i64(value: i64) -> Result<EmailProcessed, SqliteStoreError> {
    match value {
        0 => Ok(EmailProcessed::New),
        1 => Ok(EmailProcessed::Classified),
        2 => Ok(EmailProcessed::Materialized),
        other => Err(SqliteStoreError::Corrupt(format!(
            "unknown email processed level: {other}"
        ))),
    }
}

struct EmailRow {
    id: i64,
    message_id: Option<String>,
    from_address: String,
    from_name: String,
    subject: String,
    body_snippet: String,
    body_full: String,
    attachments: String,
    classification: Option<String>,
    confidence: Option<f64>,
    processed: i64,
    received_at: Option<i64>,
    created_at: i64,
}

impl EmailRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            message_id: row.get("message_id")?,
            from_address: row.get("from_address")?,
            from_name: row.get("from_name")?,
            subject: row.get("subject")?,
            body_snippet: row.get("body_snippet")?,
            body_full: row.get("body_full")?,
            attachments: row.get("attachments")?,
            classification: row.get("classification")?,
            confidence: row.get("confidence")?,
            processed: row.get("processed")?,
            received_at: row.get("received_at")?,
            created_at: row.get("created_at")?,
        })
    }

    fn into_email(self) -> Result<Email, SqliteStoreError> {
        Ok(Email {
            id: EmailId::try_from(self.id).map_err(|e| SqliteStoreError::Corrupt(e.to_string()))?,
            message_id: self.message_id,
            from_address: self.from_address,
            from_name: self.from_name,
            subject: self.subject,
            body_snippet: self.body_snippet,
            body_full: self.body_full,
            attachments: from_json(&self.attachments)?,
            classification: from_json_opt::<EmailClassification>(self.classification)?,
            confidence: self.confidence,
            processed: processed_from_i64(self.processed)?,
            received_at: from_unix_opt(self.received_at)?,
            created_at: from_unix(self.created_at)?,
        })
    }
}

impl Store {
    /// Inserts a newly observed email at [`EmailProcessed::New`].
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::Conflict`] if `message_id` is already
    /// known (the mailbox listener's dedup guard).
    pub fn insert_email(&self, email: &Email) -> Result<EmailId, SqliteStoreError> {
        self.with_txn(None, |tx| {
            tx.execute(
                "INSERT INTO emails (message_id, from_address, from_name, subject, body_snippet,
                    body_full, attachments, classification, confidence, processed, received_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    email.message_id,
                    email.from_address,
                    email.from_name,
                    email.subject,
                    email.body_snippet,
                    email.body_full,
                    to_json(&email.attachments)?,
                    email.classification.as_ref().map(to_json).transpose()?,
                    email.confidence,
                    processed_to_i64(email.processed),
                    email.received_at.map(to_unix),
                    to_unix(email.created_at),
                ],
            )
            .map_err(|err| match err.sqlite_error_code() {
                Some(rusqlite::ErrorCode::ConstraintViolation) => SqliteStoreError::Conflict(
                    format!("email with message_id already exists: {:?}", email.message_id),
                ),
                _ => SqliteStoreError::from(err),
            })?;
            let id = tx.last_insert_rowid();
            EmailId::try_from(id).map_err(|e| SqliteStoreError::Corrupt(e.to_string()))
        })
    }

    /// Fetches an email by its durable identifier.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such email exists.
    pub fn get_email(&self, id: EmailId) -> Result<Email, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let row = tx
                .query_row("SELECT * FROM emails WHERE id = ?1", params![id.as_i64()], EmailRow::from_row)
                .optional()?;
            row.ok_or_else(|| SqliteStoreError::NotFound(format!("email {id}")))?
                .into_email()
        })
    }

    /// Fetches an email by its transport-level message id, if the
    /// mailbox backend reports one. Used to skip re-ingesting a message
    /// already observed once.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] on a query or decode failure.
    pub fn get_email_by_message_id(
        &self,
        message_id: &str,
    ) -> Result<Option<Email>, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let row = tx
                .query_row(
                    "SELECT * FROM emails WHERE message_id = ?1",
                    params![message_id],
                    EmailRow::from_row,
                )
                .optional()?;
            row.map(EmailRow::into_email).transpose()
        })
    }

    /// Lists emails still at [`EmailProcessed::New`], oldest first — the
    /// ingestion pipeline's work queue.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] on a query or decode failure.
    pub fn list_unprocessed_emails(&self) -> Result<Vec<Email>, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let mut stmt =
                tx.prepare("SELECT * FROM emails WHERE processed = 0 ORDER BY created_at ASC")?;
            let rows = stmt.query_map(params![], EmailRow::from_row)?;
            let mut emails = Vec::new();
            for row in rows {
                emails.push(row?.into_email()?);
            }
            Ok(emails)
        })
    }

    /// Records the classifier's output and advances `processed` to
    /// [`EmailProcessed::Classified`].
    ///
    /// Idempotent: if the email is already past this level, the call is
    /// a no-op rather than an error, since a retried classify step must
    /// not regress the monotonic `processed` counter.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such email exists.
    pub fn mark_email_classified(
        &self,
        id: EmailId,
        classification: &EmailClassification,
        confidence: f64,
    ) -> Result<(), SqliteStoreError> {
        self.with_txn(None, |tx| {
            let affected = tx.execute(
                "UPDATE emails SET classification = ?1, confidence = ?2, processed = ?3
                 WHERE id = ?4 AND processed < ?3",
                params![
                    to_json(classification)?,
                    confidence,
                    processed_to_i64(EmailProcessed::Classified),
                    id.as_i64(),
                ],
            )?;
            if affected == 0 {
                let exists: i64 =
                    tx.query_row("SELECT COUNT(1) FROM emails WHERE id = ?1", params![id.as_i64()], |row| {
                        row.get(0)
                    })?;
                if exists == 0 {
                    return Err(SqliteStoreError::NotFound(format!("email {id}")));
                }
            }
            Ok(())
        })
    }

    /// Advances `processed` to [`EmailProcessed::Materialized`]. Same
    /// idempotency guard as [`Store::mark_email_classified`].
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no such email exists.
    pub fn mark_email_materialized(&self, id: EmailId) -> Result<(), SqliteStoreError> {
        self.with_txn(None, |tx| {
            let affected = tx.execute(
                "UPDATE emails SET processed = ?1 WHERE id = ?2 AND processed < ?1",
                params![processed_to_i64(EmailProcessed::Materialized), id.as_i64()],
            )?;
            if affected == 0 {
                let exists: i64 =
                    tx.query_row("SELECT COUNT(1) FROM emails WHERE id = ?1", params![id.as_i64()], |row| {
                        row.get(0)
                    })?;
                if exists == 0 {
                    return Err(SqliteStoreError::NotFound(format!("email {id}")));
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processed_level_round_trips() {
        for level in [
            EmailProcessed::New,
            EmailProcessed::Classified,
            EmailProcessed::Materialized,
        ] {
            let encoded = processed_to_i64(level);
            assert_eq!(processed_from_i64(encoded).expect("valid level"), level);
        }
    }
}
