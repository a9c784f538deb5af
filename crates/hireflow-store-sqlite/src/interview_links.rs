// crates/hireflow-store-sqlite/src/interview_links.rs
// ============================================================================
// Module: Interview Link Accessors
// Description: CRUD for the `interview_links` table — the single-use token
//              lifecycle the self-serve interview flow is built on.
// ============================================================================

use hireflow_core::model::{InterviewLink, InterviewLinkStatus};
use hireflow_core::telemetry::TelemetryAggregate;
use hireflow_core::{ApplicationId, LinkToken};
use rusqlite::{params, OptionalExtension, Row};
use serde_json::Value;
use time::OffsetDateTime;

use crate::error::SqliteStoreError;
use crate::events::insert_event_row;
use crate::rows::{from_json_opt, from_unix, from_unix_opt, to_json, to_unix};
use crate::store::Store;

fn status_str(status: InterviewLinkStatus) -> &'static str {
    match status {
        InterviewLinkStatus::Generated => "generated",
        InterviewLinkStatus::Sent => "sent",
        InterviewLinkStatus::Opened => "opened",
        InterviewLinkStatus::InterviewStarted => "interview_started",
        InterviewLinkStatus::InterviewCompleted => "interview_completed",
        InterviewLinkStatus::Expired => "expired",
    }
}

fn parse_status(value: &str) -> Result<InterviewLinkStatus, SqliteStoreError> {
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

struct InterviewLinkRow {
    token: String,
    app_id: i64,
    status: String,
    round: i64,
    voice_conversation_id: Option<String>,
    face_tracking: Option<String>,
    expires_at: i64,
    opened_at: Option<i64>,
    interview_started_at: Option<i64>,
    interview_completed_at: Option<i64>,
    created_at: i64,
}

impl InterviewLinkRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            token: row.get("token")?,
            app_id: row.get("app_id")?,
            status: row.get("status")?,
            round: row.get("round")?,
            voice_conversation_id: row.get("voice_conversation_id")?,
            face_tracking: row.get("face_tracking")?,
            expires_at: row.get("expires_at")?,
            opened_at: row.get("opened_at")?,
            interview_started_at: row.get("interview_started_at")?,
            interview_completed_at: row.get("interview_completed_at")?,
            created_at: row.get("created_at")?,
        })
    }

    fn into_link(self) -> Result<InterviewLink, SqliteStoreError> {
        Ok(InterviewLink {
            token: LinkToken::parse(&self.token)
                .map_err(|e| SqliteStoreError::Corrupt(e.to_string()))?,
            app_id: ApplicationId::try_from(self.app_id)
                .map_err(|e| SqliteStoreError::Corrupt(e.to_string()))?,
            status: parse_status(&self.status)?,
            round: u8::try_from(self.round)
                .map_err(|_| SqliteStoreError::Corrupt("round out of range".to_owned()))?,
            voice_conversation_id: self.voice_conversation_id,
            face_tracking: from_json_opt::<TelemetryAggregate>(self.face_tracking)?,
            expires_at: from_unix(self.expires_at)?,
            opened_at: from_unix_opt(self.opened_at)?,
            interview_started_at: from_unix_opt(self.interview_started_at)?,
            interview_completed_at: from_unix_opt(self.interview_completed_at)?,
            created_at: from_unix(self.created_at)?,
        })
    }
}

impl Store {
    /// Inserts a newly issued interview link.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::Conflict`] in the astronomically
    /// unlikely event of a token collision.
    pub fn create_interview_link(&self, link: &InterviewLink) -> Result<(), SqliteStoreError> {
        self.with_txn(Some(link.app_id), |tx| {
            tx.execute(
                "INSERT INTO interview_links (token, app_id, status, round, voice_conversation_id,
                    face_tracking, expires_at, opened_at, interview_started_at, interview_completed_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    link.token.to_string(),
                    link.app_id.as_i64(),
                    status_str(link.status),
                    i64::from(link.round),
                    link.voice_conversation_id,
                    link.face_tracking.as_ref().map(to_json).transpose()?,
                    to_unix(link.expires_at),
                    link.opened_at.map(to_unix),
                    link.interview_started_at.map(to_unix),
                    link.interview_completed_at.map(to_unix),
                    to_unix(link.created_at),
                ],
            )
            .map_err(|err| match err.sqlite_error_code() {
                Some(rusqlite::ErrorCode::ConstraintViolation) => {
                    SqliteStoreError::Conflict("interview link token collision".to_owned())
                }
                _ => SqliteStoreError::from(err),
            })?;
            Ok(())
        })
    }

    /// Fetches an interview link by its candidate-facing token.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if the token is unknown.
    pub fn get_interview_link(&self, token: LinkToken) -> Result<InterviewLink, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let row = tx
                .query_row(
                    "SELECT * FROM interview_links WHERE token = ?1",
                    params![token.to_string()],
                    InterviewLinkRow::from_row,
                )
                .optional()?;
            row.ok_or_else(|| SqliteStoreError::NotFound(format!("interview link {token}")))?
                .into_link()
        })
    }

    /// Fetches the most recently created interview link for an
    /// application, if one has been issued.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] on a query or decode failure.
    pub fn get_latest_interview_link(
        &self,
        app_id: ApplicationId,
    ) -> Result<Option<InterviewLink>, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let row = tx
                .query_row(
                    "SELECT * FROM interview_links WHERE app_id = ?1 ORDER BY created_at DESC LIMIT 1",
                    params![app_id.as_i64()],
                    InterviewLinkRow::from_row,
                )
                .optional()?;
            row.map(InterviewLinkRow::into_link).transpose()
        })
    }

    /// Transitions a link's lifecycle status, recording whichever
    /// milestone timestamp corresponds to the new status.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if the token is unknown.
    pub fn set_interview_link_status(
        &self,
        token: LinkToken,
        status: InterviewLinkStatus,
        now: OffsetDateTime,
    ) -> Result<(), SqliteStoreError> {
        self.with_txn(None, |tx| {
            let affected = match status {
                InterviewLinkStatus::Opened => tx.execute(
                    "UPDATE interview_links SET status = ?1, opened_at = COALESCE(opened_at, ?2) WHERE token = ?3",
                    params![status_str(status), to_unix(now), token.to_string()],
                )?,
                InterviewLinkStatus::InterviewStarted => tx.execute(
                    "UPDATE interview_links SET status = ?1, interview_started_at = COALESCE(interview_started_at, ?2) WHERE token = ?3",
                    params![status_str(status), to_unix(now), token.to_string()],
                )?,
                InterviewLinkStatus::InterviewCompleted => tx.execute(
                    "UPDATE interview_links SET status = ?1, interview_completed_at = COALESCE(interview_completed_at, ?2) WHERE token = ?3",
                    params![status_str(status), to_unix(now), token.to_string()],
                )?,
                InterviewLinkStatus::Generated | InterviewLinkStatus::Sent | InterviewLinkStatus::Expired => {
                    tx.execute(
                        "UPDATE interview_links SET status = ?1 WHERE token = ?2",
                        params![status_str(status), token.to_string()],
                    )?
                }
            };
            if affected == 0 {
                return Err(SqliteStoreError::NotFound(format!("interview link {token}")));
            }
            Ok(())
        })
    }

    /// Finds the interview link carrying a given voice-service conversation
    /// id — how the webhook maps an inbound `conversation_id` back to a
    /// token without the voice service ever seeing one.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if no link carries that id.
    pub fn find_interview_link_by_conversation_id(
        &self,
        conversation_id: &str,
    ) -> Result<InterviewLink, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let row = tx
                .query_row(
                    "SELECT * FROM interview_links WHERE voice_conversation_id = ?1
                     ORDER BY created_at DESC LIMIT 1",
                    params![conversation_id],
                    InterviewLinkRow::from_row,
                )
                .optional()?;
            row.ok_or_else(|| {
                SqliteStoreError::NotFound(format!("interview link for conversation {conversation_id}"))
            })?
            .into_link()
        })
    }

    /// Records the live voice-service conversation id once a session
    /// starts.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if the token is unknown.
    pub fn set_interview_link_conversation_id(
        &self,
        token: LinkToken,
        conversation_id: &str,
    ) -> Result<(), SqliteStoreError> {
        self.with_txn(None, |tx| {
            let affected = tx.execute(
                "UPDATE interview_links SET voice_conversation_id = ?1 WHERE token = ?2",
                params![conversation_id, token.to_string()],
            )?;
            if affected == 0 {
                return Err(SqliteStoreError::NotFound(format!("interview link {token}")));
            }
            Ok(())
        })
    }

    /// Overwrites a link's aggregated face-tracking telemetry.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if the token is unknown.
    pub fn set_interview_link_face_tracking(
        &self,
        token: LinkToken,
        aggregate: &TelemetryAggregate,
    ) -> Result<(), SqliteStoreError> {
        self.with_txn(None, |tx| {
            let affected = tx.execute(
                "UPDATE interview_links SET face_tracking = ?1 WHERE token = ?2",
                params![to_json(aggregate)?, token.to_string()],
            )?;
            if affected == 0 {
                return Err(SqliteStoreError::NotFound(format!("interview link {token}")));
            }
            Ok(())
        })
    }

    /// Expires every non-terminal link whose `expires_at` has passed.
    /// Returns the number of links expired.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] on a query failure.
    pub fn expire_stale_interview_links(
        &self,
        now: OffsetDateTime,
    ) -> Result<usize, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let affected = tx.execute(
                "UPDATE interview_links SET status = 'expired'
                 WHERE expires_at < ?1 AND status NOT IN ('interview_completed', 'expired')",
                params![to_unix(now)],
            )?;
            Ok(affected)
        })
    }

    /// Expires an application's prior active links (status `generated`,
    /// `sent`, or `opened`; a link already `interview_started` is left
    /// alone, since it is mid-interview, not superseded) and inserts the
    /// newly issued one in the same transaction, so the cascade and the
    /// new link's appearance are never observed apart.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::Conflict`] in the astronomically
    /// unlikely event of a token collision.
    pub fn issue_interview_link(&self, link: &InterviewLink) -> Result<(), SqliteStoreError> {
        self.with_txn(Some(link.app_id), |tx| {
            tx.execute(
                "UPDATE interview_links SET status = 'expired'
                 WHERE app_id = ?1 AND status IN ('generated', 'sent', 'opened')",
                params![link.app_id.as_i64()],
            )?;
            tx.execute(
                "INSERT INTO interview_links (token, app_id, status, round, voice_conversation_id,
                    face_tracking, expires_at, opened_at, interview_started_at, interview_completed_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    link.token.to_string(),
                    link.app_id.as_i64(),
                    status_str(link.status),
                    i64::from(link.round),
                    link.voice_conversation_id,
                    link.face_tracking.as_ref().map(to_json).transpose()?,
                    to_unix(link.expires_at),
                    link.opened_at.map(to_unix),
                    link.interview_started_at.map(to_unix),
                    link.interview_completed_at.map(to_unix),
                    to_unix(link.created_at),
                ],
            )
            .map_err(|err| match err.sqlite_error_code() {
                Some(rusqlite::ErrorCode::ConstraintViolation) => {
                    SqliteStoreError::Conflict("interview link token collision".to_owned())
                }
                _ => SqliteStoreError::from(err),
            })?;
            Ok(())
        })
    }

    /// Marks a link `sent`, mirrors the status onto its application, and
    /// appends the audit Event — all in one transaction, satisfying the
    /// ingestion pipeline's "send succeeded" requirement that the three
    /// never diverge.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::NotFound`] if the token is unknown.
    pub fn mark_link_sent_with_event(
        &self,
        token: LinkToken,
        app_id: ApplicationId,
        event_type: &str,
        payload: &Value,
        now: OffsetDateTime,
    ) -> Result<(), SqliteStoreError> {
        self.with_txn(Some(app_id), |tx| {
            let affected = tx.execute(
                "UPDATE interview_links SET status = 'sent' WHERE token = ?1",
                params![token.to_string()],
            )?;
            if affected == 0 {
                return Err(SqliteStoreError::NotFound(format!("interview link {token}")));
            }
            tx.execute(
                "UPDATE applications SET interview_link_status = 'sent', updated_at = ?1 WHERE id = ?2",
                params![to_unix(now), app_id.as_i64()],
            )?;
            insert_event_row(tx, Some(app_id), event_type, payload, now)?;
            Ok(())
        })
    }
}
