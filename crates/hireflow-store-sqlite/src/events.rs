// crates/hireflow-store-sqlite/src/events.rs
// ============================================================================
// Module: Event Accessors
// Description: Append-only audit log for the `events` table.
// ============================================================================

use hireflow_core::model::Event;
use hireflow_core::{ApplicationId, EventId};
use rusqlite::{params, Row, Transaction};
use serde_json::Value;
use time::OffsetDateTime;

use crate::error::SqliteStoreError;
use crate::rows::{from_unix, to_unix};
use crate::store::Store;

/// Inserts one audit event row against an already-open transaction, so a
/// state-changing write and the event describing it can share a single
/// commit. Shared by [`Store::append_event`] and the composite
/// `*_with_event` transition methods in `applications.rs`.
pub(crate) fn insert_event_row(
    tx: &Transaction<'_>,
    app_id: Option<ApplicationId>,
    event_type: &str,
    payload: &Value,
    now: OffsetDateTime,
) -> Result<EventId, SqliteStoreError> {
    tx.execute(
        "INSERT INTO events (app_id, event_type, payload, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            app_id.map(ApplicationId::as_i64),
            event_type,
            serde_json::to_string(payload).map_err(|err| SqliteStoreError::Corrupt(err.to_string()))?,
            to_unix(now),
        ],
    )?;
    let id = tx.last_insert_rowid();
    EventId::try_from(id).map_err(|e| SqliteStoreError::Corrupt(e.to_string()))
}

struct EventRow {
    id: i64,
    app_id: Option<i64>,
    event_type: String,
    payload: String,
    created_at: i64,
}

impl EventRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            app_id: row.get("app_id")?,
            event_type: row.get("event_type")?,
            payload: row.get("payload")?,
            created_at: row.get("created_at")?,
        })
    }

    fn into_event(self) -> Result<Event, SqliteStoreError> {
        Ok(Event {
            id: EventId::try_from(self.id).map_err(|e| SqliteStoreError::Corrupt(e.to_string()))?,
            app_id: self
                .app_id
                .map(ApplicationId::try_from)
                .transpose()
                .map_err(|e| SqliteStoreError::Corrupt(e.to_string()))?,
            event_type: self.event_type,
            payload: serde_json::from_str(&self.payload)
                .map_err(|err| SqliteStoreError::Corrupt(err.to_string()))?,
            created_at: from_unix(self.created_at)?,
        })
    }
}

impl Store {
    /// Appends an audit event, optionally attached to an application.
    ///
    /// Writes inside the same `with_txn` call (and, when `app_id` is
    /// `Some`, under that application's lock) as the state change it
    /// records, so the audit trail and the state it describes never
    /// diverge.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] on a query failure.
    pub fn append_event(
        &self,
        app_id: Option<ApplicationId>,
        event_type: &str,
        payload: &Value,
        now: OffsetDateTime,
    ) -> Result<EventId, SqliteStoreError> {
        self.with_txn(app_id, |tx| {
            insert_event_row(tx, app_id, event_type, payload, now)
        })
    }

    /// Lists events attached to an application, oldest first.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] on a query or decode failure.
    pub fn list_events_for_application(
        &self,
        app_id: ApplicationId,
    ) -> Result<Vec<Event>, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let mut stmt =
                tx.prepare("SELECT * FROM events WHERE app_id = ?1 ORDER BY created_at ASC")?;
            let rows = stmt.query_map(params![app_id.as_i64()], EventRow::from_row)?;
            let mut events = Vec::new();
            for row in rows {
                events.push(row?.into_event()?);
            }
            Ok(events)
        })
    }

    /// Lists the `limit` most recent audit events across every
    /// application, newest first — the dashboard's activity report.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] on a query or decode failure.
    pub fn list_recent_events(&self, limit: u32) -> Result<Vec<Event>, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let mut stmt =
                tx.prepare("SELECT * FROM events ORDER BY created_at DESC LIMIT ?1")?;
            let rows = stmt.query_map(params![i64::from(limit)], EventRow::from_row)?;
            let mut events = Vec::new();
            for row in rows {
                events.push(row?.into_event()?);
            }
            Ok(events)
        })
    }
}
