// crates/hireflow-store-sqlite/src/connection.rs
// ============================================================================
// Module: SQLite Connection + Schema Setup
// Description: Connection opening, pragma application, and schema
//              migration for the store.
// Purpose: A missing column must never crash startup — the migration step
//          adds whatever the running binary needs and leaves the rest of
//          the row alone.
// Dependencies: rusqlite
// ============================================================================

use std::time::Duration;

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use crate::config::StoreConfig;
use crate::error::SqliteStoreError;

/// Opens a connection to the configured database file, creating it if
/// absent, and applies durability pragmas.
pub fn open_connection(config: &StoreConfig) -> Result<Connection, SqliteStoreError> {
    if config.path.exists() && config.path.is_dir() {
        return Err(SqliteStoreError::InvalidPath(
            "store path must be a file, not a directory".to_owned(),
        ));
    }
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

fn apply_pragmas(connection: &Connection, config: &StoreConfig) -> Result<(), SqliteStoreError> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;
    connection.execute_batch(&format!(
        "PRAGMA journal_mode = {};",
        config.journal_mode.pragma_value()
    ))?;
    connection.execute_batch(&format!(
        "PRAGMA synchronous = {};",
        config.sync_mode.pragma_value()
    ))?;
    connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    Ok(())
}

/// Initializes the schema on first run, or migrates it forward. Matches
/// on the stored `store_meta.version` and applies whatever `ALTER TABLE`
/// statements are needed to reach [`crate::config::SCHEMA_VERSION`] —
/// absence of a column added by a later version must never crash
/// startup against an older database file.
pub fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction()?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| {
            row.get(0)
        })
        .optional()?;

    match version {
        None => {
            tx.execute(
                "INSERT INTO store_meta (version) VALUES (?1)",
                params![crate::config::SCHEMA_VERSION],
            )?;
            tx.execute_batch(SCHEMA_V1)?;
        }
        Some(value) if value == crate::config::SCHEMA_VERSION => {}
        Some(other) => return Err(SqliteStoreError::VersionMismatch(other)),
    }

    tx.commit()?;
    Ok(())
}

const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS jobs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    job_code TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    department TEXT NOT NULL DEFAULT '',
    location TEXT NOT NULL DEFAULT '',
    seniority TEXT NOT NULL DEFAULT '',
    must_have_skills TEXT NOT NULL DEFAULT '[]',
    nice_to_have_skills TEXT NOT NULL DEFAULT '[]',
    description TEXT NOT NULL DEFAULT '',
    resume_min REAL NOT NULL DEFAULT 80.0,
    interview_min REAL NOT NULL DEFAULT 75.0,
    reject_below REAL NOT NULL DEFAULT 50.0,
    status TEXT NOT NULL DEFAULT 'open',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS emails (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    message_id TEXT UNIQUE,
    from_address TEXT NOT NULL,
    from_name TEXT NOT NULL DEFAULT '',
    subject TEXT NOT NULL DEFAULT '',
    body_snippet TEXT NOT NULL DEFAULT '',
    body_full TEXT NOT NULL DEFAULT '',
    attachments TEXT NOT NULL DEFAULT '[]',
    classification TEXT,
    confidence REAL,
    processed INTEGER NOT NULL DEFAULT 0,
    received_at INTEGER,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_emails_processed ON emails (processed);

CREATE TABLE IF NOT EXISTS candidates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT NOT NULL DEFAULT '',
    resume_text TEXT NOT NULL DEFAULT '',
    resume_filename TEXT NOT NULL DEFAULT '',
    source_email_id INTEGER REFERENCES emails(id),
    notes TEXT NOT NULL DEFAULT '',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS applications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    candidate_id INTEGER NOT NULL REFERENCES candidates(id),
    job_id INTEGER NOT NULL REFERENCES jobs(id),
    stage TEXT NOT NULL DEFAULT 'new',
    resume_score REAL,
    resume_score_detail TEXT,
    interview_score REAL,
    interview_score_detail TEXT,
    screening_transcript TEXT,
    screening_audio_path TEXT,
    screening_status TEXT,
    screening_attempts INTEGER NOT NULL DEFAULT 0,
    screening_max_attempts INTEGER NOT NULL DEFAULT 3,
    screening_last_attempt_at INTEGER,
    screening_failure_reason TEXT,
    recommendation TEXT,
    ai_next_action TEXT,
    ai_snippets TEXT NOT NULL DEFAULT '[]',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    interview_link_status TEXT,
    interview_face_tracking TEXT,
    final_score REAL,
    booked_slot TEXT,
    email_draft_sent INTEGER NOT NULL DEFAULT 0,
    UNIQUE (candidate_id, job_id)
);
CREATE INDEX IF NOT EXISTS idx_applications_job ON applications (job_id);
CREATE INDEX IF NOT EXISTS idx_applications_stage ON applications (stage);
CREATE INDEX IF NOT EXISTS idx_applications_candidate ON applications (candidate_id);

CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    app_id INTEGER REFERENCES applications(id),
    event_type TEXT NOT NULL,
    payload TEXT NOT NULL DEFAULT '{}',
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_events_app ON events (app_id);

CREATE TABLE IF NOT EXISTS interview_links (
    token TEXT PRIMARY KEY,
    app_id INTEGER NOT NULL REFERENCES applications(id),
    status TEXT NOT NULL DEFAULT 'generated',
    round INTEGER NOT NULL DEFAULT 1,
    voice_conversation_id TEXT,
    face_tracking TEXT,
    expires_at INTEGER NOT NULL,
    opened_at INTEGER,
    interview_started_at INTEGER,
    interview_completed_at INTEGER,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_interview_links_app ON interview_links (app_id);
CREATE INDEX IF NOT EXISTS idx_interview_links_status ON interview_links (status);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";
