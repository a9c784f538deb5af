// crates/hireflow-store-sqlite/src/lib.rs
// ============================================================================
// Crate: hireflow-store-sqlite
// Description: The durable SQLite-backed store for every HireFlow entity.
// Purpose: Single-writer-serialized persistence with per-Application locking,
//          schema-version migration, and a raw-row/parsed-entity conversion
//          discipline at every accessor.
// Dependencies: hireflow-core, rusqlite, serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! One [`Store`] handle is shared across the whole process. Every mutation
//! goes through [`Store::with_txn`], which serializes writes to the same
//! application and commits or rolls back as a unit. Entity modules
//! (`jobs`, `emails`, `candidates`, `applications`, `events`,
//! `interview_links`, `settings`) each follow the same two-step row
//! conversion: a private `*Row` struct decodes raw columns inside the
//! `rusqlite` closure, then a separate `into_*` method performs the
//! fallible JSON/enum parsing outside it.

mod applications;
mod candidates;
pub mod config;
mod connection;
mod emails;
mod error;
mod events;
mod interview_links;
mod jobs;
mod rows;
mod settings;
mod store;

pub use config::{JournalMode, StoreConfig, SyncMode, SCHEMA_VERSION};
pub use error::SqliteStoreError;
pub use store::Store;

#[cfg(test)]
mod tests {
    use hireflow_core::model::{Job, JobStatus};
    use time::OffsetDateTime;

    use super::*;

    fn test_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store =
            Store::open(&StoreConfig::new(dir.path().join("hireflow.db"))).expect("store opens");
        (dir, store)
    }

    fn sample_job(job_code: &str) -> Job {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("valid timestamp");
        Job {
            id: hireflow_core::JobId::from_raw(1).expect("nonzero"),
            job_code: job_code.to_owned(),
            title: "Senior Backend Engineer".to_owned(),
            department: "Engineering".to_owned(),
            location: "Remote".to_owned(),
            seniority: "senior".to_owned(),
            must_have_skills: vec!["rust".to_owned(), "sql".to_owned()],
            nice_to_have_skills: vec!["kubernetes".to_owned()],
            description: "Build the pipeline.".to_owned(),
            thresholds: hireflow_core::decision::DEFAULT_THRESHOLDS,
            status: JobStatus::Open,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn opening_twice_does_not_reinitialize_schema() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = StoreConfig::new(dir.path().join("hireflow.db"));
        let store = Store::open(&config).expect("first open");
        store.create_job(&sample_job("JOB-1")).expect("insert job");
        drop(store);

        let reopened = Store::open(&config).expect("second open");
        let jobs = reopened.list_open_jobs().expect("list jobs");
        assert_eq!(jobs.len(), 1);
    }

    #[test]
    fn job_code_must_be_unique() {
        let (_dir, store) = test_store();
        store.create_job(&sample_job("JOB-1")).expect("first insert");
        let err = store.create_job(&sample_job("JOB-1")).unwrap_err();
        assert!(matches!(err, SqliteStoreError::Conflict(_)));
    }

    #[test]
    fn get_missing_job_is_not_found() {
        let (_dir, store) = test_store();
        let missing = hireflow_core::JobId::from_raw(999).expect("nonzero");
        let err = store.get_job(missing).unwrap_err();
        assert!(matches!(err, SqliteStoreError::NotFound(_)));
    }
}
