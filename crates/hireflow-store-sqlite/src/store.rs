// crates/hireflow-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Store
// Description: The durable store every HireFlow component reads and writes
//              through. Owns the connection and the per-Application
//              serialization discipline.
// Purpose: Every stage/status mutation occurs inside a single with_txn that
//          also writes the corresponding Event row.
// Dependencies: hireflow-core, rusqlite
// ============================================================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use hireflow_core::ApplicationId;
use rusqlite::{Connection, Transaction};

use crate::config::StoreConfig;
use crate::connection::{initialize_schema, open_connection};
use crate::error::SqliteStoreError;

/// The durable, `SQLite`-backed store.
///
/// Holds a single connection behind a mutex (the workload here is
/// nowhere near write-contended enough to warrant the teacher's
/// writer-thread/batching architecture) plus a map of per-[`ApplicationId`]
/// locks so that two concurrent mutations of the same application
/// serialize, while unrelated applications proceed fully in parallel.
pub struct Store {
    connection: Mutex<Connection>,
    app_locks: Mutex<HashMap<ApplicationId, Arc<Mutex<()>>>>,
}

impl Store {
    /// Opens (creating if absent) the database at `config.path`, applies
    /// pragmas, and migrates the schema to the current version.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] if the path is invalid, the
    /// connection cannot be opened, or schema migration fails.
    pub fn open(config: &StoreConfig) -> Result<Self, SqliteStoreError> {
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
            app_locks: Mutex::new(HashMap::new()),
        })
    }

    fn lock_for(&self, app_id: ApplicationId) -> Arc<Mutex<()>> {
        let mut locks = self
            .app_locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        locks.entry(app_id).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// Runs `f` inside a single `SQLite` transaction, committing on
    /// success and rolling back on error.
    ///
    /// When `app_id` is `Some`, the call also holds that application's
    /// dedicated lock for the duration of `f`, so concurrent mutations of
    /// the same application (a webhook arriving while a candidate submits
    /// a transcript, for instance) serialize instead of racing.
    ///
    /// # Errors
    /// Returns whatever error `f` returns, or a [`SqliteStoreError::Db`]
    /// if beginning or committing the transaction fails.
    pub fn with_txn<T>(
        &self,
        app_id: Option<ApplicationId>,
        f: impl FnOnce(&Transaction<'_>) -> Result<T, SqliteStoreError>,
    ) -> Result<T, SqliteStoreError> {
        let _app_guard = app_id.map(|id| self.lock_for(id));
        let _held = _app_guard
            .as_ref()
            .map(|lock| lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner));

        let mut conn = self
            .connection
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }
}
