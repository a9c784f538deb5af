// crates/hireflow-store-sqlite/src/settings.rs
// ============================================================================
// Module: Settings Accessors
// Description: Get/set/delete for the `settings` key/value table — the
//              mailbox listener's watermark, stored OAuth credentials, and
//              the listener-enabled flag all live here.
// ============================================================================

use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::SqliteStoreError;
use crate::rows::{from_json, to_json};
use crate::store::Store;

impl Store {
    /// Reads and deserializes a JSON-encoded setting, if present.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::Corrupt`] if the stored value is not
    /// valid JSON for `T`.
    pub fn get_setting_json<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, SqliteStoreError> {
        self.get_setting(key)?.as_deref().map(from_json).transpose()
    }

    /// Serializes and writes a setting as JSON.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] on a serialization or query failure.
    pub fn set_setting_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), SqliteStoreError> {
        self.set_setting(key, &to_json(value)?)
    }
    /// Reads a setting's raw value, if present.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] on a query failure.
    pub fn get_setting(&self, key: &str) -> Result<Option<String>, SqliteStoreError> {
        self.with_txn(None, |tx| {
            let value = tx
                .query_row(
                    "SELECT value FROM settings WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
    }

    /// Writes (creating or overwriting) a setting's raw value.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] on a query failure.
    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), SqliteStoreError> {
        self.with_txn(None, |tx| {
            tx.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            Ok(())
        })
    }

    /// Deletes a setting, if present. A no-op if the key was never set.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] on a query failure.
    pub fn delete_setting(&self, key: &str) -> Result<(), SqliteStoreError> {
        self.with_txn(None, |tx| {
            tx.execute("DELETE FROM settings WHERE key = ?1", params![key])?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;

    #[test]
    fn set_then_get_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::open(&StoreConfig::new(dir.path().join("hireflow.db")))
            .expect("store opens");
        store.set_setting("mailbox.watermark", "12345").expect("set");
        assert_eq!(
            store.get_setting("mailbox.watermark").expect("get"),
            Some("12345".to_owned())
        );
    }

    #[test]
    fn missing_key_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::open(&StoreConfig::new(dir.path().join("hireflow.db")))
            .expect("store opens");
        assert_eq!(store.get_setting("nope").expect("get"), None);
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::open(&StoreConfig::new(dir.path().join("hireflow.db")))
            .expect("store opens");
        store.set_setting("k", "v").expect("set");
        store.delete_setting("k").expect("delete");
        store.delete_setting("k").expect("delete again is a no-op");
        assert_eq!(store.get_setting("k").expect("get"), None);
    }
}
