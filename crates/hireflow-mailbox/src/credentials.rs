// crates/hireflow-mailbox/src/credentials.rs
// ============================================================================
// Module: Mailbox Credentials
// Description: Opaque (base64-encoded JSON) credential persistence under
//              `Setting` keys, restored on startup. Mirrors
//              `original_source/backend/services/gmail_service.py`'s
//              `_save_setting`/`_load_setting` pair, generalized to the
//              store's typed JSON setting helpers.
// Dependencies: base64, hireflow-store-sqlite, serde, serde_json
// ============================================================================

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hireflow_store_sqlite::{SqliteStoreError, Store};
use serde::{Deserialize, Serialize};

use crate::source::MailboxError;

const CREDENTIALS_KEY: &str = "mailbox.credentials";
const LISTENER_ENABLED_KEY: &str = "mailbox.listener_enabled";

/// Connection identity persisted across restarts. The backend-specific
/// secret (OAuth refresh token, app password) is never stored here — it
/// is always sourced from the process environment on each connect, the
/// same boundary `gmail_service.py` draws between env-sourced secrets and
/// DB-persisted connection state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailboxCredentials {
    /// The connected mailbox's address.
    pub email_address: String,
    /// Name of the backend that authenticated this connection.
    pub method: String,
}

/// Persists credentials and marks the listener as enabled for restart.
///
/// # Errors
/// Returns [`MailboxError`] if serialization or the underlying store
/// write fails.
pub fn save_credentials(store: &Store, credentials: &MailboxCredentials) -> Result<(), MailboxError> {
    let json = serde_json::to_vec(credentials)
        .map_err(|err| MailboxError::Source(format!("encoding credentials: {err}")))?;
    store.set_setting(CREDENTIALS_KEY, &BASE64.encode(json))?;
    store.set_setting(LISTENER_ENABLED_KEY, "true")?;
    Ok(())
}

/// Loads previously persisted credentials, if any.
///
/// # Errors
/// Returns [`MailboxError`] if the stored value is present but cannot be
/// decoded as the expected base64-encoded JSON shape.
pub fn load_credentials(store: &Store) -> Result<Option<MailboxCredentials>, MailboxError> {
    let Some(encoded) = store.get_setting(CREDENTIALS_KEY)? else {
        return Ok(None);
    };
    let decoded = BASE64
        .decode(encoded)
        .map_err(|err| MailboxError::Source(format!("decoding credentials: {err}")))?;
    let credentials = serde_json::from_slice(&decoded)
        .map_err(|err| MailboxError::Source(format!("parsing credentials: {err}")))?;
    Ok(Some(credentials))
}

/// Clears persisted credentials and disables restart-time auto-listen.
///
/// # Errors
/// Returns [`SqliteStoreError`] on a query failure.
pub fn clear_credentials(store: &Store) -> Result<(), SqliteStoreError> {
    store.delete_setting(CREDENTIALS_KEY)?;
    store.delete_setting(LISTENER_ENABLED_KEY)?;
    Ok(())
}

/// Whether the listener should auto-start on restart.
///
/// # Errors
/// Returns [`SqliteStoreError`] on a query failure.
pub fn listener_enabled(store: &Store) -> Result<bool, SqliteStoreError> {
    Ok(store.get_setting(LISTENER_ENABLED_KEY)?.as_deref() == Some("true"))
}

#[cfg(test)]
mod tests {
    use hireflow_store_sqlite::StoreConfig;

    use super::*;

    fn test_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store =
            Store::open(&StoreConfig::new(dir.path().join("hireflow.db"))).expect("store opens");
        (dir, store)
    }

    #[test]
    fn round_trips_through_base64_json() {
        let (_dir, store) = test_store();
        let credentials = MailboxCredentials {
            email_address: "recruiting@example.com".to_owned(),
            method: "gmail_api".to_owned(),
        };
        save_credentials(&store, &credentials).expect("save");
        assert_eq!(
            load_credentials(&store).expect("load"),
            Some(credentials)
        );
        assert!(listener_enabled(&store).expect("enabled"));
    }

    #[test]
    fn clearing_removes_credentials_and_disables_listener() {
        let (_dir, store) = test_store();
        let credentials = MailboxCredentials {
            email_address: "recruiting@example.com".to_owned(),
            method: "gmail_api".to_owned(),
        };
        save_credentials(&store, &credentials).expect("save");
        clear_credentials(&store).expect("clear");
        assert_eq!(load_credentials(&store).expect("load"), None);
        assert!(!listener_enabled(&store).expect("enabled"));
    }

    #[test]
    fn missing_credentials_is_none() {
        let (_dir, store) = test_store();
        assert_eq!(load_credentials(&store).expect("load"), None);
        assert!(!listener_enabled(&store).expect("enabled"));
    }
}
