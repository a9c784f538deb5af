// crates/hireflow-store-sqlite/src/rows.rs
// ============================================================================
// Module: Row Conversion Helpers
// Description: Shared timestamp and JSON-column conversion helpers used by
//              every entity accessor module.
// Dependencies: serde_json, time
// ============================================================================

use serde::de::DeserializeOwned;
use serde::Serialize;
use time::OffsetDateTime;

use crate::error::SqliteStoreError;

/// Converts a timestamp to the `INTEGER` (unix seconds) column form.
#[must_use]
pub fn to_unix(ts: OffsetDateTime) -> i64 {
    ts.unix_timestamp()
}

/// Converts a unix-seconds column value back to a timestamp.
///
/// # Errors
/// Returns [`SqliteStoreError::Corrupt`] if `value` is out of range.
pub fn from_unix(value: i64) -> Result<OffsetDateTime, SqliteStoreError> {
    OffsetDateTime::from_unix_timestamp(value)
        .map_err(|err| SqliteStoreError::Corrupt(format!("invalid timestamp: {err}")))
}

/// Converts an optional unix-seconds column value back to a timestamp.
///
/// # Errors
/// Returns [`SqliteStoreError::Corrupt`] if `value` is out of range.
pub fn from_unix_opt(value: Option<i64>) -> Result<Option<OffsetDateTime>, SqliteStoreError> {
    value.map(from_unix).transpose()
}

/// Serializes a value to its `TEXT` column JSON form.
///
/// # Errors
/// Returns [`SqliteStoreError::Corrupt`] if serialization fails (it does
/// not for any type this store persists, but the boundary stays fallible
/// rather than panicking).
pub fn to_json<T: Serialize>(value: &T) -> Result<String, SqliteStoreError> {
    serde_json::to_string(value).map_err(|err| SqliteStoreError::Corrupt(err.to_string()))
}

/// Deserializes a `TEXT` column JSON value.
///
/// # Errors
/// Returns [`SqliteStoreError::Corrupt`] if the stored text is not valid
/// JSON for `T`.
pub fn from_json<T: DeserializeOwned>(value: &str) -> Result<T, SqliteStoreError> {
    serde_json::from_str(value).map_err(|err| SqliteStoreError::Corrupt(err.to_string()))
}

/// Deserializes an optional `TEXT` column JSON value.
///
/// # Errors
/// Returns [`SqliteStoreError::Corrupt`] if the stored text is not valid
/// JSON for `T`.
pub fn from_json_opt<T: DeserializeOwned>(
    value: Option<String>,
) -> Result<Option<T>, SqliteStoreError> {
    value.as_deref().map(from_json).transpose()
}
