// crates/hireflow-store-sqlite/src/config.rs
// ============================================================================
// Module: SQLite Store Configuration
// Description: Connection and durability configuration for the store.
// Dependencies: serde
// ============================================================================

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The schema version this binary writes and expects to read.
pub const SCHEMA_VERSION: i64 = 1;

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl JournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite`-backed store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds before a locked database returns an
    /// error rather than blocking.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Journal mode.
    #[serde(default)]
    pub journal_mode: JournalMode,
    /// Synchronous mode.
    #[serde(default)]
    pub sync_mode: SyncMode,
}

const fn default_busy_timeout_ms() -> u64 {
    5_000
}

impl StoreConfig {
    /// Builds a config pointed at `path` with default durability settings.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: default_busy_timeout_ms(),
            journal_mode: JournalMode::default(),
            sync_mode: SyncMode::default(),
        }
    }
}
