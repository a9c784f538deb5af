// crates/hireflow-mailbox/src/source.rs
// ============================================================================
// Module: Email Source
// Description: The pluggable backend contract the listener polls or
//              awaits push notifications from, plus the raw, unparsed
//              email shape a backend hands back before it is materialized
//              into a `hireflow_core::model::Email` row.
// Dependencies: hireflow-store-sqlite, thiserror, time
// ============================================================================

use hireflow_core::PipelineError;
use hireflow_store_sqlite::SqliteStoreError;
use time::OffsetDateTime;

/// Failure modes surfaced by an [`EmailSource`] or the listener loop built
/// on top of it.
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    /// The backend itself reported a failure (network, auth, malformed
    /// response).
    #[error("mailbox source error: {0}")]
    Source(String),
    /// The configured source does not support push notifications; callers
    /// requesting [`MailboxMode::Push`](crate::MailboxMode::Push) against
    /// such a source always fall through to the keepalive timeout.
    #[error("push notifications are not supported by this mailbox source")]
    PushUnsupported,
    /// A store operation failed while persisting a fetched email or
    /// listener state.
    #[error(transparent)]
    Store(#[from] SqliteStoreError),
}

impl From<MailboxError> for PipelineError {
    fn from(err: MailboxError) -> Self {
        match err {
            MailboxError::Store(inner) => inner.into(),
            MailboxError::Source(msg) => Self::TransientExternal(msg),
            MailboxError::PushUnsupported => {
                Self::Invariant("push notifications not supported by this mailbox source".to_owned())
            }
        }
    }
}

/// One email as reported by the backend, before it has a durable
/// [`hireflow_core::identifiers::EmailId`].
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingEmail {
    /// Transport-level message id, used for the listener's dedup check.
    pub message_id: Option<String>,
    /// Sender address.
    pub from_address: String,
    /// Sender display name, empty string if unset.
    pub from_name: String,
    /// Subject line.
    pub subject: String,
    /// Full plain-text body (also used to derive the stored snippet).
    pub body_full: String,
    /// Attachment filenames observed on the message.
    pub attachments: Vec<String>,
    /// Timestamp the backend reported for receipt, if any.
    pub received_at: Option<OffsetDateTime>,
}

/// The result of one fetch: the emails found plus the backend's updated
/// cursor, persisted as the listener's watermark.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchResult {
    /// Emails observed since the prior watermark.
    pub emails: Vec<IncomingEmail>,
    /// The backend's new cursor, if it advanced.
    pub watermark: Option<i64>,
}

/// A mailbox backend the listener can poll or await push notifications
/// from. Implementations do not retry internally — the listener loop
/// owns backoff.
pub trait EmailSource: Send + Sync {
    /// Lists emails observed since `watermark`, bounded to `limit`.
    fn list_recent(
        &self,
        watermark: Option<i64>,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<FetchResult, MailboxError>> + Send;

    /// Waits for the backend to signal new mail. Sources that only
    /// support polling return [`MailboxError::PushUnsupported`]
    /// immediately; the listener treats that the same as a keepalive
    /// timeout and falls back to its poll interval.
    fn wait_for_notification(&self) -> impl std::future::Future<Output = Result<(), MailboxError>> + Send {
        async { Err(MailboxError::PushUnsupported) }
    }
}
