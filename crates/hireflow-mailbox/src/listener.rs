// crates/hireflow-mailbox/src/listener.rs
// ============================================================================
// Module: Mailbox Listener
// Description: The long-lived polling/push task that turns new mail into
//              rows in the `emails` table and dispatches their ids for
//              pipeline ingestion. Grounded on
//              `original_source/backend/services/gmail_service.py`'s
//              `GmailManager` (connect/poll loop/status fields) and the
//              teacher's bounded-buffer, per-message-task conventions.
// Dependencies: backoff, hireflow-core, hireflow-store-sqlite, tokio,
//               tokio-util, tracing
// ============================================================================

use std::collections::VecDeque;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use backoff::backoff::Backoff as _;
use backoff::ExponentialBackoffBuilder;
use hireflow_core::model::{Email, EmailProcessed};
use hireflow_core::EmailId;
use hireflow_store_sqlite::Store;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::source::{EmailSource, FetchResult, IncomingEmail, MailboxError};

/// Keepalive window for push-mode waits, matching Gmail API push
/// subscriptions' typical renewal cadence.
const PUSH_KEEPALIVE: Duration = Duration::from_secs(25 * 60);
/// Number of emails requested per fetch.
const FETCH_LIMIT: usize = 10;
/// Key the listener's backend cursor is persisted under.
const WATERMARK_KEY: &str = "mailbox.watermark";

/// How the listener obtains new mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxMode {
    /// Awaits the backend's push notification future.
    Push,
    /// Sleeps `interval` between fetches.
    Poll {
        /// Delay between fetch attempts.
        interval: Duration,
    },
    /// The listener is disabled; `run` idles until cancelled.
    Off,
}

/// One completed ingestion attempt, recorded into the bounded status
/// buffer for dashboard consumption.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    /// The email that was processed.
    pub email_id: EmailId,
    /// Subject line, carried for display without a follow-up query.
    pub subject: String,
    /// Sender address, carried for display without a follow-up query.
    pub from_address: String,
    /// Outcome summary, or the error message if ingestion failed.
    pub outcome: String,
    /// When this result was recorded.
    pub recorded_at: OffsetDateTime,
}

/// A point-in-time snapshot of listener state, the `{connected, mode,
/// email_address, last_sync_at, total_processed, recent_results}` surface.
#[derive(Debug, Clone, PartialEq)]
pub struct MailboxStatus {
    /// Whether the listener has an active source.
    pub connected: bool,
    /// Current operating mode.
    pub mode: MailboxMode,
    /// The connected mailbox's address, if connected.
    pub email_address: Option<String>,
    /// Timestamp of the last successful fetch.
    pub last_sync_at: Option<OffsetDateTime>,
    /// Total emails ingested since the listener started.
    pub total_processed: u64,
    /// The most recent ingestion results, oldest first, capped at the
    /// configured buffer size.
    pub recent_results: Vec<WorkflowResult>,
}

/// Shared, clonable handle to a running listener's status surface.
/// Dispatch-side workers (pipeline ingestion tasks) hold a clone to
/// report results back without owning the listener itself.
#[derive(Clone)]
pub struct MailboxHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    connected: std::sync::atomic::AtomicBool,
    mode: Mutex<MailboxMode>,
    email_address: Mutex<Option<String>>,
    last_sync_at: Mutex<Option<OffsetDateTime>>,
    total_processed: AtomicU64,
    recent_results: Mutex<VecDeque<WorkflowResult>>,
    recent_results_cap: usize,
}

impl MailboxHandle {
    fn new(mode: MailboxMode, recent_results_cap: usize) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                connected: std::sync::atomic::AtomicBool::new(false),
                mode: Mutex::new(mode),
                email_address: Mutex::new(None),
                last_sync_at: Mutex::new(None),
                total_processed: AtomicU64::new(0),
                recent_results: Mutex::new(VecDeque::with_capacity(recent_results_cap)),
                recent_results_cap,
            }),
        }
    }

    /// Records a pipeline worker's outcome for an ingested email,
    /// evicting the oldest entry once the buffer is at capacity.
    pub fn record_result(&self, result: WorkflowResult) {
        self.inner.total_processed.fetch_add(1, Ordering::Relaxed);
        let mut results = self.inner.recent_results.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if results.len() >= self.inner.recent_results_cap {
            results.pop_front();
        }
        results.push_back(result);
    }

    /// Snapshots current listener status.
    #[must_use]
    pub fn status(&self) -> MailboxStatus {
        MailboxStatus {
            connected: self.inner.connected.load(Ordering::Relaxed),
            mode: *self.inner.mode.lock().unwrap_or_else(std::sync::PoisonError::into_inner),
            email_address: self
                .inner
                .email_address
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone(),
            last_sync_at: *self
                .inner
                .last_sync_at
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner),
            total_processed: self.inner.total_processed.load(Ordering::Relaxed),
            recent_results: self
                .inner
                .recent_results
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .iter()
                .cloned()
                .collect(),
        }
    }

    fn set_connected(&self, connected: bool, email_address: Option<String>) {
        self.inner.connected.store(connected, Ordering::Relaxed);
        *self
            .inner
            .email_address
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = email_address;
    }

    fn set_mode(&self, mode: MailboxMode) {
        *self.inner.mode.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = mode;
    }

    fn mark_synced(&self) {
        *self
            .inner
            .last_sync_at
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(OffsetDateTime::now_utc());
    }
}

/// Drains a mailbox backend into the `emails` table and a dispatch
/// channel, one [`EmailId`] per new message. Ownership of per-message
/// pipeline execution lives outside this crate; the listener's job ends
/// at a successful, back-pressured channel send.
pub struct MailboxListener<S: EmailSource> {
    store: Arc<Store>,
    source: S,
    handle: MailboxHandle,
    dispatch: mpsc::Sender<EmailId>,
    mode: MailboxMode,
}

impl<S: EmailSource> MailboxListener<S> {
    /// Builds a listener and its paired status handle. `email_address` is
    /// recorded immediately if the source is already connected.
    pub fn new(
        store: Arc<Store>,
        source: S,
        mode: MailboxMode,
        email_address: Option<String>,
        dispatch: mpsc::Sender<EmailId>,
        recent_results_cap: usize,
    ) -> (Self, MailboxHandle) {
        let handle = MailboxHandle::new(mode, recent_results_cap);
        handle.set_connected(email_address.is_some(), email_address);
        let listener = Self {
            store,
            source,
            handle: handle.clone(),
            dispatch,
            mode,
        };
        (listener, handle)
    }

    /// Runs the fetch loop until `shutdown` is cancelled. Never panics or
    /// returns early on a backend error — failures back off and retry.
    pub async fn run(mut self, shutdown: CancellationToken) {
        self.handle.set_mode(self.mode);
        let mut backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_secs(5))
            .with_max_interval(Duration::from_secs(300))
            .with_max_elapsed_time(None)
            .build();

        loop {
            if shutdown.is_cancelled() {
                return;
            }

            let fetch_outcome = match self.mode {
                MailboxMode::Off => {
                    shutdown.cancelled().await;
                    return;
                }
                MailboxMode::Poll { .. } => Some(self.poll_once().await),
                MailboxMode::Push => {
                    tokio::select! {
                        () = shutdown.cancelled() => return,
                        result = tokio::time::timeout(PUSH_KEEPALIVE, self.source.wait_for_notification()) => {
                            match result {
                                Ok(Ok(())) => Some(self.poll_once().await),
                                Ok(Err(err)) => Some(Err(err)),
                                Err(_elapsed) => None,
                            }
                        }
                    }
                }
            };

            if let Some(outcome) = fetch_outcome {
                match outcome {
                    Ok(()) => backoff.reset(),
                    Err(err) => {
                        tracing::warn!(error = %err, "mailbox fetch failed, backing off");
                        if let Some(delay) = backoff.next_backoff() {
                            tokio::select! {
                                () = shutdown.cancelled() => return,
                                () = tokio::time::sleep(delay) => {}
                            }
                        }
                        continue;
                    }
                }
            }

            if let MailboxMode::Poll { interval } = self.mode {
                tokio::select! {
                    () = shutdown.cancelled() => return,
                    () = tokio::time::sleep(interval) => {}
                }
            }
        }
    }

    async fn poll_once(&mut self) -> Result<(), MailboxError> {
        let watermark = self.store.get_setting_json::<i64>(WATERMARK_KEY)?;
        let FetchResult { emails, watermark: new_watermark } =
            self.source.list_recent(watermark, FETCH_LIMIT).await?;

        for incoming in emails {
            if let Some(message_id) = &incoming.message_id {
                if self.store.get_email_by_message_id(message_id)?.is_some() {
                    continue;
                }
            }

            let model = to_email_model(incoming);
            let email_id = self.store.insert_email(&model)?;

            // Back-pressure: a full dispatch channel blocks the fetch
            // loop rather than dropping the email.
            if self.dispatch.send(email_id).await.is_err() {
                tracing::warn!("mailbox dispatch channel closed, stopping this fetch cycle");
                break;
            }
        }

        if let Some(watermark) = new_watermark {
            self.store.set_setting_json(WATERMARK_KEY, &watermark)?;
        }
        self.handle.mark_synced();
        Ok(())
    }
}

fn to_email_model(incoming: IncomingEmail) -> Email {
    let body_snippet = incoming.body_full.chars().take(500).collect();
    Email {
        id: EmailId::new(NonZeroU64::MIN),
        message_id: incoming.message_id,
        from_address: incoming.from_address,
        from_name: incoming.from_name,
        subject: incoming.subject,
        body_snippet,
        body_full: incoming.body_full,
        attachments: incoming.attachments,
        classification: None,
        confidence: None,
        processed: EmailProcessed::New,
        received_at: incoming.received_at,
        created_at: OffsetDateTime::now_utc(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use hireflow_store_sqlite::StoreConfig;

    use super::*;

    struct StubSource {
        batches: StdMutex<VecDeque<FetchResult>>,
    }

    impl EmailSource for StubSource {
        async fn list_recent(&self, _watermark: Option<i64>, _limit: usize) -> Result<FetchResult, MailboxError> {
            Ok(self
                .batches
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .pop_front()
                .unwrap_or_default())
        }
    }

    fn test_store() -> (tempfile::TempDir, Arc<Store>) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store =
            Store::open(&StoreConfig::new(dir.path().join("hireflow.db"))).expect("store opens");
        (dir, Arc::new(store))
    }

    fn sample_incoming(message_id: &str) -> IncomingEmail {
        IncomingEmail {
            message_id: Some(message_id.to_owned()),
            from_address: "jane@example.com".to_owned(),
            from_name: "Jane Doe".to_owned(),
            subject: "Application".to_owned(),
            body_full: "Please see my resume attached.".to_owned(),
            attachments: vec!["resume.pdf".to_owned()],
            received_at: None,
        }
    }

    #[tokio::test]
    async fn poll_once_inserts_new_emails_and_dispatches_ids() {
        let (_dir, store) = test_store();
        let source = StubSource {
            batches: StdMutex::new(VecDeque::from([FetchResult {
                emails: vec![sample_incoming("msg-1")],
                watermark: Some(42),
            }])),
        };
        let (tx, mut rx) = mpsc::channel(4);
        let (mut listener, handle) =
            MailboxListener::new(store.clone(), source, MailboxMode::Poll { interval: Duration::from_secs(30) }, Some("recruiting@example.com".to_owned()), tx, 50);

        listener.poll_once().await.expect("poll");

        let dispatched = rx.recv().await.expect("dispatched id");
        let stored = store.get_email(dispatched).expect("row exists");
        assert_eq!(stored.subject, "Application");
        assert_eq!(
            store.get_setting_json::<i64>(WATERMARK_KEY).expect("watermark"),
            Some(42)
        );
        assert!(handle.status().connected);
    }

    #[tokio::test]
    async fn poll_once_skips_already_seen_message_ids() {
        let (_dir, store) = test_store();
        let source = StubSource {
            batches: StdMutex::new(VecDeque::from([
                FetchResult { emails: vec![sample_incoming("dup")], watermark: None },
                FetchResult { emails: vec![sample_incoming("dup")], watermark: None },
            ])),
        };
        let (tx, mut rx) = mpsc::channel(4);
        let (mut listener, _handle) =
            MailboxListener::new(store, source, MailboxMode::Poll { interval: Duration::from_secs(30) }, None, tx, 50);

        listener.poll_once().await.expect("first poll");
        listener.poll_once().await.expect("second poll");

        assert!(rx.recv().await.is_some());
        // The dedup check means the second identical message never reaches
        // the dispatch channel.
        rx.close();
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn handle_bounds_recent_results() {
        let handle = MailboxHandle::new(MailboxMode::Off, 2);
        for i in 0..5 {
            handle.record_result(WorkflowResult {
                email_id: EmailId::new(NonZeroU64::MIN),
                subject: format!("subject {i}"),
                from_address: "jane@example.com".to_owned(),
                outcome: "advanced".to_owned(),
                recorded_at: OffsetDateTime::now_utc(),
            });
        }
        let status = handle.status();
        assert_eq!(status.recent_results.len(), 2);
        assert_eq!(status.total_processed, 5);
        assert_eq!(status.recent_results[1].subject, "subject 4");
    }
}
