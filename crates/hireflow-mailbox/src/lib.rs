// crates/hireflow-mailbox/src/lib.rs
// ============================================================================
// Crate: hireflow-mailbox
// Description: The push/poll mailbox listener that turns inbound mail into
//              `emails` rows and dispatches their ids for pipeline ingestion.
// Purpose: Isolate the backend-specific fetch mechanics behind the
//          `EmailSource` trait so the listener's loop, backoff, watermark
//          persistence, and bounded status buffer are backend-agnostic.
// Dependencies: backoff, hireflow-core, hireflow-store-sqlite, tokio,
//               tokio-util, tracing
// ============================================================================

//! ## Overview
//! A [`listener::MailboxListener`] owns the fetch loop; a cloned
//! [`listener::MailboxHandle`] is the read/write surface pipeline workers
//! and the dashboard status endpoint share. Credentials and the
//! backend-provided cursor (the "watermark") persist through
//! `hireflow-store-sqlite`'s `Setting` table so a restart resumes without
//! re-ingesting already-seen mail.

mod credentials;
mod listener;
mod source;

pub use credentials::{clear_credentials, listener_enabled, load_credentials, save_credentials, MailboxCredentials};
pub use listener::{MailboxHandle, MailboxListener, MailboxMode, MailboxStatus, WorkflowResult};
pub use source::{EmailSource, FetchResult, IncomingEmail, MailboxError};
