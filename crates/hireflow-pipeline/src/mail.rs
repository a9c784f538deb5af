// crates/hireflow-pipeline/src/mail.rs
// ============================================================================
// Module: Outbound Mail Transport
// Description: Best-effort delivery of interview-link and decision-outcome
//              emails, kept outside every state-transition transaction so a
//              mail-relay outage can never roll back a Store write.
// Dependencies: reqwest, serde, tokio, tracing
// ============================================================================

//! ## Overview
//! Mirrors the oracle clients' live/fallback shape from `hireflow-oracles`:
//! a relay-backed transport posts to a configured HTTP endpoint, and a
//! logging transport (used when no relay is configured, and in tests)
//! records the attempt without a network call. Both implement
//! [`MailTransport`]; callers treat its `send` result as advisory only —
//! `false` means "log it and move on," never a reason to fail the caller.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Serialize;

/// An email the pipeline wants to deliver to a candidate.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundEmail {
    /// Recipient address.
    pub to_address: String,
    /// Recipient display name, may be empty.
    pub to_name: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Delivers outbound candidate emails.
///
/// A boxed future is used here (rather than the `impl Future` return
/// position `hireflow_core::oracle::Oracle` uses) because the pipeline
/// needs to hold this behind `Arc<dyn MailTransport>` — oracle clients
/// are held as concrete types instead, since nothing needs to swap them
/// at runtime.
pub trait MailTransport: Send + Sync {
    /// Attempts delivery. Returns whether it is believed to have
    /// succeeded; implementations must never propagate an error to the
    /// caller, only log it.
    fn send(&self, message: &OutboundEmail) -> BoxFuture<'_, bool>;
}

/// Records every send attempt via `tracing` and reports success without
/// ever touching the network. The default transport in development and
/// in tests that don't care about delivery semantics.
#[derive(Debug, Default)]
pub struct LoggingMailTransport;

impl MailTransport for LoggingMailTransport {
    fn send(&self, message: &OutboundEmail) -> BoxFuture<'_, bool> {
        let to = message.to_address.clone();
        let subject = message.subject.clone();
        Box::pin(async move {
            tracing::info!(to, subject, "mail transport: logging-only delivery");
            true
        })
    }
}

/// Posts the message as JSON to a configured relay endpoint (an internal
/// mail-sending service, not a raw SMTP socket — matching the teacher
/// workspace's HTTP-first posture for every external integration).
pub struct HttpMailTransport {
    client: reqwest::Client,
    relay_url: String,
    timeout: Duration,
}

impl HttpMailTransport {
    /// Builds a transport that posts to `relay_url` with the given
    /// per-call timeout.
    #[must_use]
    pub fn new(client: reqwest::Client, relay_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            relay_url: relay_url.into(),
            timeout,
        }
    }
}

impl MailTransport for HttpMailTransport {
    fn send(&self, message: &OutboundEmail) -> BoxFuture<'_, bool> {
        let client = self.client.clone();
        let url = self.relay_url.clone();
        let timeout = self.timeout;
        let body = message.clone();
        Box::pin(async move {
            let request = client.post(&url).json(&body);
            match tokio::time::timeout(timeout, request.send()).await {
                Ok(Ok(response)) if response.status().is_success() => true,
                Ok(Ok(response)) => {
                    tracing::warn!(status = %response.status(), "mail relay rejected message");
                    false
                }
                Ok(Err(err)) => {
                    tracing::warn!(error = %err, "mail relay request failed");
                    false
                }
                Err(_) => {
                    tracing::warn!("mail relay request timed out");
                    false
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn logging_transport_always_reports_success() {
        let transport = LoggingMailTransport;
        let sent = transport
            .send(&OutboundEmail {
                to_address: "candidate@example.com".to_owned(),
                to_name: "Candidate".to_owned(),
                subject: "hi".to_owned(),
                body: "body".to_owned(),
            })
            .await;
        assert!(sent);
    }
}
