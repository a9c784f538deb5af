// crates/hireflow-pipeline/src/context.rs
// ============================================================================
// Module: Pipeline Context
// Description: Owns the Store handle, every oracle client, and the mail
//              transport — the single object the ingestion pipeline,
//              interview-link sub-engine, and decision engine all borrow.
// Purpose: Mirrors `decision-gate-broker`'s composite-dispatcher shape: one
//          struct wiring dependencies together, exposing entry-point
//          functions the API/CLI/mailbox call into, rather than threading
//          five separate handles through every call site.
// Dependencies: hireflow-core, hireflow-oracles, hireflow-store-sqlite
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use hireflow_core::decision::Thresholds;
use hireflow_oracles::{
    EmailClassifierOracle, InterviewEvaluatorOracle, OracleClientConfig, ResumeScorerOracle,
    SummaryGeneratorOracle,
};
use hireflow_store_sqlite::Store;

use crate::mail::{LoggingMailTransport, MailTransport};

/// Default expiry window for a newly issued interview link.
pub const DEFAULT_LINK_EXPIRY: Duration = Duration::from_secs(72 * 60 * 60);

/// Remote backend agent ids, one per oracle client.
///
/// Kept as a plain struct here rather than reusing a config-crate type so
/// the composition root stays the only thing that knows about config file
/// shape; the CLI copies field-by-field from `hireflow-config::OracleAgentIds`.
#[derive(Debug, Clone)]
pub struct OracleAgentIds {
    /// Agent id backing [`EmailClassifierOracle`].
    pub email_classifier: String,
    /// Agent id backing [`ResumeScorerOracle`].
    pub resume_scorer: String,
    /// Agent id backing [`InterviewEvaluatorOracle`].
    pub interview_evaluator: String,
    /// Agent id backing [`SummaryGeneratorOracle`].
    pub summary_generator: String,
}

impl Default for OracleAgentIds {
    fn default() -> Self {
        Self {
            email_classifier: "email-classifier".to_owned(),
            resume_scorer: "resume-scorer".to_owned(),
            interview_evaluator: "interview-evaluator".to_owned(),
            summary_generator: "final-summary-generator".to_owned(),
        }
    }
}

/// Shared dependencies for every pipeline entry point.
pub struct PipelineContext {
    /// The durable store.
    pub store: Arc<Store>,
    /// Classifies inbound email as a candidate application or not.
    pub classifier: EmailClassifierOracle,
    /// Scores a candidate's resume against a job.
    pub resume_scorer: ResumeScorerOracle,
    /// Scores an interview transcript.
    pub interview_evaluator: InterviewEvaluatorOracle,
    /// Drafts the short final-decision narrative.
    pub summary_generator: SummaryGeneratorOracle,
    /// Delivers outbound candidate emails, best-effort.
    pub mail: Arc<dyn MailTransport>,
    /// Decision-engine thresholds, when a Job does not override them.
    pub default_thresholds: Thresholds,
    /// Default expiry applied to newly issued interview links.
    pub link_expiry: Duration,
    /// Display name surfaced to candidates on the public validation
    /// endpoint and in outbound email copy.
    pub company_name: String,
    /// Id of the external voice agent the candidate-facing widget hands
    /// to the conversational AI provider to start an interview session.
    pub external_agent_id: String,
}

impl PipelineContext {
    /// Builds a context wired against live (or mock-fallback, depending
    /// on `oracle_config`) oracle clients and a logging-only mail
    /// transport, suitable for local development and tests.
    #[must_use]
    pub fn new(
        store: Arc<Store>,
        http_client: reqwest::Client,
        oracle_config: OracleClientConfig,
        usage_sink: Arc<dyn hireflow_oracles::UsageSink>,
    ) -> Self {
        Self::with_agent_ids(
            store,
            http_client,
            oracle_config,
            usage_sink,
            OracleAgentIds::default(),
        )
    }

    /// Builds a context the same way [`Self::new`] does, but with each
    /// oracle bound to the agent id the composition root resolved for it
    /// (the CLI sources these from `hireflow-config::OracleAgentIds`,
    /// itself overridable per-oracle via `EXTERNAL_*_AGENT_ID` env vars).
    #[must_use]
    pub fn with_agent_ids(
        store: Arc<Store>,
        http_client: reqwest::Client,
        oracle_config: OracleClientConfig,
        usage_sink: Arc<dyn hireflow_oracles::UsageSink>,
        agent_ids: OracleAgentIds,
    ) -> Self {
        Self {
            store,
            classifier: EmailClassifierOracle::new(
                http_client.clone(),
                oracle_config.clone(),
                agent_ids.email_classifier,
                Arc::clone(&usage_sink),
            ),
            resume_scorer: ResumeScorerOracle::new(
                http_client.clone(),
                oracle_config.clone(),
                agent_ids.resume_scorer,
                Arc::clone(&usage_sink),
            ),
            interview_evaluator: InterviewEvaluatorOracle::new(
                http_client.clone(),
                oracle_config.clone(),
                agent_ids.interview_evaluator,
                Arc::clone(&usage_sink),
            ),
            summary_generator: SummaryGeneratorOracle::new(
                http_client,
                oracle_config,
                agent_ids.summary_generator,
                usage_sink,
            ),
            mail: Arc::new(LoggingMailTransport),
            default_thresholds: hireflow_core::decision::DEFAULT_THRESHOLDS,
            link_expiry: DEFAULT_LINK_EXPIRY,
            company_name: "HireFlow".to_owned(),
            external_agent_id: "interview-evaluator".to_owned(),
        }
    }

    /// Overrides the mail transport (the CLI composition root swaps in an
    /// [`crate::mail::HttpMailTransport`] when a relay is configured).
    #[must_use]
    pub fn with_mail_transport(mut self, mail: Arc<dyn MailTransport>) -> Self {
        self.mail = mail;
        self
    }

    /// Overrides the default decision-engine thresholds.
    #[must_use]
    pub fn with_default_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.default_thresholds = thresholds;
        self
    }

    /// Overrides the candidate-facing company name (the CLI composition
    /// root sets this from `hireflow-config::ServerConfig::company_name`).
    #[must_use]
    pub fn with_company_name(mut self, company_name: String) -> Self {
        self.company_name = company_name;
        self
    }

    /// Overrides the external voice agent id surfaced on the public
    /// validation endpoint.
    #[must_use]
    pub fn with_external_agent_id(mut self, external_agent_id: String) -> Self {
        self.external_agent_id = external_agent_id;
        self
    }
}
