// crates/hireflow-cli/src/main.rs
// ============================================================================
// Module: HireFlow CLI Entry Point
// Description: Command dispatcher for the recruiting-pipeline service:
//              running the HTTP server, applying store migrations,
//              inspecting mailbox listener status, and seeding demo data.
// Dependencies: clap, hireflow-api, hireflow-config, hireflow-pipeline,
//               hireflow-store-sqlite, tokio, tracing-subscriber
// ============================================================================

//! ## Overview
//! The composition root: loads [`hireflow_config::HireflowConfig`], opens
//! the store, wires the oracle clients and mail transport into a
//! [`hireflow_pipeline::PipelineContext`], and either serves the API router
//! or runs a one-shot administrative command against the store directly.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use hireflow_config::HireflowConfig;
use hireflow_core::decision::DEFAULT_THRESHOLDS;
use hireflow_core::model::{Candidate, Job, JobStatus, Stage};
use hireflow_core::{ApplicationId, CandidateId, JobId};
use hireflow_mailbox::{listener_enabled, load_credentials};
use hireflow_oracles::{LoggingUsageSink, OracleClientConfig};
use hireflow_pipeline::mail::HttpMailTransport;
use hireflow_pipeline::{OracleAgentIds, PipelineContext};
use hireflow_store_sqlite::Store;
use thiserror::Error;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

/// CLI error wrapper carrying a single human-readable message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    message: String,
}

impl CliError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

type CliResult<T> = Result<T, CliError>;

/// HireFlow recruiting-pipeline service.
#[derive(Parser, Debug)]
#[command(name = "hireflow", disable_help_subcommand = true)]
struct Cli {
    /// Optional config file path (defaults to `hireflow.toml` or `HIREFLOW_CONFIG`).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<std::path::PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Starts the HTTP API server.
    Serve,
    /// Opens the store, applying schema initialization if needed.
    Migrate,
    /// Mailbox listener administration.
    Mailbox {
        /// Selected mailbox subcommand.
        #[command(subcommand)]
        command: MailboxCommand,
    },
    /// Inserts deterministic sample data for local development.
    Seed,
}

/// Mailbox subcommands.
#[derive(Subcommand, Debug)]
enum MailboxCommand {
    /// Reports whether the listener is enabled and which mailbox is connected.
    Status,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = HireflowConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load configuration: {err}")))?;

    match cli.command {
        Commands::Serve => command_serve(config).await,
        Commands::Migrate => command_migrate(config),
        Commands::Mailbox { command } => match command {
            MailboxCommand::Status => command_mailbox_status(config),
        },
        Commands::Seed => command_seed(config),
    }
}

/// Opens the durable store from the resolved configuration.
///
/// `hireflow_config::StoreConfig` only carries the database path; the
/// store's own `StoreConfig` (same name, different crate) also carries
/// durability knobs, so this is the one place both are named, and only
/// the sqlite one is imported unqualified to keep call sites readable.
fn open_store(config: &HireflowConfig) -> CliResult<Store> {
    let store_config = hireflow_store_sqlite::StoreConfig::new(&config.store.database_path);
    Store::open(&store_config).map_err(|err| CliError::new(format!("failed to open store: {err}")))
}

fn build_pipeline_context(config: &HireflowConfig, store: Arc<Store>) -> PipelineContext {
    let http_client = reqwest::Client::new();
    let oracle_config = OracleClientConfig {
        api_key: config.oracles.api_key.clone(),
        force_mock: config.oracles.force_mock,
        timeout: Duration::from_millis(config.oracles.timeout_ms),
        ..OracleClientConfig::default()
    };
    let agent_ids = OracleAgentIds {
        email_classifier: config.oracles.agent_ids.email_classifier.clone(),
        resume_scorer: config.oracles.agent_ids.resume_scorer.clone(),
        interview_evaluator: config.oracles.agent_ids.interview_evaluator.clone(),
        summary_generator: config.oracles.agent_ids.summary_generator.clone(),
    };

    let mut ctx = PipelineContext::with_agent_ids(
        store,
        http_client.clone(),
        oracle_config,
        Arc::new(LoggingUsageSink),
        agent_ids,
    )
    .with_default_thresholds(config.thresholds)
    .with_company_name(config.server.company_name.clone())
    .with_external_agent_id(config.oracles.agent_ids.interview_evaluator.clone());

    if let Ok(relay_url) = std::env::var("MAIL_RELAY_URL") {
        ctx = ctx.with_mail_transport(Arc::new(HttpMailTransport::new(
            http_client,
            relay_url,
            Duration::from_millis(config.oracles.timeout_ms),
        )));
    }

    ctx
}

async fn command_serve(config: HireflowConfig) -> CliResult<ExitCode> {
    let bind_addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .map_err(|err| CliError::new(format!("invalid server.bind_addr: {err}")))?;

    let store = Arc::new(open_store(&config)?);
    match listener_enabled(&store) {
        Ok(true) => tracing::info!("mailbox listener is enabled, but no live email source is configured for this binary; restart with the listener wired once a backend is available"),
        Ok(false) => tracing::info!("mailbox listener is disabled"),
        Err(err) => tracing::warn!(error = %err, "failed to read mailbox listener status"),
    }

    let ctx = build_pipeline_context(&config, store);
    let webhook_secret = config.webhook.hmac_secret.clone();
    let state = hireflow_api::AppState::new(Arc::new(ctx), webhook_secret);
    let app = hireflow_api::router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .map_err(|err| CliError::new(format!("failed to bind {bind_addr}: {err}")))?;
    tracing::info!(%bind_addr, "hireflow-api listening");
    axum::serve(listener, app)
        .await
        .map_err(|err| CliError::new(format!("server failed: {err}")))?;

    Ok(ExitCode::SUCCESS)
}

fn command_migrate(config: HireflowConfig) -> CliResult<ExitCode> {
    open_store(&config)?;
    println!(
        "store at {} is at schema version {}",
        config.store.database_path,
        hireflow_store_sqlite::SCHEMA_VERSION
    );
    Ok(ExitCode::SUCCESS)
}

fn command_mailbox_status(config: HireflowConfig) -> CliResult<ExitCode> {
    let store = open_store(&config)?;
    let enabled = listener_enabled(&store)
        .map_err(|err| CliError::new(format!("failed to read listener status: {err}")))?;
    let creds = load_credentials(&store)
        .map_err(|err| CliError::new(format!("failed to read mailbox credentials: {err}")))?;

    println!("listener_enabled: {enabled}");
    match creds {
        Some(creds) => println!("connected mailbox: {} (via {})", creds.email_address, creds.method),
        None => println!("connected mailbox: none"),
    }
    Ok(ExitCode::SUCCESS)
}

fn command_seed(config: HireflowConfig) -> CliResult<ExitCode> {
    let store = open_store(&config)?;
    let now = OffsetDateTime::now_utc();

    let job = Job {
        id: JobId::from_raw(1).ok_or_else(|| CliError::new("invalid seed job id"))?,
        job_code: "DEMO-ENG-1".to_owned(),
        title: "Backend Engineer".to_owned(),
        department: "Engineering".to_owned(),
        location: "Remote".to_owned(),
        seniority: "mid".to_owned(),
        must_have_skills: vec!["rust".to_owned(), "sql".to_owned()],
        nice_to_have_skills: vec!["kubernetes".to_owned()],
        description: "Build and operate the recruiting pipeline's backend services.".to_owned(),
        thresholds: DEFAULT_THRESHOLDS,
        status: JobStatus::Open,
        created_at: now,
        updated_at: now,
    };
    let job_id: JobId = store
        .create_job(&job)
        .map_err(|err| CliError::new(format!("failed to seed job: {err}")))?;

    let candidate = Candidate {
        id: CandidateId::from_raw(1).ok_or_else(|| CliError::new("invalid seed candidate id"))?,
        name: "Jordan Rivera".to_owned(),
        email: "jordan.rivera@example.com".to_owned(),
        phone: String::new(),
        resume_text: "Six years building backend services in Rust and Go.".to_owned(),
        resume_filename: "jordan_rivera_resume.pdf".to_owned(),
        source_email_id: None,
        notes: String::new(),
        created_at: now,
        updated_at: now,
    };
    let candidate_id: CandidateId = store
        .create_candidate(&candidate)
        .map_err(|err| CliError::new(format!("failed to seed candidate: {err}")))?;

    let application = hireflow_core::model::Application {
        id: ApplicationId::from_raw(1).ok_or_else(|| CliError::new("invalid seed application id"))?,
        candidate_id,
        job_id,
        stage: Stage::Matched,
        resume_score: None,
        resume_score_detail: None,
        interview_score: None,
        interview_score_detail: None,
        screening_transcript: None,
        screening_audio_path: None,
        screening_status: None,
        screening_attempts: 0,
        screening_max_attempts: 3,
        screening_last_attempt_at: None,
        screening_failure_reason: None,
        recommendation: None,
        ai_next_action: None,
        ai_snippets: Vec::new(),
        created_at: now,
        updated_at: now,
        interview_link_status: None,
        interview_face_tracking: None,
        final_score: None,
        booked_slot: None,
        email_draft_sent: false,
    };
    store
        .create_application(&application)
        .map_err(|err| CliError::new(format!("failed to seed application: {err}")))?;

    println!("seeded job {job_id}, candidate {candidate_id}, and one matched application");
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(dir: &tempfile::TempDir) -> HireflowConfig {
        let mut config = HireflowConfig::default();
        config.store.database_path = dir.path().join("hireflow.db").to_string_lossy().into_owned();
        config
    }

    #[test]
    fn migrate_reports_the_current_schema_version() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(&dir);
        assert!(command_migrate(config).is_ok());
    }

    #[test]
    fn seed_inserts_a_job_candidate_and_application() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(&dir);
        assert!(command_seed(config.clone()).is_ok());

        let store = open_store(&config).expect("store reopens");
        assert_eq!(store.list_all_jobs().expect("jobs list").len(), 1);
        assert_eq!(store.list_all_candidates().expect("candidates list").len(), 1);
        assert_eq!(store.list_all_applications().expect("applications list").len(), 1);
    }

    #[test]
    fn mailbox_status_reports_disabled_on_a_fresh_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = test_config(&dir);
        assert!(command_mailbox_status(config).is_ok());
    }

    #[test]
    fn build_pipeline_context_carries_config_overrides_through() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = test_config(&dir);
        config.server.company_name = "Acme Recruiting".to_owned();
        config.oracles.agent_ids.interview_evaluator = "custom-interviewer".to_owned();

        let store = Arc::new(open_store(&config).expect("store opens"));
        let ctx = build_pipeline_context(&config, store);
        assert_eq!(ctx.company_name, "Acme Recruiting");
        assert_eq!(ctx.external_agent_id, "custom-interviewer");
    }
}
