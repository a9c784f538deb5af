// crates/hireflow-config/src/lib.rs
// ============================================================================
// Module: HireFlow Configuration
// Description: Configuration loading and validation for the recruiting
//              pipeline.
// Purpose: Provide strict, fail-closed config parsing with environment
//          overrides for secrets and deployment-specific values.
// Dependencies: hireflow-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration loads from an optional TOML file (path from
//! `HIREFLOW_CONFIG`, default `hireflow.toml`) layered under
//! environment-variable overrides for anything secret or
//! environment-specific (database path, oracle endpoints, webhook secret).
//! Missing config file is not an error — every field has a default — but
//! a present-and-invalid file, or a post-merge value that fails
//! [`HireflowConfig::validate`], is.

use std::env;
use std::fs;
use std::path::Path;

use hireflow_core::decision::{Thresholds, DEFAULT_THRESHOLDS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable used to override the config file path.
pub const CONFIG_ENV_VAR: &str = "HIREFLOW_CONFIG";
/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "hireflow.toml";
/// Maximum configuration file size accepted from disk.
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Errors that can occur loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(String),
    /// The config file exceeded [`MAX_CONFIG_FILE_SIZE`].
    #[error("config file exceeds the {MAX_CONFIG_FILE_SIZE}-byte size limit")]
    TooLarge,
    /// The config file was not valid TOML in the expected shape.
    #[error("failed to parse config file: {0}")]
    Parse(String),
    /// A value failed post-parse validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration for the recruiting pipeline service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HireflowConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Durable store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Mailbox listener configuration.
    #[serde(default)]
    pub mailbox: MailboxConfig,
    /// Oracle client configuration.
    #[serde(default)]
    pub oracles: OracleConfig,
    /// Decision engine threshold overrides.
    #[serde(default = "default_thresholds_config")]
    pub thresholds: Thresholds,
    /// Voice-service webhook verification configuration.
    #[serde(default)]
    pub webhook: WebhookConfig,
}

const fn default_thresholds_config() -> Thresholds {
    DEFAULT_THRESHOLDS
}

impl Default for HireflowConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            mailbox: MailboxConfig::default(),
            oracles: OracleConfig::default(),
            thresholds: DEFAULT_THRESHOLDS,
            webhook: WebhookConfig::default(),
        }
    }
}

impl HireflowConfig {
    /// Loads configuration using the default resolution rules: an
    /// optional TOML file, then environment-variable overrides for
    /// secrets and deployment-specific values.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if a present config file cannot be read or
    /// parsed, or if the merged configuration fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = match path {
            Some(p) => p.to_path_buf(),
            None => match env::var(CONFIG_ENV_VAR) {
                Ok(value) => value.into(),
                Err(_) => DEFAULT_CONFIG_NAME.into(),
            },
        };

        if !resolved.exists() {
            return Ok(Self::default());
        }

        let metadata = fs::metadata(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::TooLarge);
        }

        let content = fs::read_to_string(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        toml::from_str(&content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("DATABASE_URL") {
            self.store.database_path = value;
        }
        if let Ok(value) = env::var("HIREFLOW_BIND_ADDR") {
            self.server.bind_addr = value;
        }
        if let Ok(value) = env::var("MISTRAL_API_KEY") {
            self.oracles.api_key = Some(value);
        }
        if let Ok(value) = env::var("EMAIL_CLASSIFIER_MOCK") {
            self.oracles.force_mock = parse_bool_env(&value, self.oracles.force_mock);
        }
        if let Ok(value) = env::var("HIREFLOW_WEBHOOK_SECRET") {
            self.webhook.hmac_secret = value;
        } else if let Ok(value) = env::var("VOICE_WEBHOOK_SECRET") {
            self.webhook.hmac_secret = value;
        }
        if let Ok(value) = env::var("FRONTEND_URL") {
            self.server.frontend_url = value;
        }
        if let Ok(value) = env::var("COMPANY_NAME") {
            self.server.company_name = value;
        }
        if let Ok(value) = env::var("EXTERNAL_EMAIL_CLASSIFIER_AGENT_ID") {
            self.oracles.agent_ids.email_classifier = value;
        }
        if let Ok(value) = env::var("EXTERNAL_RESUME_SCORER_AGENT_ID") {
            self.oracles.agent_ids.resume_scorer = value;
        }
        if let Ok(value) = env::var("EXTERNAL_INTERVIEW_EVALUATOR_AGENT_ID") {
            self.oracles.agent_ids.interview_evaluator = value;
        }
        if let Ok(value) = env::var("EXTERNAL_SUMMARY_GENERATOR_AGENT_ID") {
            self.oracles.agent_ids.summary_generator = value;
        }
    }

    /// Validates the merged configuration for internal consistency.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when a field is out of range or
    /// internally inconsistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.mailbox.validate()?;
        self.thresholds_in_range()?;
        Ok(())
    }

    fn thresholds_in_range(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !in_range(t.resume_min) || !in_range(t.interview_min) || !in_range(t.reject_below) {
            return Err(ConfigError::Invalid(
                "decision thresholds must be within [0, 100]".to_owned(),
            ));
        }
        Ok(())
    }
}

fn parse_bool_env(value: &str, default: bool) -> bool {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => true,
        "false" | "0" | "no" => false,
        _ => default,
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the axum server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Request body size limit in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Base URL used to mint candidate-facing interview link URLs.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    /// Display name used in candidate-facing email copy and link
    /// descriptors.
    #[serde(default = "default_company_name")]
    pub company_name: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_owned()
}

const fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024
}

fn default_frontend_url() -> String {
    "http://localhost:8080".to_owned()
}

fn default_company_name() -> String {
    "HireFlow".to_owned()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_body_bytes: default_max_body_bytes(),
            frontend_url: default_frontend_url(),
            company_name: default_company_name(),
        }
    }
}

impl ServerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "server.bind_addr is not a valid socket address: {}",
                self.bind_addr
            )));
        }
        Ok(())
    }
}

/// Durable store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Filesystem path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

fn default_database_path() -> String {
    "./hireflow.db".to_owned()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Mailbox listener configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailboxConfig {
    /// Polling interval in seconds when push notifications are
    /// unavailable.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Maximum recent workflow results retained in the status buffer.
    #[serde(default = "default_recent_results_cap")]
    pub recent_results_cap: usize,
}

const fn default_poll_interval_secs() -> u64 {
    30
}

const fn default_recent_results_cap() -> usize {
    50
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            recent_results_cap: default_recent_results_cap(),
        }
    }
}

impl MailboxConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "mailbox.poll_interval_secs must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Oracle client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// API key for the live oracle backend, if configured.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Forces every oracle to skip the live backend and use its
    /// deterministic fallback. Useful for local development and tests.
    #[serde(default)]
    pub force_mock: bool,
    /// Per-call timeout in milliseconds before falling back.
    #[serde(default = "default_oracle_timeout_ms")]
    pub timeout_ms: u64,
    /// Remote agent ids, one per oracle, resolved from `EXTERNAL_*_AGENT_ID`
    /// environment variables.
    #[serde(default)]
    pub agent_ids: OracleAgentIds,
}

const fn default_oracle_timeout_ms() -> u64 {
    8_000
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            force_mock: false,
            timeout_ms: default_oracle_timeout_ms(),
            agent_ids: OracleAgentIds::default(),
        }
    }
}

/// Remote backend agent ids, one per oracle client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleAgentIds {
    /// Agent id backing [`hireflow_oracles::EmailClassifierOracle`].
    #[serde(default = "default_email_classifier_agent_id")]
    pub email_classifier: String,
    /// Agent id backing [`hireflow_oracles::ResumeScorerOracle`].
    #[serde(default = "default_resume_scorer_agent_id")]
    pub resume_scorer: String,
    /// Agent id backing [`hireflow_oracles::InterviewEvaluatorOracle`].
    #[serde(default = "default_interview_evaluator_agent_id")]
    pub interview_evaluator: String,
    /// Agent id backing [`hireflow_oracles::SummaryGeneratorOracle`].
    #[serde(default = "default_summary_generator_agent_id")]
    pub summary_generator: String,
}

fn default_email_classifier_agent_id() -> String {
    "email-classifier".to_owned()
}
fn default_resume_scorer_agent_id() -> String {
    "resume-scorer".to_owned()
}
fn default_interview_evaluator_agent_id() -> String {
    "interview-evaluator".to_owned()
}
fn default_summary_generator_agent_id() -> String {
    "summary-generator".to_owned()
}

impl Default for OracleAgentIds {
    fn default() -> Self {
        Self {
            email_classifier: default_email_classifier_agent_id(),
            resume_scorer: default_resume_scorer_agent_id(),
            interview_evaluator: default_interview_evaluator_agent_id(),
            summary_generator: default_summary_generator_agent_id(),
        }
    }
}

/// Voice-service webhook verification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// HMAC-SHA256 secret used to verify inbound webhook signatures.
    /// An empty secret disables verification (development only).
    #[serde(default, skip_serializing)]
    pub hmac_secret: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            hmac_secret: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = HireflowConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = HireflowConfig::load(Some(Path::new("/nonexistent/hireflow.toml")))
            .expect("missing file should fall back to defaults");
        assert_eq!(config, HireflowConfig::default());
    }

    #[test]
    fn rejects_out_of_range_thresholds() {
        let mut config = HireflowConfig::default();
        config.thresholds.reject_below = 150.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_toml_file_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("hireflow.toml");
        fs::write(&path, "[server]\nbind_addr = \"127.0.0.1:9090\"\n").expect("write config");
        let config = HireflowConfig::load(Some(&path)).expect("load config");
        assert_eq!(config.server.bind_addr, "127.0.0.1:9090");
    }
}
