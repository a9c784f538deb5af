// crates/hireflow-oracles/src/config.rs
// ============================================================================
// Module: Oracle Client Configuration
// Description: Shared configuration every oracle client is built from.
// Dependencies: none beyond std
// ============================================================================

use std::time::Duration;

/// Configuration shared by every oracle client: endpoint, credentials,
/// and the bounded timeout/force-mock fields that gate the live/fallback
/// decision. Mirrors the field set the teacher's `HttpProviderConfig`
/// carries (timeout, user agent) plus the mock-override knob every
/// Python agent module reads from its own environment variable.
#[derive(Debug, Clone)]
pub struct OracleClientConfig {
    /// Base URL of the live LLM backend.
    pub base_url: String,
    /// API key for the live backend. `None` forces fallback mode.
    pub api_key: Option<String>,
    /// Skips the live backend unconditionally, even with a key present.
    pub force_mock: bool,
    /// Per-call timeout before falling back.
    pub timeout: Duration,
    /// User agent string sent with live requests.
    pub user_agent: String,
}

impl Default for OracleClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mistral.ai".to_owned(),
            api_key: None,
            force_mock: false,
            timeout: Duration::from_millis(8_000),
            user_agent: "hireflow-oracles/0.1".to_owned(),
        }
    }
}

impl OracleClientConfig {
    /// Whether a call should skip the live backend entirely.
    #[must_use]
    pub const fn should_use_mock(&self) -> bool {
        self.force_mock || self.api_key.is_none()
    }
}
