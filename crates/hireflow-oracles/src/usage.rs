// crates/hireflow-oracles/src/usage.rs
// ============================================================================
// Module: Usage Sink
// Description: Emission-only accounting for oracle calls — which agent ran,
//              in which mode, and roughly how many tokens it cost. No
//              persisted usage dashboard; this is an observability seam,
//              the Rust analogue of `llm_tracker.py`'s per-call logging.
// Dependencies: hireflow-core (OracleMode), tracing
// ============================================================================

use hireflow_core::oracle::OracleMode;

/// One oracle invocation's accounting record.
#[derive(Debug, Clone)]
pub struct UsageRecord {
    /// Name of the agent or model invoked (e.g. `"email-classifier"`).
    pub agent: &'static str,
    /// Whether the call actually reached the live backend or fell back.
    pub mode: OracleMode,
    /// Approximate input token count (word-count based, not a real tokenizer).
    pub input_tokens: u32,
    /// Approximate output token count.
    pub output_tokens: u32,
    /// Wall-clock duration of the call, in milliseconds.
    pub duration_ms: u64,
}

/// Records oracle usage for observability. Never affects control flow —
/// an oracle call's outcome is decided before the sink is notified.
pub trait UsageSink: Send + Sync {
    /// Records one completed oracle call.
    fn record(&self, usage: &UsageRecord);
}

/// Default [`UsageSink`] that emits a structured `tracing` event per call.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingUsageSink;

impl UsageSink for LoggingUsageSink {
    fn record(&self, usage: &UsageRecord) {
        match usage.mode {
            OracleMode::Live => tracing::info!(
                agent = usage.agent,
                mode = "live",
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                duration_ms = usage.duration_ms,
                "oracle call completed"
            ),
            OracleMode::Fallback => tracing::warn!(
                agent = usage.agent,
                mode = "fallback",
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                duration_ms = usage.duration_ms,
                "oracle call fell back to deterministic heuristic"
            ),
        }
    }
}

/// Rough token estimate used only for usage accounting, not billing.
/// Mirrors `llm_tracker.py`'s `len(text.split()) * 1.3` approximation.
#[must_use]
pub fn approximate_tokens(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    u32::try_from(words).map_or(u32::MAX, |w| w.saturating_mul(13) / 10)
}
