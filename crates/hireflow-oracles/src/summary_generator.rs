// crates/hireflow-oracles/src/summary_generator.rs
// ============================================================================
// Module: Final Summary Generator Oracle
// Description: Produces the narrative summary attached to an application's
//              final decision. Has no direct Python counterpart in
//              `original_source/` — the dashboard previously rendered this
//              inline from raw scores — but is built the same uniform way
//              as the other four oracles: live call with a deterministic
//              fallback.
// Dependencies: hireflow-core, reqwest, serde_json, tracing
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use hireflow_core::oracle::{FinalSummary, Oracle, OracleOutcome, SummaryGeneratorInput};
use hireflow_core::Recommendation;

use crate::config::OracleClientConfig;
use crate::transport::{call_agent, strip_markdown_fence};
use crate::usage::{approximate_tokens, UsageRecord, UsageSink};

const AGENT_NAME: &str = "final-summary-generator";

/// Generates final-decision narratives, live or by deterministic fallback.
pub struct SummaryGeneratorOracle {
    client: reqwest::Client,
    config: OracleClientConfig,
    agent_id: String,
    usage_sink: Arc<dyn UsageSink>,
}

impl SummaryGeneratorOracle {
    /// Builds a summary generator bound to the given live-backend agent id.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        config: OracleClientConfig,
        agent_id: impl Into<String>,
        usage_sink: Arc<dyn UsageSink>,
    ) -> Self {
        Self {
            client,
            config,
            agent_id: agent_id.into(),
            usage_sink,
        }
    }

    fn fallback(input: &SummaryGeneratorInput) -> FinalSummary {
        let decision_phrase = match input.decision {
            Recommendation::Advance => "advanced to the next stage",
            Recommendation::Hold => "held for manual review",
            Recommendation::Reject => "not moving forward",
        };

        let interview_clause = input.interview_score.map_or_else(
            || " No interview score was recorded.".to_owned(),
            |score| format!(" Interview score: {score:.1}."),
        );

        let narrative = format!(
            "{} applied for {}. Resume score: {:.1}.{interview_clause} Outcome: {decision_phrase}.",
            input.candidate_name, input.job_title, input.resume_score
        );

        FinalSummary { narrative }
    }
}

impl Oracle<SummaryGeneratorInput, FinalSummary> for SummaryGeneratorOracle {
    async fn call(&self, input: &SummaryGeneratorInput) -> OracleOutcome<FinalSummary> {
        if self.config.should_use_mock() {
            return OracleOutcome::fallback(Self::fallback(input));
        }

        let prompt = format!(
            "candidate: {}\njob_title: {}\nresume_score: {}\ninterview_score: {}\ndecision: {:?}",
            input.candidate_name,
            input.job_title,
            input.resume_score,
            input
                .interview_score
                .map_or_else(|| "none".to_owned(), |score| score.to_string()),
            input.decision
        );
        let started = Instant::now();
        let result = call_agent(&self.client, &self.config, &self.agent_id, &prompt).await;

        let outcome = match result {
            Ok(text) => OracleOutcome::live(FinalSummary {
                narrative: strip_markdown_fence(&text).to_owned(),
            }),
            Err(err) => {
                tracing::warn!(error = %err, "summary generator live call failed, falling back");
                OracleOutcome::fallback(Self::fallback(input))
            }
        };

        self.usage_sink.record(&UsageRecord {
            agent: AGENT_NAME,
            mode: outcome.mode,
            input_tokens: approximate_tokens(&prompt),
            output_tokens: approximate_tokens(&outcome.output.narrative),
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        });
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_mentions_decision_and_scores() {
        let summary = SummaryGeneratorOracle::fallback(&SummaryGeneratorInput {
            candidate_name: "Jane Doe".to_owned(),
            job_title: "Backend Engineer".to_owned(),
            resume_score: 88.0,
            interview_score: Some(81.5),
            decision: Recommendation::Advance,
        });
        assert!(summary.narrative.contains("Jane Doe"));
        assert!(summary.narrative.contains("88.0"));
        assert!(summary.narrative.contains("81.5"));
        assert!(summary.narrative.contains("advanced to the next stage"));
    }

    #[test]
    fn fallback_handles_missing_interview_score() {
        let summary = SummaryGeneratorOracle::fallback(&SummaryGeneratorInput {
            candidate_name: "Sam Lee".to_owned(),
            job_title: "Recruiter".to_owned(),
            resume_score: 40.0,
            interview_score: None,
            decision: Recommendation::Reject,
        });
        assert!(summary.narrative.contains("No interview score was recorded"));
        assert!(summary.narrative.contains("not moving forward"));
    }
}
