// crates/hireflow-oracles/src/job_generator.rs
// ============================================================================
// Module: Job Description Generator Oracle
// Description: Drafts a job posting from a role title alone, with a
//              deterministic role-keyword fallback table grounded in
//              `original_source/backend/agents/job_generator.py`.
// Dependencies: hireflow-core, reqwest, serde_json, tracing
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use hireflow_core::oracle::{JobGeneratorInput, JobGeneratorOutput, Oracle, OracleOutcome};

use crate::config::OracleClientConfig;
use crate::transport::{call_agent, strip_markdown_fence};
use crate::usage::{approximate_tokens, UsageRecord, UsageSink};

const AGENT_NAME: &str = "job-generator";

struct RoleTemplate {
    keywords: &'static [&'static str],
    department: &'static str,
    must_have: &'static [&'static str],
    nice_to_have: &'static [&'static str],
}

const ROLE_TEMPLATES: [RoleTemplate; 5] = [
    RoleTemplate {
        keywords: &["engineer", "developer", "swe"],
        department: "Engineering",
        must_have: &["git", "debugging", "system design"],
        nice_to_have: &["ci/cd", "cloud infrastructure"],
    },
    RoleTemplate {
        keywords: &["data scientist", "data engineer", "analytics"],
        department: "Data",
        must_have: &["sql", "python", "statistics"],
        nice_to_have: &["machine learning", "data visualization"],
    },
    RoleTemplate {
        keywords: &["designer", "ux", "ui"],
        department: "Design",
        must_have: &["figma", "user research"],
        nice_to_have: &["prototyping", "design systems"],
    },
    RoleTemplate {
        keywords: &["sales", "account executive"],
        department: "Sales",
        must_have: &["pipeline management", "negotiation"],
        nice_to_have: &["crm tooling"],
    },
    RoleTemplate {
        keywords: &["recruiter", "talent", "people"],
        department: "People",
        must_have: &["sourcing", "interviewing"],
        nice_to_have: &["ats administration"],
    },
];

const DEFAULT_DEPARTMENT: &str = "Operations";
const DEFAULT_MUST_HAVE: [&str; 2] = ["communication", "ownership"];
const DEFAULT_NICE_TO_HAVE: [&str; 1] = ["cross-functional collaboration"];

/// Drafts job postings from a title alone, live or by deterministic fallback.
pub struct JobGeneratorOracle {
    client: reqwest::Client,
    config: OracleClientConfig,
    agent_id: String,
    usage_sink: Arc<dyn UsageSink>,
}

impl JobGeneratorOracle {
    /// Builds a job generator bound to the given live-backend agent id.
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

    fn fallback(input: &JobGeneratorInput) -> JobGeneratorOutput {
        let title_lower = input.title.to_lowercase();
        let template = ROLE_TEMPLATES
            .iter()
            .find(|template| template.keywords.iter().any(|kw| title_lower.contains(kw)));

        let (department, must_have, nice_to_have) = template.map_or(
            (
                DEFAULT_DEPARTMENT.to_owned(),
                DEFAULT_MUST_HAVE.iter().map(|s| (*s).to_owned()).collect(),
                DEFAULT_NICE_TO_HAVE
                    .iter()
                    .map(|s| (*s).to_owned())
                    .collect(),
            ),
            |template| {
                (
                    template.department.to_owned(),
                    template.must_have.iter().map(|s| (*s).to_owned()).collect(),
                    template
                        .nice_to_have
                        .iter()
                        .map(|s| (*s).to_owned())
                        .collect(),
                )
            },
        );

        let seniority = if title_lower.contains("senior") || title_lower.contains("staff") {
            "senior"
        } else if title_lower.contains("junior") || title_lower.contains("associate") {
            "junior"
        } else {
            "mid"
        }
        .to_owned();

        JobGeneratorOutput {
            department: department.clone(),
            location: "Remote".to_owned(),
            seniority,
            must_have_skills: must_have,
            nice_to_have_skills: nice_to_have,
            responsibilities: vec![format!(
                "Own day-to-day {} responsibilities for the {} function.",
                input.title, department
            )],
            qualifications: vec![format!(
                "Demonstrated experience relevant to a {} role.",
                input.title
            )],
            description: format!(
                "We are hiring a {} to join our {} team.",
                input.title, department
            ),
        }
    }
}

impl Oracle<JobGeneratorInput, JobGeneratorOutput> for JobGeneratorOracle {
    async fn call(&self, input: &JobGeneratorInput) -> OracleOutcome<JobGeneratorOutput> {
        if self.config.should_use_mock() {
            return OracleOutcome::fallback(Self::fallback(input));
        }

        let prompt = format!("title: {}", input.title);
        let started = Instant::now();
        let result = call_agent(&self.client, &self.config, &self.agent_id, &prompt).await;

        let outcome = match result {
            Ok(text) => match parse_output(&text) {
                Ok(output) => OracleOutcome::live(output),
                Err(err) => {
                    tracing::warn!(error = %err, "job generator response unparsable, falling back");
                    OracleOutcome::fallback(Self::fallback(input))
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "job generator live call failed, falling back");
                OracleOutcome::fallback(Self::fallback(input))
            }
        };

        self.usage_sink.record(&UsageRecord {
            agent: AGENT_NAME,
            mode: outcome.mode,
            input_tokens: approximate_tokens(&prompt),
            output_tokens: approximate_tokens(&outcome.output.description),
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        });
        outcome
    }
}

fn parse_output(text: &str) -> Result<JobGeneratorOutput, serde_json::Error> {
    serde_json::from_str(strip_markdown_fence(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engineer_title_maps_to_engineering_department() {
        let output = JobGeneratorOracle::fallback(&JobGeneratorInput {
            title: "Senior Backend Engineer".to_owned(),
        });
        assert_eq!(output.department, "Engineering");
        assert_eq!(output.seniority, "senior");
        assert!(output.must_have_skills.contains(&"system design".to_owned()));
    }

    #[test]
    fn unrecognized_title_falls_back_to_default_template() {
        let output = JobGeneratorOracle::fallback(&JobGeneratorInput {
            title: "Chief Vibes Officer".to_owned(),
        });
        assert_eq!(output.department, "Operations");
        assert_eq!(output.seniority, "mid");
    }
}
