// crates/hireflow-oracles/src/email_classifier.rs
// ============================================================================
// Module: Email Classifier Oracle
// Description: Sorts inbound email into candidate-application / general /
//              unknown, with a deterministic keyword-and-attachment
//              fallback grounded in `original_source/backend/agents/
//              email_classifier.py`.
// Dependencies: hireflow-core, reqwest, serde_json, tracing
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use hireflow_core::oracle::{
    EmailCategory, EmailClassification, EmailClassifierInput, Oracle, OracleOutcome,
};

use crate::config::OracleClientConfig;
use crate::transport::{call_agent, strip_markdown_fence};
use crate::usage::{approximate_tokens, UsageRecord, UsageSink};

const AGENT_NAME: &str = "email-classifier";

/// Attachment extensions that read as a resume upload.
const RESUME_ATTACHMENT_EXTENSIONS: [&str; 3] = [".pdf", ".doc", ".docx"];

/// Subject/body keywords that suggest a job application.
const APPLICATION_KEYWORDS: [&str; 8] = [
    "resume",
    "cv",
    "application",
    "applying",
    "candidate",
    "position",
    "job opening",
    "role",
];

/// Classifies inbound email, live or by deterministic fallback.
pub struct EmailClassifierOracle {
    client: reqwest::Client,
    config: OracleClientConfig,
    agent_id: String,
    usage_sink: Arc<dyn UsageSink>,
}

impl EmailClassifierOracle {
    /// Builds a classifier bound to the given live-backend agent id.
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

    fn fallback(input: &EmailClassifierInput) -> EmailClassification {
        let haystack = format!(
            "{} {}",
            input.subject.to_lowercase(),
            input.body_text.to_lowercase()
        );
        let has_resume_attachment = input.attachment_names.iter().any(|name| {
            let lower = name.to_lowercase();
            RESUME_ATTACHMENT_EXTENSIONS
                .iter()
                .any(|ext| lower.ends_with(ext))
        });
        let keyword_hits = APPLICATION_KEYWORDS
            .iter()
            .filter(|kw| haystack.contains(*kw))
            .count();

        let (category, confidence, reasoning) = if has_resume_attachment {
            (
                EmailCategory::CandidateApplication,
                0.92,
                "resume-like attachment present".to_owned(),
            )
        } else if keyword_hits >= 2 {
            (
                EmailCategory::CandidateApplication,
                0.78,
                "multiple application keywords present".to_owned(),
            )
        } else {
            (
                EmailCategory::General,
                0.85,
                "no application signal detected".to_owned(),
            )
        };

        EmailClassification {
            category,
            confidence,
            reasoning,
            suggested_action: "manual_review".to_owned(),
            detected_name: None,
            detected_role: None,
        }
    }
}

impl Oracle<EmailClassifierInput, EmailClassification> for EmailClassifierOracle {
    async fn call(&self, input: &EmailClassifierInput) -> OracleOutcome<EmailClassification> {
        if self.config.should_use_mock() {
            return OracleOutcome::fallback(Self::fallback(input));
        }

        let prompt = format!(
            "subject: {}\nfrom: {} <{}>\nattachments: {}\nbody:\n{}",
            input.subject,
            input.from_name,
            input.from_address,
            input.attachment_names.join(", "),
            input.body_text
        );
        let started = Instant::now();
        let result = call_agent(&self.client, &self.config, &self.agent_id, &prompt).await;

        let outcome = match result {
            Ok(text) => match parse_classification(&text) {
                Ok(classification) => OracleOutcome::live(classification),
                Err(err) => {
                    tracing::warn!(error = %err, "email classifier response unparsable, falling back");
                    OracleOutcome::fallback(Self::fallback(input))
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "email classifier live call failed, falling back");
                OracleOutcome::fallback(Self::fallback(input))
            }
        };

        self.usage_sink.record(&UsageRecord {
            agent: AGENT_NAME,
            mode: outcome.mode,
            input_tokens: approximate_tokens(&prompt),
            output_tokens: approximate_tokens(input.body_text.as_str()),
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        });
        outcome
    }
}

fn parse_classification(text: &str) -> Result<EmailClassification, serde_json::Error> {
    serde_json::from_str(strip_markdown_fence(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(subject: &str, body: &str, attachments: &[&str]) -> EmailClassifierInput {
        EmailClassifierInput {
            subject: subject.to_owned(),
            from_name: "Jane Doe".to_owned(),
            from_address: "jane@example.com".to_owned(),
            attachment_names: attachments.iter().map(|s| (*s).to_owned()).collect(),
            body_text: body.to_owned(),
        }
    }

    #[test]
    fn resume_attachment_with_keywords_is_high_confidence_application() {
        let classification = EmailClassifierOracle::fallback(&input(
            "Application for Backend Engineer",
            "Please find my resume attached for the role.",
            &["jane_doe_resume.pdf"],
        ));
        assert_eq!(classification.category, EmailCategory::CandidateApplication);
        assert!((classification.confidence - 0.92).abs() < f64::EPSILON);
    }

    #[test]
    fn plain_email_with_no_signal_is_general() {
        let classification =
            EmailClassifierOracle::fallback(&input("Newsletter", "Check out our sale.", &[]));
        assert_eq!(classification.category, EmailCategory::General);
    }

    #[test]
    fn keyword_only_email_is_moderate_confidence_application() {
        let classification = EmailClassifierOracle::fallback(&input(
            "Question about the open position",
            "I'm interested in applying for this role, do you have a job opening?",
            &[],
        ));
        assert_eq!(classification.category, EmailCategory::CandidateApplication);
        assert!((classification.confidence - 0.78).abs() < f64::EPSILON);
    }
}
