// crates/hireflow-oracles/src/resume_scorer.rs
// ============================================================================
// Module: Resume Scorer Oracle
// Description: Scores a resume against a job's required/nice-to-have skills,
//              with a deterministic skill-overlap fallback grounded in
//              `original_source/backend/agents/resume_scorer.py`.
// Dependencies: hireflow-core, reqwest, serde_json, tracing
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use hireflow_core::oracle::{Oracle, OracleOutcome, ResumeScoreDetail, ResumeScorerInput};
use hireflow_core::Recommendation;

use crate::config::OracleClientConfig;
use crate::transport::{call_agent, strip_markdown_fence};
use crate::usage::{approximate_tokens, UsageRecord, UsageSink};

const AGENT_NAME: &str = "resume-scorer";

/// Scores resumes, live or by deterministic fallback.
pub struct ResumeScorerOracle {
    client: reqwest::Client,
    config: OracleClientConfig,
    agent_id: String,
    usage_sink: Arc<dyn UsageSink>,
}

impl ResumeScorerOracle {
    /// Builds a resume scorer bound to the given live-backend agent id.
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

    fn fallback(input: &ResumeScorerInput) -> ResumeScoreDetail {
        let resume_lower = input.resume_text.to_lowercase();
        let (must_hits, must_misses) = partition_by_presence(&resume_lower, &input.must_have_skills);
        let (nice_hits, _nice_misses) = partition_by_presence(&resume_lower, &input.nice_to_have_skills);

        let must_ratio = ratio(must_hits.len(), input.must_have_skills.len());
        let nice_ratio = ratio(nice_hits.len(), input.nice_to_have_skills.len());

        let raw_score = 40.0 + must_ratio * 40.0 + nice_ratio * 15.0 + 5.0;
        let score = round1(raw_score.min(98.0));

        let recommendation = if score >= 70.0 {
            Recommendation::Advance
        } else if score < 50.0 {
            Recommendation::Reject
        } else {
            Recommendation::Hold
        };

        let mut evidence: Vec<String> = must_hits
            .iter()
            .map(|skill| format!("resume mentions required skill \"{skill}\""))
            .collect();
        evidence.extend(
            nice_hits
                .iter()
                .map(|skill| format!("resume mentions nice-to-have skill \"{skill}\"")),
        );

        let gaps: Vec<String> = must_misses
            .iter()
            .map(|skill| format!("no mention of required skill \"{skill}\""))
            .collect();

        let risks = if must_misses.len() > must_hits.len() {
            vec!["majority of required skills not evidenced in resume text".to_owned()]
        } else {
            Vec::new()
        };

        ResumeScoreDetail {
            score,
            evidence,
            gaps: gaps.clone(),
            risks,
            recommendation,
            screening_questions: must_misses
                .iter()
                .map(|skill| format!("Can you walk through your experience with {skill}?"))
                .collect(),
            summary: format!(
                "{}/{} required and {}/{} nice-to-have skills found in the resume text for the {} role.",
                must_hits.len(),
                input.must_have_skills.len(),
                nice_hits.len(),
                input.nice_to_have_skills.len(),
                input.job_title
            ),
            why_shortlisted: must_hits
                .iter()
                .map(|skill| format!("demonstrates {skill}"))
                .collect(),
            key_strengths: must_hits,
            main_gaps: gaps,
            interview_focus: must_misses,
        }
    }
}

fn partition_by_presence(haystack: &str, skills: &[String]) -> (Vec<String>, Vec<String>) {
    let mut present = Vec::new();
    let mut missing = Vec::new();
    for skill in skills {
        if haystack.contains(&skill.to_lowercase()) {
            present.push(skill.clone());
        } else {
            missing.push(skill.clone());
        }
    }
    (present, missing)
}

fn ratio(hits: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        #[allow(clippy::cast_precision_loss, reason = "skill counts stay far below f64's exact-integer range")]
        let value = hits as f64 / total as f64;
        value
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl Oracle<ResumeScorerInput, ResumeScoreDetail> for ResumeScorerOracle {
    async fn call(&self, input: &ResumeScorerInput) -> OracleOutcome<ResumeScoreDetail> {
        if self.config.should_use_mock() {
            return OracleOutcome::fallback(Self::fallback(input));
        }

        let prompt = format!(
            "job_title: {}\nseniority: {}\nmust_have: {}\nnice_to_have: {}\njob_description:\n{}\nresume:\n{}",
            input.job_title,
            input.seniority,
            input.must_have_skills.join(", "),
            input.nice_to_have_skills.join(", "),
            input.job_description,
            input.resume_text
        );
        let started = Instant::now();
        let result = call_agent(&self.client, &self.config, &self.agent_id, &prompt).await;

        let outcome = match result {
            Ok(text) => match parse_detail(&text) {
                Ok(detail) => OracleOutcome::live(detail),
                Err(err) => {
                    tracing::warn!(error = %err, "resume scorer response unparsable, falling back");
                    OracleOutcome::fallback(Self::fallback(input))
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "resume scorer live call failed, falling back");
                OracleOutcome::fallback(Self::fallback(input))
            }
        };

        self.usage_sink.record(&UsageRecord {
            agent: AGENT_NAME,
            mode: outcome.mode,
            input_tokens: approximate_tokens(&prompt),
            output_tokens: approximate_tokens(&outcome.output.summary),
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        });
        outcome
    }
}

fn parse_detail(text: &str) -> Result<ResumeScoreDetail, serde_json::Error> {
    serde_json::from_str(strip_markdown_fence(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(resume: &str, must: &[&str], nice: &[&str]) -> ResumeScorerInput {
        ResumeScorerInput {
            resume_text: resume.to_owned(),
            job_title: "Backend Engineer".to_owned(),
            job_description: "Build things.".to_owned(),
            must_have_skills: must.iter().map(|s| (*s).to_owned()).collect(),
            nice_to_have_skills: nice.iter().map(|s| (*s).to_owned()).collect(),
            seniority: "senior".to_owned(),
        }
    }

    #[test]
    fn full_skill_overlap_scores_near_cap() {
        let detail = ResumeScorerOracle::fallback(&input(
            "Experienced with rust and sql, also kubernetes.",
            &["rust", "sql"],
            &["kubernetes"],
        ));
        // 40 + 1.0*40 + 1.0*15 + 5 = 100, capped at 98
        assert!((detail.score - 98.0).abs() < f64::EPSILON);
        assert_eq!(detail.recommendation, Recommendation::Advance);
    }

    #[test]
    fn no_skill_overlap_scores_at_floor() {
        let detail = ResumeScorerOracle::fallback(&input(
            "I enjoy painting and hiking.",
            &["rust", "sql"],
            &["kubernetes"],
        ));
        // 40 + 0 + 0 + 5 = 45
        assert!((detail.score - 45.0).abs() < f64::EPSILON);
        assert_eq!(detail.recommendation, Recommendation::Reject);
    }

    #[test]
    fn partial_overlap_lands_in_hold_band() {
        let detail = ResumeScorerOracle::fallback(&input(
            "Skilled in rust development.",
            &["rust", "sql"],
            &["kubernetes"],
        ));
        // 40 + 0.5*40 + 0 + 5 = 65
        assert!((detail.score - 65.0).abs() < f64::EPSILON);
        assert_eq!(detail.recommendation, Recommendation::Hold);
    }
}
