// crates/hireflow-oracles/src/interview_evaluator.rs
// ============================================================================
// Module: Interview Evaluator Oracle
// Description: Scores an interview transcript against a role, with a
//              deterministic fallback anchored to the candidate's resume
//              score, grounded in `original_source/backend/agents/
//              interview_evaluator.py`.
// Dependencies: hireflow-core, reqwest, serde_json, tracing
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use hireflow_core::oracle::{
    InterviewEvaluatorInput, InterviewScoreDetail, Oracle, OracleOutcome, QualitativeRating,
};
use hireflow_core::Recommendation;

use crate::config::OracleClientConfig;
use crate::transport::{call_agent, strip_markdown_fence};
use crate::usage::{approximate_tokens, UsageRecord, UsageSink};

const AGENT_NAME: &str = "interview-evaluator";

/// Evaluates interview transcripts, live or by deterministic fallback.
pub struct InterviewEvaluatorOracle {
    client: reqwest::Client,
    config: OracleClientConfig,
    agent_id: String,
    usage_sink: Arc<dyn UsageSink>,
}

impl InterviewEvaluatorOracle {
    /// Builds an interview evaluator bound to the given live-backend agent id.
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

    fn fallback(input: &InterviewEvaluatorInput) -> InterviewScoreDetail {
        let transcript_words = input.transcript.split_whitespace().count();
        // A transcript with too few words to reflect a real conversation
        // cannot be scored off the resume anchor in good faith.
        let score = if transcript_words < 20 {
            round1((input.resume_score * 0.3).min(40.0))
        } else {
            round1((input.resume_score.mul_add(0.7, 20.0)).min(95.0))
        };

        let decision = if score >= 70.0 {
            Recommendation::Advance
        } else if score < 50.0 {
            Recommendation::Reject
        } else {
            Recommendation::Hold
        };

        let rating = rating_for(score);

        let strengths = if transcript_words >= 20 {
            vec!["carried a full conversation across the screening".to_owned()]
        } else {
            Vec::new()
        };
        let concerns = if transcript_words < 20 {
            vec!["transcript too short to evaluate technical depth".to_owned()]
        } else {
            Vec::new()
        };

        InterviewScoreDetail {
            score,
            decision,
            strengths,
            concerns,
            communication_rating: rating,
            technical_depth: rating,
            cultural_fit: rating,
            email_draft: String::new(),
            scheduling_slots: Vec::new(),
            summary: format!(
                "Fallback evaluation for {}: resume score {} carried forward with a {transcript_words}-word transcript.",
                input.job_title, input.resume_score
            ),
        }
    }
}

fn rating_for(score: f64) -> QualitativeRating {
    if score >= 90.0 {
        QualitativeRating::Excellent
    } else if score >= 80.0 {
        QualitativeRating::Strong
    } else if score >= 70.0 {
        QualitativeRating::Good
    } else if score >= 60.0 {
        QualitativeRating::Adequate
    } else if score >= 50.0 {
        QualitativeRating::Average
    } else if score >= 35.0 {
        QualitativeRating::Weak
    } else {
        QualitativeRating::Poor
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl Oracle<InterviewEvaluatorInput, InterviewScoreDetail> for InterviewEvaluatorOracle {
    async fn call(&self, input: &InterviewEvaluatorInput) -> OracleOutcome<InterviewScoreDetail> {
        if self.config.should_use_mock() {
            return OracleOutcome::fallback(Self::fallback(input));
        }

        let prompt = format!(
            "job_title: {}\nrequired_skills: {}\nresume_score: {}\nresume_summary:\n{}\njob_description:\n{}\ntranscript:\n{}",
            input.job_title,
            input.required_skills.join(", "),
            input.resume_score,
            input.resume_summary,
            input.job_description,
            input.transcript
        );
        let started = Instant::now();
        let result = call_agent(&self.client, &self.config, &self.agent_id, &prompt).await;

        let outcome = match result {
            Ok(text) => match parse_detail(&text) {
                Ok(detail) => OracleOutcome::live(detail),
                Err(err) => {
                    tracing::warn!(error = %err, "interview evaluator response unparsable, falling back");
                    OracleOutcome::fallback(Self::fallback(input))
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "interview evaluator live call failed, falling back");
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

fn parse_detail(text: &str) -> Result<InterviewScoreDetail, serde_json::Error> {
    serde_json::from_str(strip_markdown_fence(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(transcript: &str, resume_score: f64) -> InterviewEvaluatorInput {
        InterviewEvaluatorInput {
            transcript: transcript.to_owned(),
            job_title: "Backend Engineer".to_owned(),
            job_description: "Build things.".to_owned(),
            required_skills: vec!["rust".to_owned()],
            resume_score,
            resume_summary: "Strong rust background.".to_owned(),
        }
    }

    #[test]
    fn score_tracks_resume_score_linearly() {
        let detail = InterviewEvaluatorOracle::fallback(&input(
            "this is a sufficiently long transcript with more than twenty words so the full formula applies to this candidate today",
            90.0,
        ));
        // min(90*0.7 + 20, 95) = min(83, 95) = 83
        assert!((detail.score - 83.0).abs() < f64::EPSILON);
        assert_eq!(detail.decision, Recommendation::Advance);
    }

    #[test]
    fn score_caps_at_ninety_five() {
        let detail = InterviewEvaluatorOracle::fallback(&input(
            "this is a sufficiently long transcript with more than twenty words so the full formula applies to this candidate today",
            100.0,
        ));
        assert!((detail.score - 95.0).abs() < f64::EPSILON);
    }

    #[test]
    fn short_transcript_is_penalized_and_flagged() {
        let detail = InterviewEvaluatorOracle::fallback(&input("hi there", 90.0));
        assert!(detail.score < 50.0);
        assert_eq!(detail.decision, Recommendation::Reject);
        assert!(!detail.concerns.is_empty());
    }
}
