// crates/hireflow-core/src/oracle.rs
// ============================================================================
// Module: HireFlow Oracle Interfaces
// Description: The uniform oracle trait and the concrete input/output shapes
//              for the five oracle clients (classifier, resume scorer,
//              interview evaluator, summary generator, job generator).
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every oracle is a live-backed classifier/scorer/generator with a
//! deterministic fallback. `hireflow-core` only defines the shapes; the
//! live-call/fallback logic lives in `hireflow-oracles`, which implements
//! [`Oracle`] for each client.

use serde::{Deserialize, Serialize};

use crate::model::Recommendation;

/// Whether an [`Oracle`] call was served by its live backend or its
/// deterministic fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleMode {
    /// Served by the live external backend.
    Live,
    /// The live backend failed or was disabled; served by the fallback.
    Fallback,
}

/// The result of an [`Oracle`] call: the output plus which mode served it.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleOutcome<O> {
    /// The oracle's output, from whichever mode served the call.
    pub output: O,
    /// Which mode served the call.
    pub mode: OracleMode,
}

impl<O> OracleOutcome<O> {
    /// Wraps an output as a live-mode outcome.
    pub const fn live(output: O) -> Self {
        Self {
            output,
            mode: OracleMode::Live,
        }
    }

    /// Wraps an output as a fallback-mode outcome.
    pub const fn fallback(output: O) -> Self {
        Self {
            output,
            mode: OracleMode::Fallback,
        }
    }
}

/// A uniform external classifier/scorer/generator.
///
/// Implementors never propagate transport or parse failures to the
/// caller: on any failure they fall back to a deterministic output and
/// report [`OracleMode::Fallback`].
pub trait Oracle<I, O> {
    /// Invokes the oracle on `input`, never failing — any backend error
    /// is absorbed into a fallback [`OracleOutcome`].
    fn call(
        &self,
        input: &I,
    ) -> impl std::future::Future<Output = OracleOutcome<O>> + Send;
}

// ---------------------------------------------------------------------------
// Email classifier
// ---------------------------------------------------------------------------

/// Coarse category an inbound email is sorted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailCategory {
    /// Looks like a job application.
    CandidateApplication,
    /// Not a job application.
    General,
    /// Could not be confidently categorized.
    Unknown,
}

/// Input to the email classifier oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailClassifierInput {
    /// Subject line.
    pub subject: String,
    /// Sender display name.
    pub from_name: String,
    /// Sender address.
    pub from_address: String,
    /// Attachment filenames.
    pub attachment_names: Vec<String>,
    /// Plain-text body.
    pub body_text: String,
}

/// Output of the email classifier oracle, also stored verbatim on
/// [`crate::model::Email::classification`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailClassification {
    /// Assigned category.
    pub category: EmailCategory,
    /// Confidence in `[0.0, 1.0]`.
    pub confidence: f64,
    /// Free-text reasoning.
    pub reasoning: String,
    /// Suggested next action.
    pub suggested_action: String,
    /// Candidate name detected in the email, if any.
    pub detected_name: Option<String>,
    /// Role title detected in the email, if any.
    pub detected_role: Option<String>,
}

// ---------------------------------------------------------------------------
// Resume scorer
// ---------------------------------------------------------------------------

/// Input to the resume scorer oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeScorerInput {
    /// Extracted resume text.
    pub resume_text: String,
    /// Job title being matched against.
    pub job_title: String,
    /// Job description being matched against.
    pub job_description: String,
    /// Required skills for the role.
    pub must_have_skills: Vec<String>,
    /// Skills that improve the match but are not required.
    pub nice_to_have_skills: Vec<String>,
    /// Seniority band of the role.
    pub seniority: String,
}

/// Output of the resume scorer oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeScoreDetail {
    /// Numeric score in `[0, 100]`.
    pub score: f64,
    /// Evidence supporting the score.
    pub evidence: Vec<String>,
    /// Gaps relative to the role's requirements.
    pub gaps: Vec<String>,
    /// Identified risks.
    pub risks: Vec<String>,
    /// Recommendation derived from the score.
    pub recommendation: Recommendation,
    /// Suggested screening questions.
    pub screening_questions: Vec<String>,
    /// Free-text summary.
    pub summary: String,
    /// Reasons this candidate was shortlisted.
    pub why_shortlisted: Vec<String>,
    /// Key strengths.
    pub key_strengths: Vec<String>,
    /// Main gaps.
    pub main_gaps: Vec<String>,
    /// Suggested interview focus areas.
    pub interview_focus: Vec<String>,
}

// ---------------------------------------------------------------------------
// Interview evaluator
// ---------------------------------------------------------------------------

/// Input to the interview evaluator oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewEvaluatorInput {
    /// Interview transcript text.
    pub transcript: String,
    /// Job title.
    pub job_title: String,
    /// Job description.
    pub job_description: String,
    /// Required skills for the role.
    pub required_skills: Vec<String>,
    /// The candidate's resume score.
    pub resume_score: f64,
    /// The candidate's resume summary.
    pub resume_summary: String,
}

/// Communication, technical, and cultural-fit ratings an interview
/// evaluation assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualitativeRating {
    /// Top-tier rating.
    Excellent,
    /// Strong rating.
    Strong,
    /// Solidly acceptable rating.
    Good,
    /// Meets the bar but nothing more.
    Adequate,
    /// Middling rating.
    Average,
    /// Below the bar.
    Weak,
    /// Well below the bar.
    Poor,
}

/// Output of the interview evaluator oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewScoreDetail {
    /// Numeric score in `[0, 100]`.
    pub score: f64,
    /// Recommendation derived from the score.
    pub decision: Recommendation,
    /// Identified strengths.
    pub strengths: Vec<String>,
    /// Identified concerns.
    pub concerns: Vec<String>,
    /// Communication rating.
    pub communication_rating: QualitativeRating,
    /// Technical depth rating.
    pub technical_depth: QualitativeRating,
    /// Cultural fit rating.
    pub cultural_fit: QualitativeRating,
    /// Drafted follow-up email, ready to send on `advance`.
    pub email_draft: String,
    /// Proposed scheduling slots, free-text.
    pub scheduling_slots: Vec<String>,
    /// Free-text summary.
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Final summary generator
// ---------------------------------------------------------------------------

/// Input to the final summary generator oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryGeneratorInput {
    /// Candidate name.
    pub candidate_name: String,
    /// Job title.
    pub job_title: String,
    /// Resume score.
    pub resume_score: f64,
    /// Interview score, if available.
    pub interview_score: Option<f64>,
    /// Final decision recommendation.
    pub decision: Recommendation,
}

/// Output of the final summary generator oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalSummary {
    /// Free-text narrative summary of the candidate's funnel outcome.
    pub narrative: String,
}

// ---------------------------------------------------------------------------
// Job description generator
// ---------------------------------------------------------------------------

/// Input to the job description generator oracle: just the role title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobGeneratorInput {
    /// Role title to generate a posting for.
    pub title: String,
}

/// Output of the job description generator oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobGeneratorOutput {
    /// Suggested department.
    pub department: String,
    /// Suggested location.
    pub location: String,
    /// Suggested seniority band.
    pub seniority: String,
    /// Suggested required skills.
    pub must_have_skills: Vec<String>,
    /// Suggested nice-to-have skills.
    pub nice_to_have_skills: Vec<String>,
    /// Suggested day-to-day responsibilities.
    pub responsibilities: Vec<String>,
    /// Suggested qualifications.
    pub qualifications: Vec<String>,
    /// Suggested full description text.
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oracle_outcome_tracks_mode() {
        let live = OracleOutcome::live(42);
        let fallback = OracleOutcome::fallback(7);
        assert_eq!(live.mode, OracleMode::Live);
        assert_eq!(fallback.mode, OracleMode::Fallback);
    }
}
