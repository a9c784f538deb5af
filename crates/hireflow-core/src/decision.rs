// crates/hireflow-core/src/decision.rs
// ============================================================================
// Module: HireFlow Decision Engine Math
// Description: The threshold table and scoring law the decision engine
//              applies once a resume score (and, later, an interview score)
//              is available for an application.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module is pure: no I/O, no store access. `hireflow-pipeline`'s
//! decision engine calls [`decide`] and applies whatever side effects the
//! returned [`DecisionOutcome`] calls for.

use serde::{Deserialize, Serialize};

/// The three per-Job threshold values the decision engine compares
/// scores against. Centralized here per the single-source-of-truth
/// resolution in `DESIGN.md`; a `Job` may override any of the three.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum resume score required, independently of the interview
    /// score, for an `advance` verdict.
    pub resume_min: f64,
    /// Minimum interview score required, independently of the resume
    /// score, for an `advance` verdict.
    pub interview_min: f64,
    /// Combined final score below which an application is rejected
    /// rather than held.
    pub reject_below: f64,
}

/// The default threshold values, used unless a `Job` overrides them.
pub const DEFAULT_THRESHOLDS: Thresholds = Thresholds {
    resume_min: 80.0,
    interview_min: 75.0,
    reject_below: 50.0,
};

/// The two scores the decision engine has available once the interview
/// evaluator has run — the engine only runs after both exist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionInput {
    /// The resume scorer's numeric score.
    pub resume_score: f64,
    /// The interview evaluator's numeric score.
    pub interview_score: f64,
}

/// The decision engine's verdict, carrying the score it was computed
/// from so callers can persist it without recomputing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DecisionOutcome {
    /// Advance the application to the next stage.
    Advance {
        /// The score the decision was based on.
        score: f64,
    },
    /// Hold the application for manual recruiter review.
    Hold {
        /// The score the decision was based on.
        score: f64,
    },
    /// Reject the application.
    Reject {
        /// The score the decision was based on.
        score: f64,
    },
}

impl DecisionOutcome {
    /// Returns the score the outcome was computed from, regardless of
    /// variant.
    #[must_use]
    pub const fn score(self) -> f64 {
        match self {
            Self::Advance { score } | Self::Hold { score } | Self::Reject { score } => score,
        }
    }
}

/// Rounds `value` to one decimal place.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Applies the decision engine's scoring law and threshold table to
/// `input`.
///
/// `advance` requires both scores to independently clear their own
/// threshold; a strong interview cannot compensate for a resume score
/// below `thresholds.resume_min`, and vice versa. Otherwise the combined
/// score `0.4 * resume + 0.6 * interview` (rounded to one decimal place)
/// decides between `hold` and `reject`.
#[must_use]
pub fn decide(input: DecisionInput, thresholds: &Thresholds) -> DecisionOutcome {
    let final_score = round1(0.4 * input.resume_score + 0.6 * input.interview_score);
    if input.resume_score >= thresholds.resume_min && input.interview_score >= thresholds.interview_min {
        DecisionOutcome::Advance { score: final_score }
    } else if final_score < thresholds.reject_below {
        DecisionOutcome::Reject { score: final_score }
    } else {
        DecisionOutcome::Hold { score: final_score }
    }
}

/// Extracts a candidate-preferred scheduling slot from the trailing JSON
/// object in a transcript, if one is present.
///
/// The voice-interview widget appends a trailer of the form
/// `{"candidate_name": ..., "availability": {"candidate_preferred_slot":
/// <slot>}}` after the spoken transcript; this is best-effort and
/// tolerant of absence or malformed trailers.
#[must_use]
pub fn extract_preferred_slot(transcript: &str) -> Option<String> {
    let brace = transcript.find('{')?;
    let tail = &transcript[brace..];
    #[derive(Deserialize)]
    struct Availability {
        candidate_preferred_slot: Option<String>,
    }
    #[derive(Deserialize)]
    struct Trailer {
        availability: Option<Availability>,
    }
    serde_json::from_str::<Trailer>(tail)
        .ok()
        .and_then(|t| t.availability)
        .and_then(|a| a.candidate_preferred_slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_scores_above_threshold_advances() {
        let outcome = decide(
            DecisionInput {
                resume_score: 90.0,
                interview_score: 80.0,
            },
            &DEFAULT_THRESHOLDS,
        );
        // 0.4*90 + 0.6*80 = 36 + 48 = 84
        assert_eq!(outcome, DecisionOutcome::Advance { score: 84.0 });
    }

    #[test]
    fn strong_interview_cannot_compensate_weak_resume() {
        // resume_score below resume_min disqualifies advance even though
        // the combined score alone would clear a single 75 bar.
        let outcome = decide(
            DecisionInput {
                resume_score: 60.0,
                interview_score: 90.0,
            },
            &DEFAULT_THRESHOLDS,
        );
        // 0.4*60 + 0.6*90 = 24 + 54 = 78, not below reject_below(50) => hold
        assert_eq!(outcome, DecisionOutcome::Hold { score: 78.0 });
    }

    #[test]
    fn low_combined_score_rejects() {
        let outcome = decide(
            DecisionInput {
                resume_score: 40.0,
                interview_score: 30.0,
            },
            &DEFAULT_THRESHOLDS,
        );
        assert_eq!(outcome.score(), 34.0);
        assert!(matches!(outcome, DecisionOutcome::Reject { .. }));
    }

    #[test]
    fn hold_when_interview_misses_but_final_above_reject_floor() {
        // S3 from the seed scenarios: resume 82 (>= resume_min), interview
        // 60 (< interview_min), final 68.8 (>= reject_below) => hold.
        let outcome = decide(
            DecisionInput {
                resume_score: 82.0,
                interview_score: 60.0,
            },
            &DEFAULT_THRESHOLDS,
        );
        assert_eq!(outcome, DecisionOutcome::Hold { score: 68.8 });
    }

    #[test]
    fn preferred_slot_extraction_tolerates_absence() {
        assert_eq!(extract_preferred_slot("no trailer here"), None);
        let transcript = "candidate said hello\n{\"candidate_name\": \"Jane\", \"availability\": {\"candidate_preferred_slot\": \"Tuesday 2pm\"}}";
        assert_eq!(
            extract_preferred_slot(transcript),
            Some("Tuesday 2pm".to_owned())
        );
    }
}
