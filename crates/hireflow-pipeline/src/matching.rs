// crates/hireflow-pipeline/src/matching.rs
// ============================================================================
// Module: Candidate Materialization and Job Matching
// Description: Pure helpers for ingestion step 3 (derive a Candidate from
//              an Email) and step 4 (pick the best open Job), grounded in
//              `original_source/backend/services/workflow_service.py`'s
//              `_create_candidate_from_email` and `_find_best_matching_job`.
// Dependencies: hireflow-core
// ============================================================================

use hireflow_core::model::{Email, Job};
use hireflow_core::oracle::EmailClassification;

const RESUME_EXTENSIONS: [&str; 4] = [".pdf", ".doc", ".docx", ".rtf"];

/// Selects the first attachment filename that looks like a resume.
pub(crate) fn pick_resume_attachment(attachments: &[String]) -> Option<&String> {
    attachments
        .iter()
        .find(|name| RESUME_EXTENSIONS.iter().any(|ext| name.to_lowercase().ends_with(ext)))
}

/// Derives a display name for a materialized candidate: the classifier's
/// detected name, then a name parsed out of the body text, then the
/// sender's display name, then a titlecased local-part of the address.
pub(crate) fn derive_candidate_name(email: &Email, classification: &EmailClassification) -> String {
    if let Some(name) = classification.detected_name.as_deref() {
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            return trimmed.to_owned();
        }
    }
    if let Some(name) = parse_name_from_body(&email.body_full) {
        return name;
    }
    if !email.from_name.trim().is_empty() {
        return email.from_name.trim().to_owned();
    }
    titlecase_local_part(&email.from_address)
}

/// Looks for a `Name:`-prefixed line (case-insensitive) in the body text,
/// as a resume/cover-letter header commonly carries.
fn parse_name_from_body(body: &str) -> Option<String> {
    for line in body.lines() {
        let trimmed = line.trim();
        let lower = trimmed.to_lowercase();
        if let Some(rest) = lower.strip_prefix("name:") {
            let start = trimmed.len() - rest.len();
            let candidate = trimmed[start..].trim();
            if !candidate.is_empty() {
                return Some(candidate.to_owned());
            }
        }
    }
    None
}

fn titlecase_local_part(address: &str) -> String {
    let local = address.split('@').next().unwrap_or(address);
    local
        .split(|c: char| c == '.' || c == '_' || c == '-' || c == '+')
        .filter(|part| !part.is_empty())
        .map(titlecase_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn titlecase_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Extracts the first token in `body` that looks like an email address,
/// distinct from the message's own `from_address` (a candidate sometimes
/// lists a different preferred contact address in their signature).
pub(crate) fn parse_email_from_body(body: &str, fallback: &str) -> String {
    for token in body.split_whitespace() {
        let cleaned = token.trim_matches(|c: char| !c.is_alphanumeric() && c != '@' && c != '.');
        if let Some(at) = cleaned.find('@') {
            let (local, domain) = cleaned.split_at(at);
            let domain = &domain[1..];
            if !local.is_empty() && domain.contains('.') {
                return cleaned.to_owned();
            }
        }
    }
    fallback.to_owned()
}

/// Extracts the first token in `body` that looks like a phone number: a
/// run of digits (ignoring separators) between 7 and 15 characters long.
pub(crate) fn parse_phone_from_body(body: &str) -> String {
    for token in body.split_whitespace() {
        let digits: String = token.chars().filter(char::is_ascii_digit).collect();
        let separators_only = token
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' ' | '.'));
        if separators_only && (7..=15).contains(&digits.len()) {
            return token.to_owned();
        }
    }
    String::new()
}

/// Scores a job against a candidate's detected role and resume text:
/// +10 per word (longer than two characters) of `detected_role` found in
/// the job title, +5 per job skill found in `detected_role` + resume
/// text, +3 if the job's department is mentioned in either.
fn score_job(job: &Job, detected_role: &str, resume_text: &str) -> i64 {
    let title_lower = job.title.to_lowercase();
    let mut score: i64 = 0;
    for word in detected_role.split_whitespace().filter(|w| w.len() > 2) {
        if title_lower.contains(&word.to_lowercase()) {
            score += 10;
        }
    }

    let haystack = format!("{detected_role} {resume_text}").to_lowercase();
    for skill in job.must_have_skills.iter().chain(job.nice_to_have_skills.iter()) {
        if !skill.is_empty() && haystack.contains(&skill.to_lowercase()) {
            score += 5;
        }
    }
    if !job.department.is_empty() && haystack.contains(&job.department.to_lowercase()) {
        score += 3;
    }
    score
}

/// Picks the highest-scoring open job; falls back to the first open job
/// if none scores positive; `None` if `jobs` is empty.
pub(crate) fn pick_best_job<'a>(
    jobs: &'a [Job],
    detected_role: &str,
    resume_text: &str,
) -> Option<&'a Job> {
    let best = jobs
        .iter()
        .map(|job| (score_job(job, detected_role, resume_text), job))
        .max_by_key(|(score, _)| *score);

    match best {
        Some((score, job)) if score > 0 => Some(job),
        _ => jobs.first(),
    }
}

#[cfg(test)]
mod tests {
    use hireflow_core::decision::DEFAULT_THRESHOLDS;
    use hireflow_core::model::JobStatus;
    use time::OffsetDateTime;

    use super::*;

    fn sample_job(id: i64, title: &str, department: &str, skills: &[&str]) -> Job {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("valid timestamp");
        Job {
            id: hireflow_core::JobId::from_raw(id).expect("nonzero"),
            job_code: format!("JOB-{id}"),
            title: title.to_owned(),
            department: department.to_owned(),
            location: "Remote".to_owned(),
            seniority: "mid".to_owned(),
            must_have_skills: skills.iter().map(|s| (*s).to_owned()).collect(),
            nice_to_have_skills: Vec::new(),
            description: String::new(),
            thresholds: DEFAULT_THRESHOLDS,
            status: JobStatus::Open,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn picks_highest_scoring_job() {
        let jobs = vec![
            sample_job(1, "Data Analyst", "Analytics", &["sql", "power bi", "python"]),
            sample_job(2, "Software Engineer", "Engineering", &["rust", "kubernetes"]),
        ];
        let picked = pick_best_job(
            &jobs,
            "Data Analyst",
            "Experienced with SQL, Power BI dashboards, and Python scripting.",
        )
        .expect("a job is picked");
        assert_eq!(picked.job_code, "JOB-1");
    }

    #[test]
    fn falls_back_to_first_open_job_when_nothing_scores() {
        let jobs = vec![sample_job(7, "Mystery Role", "Ops", &["cobol"])];
        let picked = pick_best_job(&jobs, "", "no overlap here").expect("fallback job");
        assert_eq!(picked.job_code, "JOB-7");
    }

    #[test]
    fn titlecases_local_part_when_no_other_name_signal() {
        assert_eq!(titlecase_local_part("jane.doe@example.com"), "Jane Doe");
        assert_eq!(titlecase_local_part("john_smith@example.com"), "John Smith");
    }

    #[test]
    fn parses_name_from_body_header() {
        let body = "Hello team,\nName: Priya Patel\nI am applying for the role.";
        assert_eq!(parse_name_from_body(body), Some("Priya Patel".to_owned()));
    }

    #[test]
    fn parses_phone_number_token() {
        assert_eq!(parse_phone_from_body("Call me at 555-123-4567 thanks"), "555-123-4567");
    }

    #[test]
    fn resume_attachment_picked_by_extension() {
        let attachments = vec!["cover_letter.txt".to_owned(), "resume.pdf".to_owned()];
        assert_eq!(pick_resume_attachment(&attachments), Some(&"resume.pdf".to_owned()));
    }
}
