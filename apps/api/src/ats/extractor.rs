//! LLM extraction: turns raw JD and resume text into validated records.

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::ats::experience::{years_from_entries, years_required_from_text};
use crate::ats::models::{NormalizedResume, ParsedJobDescription};
use crate::ats::prompts::{
    JD_PARSE_PROMPT_TEMPLATE, JD_PARSE_ROLE, RESUME_NORMALIZE_PROMPT_TEMPLATE,
    RESUME_NORMALIZE_ROLE,
};
use crate::errors::AppError;
use crate::llm_client::prompts::{json_system, NO_INVENTION_INSTRUCTION};
use crate::llm_client::{complete_validated, LlmBackend, LlmError};

/// Schema failures mean the document itself had nothing usable; anything else is upstream.
pub fn llm_failure(stage: &str, error: LlmError) -> AppError {
    match error {
        LlmError::Schema(msg) => AppError::UnprocessableEntity(format!("{stage}: {msg}")),
        other => AppError::Llm(format!("{stage} failed: {other}")),
    }
}

/// Parses a job description using the LLM and returns a validated `ParsedJobDescription`.
pub async fn parse_job_description(
    jd_text: &str,
    llm: &dyn LlmBackend,
) -> Result<ParsedJobDescription, AppError> {
    let prompt = JD_PARSE_PROMPT_TEMPLATE
        .replace("{no_invention}", NO_INVENTION_INSTRUCTION)
        .replace("{jd_text}", jd_text);

    let mut parsed: ParsedJobDescription =
        complete_validated(llm, &prompt, &json_system(JD_PARSE_ROLE))
            .await
            .map_err(|e| llm_failure("Job description parsing", e))?;

    if parsed.min_years_experience.is_none() {
        parsed.min_years_experience = years_required_from_text(jd_text);
    }

    debug!(
        title = %parsed.title,
        required = parsed.required_skills.len(),
        preferred = parsed.preferred_skills.len(),
        responsibilities = parsed.responsibilities.len(),
        "Parsed job description"
    );
    Ok(parsed)
}

/// Normalizes a resume using the LLM and returns a validated `NormalizedResume`.
pub async fn normalize_resume(
    resume_text: &str,
    llm: &dyn LlmBackend,
) -> Result<NormalizedResume, AppError> {
    let prompt = RESUME_NORMALIZE_PROMPT_TEMPLATE
        .replace("{no_invention}", NO_INVENTION_INSTRUCTION)
        .replace("{resume_text}", resume_text);

    let resume: NormalizedResume =
        complete_validated(llm, &prompt, &json_system(RESUME_NORMALIZE_ROLE))
            .await
            .map_err(|e| llm_failure("Resume normalization", e))?;

    let resume = fill_experience_years(resume, Utc::now().date_naive());

    debug!(
        skills = resume.skills.len(),
        experience = resume.experience.len(),
        education = resume.education.len(),
        years = resume.total_years_experience,
        "Normalized resume"
    );
    Ok(resume)
}

/// Replaces a zero year count with one derived from the entry dates.
fn fill_experience_years(mut resume: NormalizedResume, today: NaiveDate) -> NormalizedResume {
    if resume.total_years_experience == 0.0 && !resume.experience.is_empty() {
        resume.total_years_experience = years_from_entries(&resume.experience, today);
    }
    resume
}
