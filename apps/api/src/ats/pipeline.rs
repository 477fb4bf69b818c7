//! End-to-end scan: extract → normalize → compare skills → match responsibilities → score.

use tracing::info;
use uuid::Uuid;

use crate::ats::cache::JdCache;
use crate::ats::education::assess_education;
use crate::ats::extractor::{normalize_resume, parse_job_description};
use crate::ats::models::{AtsReport, ParsedJobDescription};
use crate::ats::responsibilities::ResponsibilityMatcher;
use crate::ats::scoring::{compute_score, ScoreInputs};
use crate::ats::skills::compare_skills;
use crate::errors::AppError;
use crate::llm_client::LlmBackend;

/// Collaborators borrowed from `AppState` for one scan.
pub struct PipelineDeps<'a> {
    pub llm: &'a dyn LlmBackend,
    pub matcher: &'a dyn ResponsibilityMatcher,
    pub jd_cache: Option<&'a JdCache>,
}

/// Parses a JD, consulting the cache first when one is configured.
pub async fn parse_job_cached(
    jd_text: &str,
    llm: &dyn LlmBackend,
    jd_cache: Option<&JdCache>,
) -> Result<ParsedJobDescription, AppError> {
    let cached = match jd_cache {
        Some(cache) => cache.get(jd_text).await,
        None => None,
    };
    if let Some(parsed) = cached {
        return Ok(parsed);
    }

    let parsed = parse_job_description(jd_text, llm).await?;
    if let Some(cache) = jd_cache {
        cache.put(jd_text, &parsed).await;
    }
    Ok(parsed)
}

pub async fn score_documents(
    resume_text: &str,
    jd_text: &str,
    deps: &PipelineDeps<'_>,
) -> Result<AtsReport, AppError> {
    let scan_id = Uuid::new_v4();
    info!(
        %scan_id,
        resume_chars = resume_text.len(),
        jd_chars = jd_text.len(),
        "Starting ATS scan"
    );

    // The two extraction calls are independent.
    let (job, resume) = tokio::try_join!(
        parse_job_cached(jd_text, deps.llm, deps.jd_cache),
        normalize_resume(resume_text, deps.llm),
    )?;

    let skill_comparison = compare_skills(&job, &resume, resume_text);

    let responsibility_matches = deps
        .matcher
        .match_responsibilities(&job.responsibilities, &resume, resume_text)
        .await?;

    let education = assess_education(&job.education, &resume.education);

    let result = compute_score(&ScoreInputs {
        skills: &skill_comparison,
        responsibilities: &responsibility_matches,
        education: &education,
        min_years_experience: job.min_years_experience,
        resume_years_experience: resume.total_years_experience,
    });

    info!(
        %scan_id,
        score = result.score,
        deductions = result.deductions.len(),
        matcher = deps.matcher.backend(),
        "ATS scan complete"
    );

    Ok(AtsReport {
        scan_id,
        job,
        resume,
        result,
    })
}
