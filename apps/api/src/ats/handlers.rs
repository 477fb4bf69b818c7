//! Axum route handlers for the ATS API.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ats::extractor::normalize_resume;
use crate::ats::models::{AtsReport, NormalizedResume, ParsedJobDescription};
use crate::ats::pipeline::{parse_job_cached, score_documents, PipelineDeps};
use crate::ats::store::{get_scan, save_scan};
use crate::ats::text::{clean_text, extract_document_text};
use crate::errors::AppError;
use crate::models::scan::AtsScanRow;
use crate::state::AppState;

const MAX_JD_CHARS: usize = 30_000;
const MAX_RESUME_CHARS: usize = 50_000;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ParseJdRequest {
    pub jd_text: String,
}

#[derive(Debug, Deserialize)]
pub struct NormalizeResumeRequest {
    pub resume_text: String,
}

#[derive(Debug, Deserialize)]
pub struct ScoreTextRequest {
    pub resume_text: String,
    pub jd_text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/ats/parse-jd
///
/// Parses a raw job description. Useful for previewing extraction before scoring.
pub async fn handle_parse_jd(
    State(state): State<AppState>,
    Json(request): Json<ParseJdRequest>,
) -> Result<Json<ParsedJobDescription>, AppError> {
    let jd_text = require_text("jd_text", &request.jd_text, MAX_JD_CHARS)?;
    let parsed = parse_job_cached(&jd_text, state.llm.as_ref(), Some(&state.jd_cache)).await?;
    Ok(Json(parsed))
}

/// POST /api/v1/ats/normalize-resume
pub async fn handle_normalize_resume(
    State(state): State<AppState>,
    Json(request): Json<NormalizeResumeRequest>,
) -> Result<Json<NormalizedResume>, AppError> {
    let resume_text = require_text("resume_text", &request.resume_text, MAX_RESUME_CHARS)?;
    let resume = normalize_resume(&resume_text, state.llm.as_ref()).await?;
    Ok(Json(resume))
}

/// POST /api/v1/ats/score/text
///
/// Scores pasted resume text against a job description.
pub async fn handle_score_text(
    State(state): State<AppState>,
    Json(request): Json<ScoreTextRequest>,
) -> Result<Json<AtsReport>, AppError> {
    let jd_text = require_text("jd_text", &request.jd_text, MAX_JD_CHARS)?;
    let resume_text = require_text("resume_text", &request.resume_text, MAX_RESUME_CHARS)?;

    let report = run_scan(&state, &resume_text, &jd_text).await?;
    Ok(Json(report))
}

/// POST /api/v1/ats/score
///
/// Multipart form: `resume` (PDF or text file) and `jd_text` (text field).
pub async fn handle_score_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AtsReport>, AppError> {
    let mut resume_file: Option<(Option<String>, Option<String>, Bytes)> = None;
    let mut jd_text: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("resume") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;
                resume_file = Some((file_name, content_type, data));
            }
            Some("jd_text") => {
                jd_text = Some(field.text().await.map_err(multipart_error)?);
            }
            other => {
                warn!("Ignoring unexpected multipart field {:?}", other);
            }
        }
    }

    let (file_name, content_type, data) = resume_file
        .ok_or_else(|| AppError::Validation("resume file is required".to_string()))?;
    let jd_text = require_text("jd_text", jd_text.as_deref().unwrap_or_default(), MAX_JD_CHARS)?;

    info!(
        file_name = file_name.as_deref().unwrap_or("<unnamed>"),
        bytes = data.len(),
        "Received resume upload"
    );

    let resume_text =
        extract_document_text(file_name.as_deref(), content_type.as_deref(), data).await?;
    let resume_text = truncate_chars(resume_text, MAX_RESUME_CHARS);

    let report = run_scan(&state, &resume_text, &jd_text).await?;
    Ok(Json(report))
}

/// GET /api/v1/ats/scans/:id
pub async fn handle_get_scan(
    State(state): State<AppState>,
    Path(scan_id): Path<Uuid>,
) -> Result<Json<AtsScanRow>, AppError> {
    let scan = get_scan(&state.db, scan_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Scan {scan_id} not found")))?;
    Ok(Json(scan))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn run_scan(state: &AppState, resume_text: &str, jd_text: &str) -> Result<AtsReport, AppError> {
    let deps = PipelineDeps {
        llm: state.llm.as_ref(),
        matcher: state.matcher.as_ref(),
        jd_cache: Some(&state.jd_cache),
    };
    let report = score_documents(resume_text, jd_text, &deps).await?;

    // A scan that scored but failed to persist is still returned to the user.
    if let Err(e) = save_scan(&state.db, &report).await {
        warn!(scan_id = %report.scan_id, "Failed to store ATS scan: {e:#}");
    }
    Ok(report)
}

/// Cleans a text field and enforces that it is present and bounded.
fn require_text(field: &str, raw: &str, max_chars: usize) -> Result<String, AppError> {
    let text = clean_text(raw);
    if text.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    let chars = text.chars().count();
    if chars > max_chars {
        return Err(AppError::PayloadTooLarge(format!(
            "{field} is {chars} characters; the limit is {max_chars}"
        )));
    }
    Ok(text)
}

/// Long PDFs are cut rather than rejected; the first pages carry the signal.
fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text,
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}
