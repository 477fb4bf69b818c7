//! Document text extraction for uploaded resumes.

use bytes::Bytes;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

/// Decides how to read an upload from its declared content type, then its extension.
pub fn detect_kind(file_name: Option<&str>, content_type: Option<&str>) -> Option<DocumentKind> {
    let content_type = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase());
    match content_type.as_deref() {
        Some("application/pdf") => return Some(DocumentKind::Pdf),
        Some(ct) if ct.starts_with("text/") => return Some(DocumentKind::PlainText),
        _ => {}
    }

    let extension = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdf") => Some(DocumentKind::Pdf),
        Some("txt" | "md" | "text") => Some(DocumentKind::PlainText),
        _ => None,
    }
}

/// Extracts and cleans the text of an uploaded document.
/// PDF parsing is CPU-bound, so it runs on the blocking pool.
pub async fn extract_document_text(
    file_name: Option<&str>,
    content_type: Option<&str>,
    data: Bytes,
) -> Result<String, AppError> {
    let kind = detect_kind(file_name, content_type).ok_or_else(|| {
        AppError::UnsupportedMedia(format!(
            "{} is not a supported resume format; upload a PDF or plain-text file",
            file_name.unwrap_or("upload")
        ))
    })?;

    let raw = match kind {
        DocumentKind::Pdf => tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&data)
        })
        .await
        .map_err(|e| {
            // pdf-extract panics on some malformed inputs
            if e.is_panic() {
                AppError::UnprocessableEntity("Could not read PDF: malformed document".to_string())
            } else {
                AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}"))
            }
        })?
        .map_err(|e| AppError::UnprocessableEntity(format!("Could not read PDF: {e}")))?,
        DocumentKind::PlainText => String::from_utf8_lossy(&data).into_owned(),
    };

    let text = clean_text(&raw);
    if text.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "No extractable text found in the document (scanned images are not supported)"
                .to_string(),
        ));
    }
    Ok(text)
}

/// Collapses horizontal whitespace, trims lines, keeps at most one blank line in a row,
/// and strips control characters left behind by PDF extraction.
pub fn clean_text(raw: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut previous_blank = true;

    for line in raw.lines() {
        let cleaned: String = line
            .chars()
            .map(|c| if c.is_control() && c != '\t' { ' ' } else { c })
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        if cleaned.is_empty() {
            if !previous_blank {
                lines.push(String::new());
            }
            previous_blank = true;
        } else {
            lines.push(cleaned);
            previous_blank = false;
        }
    }

    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines.join("\n")
}
