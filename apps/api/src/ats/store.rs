//! Scan persistence. Every scored report is stored so the frontend can link back to it.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::ats::models::AtsReport;
use crate::models::scan::AtsScanRow;

pub async fn save_scan(pool: &PgPool, report: &AtsReport) -> Result<()> {
    let payload = serde_json::to_value(report).context("serializing ATS report")?;

    sqlx::query(
        r#"
        INSERT INTO ats_scans (id, job_title, score, report)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(report.scan_id)
    .bind(&report.job.title)
    .bind(report.result.score as i32)
    .bind(payload)
    .execute(pool)
    .await
    .context("inserting ATS scan")?;

    Ok(())
}

pub async fn get_scan(pool: &PgPool, scan_id: Uuid) -> Result<Option<AtsScanRow>, sqlx::Error> {
    sqlx::query_as::<_, AtsScanRow>("SELECT * FROM ats_scans WHERE id = $1")
        .bind(scan_id)
        .fetch_optional(pool)
        .await
}
