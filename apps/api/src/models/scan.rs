use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AtsScanRow {
    pub id: Uuid,
    pub job_title: String,
    pub score: i32,
    /// Full `AtsReport` as returned by the scoring endpoint.
    pub report: Value,
    pub created_at: DateTime<Utc>,
}
