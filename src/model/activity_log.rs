use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: u64,
    #[schema(example = "5f8c3a0e-8d5e-4c1f-9f3e-0b6c1e2a7d41")]
    pub request_id: String,
    pub user_id: Option<u64>,
    #[schema(example = "POST")]
    pub method: String,
    #[schema(example = "/api/attendance/punch-in")]
    pub path: String,
    #[schema(example = 201)]
    pub status_code: u16,
    pub ip: Option<String>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}
