use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Award {
    pub id: u64,
    pub user_id: u64,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "Employee of the Month")]
    pub title: String,
    #[schema(example = "2026-01-31", format = "date", value_type = String)]
    pub awarded_on: NaiveDate,
}
