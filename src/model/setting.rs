use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Key holding the comma-separated office IP allow-list.
pub const OFFICE_IP_KEY: &str = "office_ip";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Setting {
    #[schema(example = "office_ip")]
    pub key: String,
    #[schema(example = "10.0.0.5, 10.0.0.6")]
    pub value: String,
}
