use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub user_id: u64,
    #[schema(example = 2)]
    pub leave_type_id: u64,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    #[schema(example = "PENDING")]
    pub status: String,
    pub approver_id: Option<u64>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl LeaveRequest {
    pub fn is_approved(&self) -> bool {
        self.status.parse::<LeaveStatus>() == Ok(LeaveStatus::Approved)
    }

    /// True when `day` falls inside the inclusive leave range.
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }
}

pub const LEAVE_COLUMNS: &str =
    "id, user_id, leave_type_id, start_date, end_date, reason, status, approver_id, created_at";

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn approved_leave(id: u64, user_id: u64, start: &str, end: &str) -> LeaveRequest {
        LeaveRequest {
            id,
            user_id,
            leave_type_id: 1,
            start_date: start.parse().unwrap(),
            end_date: end.parse().unwrap(),
            reason: None,
            status: LeaveStatus::Approved.to_string(),
            approver_id: Some(1),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::approved_leave;
    use super::*;

    #[test]
    fn covers_is_inclusive_on_both_ends() {
        let leave = approved_leave(1, 3, "2024-06-10", "2024-06-12");
        assert!(leave.covers("2024-06-10".parse().unwrap()));
        assert!(leave.covers("2024-06-12".parse().unwrap()));
        assert!(!leave.covers("2024-06-13".parse().unwrap()));
        assert!(!leave.covers("2024-06-09".parse().unwrap()));
    }

    #[test]
    fn only_approved_status_counts() {
        let mut leave = approved_leave(1, 3, "2024-06-10", "2024-06-12");
        assert!(leave.is_approved());
        leave.status = "PENDING".into();
        assert!(!leave.is_approved());
    }
}
