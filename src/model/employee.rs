use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An active user joined with their (optional) employee profile.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": 1,
        "username": "jdoe",
        "firstName": "John",
        "lastName": "Doe",
        "roleId": 3,
        "department": "Engineering",
        "designation": "Developer",
        "dateOfBirth": "1990-04-12",
        "workOutsideOfficeAllowed": true,
        "attendanceRequired": true
    })
)]
pub struct Employee {
    pub id: u64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role_id: u8,
    pub department: Option<String>,
    pub designation: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    pub date_of_birth: Option<NaiveDate>,
    /// `None` when the user has no profile row yet.
    pub work_outside_office_allowed: Option<bool>,
    pub attendance_required: Option<bool>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Only an explicit `false` on the profile opts out of tracking.
    pub fn attendance_required(&self) -> bool {
        self.attendance_required.unwrap_or(true)
    }
}

/// Query fragment selecting `Employee` rows; callers append WHERE / ORDER.
pub const EMPLOYEE_SELECT: &str = r#"
    SELECT
        u.id, u.username, u.first_name, u.last_name, u.role_id,
        p.department, p.designation, p.date_of_birth,
        p.work_outside_office_allowed, p.attendance_required
    FROM users u
    LEFT JOIN employee_profiles p ON p.user_id = u.id
"#;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeProfile {
    pub user_id: u64,
    pub department: Option<String>,
    pub designation: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    pub date_of_birth: Option<NaiveDate>,
    pub work_outside_office_allowed: bool,
    pub attendance_required: bool,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn employee(id: u64, first_name: &str) -> Employee {
        Employee {
            id,
            username: first_name.to_lowercase(),
            first_name: first_name.into(),
            last_name: "Tester".into(),
            role_id: 3,
            department: None,
            designation: None,
            date_of_birth: None,
            work_outside_office_allowed: None,
            attendance_required: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::employee;

    #[test]
    fn missing_profile_means_attendance_required() {
        let mut e = employee(1, "Ada");
        assert!(e.attendance_required());
        e.attendance_required = Some(false);
        assert!(!e.attendance_required());
    }

    #[test]
    fn full_name_trims_empty_last_name() {
        let mut e = employee(1, "Ada");
        e.last_name = String::new();
        assert_eq!(e.full_name(), "Ada");
    }
}
