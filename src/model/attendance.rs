use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Where a punch was made from.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum WorkLocation {
    Office,
    Home,
}

/// Status stored on an attendance record.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum RecordStatus {
    Present,
    Late,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: u64,
    pub user_id: u64,
    #[schema(value_type = String, format = "date", example = "2024-06-10")]
    pub date: NaiveDate,
    #[schema(value_type = String, format = "date-time", example = "2024-06-10T09:00:00")]
    pub check_in_time: NaiveDateTime,
    #[schema(example = "OFFICE")]
    pub check_in_location: String,
    #[schema(example = "10.0.0.5")]
    pub check_in_ip: String,
    pub check_in_project_id: Option<u64>,
    pub check_in_task: Option<String>,
    pub check_in_notes: Option<String>,
    #[schema(value_type = Option<String>, format = "date-time", example = "2024-06-10T17:30:00")]
    pub check_out_time: Option<NaiveDateTime>,
    pub check_out_location: Option<String>,
    pub check_out_ip: Option<String>,
    pub check_out_project_id: Option<u64>,
    pub check_out_task: Option<String>,
    pub check_out_notes: Option<String>,
    #[schema(example = "PRESENT")]
    pub status: String,
}

impl AttendanceRecord {
    pub fn is_open(&self) -> bool {
        self.check_out_time.is_none()
    }

    /// Worked seconds for a closed session, 0 while the session is open.
    pub fn worked_seconds(&self) -> i64 {
        self.check_out_time
            .map(|out| (out - self.check_in_time).num_seconds().max(0))
            .unwrap_or(0)
    }
}

/// Columns selected for every `AttendanceRecord` query.
pub const RECORD_COLUMNS: &str = r#"
    id, user_id, date, check_in_time, check_in_location, check_in_ip,
    check_in_project_id, check_in_task, check_in_notes,
    check_out_time, check_out_location, check_out_ip,
    check_out_project_id, check_out_task, check_out_notes, status
"#;

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn record(id: u64, user_id: u64, check_in: &str, check_out: Option<&str>) -> AttendanceRecord {
        let parse = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
        let check_in_time = parse(check_in);
        AttendanceRecord {
            id,
            user_id,
            date: check_in_time.date(),
            check_in_time,
            check_in_location: "OFFICE".into(),
            check_in_ip: "10.0.0.5".into(),
            check_in_project_id: None,
            check_in_task: None,
            check_in_notes: None,
            check_out_time: check_out.map(parse),
            check_out_location: check_out.map(|_| "OFFICE".into()),
            check_out_ip: None,
            check_out_project_id: None,
            check_out_task: None,
            check_out_notes: None,
            status: "PRESENT".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::record;
    use super::*;

    #[test]
    fn worked_seconds_of_closed_session() {
        let r = record(1, 7, "2024-06-10 09:00", Some("2024-06-10 17:30"));
        assert_eq!(r.worked_seconds(), 8 * 3600 + 30 * 60);
        assert!(!r.is_open());
    }

    #[test]
    fn open_session_counts_as_zero() {
        let r = record(1, 7, "2024-06-10 09:00", None);
        assert_eq!(r.worked_seconds(), 0);
        assert!(r.is_open());
    }

    #[test]
    fn location_parses_case_insensitively() {
        assert_eq!("home".parse::<WorkLocation>().unwrap(), WorkLocation::Home);
        assert_eq!(WorkLocation::Office.to_string(), "OFFICE");
        assert!("moon".parse::<WorkLocation>().is_err());
    }
}
