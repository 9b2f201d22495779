use serde::Serialize;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::attendance::AttendanceRecord;

/// Per-day attendance classification of one employee.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    OnLeave,
    Holiday,
    Weekend,
    NotRequired,
}

/// What is known about one employee on one day.
#[derive(Debug, Default, Copy, Clone)]
pub struct DayFacts {
    pub has_records: bool,
    pub is_holiday: bool,
    pub on_approved_leave: bool,
    pub is_weekend: bool,
    pub attendance_required: bool,
}

/// Precedence: records, holiday, approved leave, weekend, opt-out, absent.
pub fn classify(facts: DayFacts) -> AttendanceStatus {
    if facts.has_records {
        AttendanceStatus::Present
    } else if facts.is_holiday {
        AttendanceStatus::Holiday
    } else if facts.on_approved_leave {
        AttendanceStatus::OnLeave
    } else if facts.is_weekend {
        AttendanceStatus::Weekend
    } else if !facts.attendance_required {
        AttendanceStatus::NotRequired
    } else {
        AttendanceStatus::Absent
    }
}

pub fn total_worked_seconds<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> i64 {
    records.into_iter().map(AttendanceRecord::worked_seconds).sum()
}

/// Seconds as hours, rounded to two decimals.
pub fn to_hours(seconds: i64) -> f64 {
    (seconds as f64 / 36.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::fixtures::record;

    fn required() -> DayFacts {
        DayFacts {
            attendance_required: true,
            ..DayFacts::default()
        }
    }

    #[test]
    fn records_beat_everything() {
        let facts = DayFacts {
            has_records: true,
            is_holiday: true,
            on_approved_leave: true,
            is_weekend: true,
            attendance_required: false,
        };
        assert_eq!(classify(facts), AttendanceStatus::Present);
    }

    #[test]
    fn precedence_order() {
        let holiday_and_leave = DayFacts { is_holiday: true, on_approved_leave: true, ..required() };
        assert_eq!(classify(holiday_and_leave), AttendanceStatus::Holiday);

        let leave_on_weekend = DayFacts { on_approved_leave: true, is_weekend: true, ..required() };
        assert_eq!(classify(leave_on_weekend), AttendanceStatus::OnLeave);

        let weekend_opt_out = DayFacts { is_weekend: true, attendance_required: false, ..DayFacts::default() };
        assert_eq!(classify(weekend_opt_out), AttendanceStatus::Weekend);

        assert_eq!(classify(DayFacts::default()), AttendanceStatus::NotRequired);
        assert_eq!(classify(required()), AttendanceStatus::Absent);
    }

    #[test]
    fn total_duration_is_sum_of_closed_sessions() {
        let records = vec![
            record(1, 7, "2024-06-10 09:00", Some("2024-06-10 12:00")),
            record(2, 7, "2024-06-10 13:00", Some("2024-06-10 17:30")),
            record(3, 7, "2024-06-10 18:00", None),
        ];
        let total = total_worked_seconds(&records);
        assert_eq!(total, 3 * 3600 + 4 * 3600 + 30 * 60);
        assert_eq!(to_hours(total), 7.5);
    }

    #[test]
    fn status_serializes_screaming_snake() {
        assert_eq!(AttendanceStatus::OnLeave.to_string(), "ON_LEAVE");
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::NotRequired).unwrap(),
            "\"NOT_REQUIRED\""
        );
    }
}
