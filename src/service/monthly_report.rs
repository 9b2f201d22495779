use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::model::attendance::{AttendanceRecord, RECORD_COLUMNS};
use crate::model::employee::{EMPLOYEE_SELECT, Employee};
use crate::model::holiday::Holiday;
use crate::model::leave_request::{LEAVE_COLUMNS, LeaveRequest};
use crate::service::day_status::{
    AttendanceStatus, DayFacts, classify, to_hours, total_worked_seconds,
};
use crate::utils::dates::{day_bounds, days_inclusive, inclusive_day_count, is_weekend};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MonthlyReportQuery {
    #[schema(example = 7)]
    pub employee_id: u64,
    #[schema(example = "2024-06-01", format = "date", value_type = String)]
    #[param(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2024-06-30", format = "date", value_type = String)]
    #[param(value_type = String, format = "date")]
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReportEntry {
    #[schema(value_type = String, format = "date", example = "2024-06-10")]
    pub date: NaiveDate,
    #[schema(example = "Mon")]
    pub weekday: String,
    pub status: AttendanceStatus,
    pub holiday_name: Option<String>,
    pub leave_request_id: Option<u64>,
    pub records: Vec<AttendanceRecord>,
    pub total_seconds: i64,
    pub total_hours: f64,
}

/// Checks the requested range before anything is loaded.
pub fn validate_range(start: NaiveDate, end: NaiveDate, max_days: i64) -> Result<(), ApiError> {
    if start > end {
        return Err(ApiError::validation("startDate cannot be after endDate"));
    }
    if inclusive_day_count(start, end) > max_days {
        return Err(ApiError::validation(format!(
            "Report range cannot exceed {max_days} days"
        )));
    }
    Ok(())
}

/// One entry per calendar day in `[start, end]`, whatever the data density.
pub fn build_monthly_report(
    employee: &Employee,
    start: NaiveDate,
    end: NaiveDate,
    records: Vec<AttendanceRecord>,
    leaves: &[LeaveRequest],
    holidays: &[Holiday],
) -> Vec<MonthlyReportEntry> {
    let mut by_date: HashMap<NaiveDate, Vec<AttendanceRecord>> = HashMap::new();
    for record in records.into_iter().filter(|r| r.user_id == employee.id) {
        by_date
            .entry(record.check_in_time.date())
            .or_default()
            .push(record);
    }

    days_inclusive(start, end)
        .map(|day| {
            let mut records = by_date.remove(&day).unwrap_or_default();
            records.sort_by_key(|r| (r.check_in_time, r.id));

            let holiday = holidays.iter().find(|h| h.falls_on(day));
            let leave = leaves
                .iter()
                .find(|l| l.user_id == employee.id && l.is_approved() && l.covers(day));

            let status = classify(DayFacts {
                has_records: !records.is_empty(),
                is_holiday: holiday.is_some(),
                on_approved_leave: leave.is_some(),
                is_weekend: is_weekend(day),
                attendance_required: employee.attendance_required(),
            });

            let total_seconds = total_worked_seconds(&records);

            MonthlyReportEntry {
                date: day,
                weekday: day.weekday().to_string(),
                status,
                holiday_name: holiday.map(|h| h.name.clone()),
                leave_request_id: leave.map(|l| l.id),
                total_seconds,
                total_hours: to_hours(total_seconds),
                records,
            }
        })
        .collect()
}

pub async fn get_employee_monthly_report(
    pool: &MySqlPool,
    employee_id: u64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<MonthlyReportEntry>, ApiError> {
    let employee_sql = format!("{EMPLOYEE_SELECT} WHERE u.id = ?");
    let employee = sqlx::query_as::<_, Employee>(&employee_sql)
        .bind(employee_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee not found"))?;

    let (range_start, _) = day_bounds(start);
    let (_, range_end) = day_bounds(end);

    let records_sql = format!(
        r#"
        SELECT {RECORD_COLUMNS}
        FROM attendance_records
        WHERE user_id = ? AND check_in_time >= ? AND check_in_time < ?
        ORDER BY check_in_time, id
        "#
    );
    let leaves_sql = format!(
        r#"
        SELECT {LEAVE_COLUMNS}
        FROM leave_requests
        WHERE user_id = ? AND status = 'APPROVED' AND start_date <= ? AND end_date >= ?
        "#
    );

    let (records, leaves, holidays) = futures::try_join!(
        sqlx::query_as::<_, AttendanceRecord>(&records_sql)
            .bind(employee_id)
            .bind(range_start)
            .bind(range_end)
            .fetch_all(pool),
        sqlx::query_as::<_, LeaveRequest>(&leaves_sql)
            .bind(employee_id)
            .bind(end)
            .bind(start)
            .fetch_all(pool),
        sqlx::query_as::<_, Holiday>(
            r#"
            SELECT id, name, date, is_recurring
            FROM holidays
            WHERE (date >= ? AND date <= ?) OR is_recurring = TRUE
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool),
    )?;

    debug!(
        employee_id,
        %start,
        %end,
        records = records.len(),
        leaves = leaves.len(),
        holidays = holidays.len(),
        "Building monthly report"
    );

    Ok(build_monthly_report(&employee, start, end, records, &leaves, &holidays))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::fixtures::record;
    use crate::model::employee::fixtures::employee;
    use crate::model::leave_request::fixtures::approved_leave;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn holiday(name: &str, date: &str, is_recurring: bool) -> Holiday {
        Holiday {
            id: 1,
            name: name.into(),
            date: d(date),
            is_recurring,
        }
    }

    #[test]
    fn length_matches_inclusive_day_count_with_no_data() {
        let e = employee(7, "Eve");
        let report = build_monthly_report(&e, d("2024-02-01"), d("2024-03-01"), vec![], &[], &[]);
        assert_eq!(report.len(), 30);
        assert_eq!(report.first().unwrap().date, d("2024-02-01"));
        assert_eq!(report.last().unwrap().date, d("2024-03-01"));
    }

    #[test]
    fn weekend_and_present_scenario() {
        let e = employee(7, "Eve");
        let records = vec![record(1, 7, "2024-06-10 09:00", Some("2024-06-10 17:30"))];

        let report = build_monthly_report(&e, d("2024-06-08"), d("2024-06-10"), records, &[], &[]);

        assert_eq!(report[0].date, d("2024-06-08"));
        assert_eq!(report[0].status, AttendanceStatus::Weekend);
        assert_eq!(report[0].weekday, "Sat");
        assert_eq!(report[1].status, AttendanceStatus::Weekend);

        assert_eq!(report[2].status, AttendanceStatus::Present);
        assert_eq!(report[2].total_hours, 8.5);
        assert_eq!(report[2].records.len(), 1);
    }

    #[test]
    fn holiday_leave_and_absence() {
        let e = employee(7, "Eve");
        let holidays = vec![holiday("Midsummer", "2024-06-11", false)];
        let leaves = vec![approved_leave(3, 7, "2024-06-11", "2024-06-12")];

        let report =
            build_monthly_report(&e, d("2024-06-11"), d("2024-06-13"), vec![], &leaves, &holidays);

        assert_eq!(report[0].status, AttendanceStatus::Holiday);
        assert_eq!(report[0].holiday_name.as_deref(), Some("Midsummer"));
        assert_eq!(report[1].status, AttendanceStatus::OnLeave);
        assert_eq!(report[1].leave_request_id, Some(3));
        assert_eq!(report[2].status, AttendanceStatus::Absent);
    }

    #[test]
    fn recurring_holiday_and_opt_out() {
        let mut e = employee(7, "Eve");
        e.attendance_required = Some(false);
        let holidays = vec![holiday("Founders Day", "2001-06-12", true)];

        let report = build_monthly_report(&e, d("2024-06-11"), d("2024-06-12"), vec![], &[], &holidays);
        assert_eq!(report[0].status, AttendanceStatus::NotRequired);
        assert_eq!(report[1].status, AttendanceStatus::Holiday);
    }

    #[test]
    fn other_users_records_and_leaves_are_ignored() {
        let e = employee(7, "Eve");
        let records = vec![record(1, 8, "2024-06-10 09:00", Some("2024-06-10 17:00"))];
        let leaves = vec![approved_leave(3, 8, "2024-06-10", "2024-06-10")];

        let report = build_monthly_report(&e, d("2024-06-10"), d("2024-06-10"), records, &leaves, &[]);
        assert_eq!(report[0].status, AttendanceStatus::Absent);
    }

    #[test]
    fn range_validation() {
        assert!(validate_range(d("2024-06-10"), d("2024-06-01"), 366).is_err());
        assert!(validate_range(d("2024-01-01"), d("2025-12-31"), 366).is_err());
        assert!(validate_range(d("2024-06-01"), d("2024-06-30"), 366).is_ok());
        assert!(validate_range(d("2024-06-01"), d("2024-06-01"), 1).is_ok());
    }
}
