use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::debug;
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, RECORD_COLUMNS};
use crate::model::employee::{EMPLOYEE_SELECT, Employee};
use crate::model::leave_request::{LEAVE_COLUMNS, LeaveRequest};
use crate::service::day_status::{
    AttendanceStatus, DayFacts, classify, to_hours, total_worked_seconds,
};
use crate::utils::dates::day_bounds;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyReportRow {
    pub user_id: u64,
    #[schema(example = "John Doe")]
    pub name: String,
    pub department: Option<String>,
    pub status: AttendanceStatus,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub first_check_in: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub last_check_out: Option<NaiveDateTime>,
    pub records: Vec<AttendanceRecord>,
    #[schema(example = 30600)]
    pub total_seconds: i64,
    #[schema(example = 8.5)]
    pub total_hours: f64,
    pub leave_request_id: Option<u64>,
}

/// One row per employee for `day`.
///
/// `records` are the day's attendance records and `leaves` the approved
/// leaves overlapping the day; anything else passed in is ignored.
pub fn build_daily_report(
    day: NaiveDate,
    employees: &[Employee],
    records: Vec<AttendanceRecord>,
    leaves: &[LeaveRequest],
) -> Vec<DailyReportRow> {
    let mut by_user: HashMap<u64, Vec<AttendanceRecord>> = HashMap::new();
    for record in records {
        if record.check_in_time.date() == day {
            by_user.entry(record.user_id).or_default().push(record);
        }
    }

    employees
        .iter()
        .map(|employee| {
            let mut records = by_user.remove(&employee.id).unwrap_or_default();
            records.sort_by_key(|r| (r.check_in_time, r.id));

            let leave = leaves
                .iter()
                .find(|l| l.user_id == employee.id && l.is_approved() && l.covers(day));

            let status = classify(DayFacts {
                has_records: !records.is_empty(),
                is_holiday: false,
                on_approved_leave: leave.is_some(),
                is_weekend: false,
                attendance_required: employee.attendance_required(),
            });

            let total_seconds = total_worked_seconds(&records);

            DailyReportRow {
                user_id: employee.id,
                name: employee.full_name(),
                department: employee.department.clone(),
                status,
                first_check_in: records.first().map(|r| r.check_in_time),
                last_check_out: records.iter().filter_map(|r| r.check_out_time).max(),
                total_seconds,
                total_hours: to_hours(total_seconds),
                leave_request_id: leave.map(|l| l.id),
                records,
            }
        })
        .collect()
}

pub async fn get_daily_report(
    pool: &MySqlPool,
    day: NaiveDate,
) -> Result<Vec<DailyReportRow>, sqlx::Error> {
    let (start, end) = day_bounds(day);

    let employees_sql = format!(
        "{EMPLOYEE_SELECT} WHERE u.is_active = TRUE ORDER BY u.first_name, u.last_name, u.id"
    );
    let records_sql = format!(
        r#"
        SELECT {RECORD_COLUMNS}
        FROM attendance_records
        WHERE check_in_time >= ? AND check_in_time < ?
        ORDER BY check_in_time, id
        "#
    );
    let leaves_sql = format!(
        r#"
        SELECT {LEAVE_COLUMNS}
        FROM leave_requests
        WHERE status = 'APPROVED' AND start_date <= ? AND end_date >= ?
        "#
    );

    let (employees, records, leaves) = futures::try_join!(
        sqlx::query_as::<_, Employee>(&employees_sql).fetch_all(pool),
        sqlx::query_as::<_, AttendanceRecord>(&records_sql)
            .bind(start)
            .bind(end)
            .fetch_all(pool),
        sqlx::query_as::<_, LeaveRequest>(&leaves_sql)
            .bind(day)
            .bind(day)
            .fetch_all(pool),
    )?;

    debug!(
        %day,
        employees = employees.len(),
        records = records.len(),
        leaves = leaves.len(),
        "Building daily report"
    );

    Ok(build_daily_report(day, &employees, records, &leaves))
}
