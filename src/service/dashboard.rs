use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::debug;
use utoipa::ToSchema;

use crate::model::activity_log::ActivityLog;
use crate::model::attendance::{AttendanceRecord, RecordStatus};
use crate::model::award::Award;
use crate::model::holiday::Holiday;
use crate::model::leave_request::{LEAVE_COLUMNS, LeaveRequest};
use crate::model::role::Role;
use crate::utils::dates::{day_bounds, next_anniversary};

/// Days ahead covered by the upcoming-events list.
pub const UPCOMING_WINDOW_DAYS: i64 = 30;
pub const NO_TASK_LABEL: &str = "No task specified";

/// A record from today joined with its owner's name.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TodayRecord {
    #[sqlx(flatten)]
    pub record: AttendanceRecord,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BirthdayRow {
    pub user_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
}

/// Everything the dashboard reads, fetched concurrently.
#[derive(Debug, Default)]
pub struct DashboardSnapshot {
    pub active_projects: i64,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub pending_tasks: i64,
    pub team_members: i64,
    pub recent_activities: Vec<ActivityLog>,
    pub today_records: Vec<TodayRecord>,
    pub active_leaves: Vec<LeaveRequest>,
    pub total_employees: i64,
    pub holidays: Vec<Holiday>,
    pub birthdays: Vec<BirthdayRow>,
    pub recent_awards: Vec<Award>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
}

#[derive(Debug, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationBreakdown {
    pub office: usize,
    /// HOME or REMOTE punches.
    pub remote: usize,
    pub other: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEmployee {
    pub user_id: u64,
    pub name: String,
    #[schema(value_type = String, format = "date-time")]
    pub check_in_time: NaiveDateTime,
    pub location: String,
    pub task: String,
    pub project_id: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub total_employees: i64,
    pub present: usize,
    pub late: usize,
    pub on_leave: usize,
    pub absent: i64,
    pub work_location: LocationBreakdown,
    pub currently_active: Vec<ActiveEmployee>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    Holiday,
    Birthday,
}

#[derive(Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingEvent {
    pub kind: EventKind,
    #[schema(example = "New Year")]
    pub title: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub days_until: i64,
    pub user_id: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub active_projects: i64,
    pub tasks: TaskStats,
    pub team_members: i64,
    pub attendance: AttendanceSummary,
    pub upcoming_events: Vec<UpcomingEvent>,
    pub recent_activities: Vec<ActivityLog>,
    pub recent_awards: Vec<Award>,
}

/// Holidays and birthdays in `[today, today + 30 days]`, earliest first.
pub fn upcoming_events(
    today: NaiveDate,
    holidays: &[Holiday],
    birthdays: &[BirthdayRow],
) -> Vec<UpcomingEvent> {
    let horizon = today + Duration::days(UPCOMING_WINDOW_DAYS);

    let holiday_events = holidays.iter().filter_map(|h| {
        let date = h.next_occurrence(today)?;
        Some(UpcomingEvent {
            kind: EventKind::Holiday,
            title: h.name.clone(),
            date,
            days_until: (date - today).num_days(),
            user_id: None,
        })
    });

    let birthday_events = birthdays.iter().map(|b| {
        let date = next_anniversary(b.date_of_birth, today);
        UpcomingEvent {
            kind: EventKind::Birthday,
            title: format!("{} {}'s birthday", b.first_name, b.last_name),
            date,
            days_until: (date - today).num_days(),
            user_id: Some(b.user_id),
        }
    });

    let mut events: Vec<_> = holiday_events
        .chain(birthday_events)
        .filter(|e| e.date <= horizon)
        .collect();

    events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.title.cmp(&b.title)));
    events
}

/// Latest record per user, by check-in time then id; input order is irrelevant.
pub fn latest_per_user(records: &[TodayRecord]) -> HashMap<u64, &TodayRecord> {
    let mut latest: HashMap<u64, &TodayRecord> = HashMap::new();
    for row in records {
        let key = (row.record.check_in_time, row.record.id);
        latest
            .entry(row.record.user_id)
            .and_modify(|current| {
                if key > (current.record.check_in_time, current.record.id) {
                    *current = row;
                }
            })
            .or_insert(row);
    }
    latest
}

pub fn location_breakdown<'a>(latest: impl IntoIterator<Item = &'a TodayRecord>) -> LocationBreakdown {
    let mut breakdown = LocationBreakdown::default();
    for row in latest {
        match row.record.check_in_location.to_ascii_uppercase().as_str() {
            "OFFICE" => breakdown.office += 1,
            "HOME" | "REMOTE" => breakdown.remote += 1,
            _ => breakdown.other += 1,
        }
    }
    breakdown
}

/// `total − |present ∪ on_leave|`, never negative.
pub fn absent_count(total_employees: i64, present: &HashSet<u64>, on_leave: &HashSet<u64>) -> i64 {
    let accounted = present.union(on_leave).count() as i64;
    (total_employees - accounted).max(0)
}

pub fn summarize(snapshot: DashboardSnapshot, today: NaiveDate) -> DashboardStats {
    let present: HashSet<u64> = snapshot
        .today_records
        .iter()
        .map(|r| r.record.user_id)
        .collect();

    let late: HashSet<u64> = snapshot
        .today_records
        .iter()
        .filter(|r| r.record.status.parse::<RecordStatus>() == Ok(RecordStatus::Late))
        .map(|r| r.record.user_id)
        .collect();

    let on_leave: HashSet<u64> = snapshot
        .active_leaves
        .iter()
        .filter(|l| l.is_approved() && l.covers(today))
        .map(|l| l.user_id)
        .collect();

    let latest = latest_per_user(&snapshot.today_records);
    let work_location = location_breakdown(latest.values().copied());

    let mut currently_active: Vec<ActiveEmployee> = latest
        .values()
        .filter(|row| row.record.is_open())
        .map(|row| ActiveEmployee {
            user_id: row.record.user_id,
            name: format!("{} {}", row.first_name, row.last_name).trim().to_string(),
            check_in_time: row.record.check_in_time,
            location: row.record.check_in_location.clone(),
            task: row
                .record
                .check_in_task
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| NO_TASK_LABEL.to_string()),
            project_id: row.record.check_in_project_id,
        })
        .collect();
    currently_active.sort_by_key(|a| (a.check_in_time, a.user_id));

    let attendance = AttendanceSummary {
        total_employees: snapshot.total_employees,
        present: present.len(),
        late: late.len(),
        on_leave: on_leave.len(),
        absent: absent_count(snapshot.total_employees, &present, &on_leave),
        work_location,
        currently_active,
    };

    DashboardStats {
        active_projects: snapshot.active_projects,
        tasks: TaskStats {
            total: snapshot.total_tasks,
            completed: snapshot.completed_tasks,
            pending: snapshot.pending_tasks,
        },
        team_members: snapshot.team_members,
        attendance,
        upcoming_events: upcoming_events(today, &snapshot.holidays, &snapshot.birthdays),
        recent_activities: snapshot.recent_activities,
        recent_awards: snapshot.recent_awards,
    }
}

/// Today's records of active users; `total_employees` counts the same set.
const TODAY_RECORDS_SQL: &str = r#"
    SELECT
        a.id, a.user_id, a.date, a.check_in_time, a.check_in_location, a.check_in_ip,
        a.check_in_project_id, a.check_in_task, a.check_in_notes,
        a.check_out_time, a.check_out_location, a.check_out_ip,
        a.check_out_project_id, a.check_out_task, a.check_out_notes, a.status,
        u.first_name, u.last_name
    FROM attendance_records a
    JOIN users u ON u.id = a.user_id
    WHERE u.is_active = TRUE
      AND a.check_in_time >= ? AND a.check_in_time < ?
    ORDER BY a.check_in_time, a.id
"#;

const ACTIVE_EMPLOYEES_SQL: &str = "SELECT COUNT(*) FROM users WHERE is_active = TRUE";

fn count(sql: &str) -> sqlx::query::QueryScalar<'_, sqlx::MySql, i64, sqlx::mysql::MySqlArguments> {
    sqlx::query_scalar::<_, i64>(sql)
}

pub async fn load_snapshot(
    pool: &MySqlPool,
    today: NaiveDate,
) -> Result<DashboardSnapshot, sqlx::Error> {
    let (start, end) = day_bounds(today);
    let horizon = today + Duration::days(UPCOMING_WINDOW_DAYS);
    let leaves_sql = format!(
        r#"
        SELECT {LEAVE_COLUMNS}
        FROM leave_requests
        WHERE status = 'APPROVED' AND start_date <= ? AND end_date >= ?
        "#
    );

    let (
        active_projects,
        total_tasks,
        completed_tasks,
        pending_tasks,
        team_members,
        recent_activities,
        today_records,
        active_leaves,
        total_employees,
        holidays,
        birthdays,
        recent_awards,
    ) = futures::try_join!(
        count("SELECT COUNT(*) FROM projects WHERE status = 'ACTIVE'").fetch_one(pool),
        count("SELECT COUNT(*) FROM tasks").fetch_one(pool),
        count("SELECT COUNT(*) FROM tasks WHERE status = 'COMPLETED'").fetch_one(pool),
        count("SELECT COUNT(*) FROM tasks WHERE status = 'PENDING'").fetch_one(pool),
        count("SELECT COUNT(*) FROM users WHERE is_active = TRUE AND role_id = ?")
            .bind(Role::Employee as u8)
            .fetch_one(pool),
        sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT id, request_id, user_id, method, path, status_code, ip, created_at
            FROM activity_logs
            ORDER BY created_at DESC, id DESC
            LIMIT 10
            "#,
        )
        .fetch_all(pool),
        sqlx::query_as::<_, TodayRecord>(TODAY_RECORDS_SQL)
        .bind(start)
        .bind(end)
        .fetch_all(pool),
        sqlx::query_as::<_, LeaveRequest>(&leaves_sql)
            .bind(today)
            .bind(today)
            .fetch_all(pool),
        count(ACTIVE_EMPLOYEES_SQL).fetch_one(pool),
        sqlx::query_as::<_, Holiday>(
            r#"
            SELECT id, name, date, is_recurring
            FROM holidays
            WHERE (date >= ? AND date <= ?) OR is_recurring = TRUE
            "#,
        )
        .bind(today)
        .bind(horizon)
        .fetch_all(pool),
        sqlx::query_as::<_, BirthdayRow>(
            r#"
            SELECT u.id AS user_id, u.first_name, u.last_name, p.date_of_birth
            FROM users u
            JOIN employee_profiles p ON p.user_id = u.id
            WHERE u.is_active = TRUE AND p.date_of_birth IS NOT NULL
            "#,
        )
        .fetch_all(pool),
        sqlx::query_as::<_, Award>(
            r#"
            SELECT a.id, a.user_id, u.first_name, u.last_name, a.title, a.awarded_on
            FROM awards a
            JOIN users u ON u.id = a.user_id
            ORDER BY a.awarded_on DESC, a.id DESC
            LIMIT 5
            "#,
        )
        .fetch_all(pool),
    )?;

    debug!(
        %today,
        today_records = today_records.len(),
        active_leaves = active_leaves.len(),
        "Dashboard snapshot loaded"
    );

    Ok(DashboardSnapshot {
        active_projects,
        total_tasks,
        completed_tasks,
        pending_tasks,
        team_members,
        recent_activities,
        today_records,
        active_leaves,
        total_employees,
        holidays,
        birthdays,
        recent_awards,
    })
}

pub async fn get_dashboard_stats(
    pool: &MySqlPool,
    today: NaiveDate,
) -> Result<DashboardStats, sqlx::Error> {
    let snapshot = load_snapshot(pool, today).await?;
    Ok(summarize(snapshot, today))
}
