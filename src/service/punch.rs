use actix_web::http::StatusCode;
use chrono::NaiveDateTime;
use derive_more::Display;
use serde::Deserialize;
use sqlx::{MySqlConnection, MySqlPool};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::model::attendance::{AttendanceRecord, RECORD_COLUMNS, RecordStatus, WorkLocation};
use crate::service::settings_store::AttendancePolicy;
use crate::utils::db_utils::is_duplicate_key;

/// Business-rule violations of a punch attempt.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq)]
pub enum PunchError {
    #[display(fmt = "Already punched in. Punch out before starting a new session")]
    AlreadyPunchedIn,
    #[display(fmt = "Work from home is not allowed for this employee")]
    WorkFromHomeDisallowed,
    #[display(fmt = "Invalid location: office punches must come from the office network")]
    InvalidLocation,
    #[display(fmt = "No active check-in found")]
    NoActiveCheckIn,
}

impl PunchError {
    pub fn status(&self) -> StatusCode {
        match self {
            PunchError::AlreadyPunchedIn => StatusCode::BAD_REQUEST,
            PunchError::WorkFromHomeDisallowed | PunchError::InvalidLocation => {
                StatusCode::FORBIDDEN
            }
            PunchError::NoActiveCheckIn => StatusCode::NOT_FOUND,
        }
    }
}

impl From<PunchError> for ApiError {
    fn from(e: PunchError) -> Self {
        ApiError::Application {
            status: e.status(),
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PunchRequest {
    #[schema(example = "OFFICE")]
    pub location: WorkLocation,
    #[schema(example = 12)]
    pub project_id: Option<u64>,
    #[schema(example = "Code review")]
    pub task: Option<String>,
    pub notes: Option<String>,
}

fn check_office_ip(
    policy: &AttendancePolicy,
    location: WorkLocation,
    ip: &str,
) -> Result<(), PunchError> {
    if location == WorkLocation::Office && !policy.allows_office_ip(ip) {
        return Err(PunchError::InvalidLocation);
    }
    Ok(())
}

/// `work_outside_office_allowed` is `None` when the user has no profile.
pub fn validate_punch_in(
    open_session: Option<&AttendanceRecord>,
    work_outside_office_allowed: Option<bool>,
    policy: &AttendancePolicy,
    location: WorkLocation,
    ip: &str,
) -> Result<(), PunchError> {
    if open_session.is_some() {
        return Err(PunchError::AlreadyPunchedIn);
    }

    if location == WorkLocation::Home && work_outside_office_allowed == Some(false) {
        return Err(PunchError::WorkFromHomeDisallowed);
    }

    check_office_ip(policy, location, ip)
}

pub fn validate_punch_out(
    open_session: Option<AttendanceRecord>,
    policy: &AttendancePolicy,
    location: WorkLocation,
    ip: &str,
) -> Result<AttendanceRecord, PunchError> {
    let record = open_session.ok_or(PunchError::NoActiveCheckIn)?;
    check_office_ip(policy, location, ip)?;
    Ok(record)
}

/// Unique key that allows a single open session per user.
const OPEN_SESSION_KEY: &str = "uq_attendance_open_session";

/// Most recent open session of the user, row-locked for the rest of the
/// surrounding transaction.
async fn find_open_record_for_update(
    conn: &mut MySqlConnection,
    user_id: u64,
) -> Result<Option<AttendanceRecord>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {RECORD_COLUMNS}
        FROM attendance_records
        WHERE user_id = ? AND check_out_time IS NULL
        ORDER BY check_in_time DESC, id DESC
        LIMIT 1
        FOR UPDATE
        "#
    );

    sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
}

async fn fetch_record(conn: &mut MySqlConnection, id: u64) -> Result<AttendanceRecord, sqlx::Error> {
    let sql = format!("SELECT {RECORD_COLUMNS} FROM attendance_records WHERE id = ?");

    sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await
}

pub async fn active_session(
    pool: &MySqlPool,
    user_id: u64,
) -> Result<Option<AttendanceRecord>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {RECORD_COLUMNS}
        FROM attendance_records
        WHERE user_id = ? AND check_out_time IS NULL
        ORDER BY check_in_time DESC, id DESC
        LIMIT 1
        "#
    );

    sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn punch_in(
    pool: &MySqlPool,
    policy: &AttendancePolicy,
    user_id: u64,
    req: &PunchRequest,
    ip: &str,
    now: NaiveDateTime,
) -> Result<AttendanceRecord, ApiError> {
    let mut tx = pool.begin().await?;

    let open = find_open_record_for_update(&mut tx, user_id).await?;

    let work_outside_office_allowed = sqlx::query_scalar::<_, bool>(
        "SELECT work_outside_office_allowed FROM employee_profiles WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    if let Err(e) = validate_punch_in(
        open.as_ref(),
        work_outside_office_allowed,
        policy,
        req.location,
        ip,
    ) {
        warn!(user_id, ip, location = %req.location, reason = %e, "Punch-in rejected");
        return Err(e.into());
    }

    let result = sqlx::query(
        r#"
        INSERT INTO attendance_records
            (user_id, date, check_in_time, check_in_location, check_in_ip,
             check_in_project_id, check_in_task, check_in_notes, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(now.date())
    .bind(now)
    .bind(req.location.to_string())
    .bind(ip)
    .bind(req.project_id)
    .bind(req.task.as_deref())
    .bind(req.notes.as_deref())
    .bind(RecordStatus::Present.to_string())
    .execute(&mut *tx)
    .await;

    let id = match result {
        Ok(r) => r.last_insert_id(),
        // a concurrent punch-in won the open-session unique key
        Err(e) if is_duplicate_key(&e, OPEN_SESSION_KEY) => {
            warn!(user_id, "Concurrent punch-in rejected by open-session constraint");
            return Err(PunchError::AlreadyPunchedIn.into());
        }
        Err(e) => return Err(e.into()),
    };

    let record = fetch_record(&mut tx, id).await?;
    tx.commit().await?;

    info!(user_id, record_id = id, location = %req.location, "Punched in");
    Ok(record)
}

pub async fn punch_out(
    pool: &MySqlPool,
    policy: &AttendancePolicy,
    user_id: u64,
    req: &PunchRequest,
    ip: &str,
    now: NaiveDateTime,
) -> Result<AttendanceRecord, ApiError> {
    let mut tx = pool.begin().await?;

    let open = find_open_record_for_update(&mut tx, user_id).await?;
    let record = validate_punch_out(open, policy, req.location, ip).map_err(|e| {
        warn!(user_id, ip, location = %req.location, reason = %e, "Punch-out rejected");
        ApiError::from(e)
    })?;

    sqlx::query(
        r#"
        UPDATE attendance_records
        SET check_out_time = ?,
            check_out_location = ?,
            check_out_ip = ?,
            check_out_project_id = ?,
            check_out_task = ?,
            check_out_notes = ?
        WHERE id = ?
        "#,
    )
    .bind(now.max(record.check_in_time))
    .bind(req.location.to_string())
    .bind(ip)
    .bind(req.project_id)
    .bind(req.task.as_deref())
    .bind(req.notes.as_deref())
    .bind(record.id)
    .execute(&mut *tx)
    .await?;

    let updated = fetch_record(&mut tx, record.id).await?;
    tx.commit().await?;

    info!(
        user_id,
        record_id = record.id,
        worked_seconds = updated.worked_seconds(),
        "Punched out"
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::fixtures::record;

    fn open_policy() -> AttendancePolicy {
        AttendancePolicy::default()
    }

    fn office_policy() -> AttendancePolicy {
        AttendancePolicy::from_office_ip_setting(Some("10.0.0.5, 10.0.0.6"))
    }

    #[test]
    fn second_punch_in_without_punch_out_fails() {
        let open = record(1, 7, "2024-06-10 09:00", None);
        let err = validate_punch_in(Some(&open), None, &open_policy(), WorkLocation::Office, "1.2.3.4")
            .unwrap_err();
        assert_eq!(err, PunchError::AlreadyPunchedIn);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn already_punched_in_wins_over_other_violations() {
        let open = record(1, 7, "2024-06-10 09:00", None);
        let err = validate_punch_in(Some(&open), Some(false), &office_policy(), WorkLocation::Home, "x")
            .unwrap_err();
        assert_eq!(err, PunchError::AlreadyPunchedIn);
    }

    #[test]
    fn home_punch_respects_profile() {
        let policy = office_policy();
        assert_eq!(
            validate_punch_in(None, Some(false), &policy, WorkLocation::Home, "203.0.113.1"),
            Err(PunchError::WorkFromHomeDisallowed)
        );
        // no profile, or an explicit allowance, lets the punch through from anywhere
        assert!(validate_punch_in(None, None, &policy, WorkLocation::Home, "203.0.113.1").is_ok());
        assert!(validate_punch_in(None, Some(true), &policy, WorkLocation::Home, "203.0.113.1").is_ok());
    }

    #[test]
    fn office_punch_checks_allow_list() {
        let policy = office_policy();
        let err = validate_punch_in(None, None, &policy, WorkLocation::Office, "10.0.0.7").unwrap_err();
        assert_eq!(err, PunchError::InvalidLocation);
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        assert!(validate_punch_in(None, None, &policy, WorkLocation::Office, "10.0.0.6").is_ok());
    }

    #[test]
    fn empty_allow_list_accepts_any_office_ip() {
        assert!(validate_punch_in(None, None, &open_policy(), WorkLocation::Office, "198.51.100.4").is_ok());
    }

    #[test]
    fn punch_out_requires_open_session() {
        let err = validate_punch_out(None, &open_policy(), WorkLocation::Office, "10.0.0.5").unwrap_err();
        assert_eq!(err, PunchError::NoActiveCheckIn);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn punch_out_applies_office_ip_rule() {
        let open = record(3, 7, "2024-06-10 09:00", None);
        assert_eq!(
            validate_punch_out(Some(open.clone()), &office_policy(), WorkLocation::Office, "10.0.0.7"),
            Err(PunchError::InvalidLocation)
        );

        let found = validate_punch_out(Some(open), &office_policy(), WorkLocation::Office, "10.0.0.5")
            .unwrap();
        assert_eq!(found.id, 3);

        let home = record(4, 7, "2024-06-10 09:00", None);
        assert!(validate_punch_out(Some(home), &office_policy(), WorkLocation::Home, "10.0.0.7").is_ok());
    }

    #[test]
    fn punch_error_converts_to_api_error() {
        let api: ApiError = PunchError::InvalidLocation.into();
        match api {
            ApiError::Application { status, message } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert!(message.starts_with("Invalid location"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
