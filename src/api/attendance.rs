use crate::auth::auth::AuthUser;
use crate::auth::permission::{Action, Module};
use crate::config::Config;
use crate::error::ApiError;
use crate::model::attendance::AttendanceRecord;
use crate::service::daily_report::{self, DailyReportRow};
use crate::service::monthly_report::{self, MonthlyReportEntry, MonthlyReportQuery};
use crate::service::punch::{self, PunchRequest};
use crate::service::settings_store::SettingsStore;
use crate::utils::client_ip::client_ip;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DailyReportQuery {
    /// Report day, defaults to today
    #[param(value_type = Option<String>, format = "date", example = "2024-06-10")]
    pub date: Option<NaiveDate>,
}

/// Punch-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/punch-in",
    request_body(
        content = PunchRequest,
        description = "Punch details",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Punched in", body = Object, example = json!({
            "message": "Punched in successfully",
            "data": { "id": 1, "userId": 7, "checkInLocation": "OFFICE", "status": "PRESENT" }
        })),
        (status = 400, description = "Already punched in", body = Object, example = json!({
            "status": 400,
            "message": "Already punched in. Punch out before starting a new session"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Work from home disallowed or IP not on the office allow-list"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn punch_in(
    auth: AuthUser,
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    settings: web::Data<SettingsStore>,
    payload: web::Json<PunchRequest>,
) -> Result<impl Responder, ApiError> {
    auth.require(Module::Attendance, Action::Punch)?;

    let ip = client_ip(&req, config.trust_proxy_headers);
    let policy = settings.attendance_policy().await?;

    let record = punch::punch_in(
        pool.get_ref(),
        &policy,
        auth.user_id,
        &payload,
        &ip,
        Local::now().naive_local(),
    )
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Punched in successfully",
        "data": record
    })))
}

/// Punch-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/punch-out",
    request_body = PunchRequest,
    responses(
        (status = 200, description = "Punched out", body = Object, example = json!({
            "message": "Punched out successfully"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "IP not on the office allow-list"),
        (status = 404, description = "No active check-in", body = Object, example = json!({
            "status": 404,
            "message": "No active check-in found"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn punch_out(
    auth: AuthUser,
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    settings: web::Data<SettingsStore>,
    payload: web::Json<PunchRequest>,
) -> Result<impl Responder, ApiError> {
    auth.require(Module::Attendance, Action::Punch)?;

    let ip = client_ip(&req, config.trust_proxy_headers);
    let policy = settings.attendance_policy().await?;

    let record = punch::punch_out(
        pool.get_ref(),
        &policy,
        auth.user_id,
        &payload,
        &ip,
        Local::now().naive_local(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Punched out successfully",
        "data": record
    })))
}

/// Current open session of the caller
#[utoipa::path(
    get,
    path = "/api/attendance/me/active",
    responses(
        (status = 200, description = "Open session", body = AttendanceRecord),
        (status = 404, description = "Not punched in")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn active_session(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    auth.require(Module::Attendance, Action::Punch)?;

    match punch::active_session(pool.get_ref(), auth.user_id).await? {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Err(ApiError::not_found("No active check-in found")),
    }
}

/// Attendance status of every employee for one day
#[utoipa::path(
    get,
    path = "/api/attendance/report",
    params(DailyReportQuery),
    responses(
        (status = 200, description = "Per-employee daily status", body = Vec<DailyReportRow>),
        (status = 400, description = "Malformed date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn daily_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<DailyReportQuery>,
) -> Result<impl Responder, ApiError> {
    auth.require(Module::Attendance, Action::Read)?;

    let day = query.date.unwrap_or_else(|| Local::now().date_naive());
    let report = daily_report::get_daily_report(pool.get_ref(), day).await?;

    Ok(HttpResponse::Ok().json(report))
}

/// Day-by-day attendance of one employee
#[utoipa::path(
    get,
    path = "/api/attendance/employee-monthly-report",
    params(MonthlyReportQuery),
    responses(
        (status = 200, description = "One entry per day in the range", body = Vec<MonthlyReportEntry>),
        (status = 400, description = "Invalid range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn employee_monthly_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<MonthlyReportQuery>,
) -> Result<impl Responder, ApiError> {
    if query.employee_id != auth.user_id {
        auth.require(Module::Attendance, Action::Read)?;
    }

    monthly_report::validate_range(query.start_date, query.end_date, config.max_report_days)?;

    let report = monthly_report::get_employee_monthly_report(
        pool.get_ref(),
        query.employee_id,
        query.start_date,
        query.end_date,
    )
    .await?;

    Ok(HttpResponse::Ok().json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::tests::issue;
    use crate::models::TokenType;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};

    const SECRET: &str = "s3cret";

    fn test_config() -> Config {
        Config {
            database_url: "mysql://opsdesk@localhost/opsdesk".into(),
            jwt_secret: SECRET.into(),
            server_addr: "127.0.0.1:0".into(),
            api_prefix: "/api".into(),
            rate_protected_per_min: 1000,
            rate_punch_per_min: 30,
            settings_ttl_secs: 60,
            trust_proxy_headers: false,
            max_report_days: 366,
            run_migrations: false,
            log_dir: "logs".into(),
            log_level: tracing::Level::DEBUG,
        }
    }

    // Requests rejected by these checks never reach the database, so a lazy
    // pool with nothing behind it is enough.
    async fn monthly_report_status(query: &str) -> StatusCode {
        let config = test_config();
        let pool = MySqlPool::connect_lazy(&config.database_url).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .app_data(web::Data::new(config))
                .configure(crate::routes::extractor_config)
                .route(
                    "/attendance/employee-monthly-report",
                    web::get().to(employee_monthly_report),
                ),
        )
        .await;

        // token for user 42 with the Employee role
        let token = issue(SECRET, TokenType::Access, 600);
        let req = test::TestRequest::get()
            .uri(&format!("/attendance/employee-monthly-report?{query}"))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();

        test::call_service(&app, req).await.status()
    }

    #[actix_web::test]
    async fn employee_cannot_read_another_employees_report() {
        let status =
            monthly_report_status("employeeId=7&startDate=2024-06-01&endDate=2024-06-30").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn own_report_with_reversed_range_is_rejected() {
        let status =
            monthly_report_status("employeeId=42&startDate=2024-06-30&endDate=2024-06-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn malformed_date_is_a_validation_error() {
        let status =
            monthly_report_status("employeeId=42&startDate=June&endDate=2024-06-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
