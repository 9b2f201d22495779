use crate::{
    auth::{
        auth::AuthUser,
        permission::{Action, Module},
    },
    error::ApiError,
    model::holiday::Holiday,
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

const UPDATABLE_COLUMNS: &[&str] = &["name", "date", "is_recurring"];

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HolidayFilter {
    /// Only holidays observed in this year (recurring ones always match)
    #[param(example = 2024)]
    pub year: Option<i32>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHoliday {
    #[schema(example = "New Year")]
    pub name: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[serde(default)]
    pub is_recurring: bool,
}

#[utoipa::path(
    get,
    path = "/api/holidays",
    params(HolidayFilter),
    responses(
        (status = 200, description = "Holidays ordered by date", body = Vec<Holiday>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn list_holidays(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<HolidayFilter>,
) -> Result<impl Responder, ApiError> {
    auth.require(Module::Holiday, Action::Read)?;

    let holidays = match query.year {
        Some(year) => {
            sqlx::query_as::<_, Holiday>(
                r#"
                SELECT id, name, date, is_recurring
                FROM holidays
                WHERE YEAR(date) = ? OR is_recurring = TRUE
                ORDER BY MONTH(date), DAY(date), id
                "#,
            )
            .bind(year)
            .fetch_all(pool.get_ref())
            .await?
        }
        None => {
            sqlx::query_as::<_, Holiday>(
                "SELECT id, name, date, is_recurring FROM holidays ORDER BY date, id",
            )
            .fetch_all(pool.get_ref())
            .await?
        }
    };

    Ok(HttpResponse::Ok().json(holidays))
}

#[utoipa::path(
    post,
    path = "/api/holidays",
    request_body = CreateHoliday,
    responses(
        (status = 201, description = "Holiday created", body = Holiday),
        (status = 400, description = "Bad request"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn create_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateHoliday>,
) -> Result<impl Responder, ApiError> {
    auth.require(Module::Holiday, Action::Create)?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("Holiday name must not be empty"));
    }

    let result = sqlx::query("INSERT INTO holidays (name, date, is_recurring) VALUES (?, ?, ?)")
        .bind(name)
        .bind(payload.date)
        .bind(payload.is_recurring)
        .execute(pool.get_ref())
        .await?;

    let holiday = Holiday {
        id: result.last_insert_id(),
        name: name.to_string(),
        date: payload.date,
        is_recurring: payload.is_recurring,
    };
    info!(holiday_id = holiday.id, date = %holiday.date, "Holiday created");

    Ok(HttpResponse::Created().json(holiday))
}

#[utoipa::path(
    put,
    path = "/api/holidays/{holiday_id}",
    params(("holiday_id" = u64, Path, description = "Holiday ID")),
    request_body(content = Object, description = "Any of: name, date, is_recurring"),
    responses(
        (status = 200, description = "Holiday updated", body = Object, example = json!({
            "message": "Holiday updated"
        })),
        (status = 400, description = "Unknown or invalid field"),
        (status = 404, description = "Holiday not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn update_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> Result<impl Responder, ApiError> {
    auth.require(Module::Holiday, Action::Update)?;

    let holiday_id = path.into_inner();
    let update = build_update_sql("holidays", &body, UPDATABLE_COLUMNS, "id", holiday_id)?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        error!(error = %e, holiday_id, "Failed to update holiday");
        ApiError::from(e)
    })?;

    if affected == 0 {
        return Err(ApiError::not_found("Holiday not found"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Holiday updated"
    })))
}

#[utoipa::path(
    delete,
    path = "/api/holidays/{holiday_id}",
    params(("holiday_id" = u64, Path, description = "Holiday ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Holiday not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn delete_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.require(Module::Holiday, Action::Delete)?;

    let holiday_id = path.into_inner();
    let result = sqlx::query("DELETE FROM holidays WHERE id = ?")
        .bind(holiday_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Holiday not found"));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
