use crate::auth::auth::AuthUser;
use crate::auth::permission::{Action, Module};
use crate::error::ApiError;
use crate::model::activity_log::ActivityLog;
use crate::utils::pagination::Page;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogQuery {
    /// Only entries created by this user
    pub user_id: Option<u64>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogPage {
    pub data: Vec<ActivityLog>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[utoipa::path(
    get,
    path = "/api/activity-logs",
    params(ActivityLogQuery),
    responses(
        (status = 200, description = "Audit trail, newest first", body = ActivityLogPage),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "ActivityLog"
)]
pub async fn list_activity_logs(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ActivityLogQuery>,
) -> Result<impl Responder, ApiError> {
    auth.require(Module::ActivityLog, Action::Read)?;

    let Page {
        page,
        per_page,
        offset,
    } = Page::resolve(query.page, query.per_page, 20);

    let (total, data) = futures::try_join!(
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM activity_logs WHERE (? IS NULL OR user_id = ?)",
        )
        .bind(query.user_id)
        .bind(query.user_id)
        .fetch_one(pool.get_ref()),
        sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT id, request_id, user_id, method, path, status_code, ip, created_at
            FROM activity_logs
            WHERE (? IS NULL OR user_id = ?)
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(query.user_id)
        .bind(query.user_id)
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(pool.get_ref()),
    )?;

    Ok(HttpResponse::Ok().json(ActivityLogPage {
        data,
        page,
        per_page,
        total,
    }))
}
