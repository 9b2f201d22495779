use crate::auth::auth::AuthUser;
use crate::auth::permission::{Action, Module};
use crate::error::ApiError;
use crate::service::dashboard::{self, DashboardStats};
use actix_web::{HttpResponse, Responder, web};
use chrono::Local;
use sqlx::MySqlPool;
use tracing::instrument;

/// Aggregated company dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses(
        (status = 200, description = "Dashboard aggregates", body = DashboardStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
#[instrument(name = "dashboard_stats", skip(auth, pool), fields(user_id = auth.user_id))]
pub async fn stats(auth: AuthUser, pool: web::Data<MySqlPool>) -> Result<impl Responder, ApiError> {
    auth.require(Module::Dashboard, Action::Read)?;

    let today = Local::now().date_naive();
    let stats = dashboard::get_dashboard_stats(pool.get_ref(), today).await?;

    Ok(HttpResponse::Ok().json(stats))
}
