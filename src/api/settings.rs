use crate::auth::auth::AuthUser;
use crate::auth::permission::{Action, Module};
use crate::error::ApiError;
use crate::model::setting::Setting;
use crate::service::settings_store::SettingsStore;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct UpdateSetting {
    #[schema(example = "10.0.0.5, 10.0.0.6")]
    pub value: String,
}

#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "All company settings", body = Vec<Setting>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn list_settings(
    auth: AuthUser,
    settings: web::Data<SettingsStore>,
) -> Result<impl Responder, ApiError> {
    auth.require(Module::Settings, Action::Read)?;

    Ok(HttpResponse::Ok().json(settings.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/settings/{key}",
    params(("key" = String, Path, description = "Setting key")),
    responses(
        (status = 200, description = "Setting", body = Setting),
        (status = 404, description = "Unknown setting")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn get_setting(
    auth: AuthUser,
    settings: web::Data<SettingsStore>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    auth.require(Module::Settings, Action::Read)?;

    let key = path.into_inner();
    match settings.get(&key).await? {
        Some(value) => Ok(HttpResponse::Ok().json(Setting { key, value })),
        None => Err(ApiError::not_found("Setting not found")),
    }
}

#[utoipa::path(
    put,
    path = "/api/settings/{key}",
    params(("key" = String, Path, description = "Setting key")),
    request_body = UpdateSetting,
    responses(
        (status = 200, description = "Setting stored", body = Object, example = json!({
            "message": "Setting updated"
        })),
        (status = 400, description = "Invalid key"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn update_setting(
    auth: AuthUser,
    settings: web::Data<SettingsStore>,
    path: web::Path<String>,
    payload: web::Json<UpdateSetting>,
) -> Result<impl Responder, ApiError> {
    auth.require(Module::Settings, Action::Update)?;

    let key = path.into_inner();
    if key.trim().is_empty() || key.len() > 64 {
        return Err(ApiError::validation("Setting key must be 1-64 characters"));
    }

    settings.set(&key, payload.value.trim()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Setting updated"
    })))
}
