use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::Method,
    web::Data,
};
use sqlx::MySqlPool;
use tracing::{debug, error};
use uuid::Uuid;

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::utils::client_ip::client_ip;

/// Only state-changing requests are audited.
pub fn is_audited(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Intercepts the response of every state-changing request and appends an
/// entry to `activity_logs` when it succeeded. A failed insert is logged and
/// never changes the response.
pub async fn activity_log_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    if !is_audited(req.method()) {
        return next.call(req).await;
    }

    let request_id = Uuid::new_v4().to_string();
    let res = next.call(req).await?;

    if !res.status().is_success() {
        return Ok(res);
    }

    let request = res.request();
    let Some(pool) = request.app_data::<Data<MySqlPool>>() else {
        return Ok(res);
    };

    let trust_proxy_headers = request
        .app_data::<Data<Config>>()
        .map(|c| c.trust_proxy_headers)
        .unwrap_or(false);

    let user_id = request.extensions().get::<AuthUser>().map(|u| u.user_id);
    let ip = client_ip(request, trust_proxy_headers);
    let method = request.method().as_str();
    let path = request.path();
    let status = res.status().as_u16();

    let result = sqlx::query(
        r#"
        INSERT INTO activity_logs (request_id, user_id, method, path, status_code, ip)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&request_id)
    .bind(user_id)
    .bind(method)
    .bind(path)
    .bind(status)
    .bind(Some(ip).filter(|ip| !ip.is_empty()))
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => debug!(%request_id, method, path, status, "Activity logged"),
        Err(e) => error!(error = %e, %request_id, method, path, "Failed to write activity log"),
    }

    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_mutating_methods_are_audited() {
        assert!(is_audited(&Method::POST));
        assert!(is_audited(&Method::PUT));
        assert!(is_audited(&Method::DELETE));
        assert!(!is_audited(&Method::GET));
        assert!(!is_audited(&Method::OPTIONS));
    }
}
