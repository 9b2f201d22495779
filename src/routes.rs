use crate::{
    api::{activity_log, attendance, dashboard, employee, holiday, leave_request, settings},
    auth::middleware::auth_middleware,
    config::Config,
    error::ApiError,
    utils::activity_logger::activity_log_middleware,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        // both values are clamped to >= 1, the only case `finish` rejects
        .unwrap_or_default();
    Governor::new(&cfg)
}

/// Malformed JSON bodies and query strings answer with the standard error body.
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| ApiError::from(err).into()))
        .app_data(web::QueryConfig::default().error_handler(|err, _| ApiError::from(err).into()))
        .app_data(web::PathConfig::default().error_handler(|err, _| ApiError::from(err).into()));
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let protected_limiter = build_limiter(config.rate_protected_per_min);
    let punch_limiter = Arc::new(build_limiter(config.rate_punch_per_min));

    // middleware runs bottom-up: limiter, then auth, then the activity log
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(activity_log_middleware))
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter)
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/punch-in")
                            .wrap(punch_limiter.clone())
                            .route(web::post().to(attendance::punch_in)),
                    )
                    .service(
                        web::resource("/punch-out")
                            .wrap(punch_limiter.clone())
                            .route(web::post().to(attendance::punch_out)),
                    )
                    .service(
                        web::resource("/me/active")
                            .route(web::get().to(attendance::active_session)),
                    )
                    .service(
                        web::resource("/report").route(web::get().to(attendance::daily_report)),
                    )
                    .service(
                        web::resource("/employee-monthly-report")
                            .route(web::get().to(attendance::employee_monthly_report)),
                    ),
            )
            .service(
                web::scope("/dashboard")
                    .service(web::resource("/stats").route(web::get().to(dashboard::stats))),
            )
            .service(
                web::scope("/settings")
                    // /settings
                    .service(web::resource("").route(web::get().to(settings::list_settings)))
                    // /settings/{key}
                    .service(
                        web::resource("/{key}")
                            .route(web::get().to(settings::get_setting))
                            .route(web::put().to(settings::update_setting)),
                    ),
            )
            .service(
                web::scope("/holidays")
                    .service(
                        web::resource("")
                            .route(web::get().to(holiday::list_holidays))
                            .route(web::post().to(holiday::create_holiday)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(holiday::update_holiday))
                            .route(web::delete().to(holiday::delete_holiday)),
                    ),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    // /leave/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    ),
            )
            .service(
                web::scope("/employees")
                    .service(web::resource("").route(web::get().to(employee::list_employees)))
                    .service(web::resource("/{id}").route(web::get().to(employee::get_employee)))
                    .service(
                        web::resource("/{id}/profile")
                            .route(web::put().to(employee::update_profile)),
                    ),
            )
            .service(
                web::resource("/activity-logs")
                    .route(web::get().to(activity_log::list_activity_logs)),
            ),
    );
}
