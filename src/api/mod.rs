//! API endpoint modules.

pub mod admin;
pub mod cases;
pub mod health;
pub mod openapi;
pub mod submissions;

pub use admin::configure_routes as configure_admin_routes;
pub use cases::configure_routes as configure_case_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use submissions::configure_routes as configure_submission_routes;

use actix_web::web;

use crate::error::AppError;

/// Register every `/api/v1` route.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_health_routes)
        .configure(configure_submission_routes)
        .configure(configure_case_routes)
        .configure(configure_admin_routes);
}

/// JSON body settings: malformed bodies become `VALIDATION_ERROR` responses.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| {
            AppError::Validation(format!("Solicitud inválida: {}", err)).into()
        })
}
