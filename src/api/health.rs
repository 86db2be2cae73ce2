//! Liveness and readiness probes for the intake desk.

use actix_web::{HttpResponse, get, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::error::ErrorResponse;

/// Process is up.
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    checked_at: DateTime<Utc>,
}

/// Process is up and its database answers.
#[derive(Serialize, ToSchema)]
pub struct ReadyResponse {
    status: &'static str,
    database: &'static str,
}

/// Liveness: answers without touching the database.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Mesa de Partes is running", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        service: "mesa-partes",
        version: env!("CARGO_PKG_VERSION"),
        checked_at: Utc::now(),
    })
}

/// Readiness: 503 until the case database accepts queries.
#[utoipa::path(
    get,
    path = "/api/v1/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Ready to take submissions", body = ReadyResponse),
        (status = 503, description = "Case database unreachable", body = ErrorResponse)
    )
)]
#[get("/ready")]
pub async fn ready(pool: web::Data<DbPool>) -> HttpResponse {
    if let Err(e) = pool.ping().await {
        tracing::warn!(error = %e, "Case database did not answer readiness ping");
        return HttpResponse::ServiceUnavailable().json(ErrorResponse {
            error: "NOT_READY".to_string(),
            message: "La base de datos no está disponible".to_string(),
        });
    }

    HttpResponse::Ok().json(ReadyResponse {
        status: "ready",
        database: "ok",
    })
}

pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(ready);
}
