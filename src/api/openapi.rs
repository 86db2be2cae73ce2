//! OpenAPI documentation configuration.

use utoipa::OpenApi;
use utoipa::openapi::security::{
    ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme,
};

use crate::config::SESSION_COOKIE;
use crate::{api, error, models, services};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mesa de Partes Virtual",
        version = "0.1.0",
        description = "Citizen document intake with email verification, case lookup and administrator case tracking"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Citizen endpoints
        api::submissions::identify,
        api::submissions::verify,
        api::submissions::submit,
        api::cases::lookup_case,
        // Administrator endpoints
        api::admin::login,
        api::admin::logout,
        api::admin::me,
        api::admin::get_dashboard,
        api::admin::list_cases,
        api::admin::get_case,
        api::admin::record_movement,
        api::admin::change_status,
        api::admin::download_attachment,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            models::Pagination,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Submissions
            models::IdentifyRequest,
            models::IdentifyResponse,
            models::VerifyCodeRequest,
            models::VerifyCodeResponse,
            models::SubmissionResponse,
            models::RejectedAttachment,
            models::DocumentType,
            // Cases
            models::CaseStatus,
            models::CaseOwner,
            models::CaseSummary,
            models::CaseDetail,
            models::CaseLookupRequest,
            models::CaseListResponse,
            models::AttachmentKind,
            models::AttachmentResponse,
            // Movements
            models::MovementType,
            models::MovementResponse,
            models::RecordMovementRequest,
            models::ChangeStatusRequest,
            services::movements::MovementOutcome,
            // Administrators
            models::AdminRole,
            models::AdminResponse,
            models::LoginRequest,
            models::LoginResponse,
            models::StatusCount,
            models::DashboardResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Submissions", description = "Citizen identification, verification and case submission"),
        (name = "Cases", description = "Citizen case lookup"),
        (name = "Admin", description = "Administrator session and case management")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add the session cookie and bearer token security schemes.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
