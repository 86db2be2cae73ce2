//! Administrator endpoints: session, dashboard, case management, downloads.

use actix_web::cookie::{Cookie, SameSite, time};
use actix_web::http::header;
use actix_web::{HttpResponse, get, post, put, web};
use uuid::Uuid;

use crate::auth::AdminAuth;
use crate::config::{Config, SESSION_COOKIE};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    AdminResponse, CaseListResponse, CaseStatus, ChangeStatusRequest, ListCasesQuery,
    LoginRequest, LoginResponse, Pagination, RecordMovementRequest,
};
use crate::services::storage::{BlobStore, content_type_for_extension, file_extension};
use crate::services::{admin_auth, case_query, dashboard, movements};

/// Configure administrator routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(logout)
        .service(me)
        .service(get_dashboard)
        .service(list_cases)
        .service(get_case)
        .service(record_movement)
        .service(change_status)
        .service(download_attachment);
}

fn session_cookie(config: &Config, token: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(!config.is_development())
        .max_age(time::Duration::seconds(max_age_secs))
        .finish()
}

/// Open an administrator session.
#[utoipa::path(
    post,
    path = "/api/v1/admin/login",
    tag = "Admin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened; token also set as cookie", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse),
    )
)]
#[post("/admin/login")]
pub async fn login(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let (token, expires_at, admin) = admin_auth::login(&pool, &config.session, &body).await?;

    let cookie = session_cookie(&config, token.clone(), config.session.ttl_secs as i64);
    Ok(HttpResponse::Ok().cookie(cookie).json(LoginResponse {
        token,
        expires_at,
        admin: AdminResponse::from(admin),
    }))
}

/// Close the session by expiring the cookie.
#[utoipa::path(
    post,
    path = "/api/v1/admin/logout",
    tag = "Admin",
    responses((status = 204, description = "Session cookie cleared"))
)]
#[post("/admin/logout")]
pub async fn logout(config: web::Data<Config>) -> HttpResponse {
    HttpResponse::NoContent()
        .cookie(session_cookie(&config, String::new(), 0))
        .finish()
}

/// Current administrator profile.
#[utoipa::path(
    get,
    path = "/api/v1/admin/me",
    tag = "Admin",
    responses(
        (status = 200, description = "Authenticated administrator", body = AdminResponse),
        (status = 401, description = "No valid session", body = crate::error::ErrorResponse),
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
#[get("/admin/me")]
pub async fn me(auth: AdminAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let admin = pool
        .get_admin_by_id(auth.principal.admin_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Sesión inválida o expirada".to_string()))?;

    Ok(HttpResponse::Ok().json(AdminResponse::from(admin)))
}

/// Case and citizen totals.
#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard",
    tag = "Admin",
    responses(
        (status = 200, description = "Dashboard figures", body = crate::models::DashboardResponse),
        (status = 401, description = "No valid session", body = crate::error::ErrorResponse),
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
#[get("/admin/dashboard")]
pub async fn get_dashboard(_auth: AdminAuth, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let overview = dashboard::overview(&pool).await?;
    Ok(HttpResponse::Ok().json(overview))
}

/// List cases, newest first.
///
/// GET /admin/cases?page=1&limit=20&status=PENDIENTE
#[utoipa::path(
    get,
    path = "/api/v1/admin/cases",
    tag = "Admin",
    params(ListCasesQuery),
    responses(
        (status = 200, description = "Page of cases", body = CaseListResponse),
        (status = 400, description = "Unknown status filter", body = crate::error::ErrorResponse),
        (status = 401, description = "No valid session", body = crate::error::ErrorResponse),
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
#[get("/admin/cases")]
pub async fn list_cases(
    _auth: AdminAuth,
    pool: web::Data<DbPool>,
    query: web::Query<ListCasesQuery>,
) -> AppResult<HttpResponse> {
    let status = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(CaseStatus::parse(raw).ok_or_else(|| {
            AppError::Validation(format!("Estado desconocido: {}", raw))
        })?),
        None => None,
    };

    let (rows, total) = pool.list_cases(&query, status).await?;
    let cases = rows
        .into_iter()
        .map(|row| case_query::summarize(row, true))
        .collect();

    Ok(HttpResponse::Ok().json(CaseListResponse {
        cases,
        pagination: Pagination::new(query.page(), query.clamped_limit(), total),
    }))
}

/// Case detail with owner contact, attachments and movements.
#[utoipa::path(
    get,
    path = "/api/v1/admin/cases/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Case ID")),
    responses(
        (status = 200, description = "Case detail", body = crate::models::CaseDetail),
        (status = 404, description = "Case not found", body = crate::error::ErrorResponse),
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
#[get("/admin/cases/{id}")]
pub async fn get_case(
    _auth: AdminAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let detail = case_query::admin_detail(&pool, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Record a movement, optionally moving the case to a new status.
#[utoipa::path(
    post,
    path = "/api/v1/admin/cases/{id}/movements",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Case ID")),
    request_body = RecordMovementRequest,
    responses(
        (status = 201, description = "Movement recorded", body = movements::MovementOutcome),
        (status = 400, description = "Invalid movement", body = crate::error::ErrorResponse),
        (status = 404, description = "Case not found", body = crate::error::ErrorResponse),
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
#[post("/admin/cases/{id}/movements")]
pub async fn record_movement(
    auth: AdminAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<RecordMovementRequest>,
) -> AppResult<HttpResponse> {
    let outcome = movements::record(&pool, &auth.principal, path.into_inner(), &body).await?;
    Ok(HttpResponse::Created().json(outcome))
}

/// Change a case status.
#[utoipa::path(
    put,
    path = "/api/v1/admin/cases/{id}/status",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Case ID")),
    request_body = ChangeStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = movements::MovementOutcome),
        (status = 400, description = "Invalid or unchanged status", body = crate::error::ErrorResponse),
        (status = 404, description = "Case not found", body = crate::error::ErrorResponse),
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
#[put("/admin/cases/{id}/status")]
pub async fn change_status(
    auth: AdminAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<ChangeStatusRequest>,
) -> AppResult<HttpResponse> {
    let outcome =
        movements::change_status(&pool, &auth.principal, path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Download an attachment with its original filename.
#[utoipa::path(
    get,
    path = "/api/v1/admin/attachments/{id}/download",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "Attachment ID")),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 404, description = "Attachment not found", body = crate::error::ErrorResponse),
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
#[get("/admin/attachments/{id}/download")]
pub async fn download_attachment(
    _auth: AdminAuth,
    pool: web::Data<DbPool>,
    store: web::Data<dyn BlobStore>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let attachment = pool
        .get_attachment(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Archivo no encontrado: {}", id)))?;

    let (data, stored_type) = store.get(&attachment.storage_key).await?;

    let content_type = attachment
        .mime_type
        .clone()
        .or(stored_type)
        .unwrap_or_else(|| {
            let ext = file_extension(&attachment.original_filename).unwrap_or_default();
            content_type_for_extension(&ext).to_string()
        });

    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((
            header::CONTENT_DISPOSITION,
            content_disposition(&attachment.original_filename),
        ))
        .body(data))
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}
