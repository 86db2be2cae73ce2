//! Actix-web extractor for administrator sessions.
//!
//! The session token is read from the `mpv_session` cookie, or from an
//! `Authorization: Bearer` header for API clients. The administrator row is
//! reloaded on every request so deactivated accounts lose access at once.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use crate::config::{Config, SESSION_COOKIE};
use crate::db::DbPool;
use crate::error::AppError;
use crate::models::{AdminRole, Principal};
use crate::services::admin_auth::verify_session_token;

/// Extract the raw session token, cookie first.
pub fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        let value = cookie.value().trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Extractor that requires an authenticated, active administrator.
///
/// ```ignore
/// async fn protected_handler(auth: AdminAuth) -> impl Responder {
///     // auth.principal identifies the administrator
/// }
/// ```
pub struct AdminAuth {
    pub principal: Principal,
}

impl FromRequest for AdminAuth {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let pool = req.app_data::<web::Data<DbPool>>().cloned();
        let config = req.app_data::<web::Data<Config>>().cloned();
        let token = session_token(req);

        Box::pin(async move {
            let (Some(pool), Some(config)) = (pool, config) else {
                return Err(AppError::Database(
                    "Authentication dependencies not configured".to_string(),
                ));
            };

            let unauthorized = |msg: &str| AppError::Unauthorized(msg.to_string());

            let token = token.ok_or_else(|| unauthorized("Debe iniciar sesión"))?;
            let claims = verify_session_token(&token, &config.session.secret)
                .map_err(|_| unauthorized("Sesión inválida o expirada"))?;
            let admin_id = Uuid::parse_str(&claims.sub)
                .map_err(|_| unauthorized("Sesión inválida o expirada"))?;

            let admin = pool
                .get_admin_by_id(admin_id)
                .await?
                .filter(|a| a.active)
                .ok_or_else(|| unauthorized("Sesión inválida o expirada"))?;

            let role = AdminRole::parse(&admin.role)
                .ok_or_else(|| unauthorized("Rol de administrador desconocido"))?;

            Ok(AdminAuth {
                principal: Principal {
                    admin_id: admin.id,
                    email: admin.email,
                    role,
                },
            })
        })
    }
}
