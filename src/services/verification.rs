//! Email verification handshake: issue, validate and gate a one-time code.
//!
//! States per DNI are `NoCode -> CodeIssued -> Verified`. Issuing a new code
//! always drops the user back to `CodeIssued`.

use chrono::{DateTime, Duration, Utc};
use sea_orm::ConnectionTrait;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::db::{external_users, DbPool};
use crate::entity::external_user;
use crate::error::{AppError, AppResult};
use crate::models::external_user::mask_email;
use crate::models::{IdentifyRequest, IdentifyResponse, VerifyCodeRequest, VerifyCodeResponse};
use crate::services::mailer::{self, Mailer};

/// Minutes a verification code stays valid.
pub const CODE_TTL_MINUTES: i64 = 10;

const CODE_MIN: u32 = 100_000;
const CODE_SPAN: u32 = 900_000;

/// Uniformly random 6-digit code in 100000..=999999.
pub fn generate_code() -> String {
    // Rejection sampling keeps the distribution uniform.
    let limit = u32::MAX - (u32::MAX % CODE_SPAN);
    loop {
        let candidate: u32 = rand::random();
        if candidate < limit {
            return (CODE_MIN + candidate % CODE_SPAN).to_string();
        }
    }
}

/// Issue a fresh code for this identity and email it.
pub async fn issue(
    pool: &DbPool,
    mailer: &dyn Mailer,
    request: &IdentifyRequest,
) -> AppResult<IdentifyResponse> {
    issue_at(pool, mailer, request, Utc::now()).await
}

/// [`issue`] with an explicit clock.
pub async fn issue_at(
    pool: &DbPool,
    mailer: &dyn Mailer,
    request: &IdentifyRequest,
    now: DateTime<Utc>,
) -> AppResult<IdentifyResponse> {
    let identity = request.validate().map_err(AppError::Validation)?;

    let code = generate_code();
    let expires_at = now + Duration::minutes(CODE_TTL_MINUTES);

    let user = external_users::upsert_pending_verification(
        pool.connection(),
        &identity,
        &code,
        expires_at,
        now,
    )
    .await?;

    let full_name = format!("{} {}", user.first_names, user.last_names);
    let email = mailer::verification_email(&user.email, &full_name, &code, CODE_TTL_MINUTES);

    if let Err(e) = mailer.send(email).await {
        // A code the user never received must not stay redeemable.
        let withdrawn = external_users::withdraw_code(pool.connection(), &user.dni, &code).await;
        if let Err(ref clear_err) = withdrawn {
            warn!(dni = %user.dni, "Failed to withdraw undelivered code: {}", clear_err);
        }
        return Err(match e {
            AppError::Delivery(_) => e,
            other => AppError::Delivery(other.to_string()),
        });
    }

    info!(dni = %user.dni, expires_at = %expires_at, "Verification code issued");

    Ok(IdentifyResponse {
        message: "Código de verificación enviado a tu correo electrónico".to_string(),
        email_hint: mask_email(&user.email),
        expires_at,
    })
}

/// Redeem a code.
pub async fn validate(pool: &DbPool, request: &VerifyCodeRequest) -> AppResult<VerifyCodeResponse> {
    validate_at(pool, request, Utc::now()).await
}

/// [`validate`] with an explicit clock.
pub async fn validate_at(
    pool: &DbPool,
    request: &VerifyCodeRequest,
    now: DateTime<Utc>,
) -> AppResult<VerifyCodeResponse> {
    let (dni, code) = request.validate().map_err(AppError::Validation)?;

    let invalid = || AppError::InvalidCode("Código de verificación inválido".to_string());

    let user = external_users::find_by_dni(pool.connection(), &dni)
        .await?
        .ok_or_else(invalid)?;

    let matches = user
        .verification_code
        .as_deref()
        .is_some_and(|stored| bool::from(stored.as_bytes().ct_eq(code.as_bytes())));
    if !matches {
        return Err(invalid());
    }

    match user.verification_expires_at {
        Some(expires_at) if now <= expires_at => {}
        _ => {
            return Err(AppError::Expired(
                "El código ha expirado. Solicita uno nuevo.".to_string(),
            ));
        }
    }

    // Conditional on the code still being ours: a concurrent validate or a
    // newer issue makes this touch zero rows.
    if !external_users::consume_code(pool.connection(), &dni, &code, now).await? {
        return Err(invalid());
    }

    info!(dni = %dni, "Email verified");

    Ok(VerifyCodeResponse {
        verified: true,
        dni: user.dni,
        first_names: user.first_names,
        last_names: user.last_names,
        verified_at: now,
    })
}

/// Early, unlocked check that the DNI is verified.
pub async fn check_verified<C: ConnectionTrait>(conn: &C, dni: &str) -> AppResult<()> {
    external_users::find_verified_by_dni(conn, dni)
        .await?
        .map(|_| ())
        .ok_or_else(not_verified)
}

/// Re-read the user inside the caller's transaction and require the verified flag.
///
/// The row stays share-locked until the transaction ends, so a concurrent
/// Issue cannot reset the flag before the case is committed.
pub async fn require_verified<C: ConnectionTrait>(
    conn: &C,
    dni: &str,
) -> AppResult<external_user::Model> {
    external_users::lock_verified_by_dni(conn, dni)
        .await?
        .ok_or_else(not_verified)
}

fn not_verified() -> AppError {
    AppError::Forbidden(
        "Debe verificar su correo electrónico antes de enviar el documento".to_string(),
    )
}
