//! Administrator authentication: Argon2id passwords and HS256 session tokens.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use std::sync::LazyLock;
use tracing::{info, warn};

use crate::config::SessionSettings;
use crate::db::DbPool;
use crate::entity::administrator;
use crate::error::{AppError, AppResult};
use crate::models::{LoginRequest, SessionClaims};

/// Session JWT issuer.
pub const SESSION_ISSUER: &str = "mesa-partes";

/// Minimum administrator password length.
pub const MIN_PASSWORD_LENGTH: usize = 10;

const INVALID_CREDENTIALS: &str = "Credenciales inválidas";

/// Hash a plaintext password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Validation(format!("No se pudo procesar la contraseña: {}", e)))
}

/// Verify a plaintext password against a stored PHC string.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

/// Verify off the async executor. With no stored hash the password is
/// checked against a throwaway hash so unknown accounts cost the same time.
pub async fn check_password(password: &str, hash: Option<&str>) -> AppResult<bool> {
    let password = password.to_string();
    let hash = hash.map(str::to_string);
    tokio::task::spawn_blocking(move || match hash {
        Some(hash) => verify_password(&password, &hash),
        None => {
            verify_password(&password, &DUMMY_HASH);
            false
        }
    })
    .await
    .map_err(|e| AppError::Database(format!("Password check task failed: {}", e)))
}

static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("mesa-partes-placeholder").unwrap_or_default());

/// Minimum strength check applied when an administrator password is set.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "La contraseña debe tener al menos {} caracteres",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

/// Sign a session token for an administrator.
pub fn create_session_token(
    admin: &administrator::Model,
    settings: &SessionSettings,
    now: DateTime<Utc>,
) -> AppResult<(String, DateTime<Utc>)> {
    let exp = now + Duration::seconds(settings.ttl_secs as i64);

    let claims = SessionClaims {
        sub: admin.id.to_string(),
        iss: SESSION_ISSUER.to_string(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
        email: admin.email.clone(),
        role: admin.role.clone(),
    };

    let key = EncodingKey::from_secret(settings.secret.expose_secret().as_bytes());
    let token = encode(&Header::default(), &claims, &key)
        .map_err(|e| AppError::Unauthorized(format!("Failed to create session token: {}", e)))?;

    Ok((token, exp))
}

/// Verify a session token and return its claims.
pub fn verify_session_token(token: &str, secret: &SecretString) -> Result<SessionClaims, String> {
    let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[SESSION_ISSUER]);
    validation.validate_aud = false;

    let token_data = decode::<SessionClaims>(token, &key, &validation)
        .map_err(|e| format!("Invalid session token: {}", e))?;

    Ok(token_data.claims)
}

/// Check credentials and open a session.
///
/// Unknown email, wrong password and inactive accounts all yield the same error.
pub async fn login(
    pool: &DbPool,
    settings: &SessionSettings,
    request: &LoginRequest,
) -> AppResult<(String, DateTime<Utc>, administrator::Model)> {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Ingrese su correo y contraseña".to_string(),
        ));
    }

    let admin = pool.get_admin_by_email(&email).await?;
    let matches = check_password(
        &request.password,
        admin.as_ref().map(|a| a.password_hash.as_str()),
    )
    .await?;

    let admin = match admin {
        Some(admin) if matches => admin,
        _ => {
            warn!(email = %email, "Administrator login failed");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
    };
    if !admin.active {
        warn!(email = %email, "Inactive administrator attempted login");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let now = Utc::now();
    pool.touch_admin_login(admin.id, now).await?;
    let (token, expires_at) = create_session_token(&admin, settings, now)?;

    info!(admin_id = %admin.id, "Administrator logged in");

    let admin = administrator::Model {
        last_login_at: Some(now),
        ..admin
    };
    Ok((token, expires_at, admin))
}
