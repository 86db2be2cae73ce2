//! External user (citizen) models and identity validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidateEmail;

/// Length of a Peruvian DNI.
pub const DNI_LENGTH: usize = 8;

/// Length of a verification code.
pub const CODE_LENGTH: usize = 6;

/// Validate a DNI: exactly 8 ASCII digits.
pub fn validate_dni(dni: &str) -> Result<(), String> {
    if dni.chars().count() != DNI_LENGTH {
        return Err("El DNI debe tener 8 dígitos".to_string());
    }
    if !dni.bytes().all(|b| b.is_ascii_digit()) {
        return Err("El DNI solo debe contener números".to_string());
    }
    Ok(())
}

/// Validate a verification code shape: exactly 6 ASCII digits.
pub fn validate_code(code: &str) -> Result<(), String> {
    if code.len() != CODE_LENGTH || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err("El código debe tener 6 dígitos".to_string());
    }
    Ok(())
}

/// Identity data submitted in the first step of a submission.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IdentifyRequest {
    #[serde(default)]
    pub dni: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "nombres", default)]
    pub first_names: String,
    #[serde(rename = "apellidos", default)]
    pub last_names: String,
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
}

/// Identity after validation and normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub dni: String,
    /// Lower-cased
    pub email: String,
    pub first_names: String,
    pub last_names: String,
    pub phone: Option<String>,
}

impl IdentifyRequest {
    pub fn validate(&self) -> Result<Identity, String> {
        let dni = self.dni.trim();
        validate_dni(dni)?;

        let email = self.email.trim().to_lowercase();
        if !email.validate_email() {
            return Err("Email inválido".to_string());
        }

        let first_names = self.first_names.trim();
        if first_names.chars().count() < 2 {
            return Err("Nombres es requerido".to_string());
        }
        let last_names = self.last_names.trim();
        if last_names.chars().count() < 2 {
            return Err("Apellidos es requerido".to_string());
        }

        let phone = self
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        if phone.as_ref().is_some_and(|p| p.chars().count() > 20) {
            return Err("Teléfono inválido".to_string());
        }

        Ok(Identity {
            dni: dni.to_string(),
            email,
            first_names: first_names.to_string(),
            last_names: last_names.to_string(),
            phone,
        })
    }
}

/// Response after a code has been issued.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IdentifyResponse {
    pub message: String,
    /// Destination address with the local part masked
    pub email_hint: String,
    pub expires_at: DateTime<Utc>,
}

/// Code confirmation request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VerifyCodeRequest {
    #[serde(default)]
    pub dni: String,
    #[serde(rename = "codigo", default)]
    pub code: String,
}

impl VerifyCodeRequest {
    pub fn validate(&self) -> Result<(String, String), String> {
        let dni = self.dni.trim();
        validate_dni(dni)?;
        let code = self.code.trim();
        validate_code(code)?;
        Ok((dni.to_string(), code.to_string()))
    }
}

/// Response after successful verification.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyCodeResponse {
    pub verified: bool,
    pub dni: String,
    pub first_names: String,
    pub last_names: String,
    pub verified_at: DateTime<Utc>,
}

/// Mask an email for display: `juan.perez@mail.com` becomes `ju*******@mail.com`.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let visible: String = local.chars().take(2).collect();
            let hidden = local.chars().count().saturating_sub(2).max(1);
            format!("{}{}@{}", visible, "*".repeat(hidden), domain)
        }
        None => "***".to_string(),
    }
}
