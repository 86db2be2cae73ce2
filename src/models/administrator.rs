//! Administrator models for session authentication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::administrator;

/// Administrator role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AdminRole {
    #[serde(rename = "OPERADOR")]
    Operator,
    #[serde(rename = "SUPERVISOR")]
    Supervisor,
    #[serde(rename = "ADMIN")]
    Admin,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operator => "OPERADOR",
            Self::Supervisor => "SUPERVISOR",
            Self::Admin => "ADMIN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "OPERADOR" => Some(Self::Operator),
            "SUPERVISOR" => Some(Self::Supervisor),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The authenticated administrator behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub admin_id: Uuid,
    pub email: String,
    pub role: AdminRole,
}

/// Session JWT claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iss: String,
    pub exp: usize,
    pub iat: usize,
    pub email: String,
    pub role: String,
}

/// Login request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Administrator profile returned by `/admin/me` and login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminResponse {
    pub id: Uuid,
    pub email: String,
    pub first_names: String,
    pub last_names: String,
    pub role: AdminRole,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<administrator::Model> for AdminResponse {
    fn from(m: administrator::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            first_names: m.first_names,
            last_names: m.last_names,
            role: AdminRole::parse(&m.role).unwrap_or(AdminRole::Operator),
            last_login_at: m.last_login_at,
        }
    }
}

/// Login response. The token is also set as an HttpOnly cookie.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub admin: AdminResponse,
}
