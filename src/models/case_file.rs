//! Case ("expediente") domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::attachment::AttachmentResponse;
use super::movement::MovementResponse;
use super::Pagination;
use crate::entity::case_file;

/// Case lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CaseStatus {
    #[serde(rename = "PENDIENTE")]
    Pending,
    #[serde(rename = "EN_PROCESO")]
    InProgress,
    #[serde(rename = "RESUELTO")]
    Resolved,
    #[serde(rename = "ARCHIVADO")]
    Archived,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Resolved,
        Self::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDIENTE",
            Self::InProgress => "EN_PROCESO",
            Self::Resolved => "RESUELTO",
            Self::Archived => "ARCHIVADO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PENDIENTE" => Some(Self::Pending),
            "EN_PROCESO" => Some(Self::InProgress),
            "RESUELTO" => Some(Self::Resolved),
            "ARCHIVADO" => Some(Self::Archived),
            _ => None,
        }
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of document a citizen submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DocumentType {
    #[serde(rename = "Solicitud")]
    Request,
    #[serde(rename = "Reclamo")]
    Claim,
    #[serde(rename = "Queja")]
    Complaint,
    #[serde(rename = "Sugerencia")]
    Suggestion,
    #[serde(rename = "Recurso de Reconsideración")]
    ReconsiderationAppeal,
    #[serde(rename = "Recurso de Apelación")]
    Appeal,
    #[serde(rename = "Otro")]
    Other,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "Solicitud",
            Self::Claim => "Reclamo",
            Self::Complaint => "Queja",
            Self::Suggestion => "Sugerencia",
            Self::ReconsiderationAppeal => "Recurso de Reconsideración",
            Self::Appeal => "Recurso de Apelación",
            Self::Other => "Otro",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Solicitud" => Some(Self::Request),
            "Reclamo" => Some(Self::Claim),
            "Queja" => Some(Self::Complaint),
            "Sugerencia" => Some(Self::Suggestion),
            "Recurso de Reconsideración" => Some(Self::ReconsiderationAppeal),
            "Recurso de Apelación" => Some(Self::Appeal),
            "Otro" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Owner summary embedded in case responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CaseOwner {
    pub dni: String,
    pub first_names: Option<String>,
    pub last_names: Option<String>,
    /// Contact data, only populated for administrators.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Case row as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CaseSummary {
    pub id: Uuid,
    pub case_number: String,
    pub document_type: String,
    pub document_count: i32,
    pub folio_count: i32,
    pub subject: String,
    pub status: CaseStatus,
    pub policy_accepted: bool,
    pub policy_accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<CaseOwner>,
}

impl CaseSummary {
    pub fn from_model(m: case_file::Model, owner: Option<CaseOwner>) -> Self {
        Self {
            id: m.id,
            case_number: m.case_number,
            document_type: m.document_type,
            document_count: m.document_count,
            folio_count: m.folio_count,
            subject: m.subject,
            status: CaseStatus::parse(&m.status).unwrap_or(CaseStatus::Pending),
            policy_accepted: m.policy_accepted,
            policy_accepted_at: m.policy_accepted_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
            owner,
        }
    }
}

/// Full case view: the case, its attachments (oldest first) and its
/// movements (newest first).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CaseDetail {
    #[serde(flatten)]
    pub case: CaseSummary,
    pub attachments: Vec<AttachmentResponse>,
    pub movements: Vec<MovementResponse>,
}

/// Citizen case lookup request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CaseLookupRequest {
    #[serde(rename = "numero_expediente", default)]
    pub case_number: String,
    #[serde(default)]
    pub dni: String,
}

/// Query parameters for the administrator case list.
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ListCasesQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Optional status filter (PENDIENTE, EN_PROCESO, RESUELTO, ARCHIVADO)
    #[serde(alias = "estado")]
    pub status: Option<String>,
}

impl ListCasesQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn clamped_limit(&self) -> u32 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.clamped_limit())
    }
}

/// Paginated case list.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CaseListResponse {
    pub cases: Vec<CaseSummary>,
    pub pagination: Pagination,
}
