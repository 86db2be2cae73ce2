//! Movement (case history) models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::case_file::CaseStatus;
use crate::entity::movement;

/// Kind of event recorded against a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum MovementType {
    #[serde(rename = "CREADO")]
    Created,
    #[serde(rename = "RECIBIDO_CONFORME")]
    Received,
    #[serde(rename = "EN_REVISION")]
    UnderReview,
    #[serde(rename = "DERIVADO")]
    Forwarded,
    #[serde(rename = "OBSERVADO")]
    Observed,
    #[serde(rename = "SUBSANADO")]
    Corrected,
    #[serde(rename = "RESOLUCION_EMITIDA")]
    ResolutionIssued,
    #[serde(rename = "NOTIFICADO")]
    Notified,
    #[serde(rename = "ARCHIVADO")]
    Archived,
    #[serde(rename = "OTRO")]
    Other,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREADO",
            Self::Received => "RECIBIDO_CONFORME",
            Self::UnderReview => "EN_REVISION",
            Self::Forwarded => "DERIVADO",
            Self::Observed => "OBSERVADO",
            Self::Corrected => "SUBSANADO",
            Self::ResolutionIssued => "RESOLUCION_EMITIDA",
            Self::Notified => "NOTIFICADO",
            Self::Archived => "ARCHIVADO",
            Self::Other => "OTRO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "CREADO" => Some(Self::Created),
            "RECIBIDO_CONFORME" => Some(Self::Received),
            "EN_REVISION" => Some(Self::UnderReview),
            "DERIVADO" => Some(Self::Forwarded),
            "OBSERVADO" => Some(Self::Observed),
            "SUBSANADO" => Some(Self::Corrected),
            "RESOLUCION_EMITIDA" => Some(Self::ResolutionIssued),
            "NOTIFICADO" => Some(Self::Notified),
            "ARCHIVADO" => Some(Self::Archived),
            "OTRO" => Some(Self::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Movement as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MovementResponse {
    pub id: Uuid,
    pub movement_type: MovementType,
    pub description: String,
    /// Null for system-generated movements
    pub admin_id: Option<Uuid>,
    pub admin_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MovementResponse {
    pub fn from_model(m: movement::Model, admin_name: Option<String>) -> Self {
        Self {
            id: m.id,
            movement_type: MovementType::parse(&m.movement_type).unwrap_or(MovementType::Other),
            description: m.description,
            admin_id: m.administrator_id,
            admin_name,
            created_at: m.created_at,
        }
    }
}

/// Administrator request to record a movement.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecordMovementRequest {
    #[serde(rename = "tipo_movimiento", default)]
    pub movement_type: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "nuevo_estado", default)]
    pub new_status: Option<String>,
}

/// A validated movement ready to be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovement {
    pub movement_type: MovementType,
    pub description: String,
    pub new_status: Option<CaseStatus>,
}

impl RecordMovementRequest {
    pub fn validate(&self) -> Result<NewMovement, String> {
        let movement_type = MovementType::parse(&self.movement_type)
            .filter(|t| *t != MovementType::Created)
            .ok_or_else(|| "Seleccione un tipo de movimiento válido".to_string())?;
        let new_status = match self.new_status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(CaseStatus::parse(raw).ok_or_else(|| "Estado inválido".to_string())?),
        };
        let description = self.description.trim();
        if description.is_empty() {
            return Err("La descripción es requerida".to_string());
        }
        if description.chars().count() > 2000 {
            return Err("La descripción no debe superar los 2000 caracteres".to_string());
        }
        Ok(NewMovement {
            movement_type,
            description: description.to_string(),
            new_status,
        })
    }
}

/// Administrator request to change a case status.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChangeStatusRequest {
    #[serde(rename = "nuevo_estado", default)]
    pub new_status: String,
    /// Optional note appended to the generated movement
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
}

impl ChangeStatusRequest {
    pub fn validate(&self) -> Result<CaseStatus, String> {
        CaseStatus::parse(&self.new_status).ok_or_else(|| "Estado inválido".to_string())
    }
}
