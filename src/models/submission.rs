//! Case submission form and result.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::attachment::{AttachmentResponse, RejectedAttachment};
use super::case_file::{CaseStatus, DocumentType};
use super::external_user::validate_dni;

/// Text fields of the multipart submission, as received.
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    pub dni: String,
    pub document_type: String,
    pub document_count: String,
    pub folio_count: String,
    pub subject: String,
    pub policy_accepted: String,
}

/// Case description after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseDescription {
    pub dni: String,
    pub document_type: DocumentType,
    pub document_count: i32,
    pub folio_count: i32,
    pub subject: String,
}

impl SubmissionForm {
    /// Set a text field by its multipart name. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        match name {
            "dni" => self.dni = value,
            "tipo_documento" => self.document_type = value,
            "cantidad_documentos" => self.document_count = value,
            "cantidad_folios" => self.folio_count = value,
            "asunto" => self.subject = value,
            "aceptacion_politicas" => self.policy_accepted = value,
            _ => {}
        }
    }

    pub fn validate(&self) -> Result<CaseDescription, String> {
        let dni = self.dni.trim();
        validate_dni(dni)?;

        let document_type = DocumentType::parse(&self.document_type)
            .ok_or_else(|| "Seleccione un tipo de documento".to_string())?;

        let document_count = parse_positive(&self.document_count)
            .ok_or_else(|| "Mínimo 1 documento".to_string())?;
        let folio_count =
            parse_positive(&self.folio_count).ok_or_else(|| "Mínimo 1 folio".to_string())?;

        let subject = self.subject.trim();
        if subject.chars().count() < 10 {
            return Err("El asunto debe tener al menos 10 caracteres".to_string());
        }
        if subject.chars().count() > 1000 {
            return Err("El asunto no debe superar los 1000 caracteres".to_string());
        }

        if !matches!(
            self.policy_accepted.trim().to_lowercase().as_str(),
            "true" | "on" | "1"
        ) {
            return Err("Debe aceptar las políticas de privacidad".to_string());
        }

        Ok(CaseDescription {
            dni: dni.to_string(),
            document_type,
            document_count,
            folio_count,
            subject: subject.to_string(),
        })
    }
}

fn parse_positive(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok().filter(|n| *n >= 1)
}

/// Result of a successful submission.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmissionResponse {
    pub case_number: String,
    pub status: CaseStatus,
    pub attachments_accepted: Vec<AttachmentResponse>,
    pub attachments_rejected: Vec<RejectedAttachment>,
    pub message: String,
}
