//! Attachment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::attachment;

/// Role of an attached file within a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AttachmentKind {
    /// The main document, exactly one per case
    #[serde(rename = "PRINCIPAL")]
    Primary,
    /// Optional supporting documents
    #[serde(rename = "COMPLEMENTARIO")]
    Supplementary,
}

impl AttachmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "PRINCIPAL",
            Self::Supplementary => "COMPLEMENTARIO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PRINCIPAL" => Some(Self::Primary),
            "COMPLEMENTARIO" => Some(Self::Supplementary),
            _ => None,
        }
    }

    /// Storage key segment for this kind.
    pub fn key_segment(&self) -> &'static str {
        match self {
            Self::Primary => "principal",
            Self::Supplementary => "complementario",
        }
    }
}

/// Attachment metadata returned by the API. The storage key is never exposed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttachmentResponse {
    pub id: Uuid,
    pub original_filename: String,
    pub kind: AttachmentKind,
    pub size_bytes: i64,
    pub mime_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<attachment::Model> for AttachmentResponse {
    fn from(m: attachment::Model) -> Self {
        Self {
            id: m.id,
            original_filename: m.original_filename,
            kind: AttachmentKind::parse(&m.kind).unwrap_or(AttachmentKind::Supplementary),
            size_bytes: m.size_bytes,
            mime_type: m.mime_type,
            created_at: m.created_at,
        }
    }
}

/// A file the submission workflow could not attach.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RejectedAttachment {
    pub filename: String,
    pub reason: String,
}
