//! Domain models for the Mesa de Partes server.

use utoipa::ToSchema;

pub mod administrator;
pub mod attachment;
pub mod case_file;
pub mod case_number;
pub mod dashboard;
pub mod external_user;
pub mod movement;
pub mod submission;

// Re-export commonly used types
pub use administrator::{
    AdminResponse, AdminRole, LoginRequest, LoginResponse, Principal, SessionClaims,
};
pub use attachment::{AttachmentKind, AttachmentResponse, RejectedAttachment};
pub use case_file::{
    CaseDetail, CaseListResponse, CaseLookupRequest, CaseOwner, CaseStatus, CaseSummary,
    DocumentType, ListCasesQuery,
};
pub use case_number::CaseNumber;
pub use dashboard::{DashboardResponse, StatusCount};
pub use external_user::{
    IdentifyRequest, IdentifyResponse, Identity, VerifyCodeRequest, VerifyCodeResponse,
};
pub use movement::{
    ChangeStatusRequest, MovementResponse, MovementType, NewMovement, RecordMovementRequest,
};
pub use submission::{CaseDescription, SubmissionForm, SubmissionResponse};

/// Pagination metadata for responses.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Pagination {
    /// Create pagination metadata.
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if total == 0 || limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit)) as u32
        };

        Pagination {
            page,
            limit,
            total,
            total_pages,
        }
    }
}
