//! Case lookup for citizens and administrators.

use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::db::cases::CaseWithOwner;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::external_user::validate_dni;
use crate::models::{
    AttachmentResponse, CaseDetail, CaseLookupRequest, CaseNumber, CaseOwner, CaseSummary,
    MovementResponse,
};

/// Citizen lookup: the case is returned only if `dni` owns it.
pub async fn lookup(pool: &DbPool, request: &CaseLookupRequest) -> AppResult<CaseDetail> {
    let case_number = CaseNumber::parse(&request.case_number)?;
    let dni = request.dni.trim();
    validate_dni(dni).map_err(AppError::Validation)?;

    let (case, owner) = pool
        .get_case_by_number(&case_number)
        .await?
        .ok_or_else(|| not_found(&case_number.to_string()))?;

    let owns = owner
        .as_ref()
        .is_some_and(|o| bool::from(o.dni.as_bytes().ct_eq(dni.as_bytes())));
    if !owns {
        return Err(AppError::Forbidden(
            "El DNI no corresponde al titular del expediente".to_string(),
        ));
    }

    load_detail(pool, (case, owner), false).await
}

/// Administrator view of a case, including owner contact data.
pub async fn admin_detail(pool: &DbPool, case_id: Uuid) -> AppResult<CaseDetail> {
    let row = pool
        .get_case_with_owner(case_id)
        .await?
        .ok_or_else(|| not_found(&case_id.to_string()))?;

    load_detail(pool, row, true).await
}

/// Convert a case row and its owner into a summary.
pub fn summarize(row: CaseWithOwner, include_contact: bool) -> CaseSummary {
    let (case, owner) = row;
    let owner = owner.map(|o| CaseOwner {
        dni: o.dni,
        first_names: Some(o.first_names),
        last_names: Some(o.last_names),
        email: include_contact.then_some(o.email),
        phone: if include_contact { o.phone } else { None },
    });
    CaseSummary::from_model(case, owner)
}

async fn load_detail(pool: &DbPool, row: CaseWithOwner, include_contact: bool) -> AppResult<CaseDetail> {
    let case_id = row.0.id;

    let attachments = pool
        .list_attachments(case_id)
        .await?
        .into_iter()
        .map(AttachmentResponse::from)
        .collect();

    let movements = pool
        .list_movements(case_id)
        .await?
        .into_iter()
        .map(|(movement, admin)| {
            let admin_name = admin.map(|a| format!("{} {}", a.first_names, a.last_names));
            MovementResponse::from_model(movement, admin_name)
        })
        .collect();

    Ok(CaseDetail {
        case: summarize(row, include_contact),
        attachments,
        movements,
    })
}

fn not_found(case_ref: &str) -> AppError {
    AppError::NotFound(format!("Expediente {} no encontrado", case_ref))
}
