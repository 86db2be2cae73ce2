//! Citizen case lookup.

use actix_web::{HttpResponse, post, web};

use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::CaseLookupRequest;
use crate::services::case_query;

/// Configure case lookup routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(lookup_case);
}

/// Look up a case by number. The DNI travels in the body and must match the owner.
#[utoipa::path(
    post,
    path = "/api/v1/cases/lookup",
    tag = "Cases",
    request_body = CaseLookupRequest,
    responses(
        (status = 200, description = "Case with attachments and movements", body = crate::models::CaseDetail),
        (status = 400, description = "Malformed case number or DNI", body = crate::error::ErrorResponse),
        (status = 403, description = "DNI does not own the case", body = crate::error::ErrorResponse),
        (status = 404, description = "Case not found", body = crate::error::ErrorResponse),
    )
)]
#[post("/cases/lookup")]
pub async fn lookup_case(
    pool: web::Data<DbPool>,
    body: web::Json<CaseLookupRequest>,
) -> AppResult<HttpResponse> {
    let detail = case_query::lookup(pool.get_ref(), &body).await?;
    Ok(HttpResponse::Ok().json(detail))
}
