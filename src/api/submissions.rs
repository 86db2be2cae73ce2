//! Citizen submission endpoints: identify, verify, submit.

use actix_multipart::{Field, Multipart};
use actix_web::{HttpResponse, post, web};
use futures_util::StreamExt;

use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{IdentifyRequest, SubmissionForm, VerifyCodeRequest};
use crate::services::storage::BlobStore;
use crate::services::submission::{self, SubmissionDeps, SubmissionInput, UploadedFile};
use crate::services::{verification, Mailer};

/// Multipart field holding the mandatory main document.
pub const PRIMARY_FIELD: &str = "archivo_principal";
/// Multipart field holding supplementary documents (repeatable).
pub const SUPPLEMENTARY_FIELD: &str = "archivos_complementarios";

/// Upper bound for a text field in the submission form.
const MAX_TEXT_FIELD_BYTES: usize = 16 * 1024;

/// Configure submission routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(identify).service(verify).service(submit);
}

/// Start a submission: register identity and email a verification code.
#[utoipa::path(
    post,
    path = "/api/v1/submissions/identify",
    tag = "Submissions",
    request_body = IdentifyRequest,
    responses(
        (status = 200, description = "Code issued and emailed", body = crate::models::IdentifyResponse),
        (status = 400, description = "Invalid identity data", body = crate::error::ErrorResponse),
        (status = 502, description = "Email could not be delivered", body = crate::error::ErrorResponse),
    )
)]
#[post("/submissions/identify")]
pub async fn identify(
    pool: web::Data<DbPool>,
    mailer: web::Data<dyn Mailer>,
    body: web::Json<IdentifyRequest>,
) -> AppResult<HttpResponse> {
    let response = verification::issue(pool.get_ref(), mailer.get_ref(), &body).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Confirm the emailed verification code.
#[utoipa::path(
    post,
    path = "/api/v1/submissions/verify",
    tag = "Submissions",
    request_body = VerifyCodeRequest,
    responses(
        (status = 200, description = "Email verified", body = crate::models::VerifyCodeResponse),
        (status = 400, description = "Malformed or wrong code", body = crate::error::ErrorResponse),
        (status = 410, description = "Code expired", body = crate::error::ErrorResponse),
    )
)]
#[post("/submissions/verify")]
pub async fn verify(
    pool: web::Data<DbPool>,
    body: web::Json<VerifyCodeRequest>,
) -> AppResult<HttpResponse> {
    let response = verification::validate(pool.get_ref(), &body).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Submit the case description and attachments.
///
/// Multipart fields: `dni`, `tipo_documento`, `cantidad_documentos`,
/// `cantidad_folios`, `asunto`, `aceptacion_politicas`, one
/// `archivo_principal` file and any number of `archivos_complementarios`.
#[utoipa::path(
    post,
    path = "/api/v1/submissions",
    tag = "Submissions",
    request_body(content_type = "multipart/form-data", description = "Case form and files"),
    responses(
        (status = 201, description = "Case created", body = crate::models::SubmissionResponse),
        (status = 400, description = "Invalid form", body = crate::error::ErrorResponse),
        (status = 403, description = "Email not verified", body = crate::error::ErrorResponse),
        (status = 413, description = "File too large", body = crate::error::ErrorResponse),
        (status = 502, description = "Storage unavailable", body = crate::error::ErrorResponse),
    )
)]
#[post("/submissions")]
pub async fn submit(
    pool: web::Data<DbPool>,
    store: web::Data<dyn BlobStore>,
    mailer: web::Data<dyn Mailer>,
    config: web::Data<Config>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let max_file_size = config.limits.max_file_size;
    let mut input = SubmissionInput::default();

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::Validation(format!("Formulario inválido: {}", e)))?;

        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        match (name.as_str(), filename) {
            (PRIMARY_FIELD, Some(filename)) => {
                if input.primary.is_some() {
                    return Err(AppError::Validation(
                        "Solo se permite un documento principal".to_string(),
                    ));
                }
                let data = read_bounded(&mut field, max_file_size + 1).await?;
                input.primary = Some(UploadedFile { filename, data });
            }
            (SUPPLEMENTARY_FIELD | "archivos_complementarios[]", Some(filename)) => {
                let data = read_bounded(&mut field, max_file_size + 1).await?;
                // Browsers send an empty part when no file was chosen.
                if filename.is_empty() && data.is_empty() {
                    continue;
                }
                input.supplementary.push(UploadedFile { filename, data });
            }
            (_, Some(_)) => {
                drain(&mut field).await?;
            }
            (text_field, None) => {
                let data = read_bounded(&mut field, MAX_TEXT_FIELD_BYTES + 1).await?;
                if data.len() > MAX_TEXT_FIELD_BYTES {
                    return Err(AppError::Validation(format!(
                        "El campo '{}' es demasiado largo",
                        text_field
                    )));
                }
                let value = String::from_utf8(data).map_err(|_| {
                    AppError::Validation(format!("El campo '{}' no es texto válido", text_field))
                })?;
                input.form.set(text_field, value);
            }
        }
    }

    let deps = SubmissionDeps {
        pool: pool.get_ref(),
        store: store.get_ref(),
        mailer: mailer.get_ref(),
        config: config.get_ref(),
    };
    let response = submission::submit(&deps, input).await?;

    Ok(HttpResponse::Created().json(response))
}

/// Read a field, keeping at most `limit` bytes. The rest is consumed and dropped
/// so an oversized part can be reported without buffering it.
async fn read_bounded(field: &mut Field, limit: usize) -> AppResult<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk =
            chunk.map_err(|e| AppError::Validation(format!("Error al leer el archivo: {}", e)))?;
        let room = limit.saturating_sub(data.len());
        data.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }
    Ok(data)
}

async fn drain(field: &mut Field) -> AppResult<()> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| AppError::Validation(format!("Error al leer el archivo: {}", e)))?;
    }
    Ok(())
}
