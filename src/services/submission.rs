//! Case submission workflow: validate, upload, persist, confirm.
//!
//! Blobs are uploaded before the database transaction opens. If the
//! transaction fails every uploaded blob is deleted again, so a failed
//! submission leaves neither rows nor objects behind.

use chrono::{DateTime, Datelike, Utc};
use sea_orm::DatabaseTransaction;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::db::attachments::{self, StoredFile};
use crate::db::{case_numbers, cases, movements, DbPool};
use crate::entity::{attachment, case_file, external_user};
use crate::error::{AppError, AppResult};
use crate::models::{
    AttachmentKind, AttachmentResponse, CaseDescription, CaseNumber, CaseStatus, MovementType,
    RejectedAttachment, SubmissionForm, SubmissionResponse,
};
use crate::services::mailer::{self, Mailer};
use crate::services::storage::{self, BlobStore};
use crate::services::verification;

/// A file received from the client, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Everything the final submission step receives.
#[derive(Debug, Clone, Default)]
pub struct SubmissionInput {
    pub form: SubmissionForm,
    pub primary: Option<UploadedFile>,
    pub supplementary: Vec<UploadedFile>,
}

/// Collaborators the workflow needs.
pub struct SubmissionDeps<'a> {
    pub pool: &'a DbPool,
    pub store: &'a dyn BlobStore,
    pub mailer: &'a dyn Mailer,
    pub config: &'a Config,
}

/// Check a single file against the accepted types and the size limit.
pub fn validate_file(file: &UploadedFile, max_file_size: usize) -> AppResult<()> {
    if file.data.is_empty() {
        return Err(AppError::Validation(format!(
            "El archivo '{}' está vacío",
            file.filename
        )));
    }
    if !storage::is_allowed_extension(&file.filename) {
        return Err(AppError::Validation(format!(
            "Tipo de archivo no permitido: '{}'. Formatos aceptados: {}",
            file.filename,
            storage::ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    if file.data.len() > max_file_size {
        return Err(AppError::PayloadTooLarge(format!(
            "El archivo '{}' excede el tamaño máximo de {} MB",
            file.filename,
            max_file_size / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Run the final submission step.
pub async fn submit(deps: &SubmissionDeps<'_>, input: SubmissionInput) -> AppResult<SubmissionResponse> {
    submit_at(deps, input, Utc::now()).await
}

/// [`submit`] with an explicit clock.
pub async fn submit_at(
    deps: &SubmissionDeps<'_>,
    input: SubmissionInput,
    now: DateTime<Utc>,
) -> AppResult<SubmissionResponse> {
    let limits = deps.config.limits;

    let description = input.form.validate().map_err(AppError::Validation)?;

    let primary = input.primary.ok_or_else(|| {
        AppError::Validation("Debe adjuntar el documento principal".to_string())
    })?;
    validate_file(&primary, limits.max_file_size)?;

    if input.supplementary.len() > limits.max_supplementary_files {
        return Err(AppError::Validation(format!(
            "Máximo {} archivos complementarios",
            limits.max_supplementary_files
        )));
    }

    // Cheap early rejection; the authoritative check runs inside the transaction.
    verification::check_verified(deps.pool.connection(), &description.dni).await?;

    let case_id = Uuid::now_v7();

    let primary_file = upload(deps.store, case_id, AttachmentKind::Primary, primary).await?;
    let mut stored = vec![primary_file];

    let mut rejected = Vec::new();
    for file in input.supplementary {
        let filename = file.filename.clone();
        let outcome = match validate_file(&file, limits.max_file_size) {
            Ok(()) => upload(deps.store, case_id, AttachmentKind::Supplementary, file).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(stored_file) => stored.push(stored_file),
            Err(e) => {
                warn!(case_id = %case_id, filename = %filename, "Skipping supplementary file: {}", e);
                rejected.push(RejectedAttachment {
                    filename,
                    reason: rejection_reason(&e),
                });
            }
        }
    }

    let year = now.with_timezone(&deps.config.office_offset).year();
    let persisted = match deps.pool.begin().await {
        Ok(txn) => match persist_case(&txn, case_id, year, &description, &stored, now).await {
            Ok(persisted) => txn
                .commit()
                .await
                .map(|_| persisted)
                .map_err(|e| AppError::Database(format!("Failed to commit case: {}", e))),
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };

    let (case, owner, attachment_rows) = match persisted {
        Ok(persisted) => persisted,
        Err(e) => {
            discard_uploads(deps.store, &stored).await;
            return Err(e);
        }
    };

    let case_number = CaseNumber::parse(&case.case_number)?;
    info!(
        case_number = %case_number,
        dni = %owner.dni,
        attachments = attachment_rows.len(),
        rejected = rejected.len(),
        "Case created"
    );

    let full_name = format!("{} {}", owner.first_names, owner.last_names);
    let email = mailer::confirmation_email(
        &owner.email,
        &full_name,
        &case_number,
        &description,
        &deps.config.mail.public_url,
    );
    if let Err(e) = deps.mailer.send(email).await {
        warn!(case_number = %case_number, "Failed to send confirmation email: {}", e);
    }

    Ok(SubmissionResponse {
        case_number: case.case_number,
        status: CaseStatus::Pending,
        attachments_accepted: attachment_rows.into_iter().map(Into::into).collect(),
        attachments_rejected: rejected,
        message: format!(
            "Expediente {} registrado correctamente. Guarde este número para consultar su trámite.",
            case_number
        ),
    })
}

async fn upload(
    store: &dyn BlobStore,
    case_id: Uuid,
    kind: AttachmentKind,
    file: UploadedFile,
) -> AppResult<StoredFile> {
    let id = Uuid::now_v7();
    let original_filename = storage::sanitize_filename(&file.filename);
    let storage_key = storage::attachment_key(case_id, kind, id, &original_filename);
    let mime_type = storage::file_extension(&original_filename)
        .map(|ext| storage::content_type_for_extension(&ext).to_string());
    let size_bytes = file.data.len() as i64;

    store
        .put(&storage_key, file.data, mime_type.as_deref())
        .await?;

    Ok(StoredFile {
        id,
        original_filename,
        storage_key,
        kind,
        size_bytes,
        mime_type,
    })
}

async fn persist_case(
    txn: &DatabaseTransaction,
    case_id: Uuid,
    year: i32,
    description: &CaseDescription,
    files: &[StoredFile],
    now: DateTime<Utc>,
) -> AppResult<(case_file::Model, external_user::Model, Vec<attachment::Model>)> {
    let owner = verification::require_verified(txn, &description.dni).await?;

    let case_number = case_numbers::allocate(txn, year).await?;
    let case = cases::insert_case(txn, case_id, case_number, owner.id, description, now).await?;

    let mut rows = Vec::with_capacity(files.len());
    for file in files {
        rows.push(attachments::insert_attachment(txn, case.id, file, now).await?);
    }

    let note = format!(
        "Expediente creado por el ciudadano {} {} (DNI: {})",
        owner.first_names, owner.last_names, owner.dni
    );
    movements::insert_movement(txn, case.id, None, MovementType::Created, &note, now).await?;

    Ok((case, owner, rows))
}

async fn discard_uploads(store: &dyn BlobStore, files: &[StoredFile]) {
    for file in files {
        match store.delete(&file.storage_key).await {
            Ok(()) => warn!(key = %file.storage_key, "Deleted blob of failed submission"),
            Err(e) => warn!(key = %file.storage_key, "Failed to delete orphaned blob: {}", e),
        }
    }
}

fn rejection_reason(err: &AppError) -> String {
    match err {
        AppError::Storage(_) => "No se pudo almacenar el archivo".to_string(),
        other => other.to_string(),
    }
}
