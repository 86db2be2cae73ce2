//! Database queries for attachments.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::attachment::{self, ActiveModel, Entity as Attachment};
use crate::error::{AppError, AppResult};
use crate::models::AttachmentKind;

use super::DbPool;

/// An object already written to storage, waiting for its row.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub id: Uuid,
    pub original_filename: String,
    pub storage_key: String,
    pub kind: AttachmentKind,
    pub size_bytes: i64,
    pub mime_type: Option<String>,
}

/// Insert the attachment row for an uploaded file.
pub async fn insert_attachment<C: ConnectionTrait>(
    conn: &C,
    case_id: Uuid,
    file: &StoredFile,
    now: DateTime<Utc>,
) -> AppResult<attachment::Model> {
    let model = ActiveModel {
        id: Set(file.id),
        case_id: Set(case_id),
        original_filename: Set(file.original_filename.clone()),
        storage_key: Set(file.storage_key.clone()),
        kind: Set(file.kind.as_str().to_string()),
        size_bytes: Set(file.size_bytes),
        mime_type: Set(file.mime_type.clone()),
        created_at: Set(now),
    };

    model
        .insert(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert attachment: {}", e)))
}

impl DbPool {
    /// Attachments of a case, oldest first (the primary file comes first).
    pub async fn list_attachments(&self, case_id: Uuid) -> AppResult<Vec<attachment::Model>> {
        Attachment::find()
            .filter(attachment::Column::CaseId.eq(case_id))
            .order_by_asc(attachment::Column::CreatedAt)
            .order_by_asc(attachment::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list attachments: {}", e)))
    }

    /// Get an attachment by ID.
    pub async fn get_attachment(&self, id: Uuid) -> AppResult<Option<attachment::Model>> {
        Attachment::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get attachment: {}", e)))
    }
}
