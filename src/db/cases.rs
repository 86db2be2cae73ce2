//! Database queries for cases.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entity::case_file::{self, ActiveModel, Entity as CaseFile};
use crate::entity::external_user::{self, Entity as ExternalUser};
use crate::error::{AppError, AppResult};
use crate::models::{CaseDescription, CaseNumber, CaseStatus, ListCasesQuery};

use super::DbPool;

/// A case paired with its owner, if the owner row still exists.
pub type CaseWithOwner = (case_file::Model, Option<external_user::Model>);

/// Insert a new case in PENDIENTE status with the policy accepted at `now`.
pub async fn insert_case<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    case_number: CaseNumber,
    external_user_id: Uuid,
    description: &CaseDescription,
    now: DateTime<Utc>,
) -> AppResult<case_file::Model> {
    let model = ActiveModel {
        id: Set(id),
        case_number: Set(case_number.to_string()),
        external_user_id: Set(external_user_id),
        document_type: Set(description.document_type.as_str().to_string()),
        document_count: Set(description.document_count),
        folio_count: Set(description.folio_count),
        subject: Set(description.subject.clone()),
        status: Set(CaseStatus::Pending.as_str().to_string()),
        policy_accepted: Set(true),
        policy_accepted_at: Set(Some(now)),
        created_at: Set(now),
        updated_at: Set(now),
    };

    model
        .insert(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert case: {}", e)))
}

/// Get a case by ID on any connection.
pub async fn find_by_id<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> AppResult<Option<case_file::Model>> {
    CaseFile::find_by_id(id)
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get case: {}", e)))
}

/// Overwrite the status of a case.
pub async fn update_status<C: ConnectionTrait>(
    conn: &C,
    case: case_file::Model,
    status: CaseStatus,
    now: DateTime<Utc>,
) -> AppResult<case_file::Model> {
    let mut active: ActiveModel = case.into();
    active.status = Set(status.as_str().to_string());
    active.updated_at = Set(now);

    active
        .update(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to update case status: {}", e)))
}

impl DbPool {
    /// Get a case and its owner by case number.
    pub async fn get_case_by_number(&self, case_number: &CaseNumber) -> AppResult<Option<CaseWithOwner>> {
        CaseFile::find()
            .filter(case_file::Column::CaseNumber.eq(case_number.to_string()))
            .find_also_related(ExternalUser)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get case by number: {}", e)))
    }

    /// Get a case and its owner by ID.
    pub async fn get_case_with_owner(&self, id: Uuid) -> AppResult<Option<CaseWithOwner>> {
        CaseFile::find_by_id(id)
            .find_also_related(ExternalUser)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get case: {}", e)))
    }

    /// List cases, newest first, with an optional status filter.
    pub async fn list_cases(
        &self,
        query: &ListCasesQuery,
        status: Option<CaseStatus>,
    ) -> AppResult<(Vec<CaseWithOwner>, u64)> {
        let mut select = CaseFile::find();
        if let Some(status) = status {
            select = select.filter(case_file::Column::Status.eq(status.as_str()));
        }

        // Count total before pagination
        let total = select
            .clone()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count cases: {}", e)))?;

        let cases = select
            .order_by_desc(case_file::Column::CreatedAt)
            .order_by_desc(case_file::Column::Id)
            .offset(query.offset())
            .limit(u64::from(query.clamped_limit()))
            .find_also_related(ExternalUser)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list cases: {}", e)))?;

        Ok((cases, total))
    }

    /// Most recently created cases.
    pub async fn recent_cases(&self, limit: u64) -> AppResult<Vec<CaseWithOwner>> {
        CaseFile::find()
            .order_by_desc(case_file::Column::CreatedAt)
            .order_by_desc(case_file::Column::Id)
            .limit(limit)
            .find_also_related(ExternalUser)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list recent cases: {}", e)))
    }

    /// Total number of cases.
    pub async fn count_cases(&self) -> AppResult<u64> {
        CaseFile::find()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count cases: {}", e)))
    }

    /// Number of cases per status, in status order, zero counts included.
    pub async fn count_cases_by_status(&self) -> AppResult<Vec<(CaseStatus, u64)>> {
        let mut counts = Vec::with_capacity(CaseStatus::ALL.len());
        for status in CaseStatus::ALL {
            let count = CaseFile::find()
                .filter(case_file::Column::Status.eq(status.as_str()))
                .count(self.connection())
                .await
                .map_err(|e| AppError::Database(format!("Failed to count cases: {}", e)))?;
            counts.push((status, count));
        }
        Ok(counts)
    }
}
