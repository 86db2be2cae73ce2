//! Database queries for external users and the verification handshake.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Select,
    Set,
};
use uuid::Uuid;

use crate::entity::external_user::{self, ActiveModel, Entity as ExternalUser};
use crate::error::{AppError, AppResult};
use crate::models::Identity;

use super::DbPool;

/// Insert or overwrite the user row for this DNI with a fresh code.
///
/// Contact data is replaced and the verified flag is reset. Concurrent calls
/// for the same DNI are last-write-wins.
pub async fn upsert_pending_verification<C: ConnectionTrait>(
    conn: &C,
    identity: &Identity,
    code: &str,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> AppResult<external_user::Model> {
    let model = ActiveModel {
        id: Set(Uuid::now_v7()),
        dni: Set(identity.dni.clone()),
        email: Set(identity.email.clone()),
        first_names: Set(identity.first_names.clone()),
        last_names: Set(identity.last_names.clone()),
        phone: Set(identity.phone.clone()),
        email_verified: Set(false),
        verification_code: Set(Some(code.to_string())),
        verification_expires_at: Set(Some(expires_at)),
        verified_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    ExternalUser::insert(model)
        .on_conflict(
            OnConflict::column(external_user::Column::Dni)
                .update_columns([
                    external_user::Column::Email,
                    external_user::Column::FirstNames,
                    external_user::Column::LastNames,
                    external_user::Column::Phone,
                    external_user::Column::EmailVerified,
                    external_user::Column::VerificationCode,
                    external_user::Column::VerificationExpiresAt,
                    external_user::Column::VerifiedAt,
                    external_user::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to upsert external user: {}", e)))?;

    find_by_dni(conn, &identity.dni)
        .await?
        .ok_or_else(|| AppError::Database("External user missing after upsert".to_string()))
}

/// Look up a user by DNI.
pub async fn find_by_dni<C: ConnectionTrait>(
    conn: &C,
    dni: &str,
) -> AppResult<Option<external_user::Model>> {
    ExternalUser::find()
        .filter(external_user::Column::Dni.eq(dni))
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get external user: {}", e)))
}

fn verified_by_dni(dni: &str) -> Select<ExternalUser> {
    ExternalUser::find()
        .filter(external_user::Column::Dni.eq(dni))
        .filter(external_user::Column::EmailVerified.eq(true))
}

/// Look up a user by DNI only if its email is currently verified.
pub async fn find_verified_by_dni<C: ConnectionTrait>(
    conn: &C,
    dni: &str,
) -> AppResult<Option<external_user::Model>> {
    verified_by_dni(dni)
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to get verified user: {}", e)))
}

/// Like [`find_verified_by_dni`], but holds a shared row lock until the
/// surrounding transaction ends. A concurrent re-issue for the same DNI blocks
/// until then. SQLite has no row locks and serialises writers instead.
pub async fn lock_verified_by_dni<C: ConnectionTrait>(
    conn: &C,
    dni: &str,
) -> AppResult<Option<external_user::Model>> {
    verified_by_dni(dni)
        .lock_shared()
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to lock verified user: {}", e)))
}

/// Mark the user verified if `code` is still the stored code.
///
/// Returns false when another request consumed or replaced the code first.
pub async fn consume_code<C: ConnectionTrait>(
    conn: &C,
    dni: &str,
    code: &str,
    now: DateTime<Utc>,
) -> AppResult<bool> {
    let result = ExternalUser::update_many()
        .col_expr(external_user::Column::EmailVerified, Expr::value(true))
        .col_expr(external_user::Column::VerifiedAt, Expr::value(Some(now)))
        .col_expr(
            external_user::Column::VerificationCode,
            Expr::value(Option::<String>::None),
        )
        .col_expr(
            external_user::Column::VerificationExpiresAt,
            Expr::value(Option::<DateTime<Utc>>::None),
        )
        .col_expr(external_user::Column::UpdatedAt, Expr::value(now))
        .filter(external_user::Column::Dni.eq(dni))
        .filter(external_user::Column::VerificationCode.eq(code))
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to consume verification code: {}", e)))?;

    Ok(result.rows_affected == 1)
}

/// Clear `code` if it is still the stored one. Used when delivery fails.
pub async fn withdraw_code<C: ConnectionTrait>(conn: &C, dni: &str, code: &str) -> AppResult<bool> {
    let result = ExternalUser::update_many()
        .col_expr(
            external_user::Column::VerificationCode,
            Expr::value(Option::<String>::None),
        )
        .col_expr(
            external_user::Column::VerificationExpiresAt,
            Expr::value(Option::<DateTime<Utc>>::None),
        )
        .filter(external_user::Column::Dni.eq(dni))
        .filter(external_user::Column::VerificationCode.eq(code))
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to withdraw verification code: {}", e)))?;

    Ok(result.rows_affected == 1)
}

impl DbPool {
    /// Total registered external users.
    pub async fn count_external_users(&self) -> AppResult<u64> {
        ExternalUser::find()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count external users: {}", e)))
    }
}
