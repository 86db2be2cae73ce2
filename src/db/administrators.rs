//! Database queries for administrators.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::administrator::{self, ActiveModel, Entity as Administrator};
use crate::error::{AppError, AppResult};
use crate::models::AdminRole;

use super::DbPool;

/// Fields for creating or resetting an administrator.
#[derive(Debug, Clone)]
pub struct NewAdministrator {
    pub email: String,
    pub password_hash: String,
    pub first_names: String,
    pub last_names: String,
    pub role: AdminRole,
}

impl DbPool {
    /// Get an administrator by email (lower-cased).
    pub async fn get_admin_by_email(&self, email: &str) -> AppResult<Option<administrator::Model>> {
        Administrator::find()
            .filter(administrator::Column::Email.eq(email.trim().to_lowercase()))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get administrator: {}", e)))
    }

    /// Get an administrator by ID.
    pub async fn get_admin_by_id(&self, id: Uuid) -> AppResult<Option<administrator::Model>> {
        Administrator::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get administrator: {}", e)))
    }

    /// Create an administrator, or reset password, names and role of an
    /// existing one with the same email. The account is (re)activated.
    pub async fn upsert_admin(&self, new: NewAdministrator) -> AppResult<administrator::Model> {
        let now = Utc::now();
        let email = new.email.trim().to_lowercase();

        match self.get_admin_by_email(&email).await? {
            Some(existing) => {
                let mut active: ActiveModel = existing.into();
                active.password_hash = Set(new.password_hash);
                active.first_names = Set(new.first_names);
                active.last_names = Set(new.last_names);
                active.role = Set(new.role.as_str().to_string());
                active.active = Set(true);
                active.updated_at = Set(now);
                active
                    .update(self.connection())
                    .await
                    .map_err(|e| AppError::Database(format!("Failed to update administrator: {}", e)))
            }
            None => {
                let model = ActiveModel {
                    id: Set(Uuid::now_v7()),
                    email: Set(email),
                    password_hash: Set(new.password_hash),
                    first_names: Set(new.first_names),
                    last_names: Set(new.last_names),
                    role: Set(new.role.as_str().to_string()),
                    active: Set(true),
                    last_login_at: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                model
                    .insert(self.connection())
                    .await
                    .map_err(|e| AppError::Database(format!("Failed to insert administrator: {}", e)))
            }
        }
    }

    /// Record a successful login.
    pub async fn touch_admin_login(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        Administrator::update_many()
            .col_expr(administrator::Column::LastLoginAt, Expr::value(Some(now)))
            .filter(administrator::Column::Id.eq(id))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update last login: {}", e)))?;
        Ok(())
    }

    /// Enable or disable an administrator account.
    pub async fn set_admin_active(&self, id: Uuid, active: bool) -> AppResult<()> {
        let result = Administrator::update_many()
            .col_expr(administrator::Column::Active, Expr::value(active))
            .col_expr(administrator::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(administrator::Column::Id.eq(id))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update administrator: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Administrator {} not found", id)));
        }
        Ok(())
    }
}
