//! Database queries for the movement log. Rows are only ever inserted.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::administrator::{self, Entity as Administrator};
use crate::entity::movement::{self, ActiveModel, Entity as Movement};
use crate::error::{AppError, AppResult};
use crate::models::MovementType;

use super::DbPool;

/// Append a movement. `administrator_id` is None for system entries.
pub async fn insert_movement<C: ConnectionTrait>(
    conn: &C,
    case_id: Uuid,
    administrator_id: Option<Uuid>,
    movement_type: MovementType,
    description: &str,
    now: DateTime<Utc>,
) -> AppResult<movement::Model> {
    let model = ActiveModel {
        id: Set(Uuid::now_v7()),
        case_id: Set(case_id),
        administrator_id: Set(administrator_id),
        movement_type: Set(movement_type.as_str().to_string()),
        description: Set(description.to_string()),
        created_at: Set(now),
    };

    model
        .insert(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert movement: {}", e)))
}

impl DbPool {
    /// Movements of a case, newest first, each with its acting administrator.
    pub async fn list_movements(
        &self,
        case_id: Uuid,
    ) -> AppResult<Vec<(movement::Model, Option<administrator::Model>)>> {
        Movement::find()
            .filter(movement::Column::CaseId.eq(case_id))
            .order_by_desc(movement::Column::CreatedAt)
            .order_by_desc(movement::Column::Id)
            .find_also_related(Administrator)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list movements: {}", e)))
    }
}
