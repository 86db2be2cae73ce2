//! Administrator movement log and status transitions.
//!
//! A movement and the status change it carries are written in one
//! transaction. Status never changes without a movement.

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::db::{cases, movements, DbPool};
use crate::error::{AppError, AppResult};
use crate::models::{
    CaseStatus, CaseSummary, ChangeStatusRequest, MovementResponse, MovementType, NewMovement,
    Principal, RecordMovementRequest,
};

/// Outcome of a movement: the entry written and the case as it now stands.
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct MovementOutcome {
    pub movement: MovementResponse,
    pub case: CaseSummary,
}

/// Record a movement, optionally changing the case status.
pub async fn record(
    pool: &DbPool,
    principal: &Principal,
    case_id: Uuid,
    request: &RecordMovementRequest,
) -> AppResult<MovementOutcome> {
    let movement = request.validate().map_err(AppError::Validation)?;
    apply(pool, principal, case_id, movement, Utc::now()).await
}

/// Change a case status. Writes an `OTRO` movement describing the change.
pub async fn change_status(
    pool: &DbPool,
    principal: &Principal,
    case_id: Uuid,
    request: &ChangeStatusRequest,
) -> AppResult<MovementOutcome> {
    let new_status = request.validate().map_err(AppError::Validation)?;
    let note = request
        .description
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    apply_with(pool, principal, case_id, Utc::now(), |current| {
        let mut description = format!("Estado cambiado de {} a {}", current, new_status);
        if let Some(note) = note {
            description.push_str(": ");
            description.push_str(note);
        }
        NewMovement {
            movement_type: MovementType::Other,
            description,
            new_status: Some(new_status),
        }
    })
    .await
}

/// Write `movement` and its status change atomically.
pub async fn apply(
    pool: &DbPool,
    principal: &Principal,
    case_id: Uuid,
    movement: NewMovement,
    now: DateTime<Utc>,
) -> AppResult<MovementOutcome> {
    apply_with(pool, principal, case_id, now, |_| movement).await
}

/// `build` sees the status read inside the transaction. A movement whose new
/// status equals that status is rejected before anything is written.
async fn apply_with(
    pool: &DbPool,
    principal: &Principal,
    case_id: Uuid,
    now: DateTime<Utc>,
    build: impl FnOnce(&str) -> NewMovement,
) -> AppResult<MovementOutcome> {
    let txn = pool.begin().await?;

    let case = cases::find_by_id(&txn, case_id)
        .await?
        .ok_or_else(|| case_not_found(case_id))?;

    let movement = build(&case.status);
    if let Some(status) = movement.new_status {
        if !is_transition(&case.status, status) {
            return Err(AppError::Validation(format!(
                "El expediente ya se encuentra en estado {}",
                status
            )));
        }
    }

    let entry = movements::insert_movement(
        &txn,
        case.id,
        Some(principal.admin_id),
        movement.movement_type,
        &movement.description,
        now,
    )
    .await?;

    let case = match movement.new_status {
        Some(status) => cases::update_status(&txn, case, status, now).await?,
        None => case,
    };

    txn.commit()
        .await
        .map_err(|e| AppError::Database(format!("Failed to commit movement: {}", e)))?;

    info!(
        case_number = %case.case_number,
        admin_id = %principal.admin_id,
        movement_type = %movement.movement_type,
        status = %case.status,
        "Movement recorded"
    );

    let admin_name = pool
        .get_admin_by_id(principal.admin_id)
        .await?
        .map(|a| format!("{} {}", a.first_names, a.last_names));

    Ok(MovementOutcome {
        movement: MovementResponse::from_model(entry, admin_name),
        case: CaseSummary::from_model(case, None),
    })
}

fn case_not_found(case_id: Uuid) -> AppError {
    AppError::NotFound(format!("Expediente {} no encontrado", case_id))
}

fn is_transition(from: &str, to: CaseStatus) -> bool {
    CaseStatus::parse(from) != Some(to)
}
