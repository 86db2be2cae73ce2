//! Administrator movement log and status transitions.

use chrono::Duration;
use sea_orm::{EntityTrait, PaginatorTrait};

use mesa_partes_lib::entity::movement;
use mesa_partes_lib::error::AppError;
use mesa_partes_lib::models::{
    CaseNumber, CaseStatus, ChangeStatusRequest, MovementType, NewMovement, RecordMovementRequest,
};
use mesa_partes_lib::services::movements;
use uuid::Uuid;

use super::test_helpers::*;

async fn case_id(ctx: &TestContext, number: &str) -> Uuid {
    let number = CaseNumber::parse(number).unwrap();
    ctx.pool.get_case_by_number(&number).await.unwrap().unwrap().0.id
}

fn movement(kind: MovementType, description: &str, status: Option<CaseStatus>) -> NewMovement {
    NewMovement {
        movement_type: kind,
        description: description.to_string(),
        new_status: status,
    }
}

#[actix_rt::test]
async fn test_movements_are_listed_newest_first() {
    let ctx = TestContext::new().await;
    let now = march_2025();
    ctx.verify_citizen("12345678", "a@b.com", now).await;
    ctx.submit("12345678", now).await.unwrap();
    let id = case_id(&ctx, "EXP-2025-0001").await;
    let principal = ctx.principal("operador@example.gob.pe").await;

    movements::apply(
        &ctx.pool,
        &principal,
        id,
        movement(MovementType::Received, "Documento recibido", None),
        now + Duration::minutes(5),
    )
    .await
    .unwrap();
    movements::apply(
        &ctx.pool,
        &principal,
        id,
        movement(MovementType::Forwarded, "Derivado a Asesoría Legal", None),
        now + Duration::minutes(30),
    )
    .await
    .unwrap();

    let listed = ctx.pool.list_movements(id).await.unwrap();
    let kinds: Vec<&str> = listed.iter().map(|(m, _)| m.movement_type.as_str()).collect();
    assert_eq!(kinds, ["DERIVADO", "RECIBIDO_CONFORME", "CREADO"]);

    let (_, admin) = &listed[0];
    assert_eq!(admin.as_ref().unwrap().id, principal.admin_id);
    assert!(listed[2].1.is_none());
}

#[actix_rt::test]
async fn test_movement_with_status_updates_case() {
    let ctx = TestContext::new().await;
    let now = march_2025();
    ctx.verify_citizen("12345678", "a@b.com", now).await;
    ctx.submit("12345678", now).await.unwrap();
    let id = case_id(&ctx, "EXP-2025-0001").await;
    let principal = ctx.principal("operador@example.gob.pe").await;

    let later = now + Duration::hours(2);
    let outcome = movements::apply(
        &ctx.pool,
        &principal,
        id,
        movement(
            MovementType::UnderReview,
            "En evaluación por el área técnica",
            Some(CaseStatus::InProgress),
        ),
        later,
    )
    .await
    .unwrap();

    assert_eq!(outcome.case.status, CaseStatus::InProgress);
    assert_eq!(outcome.case.updated_at, later);
    assert_eq!(outcome.movement.movement_type, MovementType::UnderReview);
    assert_eq!(outcome.movement.admin_id, Some(principal.admin_id));
    assert_eq!(
        outcome.movement.admin_name.as_deref(),
        Some("María Huamán Torres")
    );
}

#[actix_rt::test]
async fn test_movement_for_missing_case_writes_nothing() {
    let ctx = TestContext::new().await;
    let principal = ctx.principal("operador@example.gob.pe").await;

    let result = movements::apply(
        &ctx.pool,
        &principal,
        Uuid::now_v7(),
        movement(MovementType::Other, "Nota", Some(CaseStatus::Resolved)),
        march_2025(),
    )
    .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    let count = movement::Entity::find()
        .count(ctx.pool.connection())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[actix_rt::test]
async fn test_change_status_records_transition() {
    let ctx = TestContext::new().await;
    let now = march_2025();
    ctx.verify_citizen("12345678", "a@b.com", now).await;
    ctx.submit("12345678", now).await.unwrap();
    let id = case_id(&ctx, "EXP-2025-0001").await;
    let principal = ctx.principal("operador@example.gob.pe").await;

    let outcome = movements::change_status(
        &ctx.pool,
        &principal,
        id,
        &ChangeStatusRequest {
            new_status: "RESUELTO".to_string(),
            description: Some("Resolución N° 015-2025".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.case.status, CaseStatus::Resolved);
    assert_eq!(outcome.movement.movement_type, MovementType::Other);
    assert_eq!(
        outcome.movement.description,
        "Estado cambiado de PENDIENTE a RESUELTO: Resolución N° 015-2025"
    );

    // Same status again is refused and leaves the log alone.
    let again = movements::change_status(
        &ctx.pool,
        &principal,
        id,
        &ChangeStatusRequest {
            new_status: "RESUELTO".to_string(),
            description: None,
        },
    )
    .await;
    assert!(matches!(again, Err(AppError::Validation(_))));
    assert_eq!(ctx.pool.list_movements(id).await.unwrap().len(), 2);
}

#[actix_rt::test]
async fn test_recorded_movement_with_current_status_is_rejected() {
    let ctx = TestContext::new().await;
    let now = march_2025();
    ctx.verify_citizen("12345678", "a@b.com", now).await;
    ctx.submit("12345678", now).await.unwrap();
    let id = case_id(&ctx, "EXP-2025-0001").await;
    let principal = ctx.principal("operador@example.gob.pe").await;

    let result = movements::record(
        &ctx.pool,
        &principal,
        id,
        &RecordMovementRequest {
            movement_type: "EN_REVISION".to_string(),
            description: "Revisión inicial".to_string(),
            new_status: Some("PENDIENTE".to_string()),
        },
    )
    .await;

    match result {
        Err(AppError::Validation(msg)) => assert!(msg.contains("PENDIENTE"), "{msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }
    let (case, _) = ctx.pool.get_case_with_owner(id).await.unwrap().unwrap();
    assert_eq!(case.updated_at, now);
    assert_eq!(ctx.pool.list_movements(id).await.unwrap().len(), 1);

    // Without a status the same movement is fine.
    let outcome = movements::record(
        &ctx.pool,
        &principal,
        id,
        &RecordMovementRequest {
            movement_type: "EN_REVISION".to_string(),
            description: "Revisión inicial".to_string(),
            new_status: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(outcome.case.status, CaseStatus::Pending);
}
