//! Case submission: end-to-end flow, numbering, partial uploads, compensation.

use std::collections::HashSet;

use actix_web::test;
use chrono::{Datelike, TimeZone, Utc};
use futures_util::future::join_all;
use sea_orm::ConnectionTrait;
use serde_json::Value;

use mesa_partes_lib::error::AppError;
use mesa_partes_lib::models::{AttachmentKind, CaseNumber, CaseStatus, MovementType};
use mesa_partes_lib::services::submission::{self, SubmissionInput, UploadedFile};

use super::test_helpers::*;

#[actix_rt::test]
async fn test_end_to_end_submission_over_http() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;

    let req = test::TestRequest::post()
        .uri("/api/v1/submissions/identify")
        .set_json(serde_json::json!({
            "dni": "12345678",
            "email": "a@b.com",
            "nombres": "Juan Carlos",
            "apellidos": "Pérez Quispe",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let code = ctx.current_code("12345678").await.unwrap();
    assert_eq!(code.len(), 6);

    let req = test::TestRequest::post()
        .uri("/api/v1/submissions/verify")
        .set_json(serde_json::json!({ "dni": "12345678", "codigo": code }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["verified"], true);

    let payload = multipart_body(
        &[
            ("dni", "12345678"),
            ("tipo_documento", "Solicitud"),
            ("cantidad_documentos", "1"),
            ("cantidad_folios", "2"),
            ("asunto", "Solicito copia certificada de resolución"),
            ("aceptacion_politicas", "true"),
        ],
        &[("archivo_principal", "solicitud.pdf", b"%PDF-1.4 content")],
    );
    let req = test::TestRequest::post()
        .uri("/api/v1/submissions")
        .insert_header(("Content-Type", multipart_content_type()))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;

    let year = Utc::now().with_timezone(&ctx.config.office_offset).year();
    assert_eq!(body["case_number"], format!("EXP-{}-0001", year));
    assert_eq!(body["status"], "PENDIENTE");
    assert_eq!(body["attachments_accepted"].as_array().unwrap().len(), 1);
    assert_eq!(body["attachments_accepted"][0]["kind"], "PRINCIPAL");
    assert!(body["attachments_rejected"].as_array().unwrap().is_empty());

    let number = CaseNumber::parse(body["case_number"].as_str().unwrap()).unwrap();
    let (case, owner) = ctx.pool.get_case_by_number(&number).await.unwrap().unwrap();
    assert_eq!(case.status, CaseStatus::Pending.as_str());
    assert_eq!(owner.unwrap().dni, "12345678");

    let attachments = ctx.pool.list_attachments(case.id).await.unwrap();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].kind, AttachmentKind::Primary.as_str());
    assert_eq!(ctx.store.len(), 1);

    let movements = ctx.pool.list_movements(case.id).await.unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].0.movement_type, MovementType::Created.as_str());
    assert!(movements[0].0.administrator_id.is_none());

    // Verification code, then confirmation.
    let sent = ctx.mailer.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].subject.contains(&number.to_string()));
}

#[actix_rt::test]
async fn test_submission_requires_verified_email() {
    let ctx = TestContext::new().await;

    let result = ctx.submit("12345678", march_2025()).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert_eq!(ctx.store.len(), 0);
    assert_eq!(ctx.pool.count_cases().await.unwrap(), 0);
}

#[actix_rt::test]
async fn test_concurrent_submissions_get_distinct_sequential_numbers() {
    let ctx = TestContext::new().await;
    let now = march_2025();

    let dnis = ["11111111", "22222222", "33333333", "44444444", "55555555"];
    for (i, dni) in dnis.iter().enumerate() {
        ctx.verify_citizen(dni, &format!("user{}@example.com", i), now).await;
    }

    let results = join_all(dnis.iter().map(|dni| ctx.submit(dni, now))).await;

    let numbers: HashSet<String> = results
        .into_iter()
        .map(|r| r.expect("submission failed").case_number)
        .collect();
    let expected: HashSet<String> = (1..=5).map(|n| format!("EXP-2025-{:04}", n)).collect();
    assert_eq!(numbers, expected);
}

#[actix_rt::test]
async fn test_case_year_follows_office_time_zone() {
    let ctx = TestContext::new().await;
    // 03:00 UTC on Jan 1st is still Dec 31st in Lima.
    let new_year_utc = Utc.with_ymd_and_hms(2026, 1, 1, 3, 0, 0).unwrap();

    ctx.verify_citizen("12345678", "a@b.com", new_year_utc).await;
    let first = ctx.submit("12345678", new_year_utc).await.unwrap();
    assert_eq!(first.case_number, "EXP-2025-0001");

    let later = Utc.with_ymd_and_hms(2026, 1, 1, 6, 0, 0).unwrap();
    let second = ctx.submit("12345678", later).await.unwrap();
    assert_eq!(second.case_number, "EXP-2026-0001");
}

#[actix_rt::test]
async fn test_failed_supplementary_files_are_reported() {
    let ctx = TestContext::new().await;
    let now = march_2025();
    ctx.verify_citizen("12345678", "a@b.com", now).await;
    ctx.store.fail_keys_containing("roto");

    let input = SubmissionInput {
        form: filled_form("12345678"),
        primary: Some(pdf("solicitud.pdf")),
        supplementary: vec![
            pdf("anexo.pdf"),
            pdf("roto.pdf"),
            UploadedFile {
                filename: "programa.exe".to_string(),
                data: vec![1, 2, 3],
            },
        ],
    };
    let response = submission::submit_at(&ctx.deps(), input, now).await.unwrap();

    assert_eq!(response.attachments_accepted.len(), 2);
    assert_eq!(response.attachments_rejected.len(), 2);
    assert_eq!(response.attachments_rejected[0].filename, "roto.pdf");
    assert_eq!(
        response.attachments_rejected[0].reason,
        "No se pudo almacenar el archivo"
    );
    assert_eq!(response.attachments_rejected[1].filename, "programa.exe");
    assert_eq!(ctx.store.len(), 2);
}

#[actix_rt::test]
async fn test_primary_upload_failure_aborts_submission() {
    let ctx = TestContext::new().await;
    let now = march_2025();
    ctx.verify_citizen("12345678", "a@b.com", now).await;
    ctx.store.fail_keys_containing("principal");

    let result = ctx.submit("12345678", now).await;
    assert!(matches!(result, Err(AppError::Storage(_))));
    assert_eq!(ctx.pool.count_cases().await.unwrap(), 0);
}

#[actix_rt::test]
async fn test_failed_transaction_deletes_uploaded_blobs() {
    let ctx = TestContext::new().await;
    let now = march_2025();
    ctx.verify_citizen("12345678", "a@b.com", now).await;

    // Make allocation fail after the uploads have succeeded.
    ctx.pool
        .connection()
        .execute_unprepared("DROP TABLE case_sequences")
        .await
        .unwrap();

    let input = SubmissionInput {
        form: filled_form("12345678"),
        primary: Some(pdf("solicitud.pdf")),
        supplementary: vec![pdf("anexo.pdf")],
    };
    let result = submission::submit_at(&ctx.deps(), input, now).await;

    assert!(matches!(result, Err(AppError::Database(_))));
    assert_eq!(ctx.store.len(), 0);
    assert_eq!(ctx.store.deleted.lock().unwrap().len(), 2);
    assert_eq!(ctx.pool.count_cases().await.unwrap(), 0);
    // Only the verification code went out.
    assert_eq!(ctx.mailer.sent().len(), 1);
}

#[actix_rt::test]
async fn test_confirmation_email_failure_keeps_case() {
    let ctx = TestContext::new().await;
    let now = march_2025();
    ctx.verify_citizen("12345678", "a@b.com", now).await;
    ctx.mailer.set_failing(true);

    let response = ctx.submit("12345678", now).await.unwrap();
    assert_eq!(response.case_number, "EXP-2025-0001");
    assert_eq!(ctx.pool.count_cases().await.unwrap(), 1);
}

#[actix_rt::test]
async fn test_form_validation_errors() {
    let ctx = TestContext::new().await;
    let now = march_2025();
    ctx.verify_citizen("12345678", "a@b.com", now).await;

    let mut no_policy = submission_input("12345678");
    no_policy.form.set("aceptacion_politicas", "false".to_string());
    let result = submission::submit_at(&ctx.deps(), no_policy, now).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let mut no_primary = submission_input("12345678");
    no_primary.primary = None;
    let result = submission::submit_at(&ctx.deps(), no_primary, now).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let mut too_big = submission_input("12345678");
    too_big.primary = Some(UploadedFile {
        filename: "grande.pdf".to_string(),
        data: vec![0; ctx.config.limits.max_file_size + 1],
    });
    let result = submission::submit_at(&ctx.deps(), too_big, now).await;
    assert!(matches!(result, Err(AppError::PayloadTooLarge(_))));

    let mut too_many = submission_input("12345678");
    too_many.supplementary = (0..4).map(|i| pdf(&format!("anexo{}.pdf", i))).collect();
    let result = submission::submit_at(&ctx.deps(), too_many, now).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    assert_eq!(ctx.store.len(), 0);
    assert_eq!(ctx.pool.count_cases().await.unwrap(), 0);
}

#[actix_rt::test]
async fn test_oversized_multipart_file_is_rejected() {
    let ctx = TestContext::new().await;
    ctx.verify_citizen("12345678", "a@b.com", Utc::now()).await;
    let app = ctx.app().await;

    let big = vec![b'x'; ctx.config.limits.max_file_size * 3];
    let payload = multipart_body(
        &[
            ("dni", "12345678"),
            ("tipo_documento", "Reclamo"),
            ("cantidad_documentos", "1"),
            ("cantidad_folios", "1"),
            ("asunto", "Reclamo por demora en la atención"),
            ("aceptacion_politicas", "on"),
        ],
        &[("archivo_principal", "grande.pdf", &big)],
    );
    let req = test::TestRequest::post()
        .uri("/api/v1/submissions")
        .insert_header(("Content-Type", multipart_content_type()))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 413);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "PAYLOAD_TOO_LARGE");
}

#[actix_rt::test]
async fn test_overlong_text_field_is_rejected() {
    let ctx = TestContext::new().await;
    ctx.verify_citizen("12345678", "a@b.com", Utc::now()).await;
    let app = ctx.app().await;

    // Two-byte characters so a plain cut would land mid-character.
    let subject = "ñ".repeat(9_000);
    let payload = multipart_body(
        &[
            ("dni", "12345678"),
            ("tipo_documento", "Reclamo"),
            ("cantidad_documentos", "1"),
            ("cantidad_folios", "1"),
            ("asunto", &subject),
            ("aceptacion_politicas", "on"),
        ],
        &[("archivo_principal", "carta.pdf", &b"%PDF-1.4"[..])],
    );
    let req = test::TestRequest::post()
        .uri("/api/v1/submissions")
        .insert_header(("Content-Type", multipart_content_type()))
        .set_payload(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "El campo 'asunto' es demasiado largo");
    assert_eq!(ctx.store.len(), 0);
}
