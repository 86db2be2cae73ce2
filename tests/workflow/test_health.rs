//! Liveness and readiness endpoints.

use actix_web::test;
use serde_json::Value;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_health_and_ready_report_ok() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "mesa-partes");

    let req = test::TestRequest::get().uri("/api/v1/ready").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
}

#[actix_rt::test]
async fn test_ready_fails_once_database_is_gone() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;
    ctx.pool.connection().close_by_ref().await.unwrap();

    let req = test::TestRequest::get().uri("/api/v1/ready").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 503);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "NOT_READY");
}
