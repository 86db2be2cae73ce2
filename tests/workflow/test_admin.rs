//! Administrator session and case management over HTTP.

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::test;
use serde_json::Value;

use mesa_partes_lib::config::SESSION_COOKIE;

use super::test_helpers::*;

async fn login<S>(app: &S, email: &str, password: &str) -> ServiceResponse
where
    S: actix_web::dev::Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/admin/login")
        .set_json(serde_json::json!({ "email": email, "password": password }))
        .to_request();
    test::call_service(app, req).await
}

fn session_cookie(resp: &ServiceResponse) -> Cookie<'static> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("session cookie not set")
        .into_owned()
}

#[actix_rt::test]
async fn test_admin_routes_require_session() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;

    for uri in ["/api/v1/admin/me", "/api/v1/admin/cases", "/api/v1/admin/dashboard"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401, "{} should require a session", uri);
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/cases")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[actix_rt::test]
async fn test_login_sets_cookie_and_opens_session() {
    let ctx = TestContext::new().await;
    ctx.create_admin("operador@example.gob.pe").await;
    let app = ctx.app().await;

    let resp = login(&app, "Operador@Example.gob.pe", TEST_PASSWORD).await;
    assert_eq!(resp.status(), 200);
    let cookie = session_cookie(&resp);
    assert_eq!(cookie.http_only(), Some(true));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["admin"]["email"], "operador@example.gob.pe");
    assert!(body["admin"]["last_login_at"].is_string());

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/me")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let me: Value = test::read_body_json(resp).await;
    assert_eq!(me["role"], "OPERADOR");

    // The same token works as a bearer header.
    let token = body["token"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri("/api/v1/admin/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);
}

#[actix_rt::test]
async fn test_bad_credentials_and_inactive_accounts() {
    let ctx = TestContext::new().await;
    let admin = ctx.create_admin("operador@example.gob.pe").await;
    let app = ctx.app().await;

    let resp = login(&app, "operador@example.gob.pe", "incorrecta-123").await;
    assert_eq!(resp.status(), 401);
    let resp = login(&app, "nadie@example.gob.pe", TEST_PASSWORD).await;
    assert_eq!(resp.status(), 401);

    let resp = login(&app, "operador@example.gob.pe", TEST_PASSWORD).await;
    let cookie = session_cookie(&resp);

    ctx.pool.set_admin_active(admin.id, false).await.unwrap();

    // An open session stops working as soon as the account is disabled.
    let req = test::TestRequest::get()
        .uri("/api/v1/admin/me")
        .cookie(cookie)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);

    let resp = login(&app, "operador@example.gob.pe", TEST_PASSWORD).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn test_case_management_flow() {
    let ctx = TestContext::new().await;
    let now = march_2025();
    ctx.verify_citizen("12345678", "a@b.com", now).await;
    ctx.submit("12345678", now).await.unwrap();
    ctx.verify_citizen("87654321", "c@d.com", now).await;
    ctx.submit("87654321", now).await.unwrap();
    ctx.create_admin("operador@example.gob.pe").await;
    let app = ctx.app().await;

    let cookie = session_cookie(&login(&app, "operador@example.gob.pe", TEST_PASSWORD).await);

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/cases?page=1&limit=10")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let list: Value = test::read_body_json(resp).await;
    assert_eq!(list["pagination"]["total"], 2);
    assert_eq!(list["cases"].as_array().unwrap().len(), 2);
    // Administrators see contact data.
    assert!(list["cases"][0]["owner"]["email"].is_string());

    let case_id = list["cases"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["case_number"] == "EXP-2025-0001")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/admin/cases/{}/movements", case_id))
        .cookie(cookie.clone())
        .set_json(serde_json::json!({
            "tipo_movimiento": "DERIVADO",
            "descripcion": "Derivado a Gerencia de Desarrollo Urbano",
            "nuevo_estado": "EN_PROCESO",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let outcome: Value = test::read_body_json(resp).await;
    assert_eq!(outcome["case"]["status"], "EN_PROCESO");

    // CREADO is reserved for the system.
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/admin/cases/{}/movements", case_id))
        .cookie(cookie.clone())
        .set_json(serde_json::json!({ "tipo_movimiento": "CREADO", "descripcion": "x" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/cases?status=en_proceso")
        .cookie(cookie.clone())
        .to_request();
    let filtered: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(filtered["pagination"]["total"], 1);
    assert_eq!(filtered["cases"][0]["id"], case_id.as_str());

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/cases?status=CERRADO")
        .cookie(cookie.clone())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/admin/cases/{}/status", case_id))
        .cookie(cookie.clone())
        .set_json(serde_json::json!({ "nuevo_estado": "RESUELTO" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/admin/cases/{}", case_id))
        .cookie(cookie.clone())
        .to_request();
    let detail: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(detail["status"], "RESUELTO");
    let movements = detail["movements"].as_array().unwrap();
    assert_eq!(movements.len(), 3);
    assert_eq!(movements[0]["movement_type"], "OTRO");
    assert_eq!(movements[2]["movement_type"], "CREADO");

    let attachment_id = detail["attachments"][0]["id"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/admin/attachments/{}/download", attachment_id))
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("solicitud.pdf"));
    let bytes = test::read_body(resp).await;
    assert_eq!(&bytes[..], b"%PDF-1.4 test document");

    let req = test::TestRequest::get()
        .uri("/api/v1/admin/dashboard")
        .cookie(cookie)
        .to_request();
    let dashboard: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(dashboard["total_cases"], 2);
    assert_eq!(dashboard["total_external_users"], 2);
}

#[actix_rt::test]
async fn test_logout_expires_cookie() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;

    let req = test::TestRequest::post().uri("/api/v1/admin/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 204);
    let cookie = session_cookie(&resp);
    assert_eq!(cookie.value(), "");
    assert_eq!(cookie.max_age(), Some(actix_web::cookie::time::Duration::ZERO));
}
