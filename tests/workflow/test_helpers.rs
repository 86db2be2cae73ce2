//! Shared fakes and fixtures for the workflow tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::{App, dev::ServiceResponse, test, web};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use sea_orm::{ConnectOptions, Database};
use secrecy::SecretString;

use mesa_partes_lib::api;
use mesa_partes_lib::config::{
    Config, DatabaseSettings, Environment, MailSettings, SessionSettings, StorageSettings,
    SubmissionLimits,
};
use mesa_partes_lib::db::DbPool;
use mesa_partes_lib::db::administrators::NewAdministrator;
use mesa_partes_lib::db::external_users;
use mesa_partes_lib::entity::administrator;
use mesa_partes_lib::error::{AppError, AppResult};
use mesa_partes_lib::models::{
    AdminRole, IdentifyRequest, Principal, SubmissionForm, SubmissionResponse, VerifyCodeRequest,
};
use mesa_partes_lib::services::submission::{self, SubmissionDeps, SubmissionInput, UploadedFile};
use mesa_partes_lib::services::{BlobStore, Mailer, OutboundEmail, admin_auth, verification};

pub const TEST_PASSWORD: &str = "clave-segura-123";
pub const TEST_SESSION_SECRET: &str = "workflow-test-session-secret";

/// In-memory blob store. Keys containing any string in `fail_on` are refused.
#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<HashMap<String, (Vec<u8>, Option<String>)>>,
    pub deleted: Mutex<Vec<String>>,
    pub fail_on: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn fail_keys_containing(&self, fragment: &str) {
        self.fail_on.lock().unwrap().push(fragment.to_string());
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: Option<&str>) -> AppResult<()> {
        if self.fail_on.lock().unwrap().iter().any(|f| key.contains(f.as_str())) {
            return Err(AppError::Storage(format!("refused {}", key)));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, content_type.map(str::to_string)));
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<(Vec<u8>, Option<String>)> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Archivo no encontrado: {}", key)))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.objects.lock().unwrap().remove(key);
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }
}

/// Mailer that records every message and can be told to fail.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutboundEmail>>,
    pub failing: AtomicBool,
}

impl RecordingMailer {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutboundEmail) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Delivery("provider unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// Everything a test needs, backed by a private in-memory database.
pub struct TestContext {
    pub pool: DbPool,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub config: Config,
}

impl TestContext {
    pub async fn new() -> Self {
        // One connection: every in-memory SQLite connection is its own database.
        let mut options = ConnectOptions::new("sqlite::memory:");
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let conn = Database::connect(options)
            .await
            .expect("Failed to open in-memory database");

        let pool = DbPool::from_connection(conn);
        pool.run_migrations()
            .await
            .expect("Failed to run migrations");

        Self {
            pool,
            store: Arc::new(MemoryStore::default()),
            mailer: Arc::new(RecordingMailer::default()),
            config: test_config(),
        }
    }

    pub fn deps(&self) -> SubmissionDeps<'_> {
        SubmissionDeps {
            pool: &self.pool,
            store: self.store.as_ref(),
            mailer: self.mailer.as_ref(),
            config: &self.config,
        }
    }

    /// Issue and redeem a code for `dni` at `now`.
    pub async fn verify_citizen(&self, dni: &str, email: &str, now: DateTime<Utc>) {
        verification::issue_at(&self.pool, self.mailer.as_ref(), &identify_request(dni, email), now)
            .await
            .expect("issue failed");
        let code = self.current_code(dni).await.expect("no code stored");
        verification::validate_at(&self.pool, &verify_request(dni, &code), now)
            .await
            .expect("validate failed");
    }

    /// The code currently stored for `dni`, if any.
    pub async fn current_code(&self, dni: &str) -> Option<String> {
        external_users::find_by_dni(self.pool.connection(), dni)
            .await
            .expect("query failed")
            .and_then(|u| u.verification_code)
    }

    pub async fn submit(
        &self,
        dni: &str,
        now: DateTime<Utc>,
    ) -> AppResult<SubmissionResponse> {
        submission::submit_at(&self.deps(), submission_input(dni), now).await
    }

    pub async fn create_admin(&self, email: &str) -> administrator::Model {
        let password_hash = admin_auth::hash_password(TEST_PASSWORD).unwrap();
        self.pool
            .upsert_admin(NewAdministrator {
                email: email.to_string(),
                password_hash,
                first_names: "María".to_string(),
                last_names: "Huamán Torres".to_string(),
                role: AdminRole::Operator,
            })
            .await
            .expect("create admin failed")
    }

    pub async fn principal(&self, email: &str) -> Principal {
        let admin = self.create_admin(email).await;
        Principal {
            admin_id: admin.id,
            email: admin.email,
            role: AdminRole::Operator,
        }
    }

    /// Actix test service with every `/api/v1` route.
    pub async fn app(
        &self,
    ) -> impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    > {
        let store: Arc<dyn BlobStore> = self.store.clone();
        let mailer: Arc<dyn Mailer> = self.mailer.clone();

        test::init_service(
            App::new()
                .app_data(web::Data::new(self.pool.clone()))
                .app_data(web::Data::new(self.config.clone()))
                .app_data(web::Data::from(store))
                .app_data(web::Data::from(mailer))
                .app_data(api::json_config())
                .service(web::scope("/api/v1").configure(api::configure_routes)),
        )
        .await
    }
}

pub fn test_config() -> Config {
    Config {
        environment: Environment::Development,
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        storage: StorageSettings {
            endpoint: None,
            bucket: "test".to_string(),
            region: "us-east-1".to_string(),
            access_key: "test".to_string(),
            secret_key: SecretString::from("test"),
        },
        mail: MailSettings {
            resend_api_key: None,
            from: "Mesa de Partes <test@example.com>".to_string(),
            public_url: "http://localhost:3000".to_string(),
        },
        session: SessionSettings {
            secret: SecretString::from(TEST_SESSION_SECRET),
            ttl_secs: 3600,
        },
        limits: SubmissionLimits {
            max_file_size: 1024,
            max_supplementary_files: 3,
        },
        office_offset: FixedOffset::west_opt(5 * 3600).unwrap(),
    }
}

/// 2025-03-10 10:00 in Lima.
pub fn march_2025() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 15, 0, 0).unwrap()
}

pub fn identify_request(dni: &str, email: &str) -> IdentifyRequest {
    IdentifyRequest {
        dni: dni.to_string(),
        email: email.to_string(),
        first_names: "Juan Carlos".to_string(),
        last_names: "Pérez Quispe".to_string(),
        phone: Some("987654321".to_string()),
    }
}

pub fn verify_request(dni: &str, code: &str) -> VerifyCodeRequest {
    VerifyCodeRequest {
        dni: dni.to_string(),
        code: code.to_string(),
    }
}

pub fn filled_form(dni: &str) -> SubmissionForm {
    let mut form = SubmissionForm::default();
    form.set("dni", dni.to_string());
    form.set("tipo_documento", "Solicitud".to_string());
    form.set("cantidad_documentos", "1".to_string());
    form.set("cantidad_folios", "3".to_string());
    form.set("asunto", "Solicito copia certificada de resolución".to_string());
    form.set("aceptacion_politicas", "true".to_string());
    form
}

pub fn pdf(name: &str) -> UploadedFile {
    UploadedFile {
        filename: name.to_string(),
        data: b"%PDF-1.4 test document".to_vec(),
    }
}

pub fn submission_input(dni: &str) -> SubmissionInput {
    SubmissionInput {
        form: filled_form(dni),
        primary: Some(pdf("solicitud.pdf")),
        supplementary: Vec::new(),
    }
}

/// Boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "----mesa-partes-test-boundary";

/// Build a `multipart/form-data` body from text fields and `(field, filename, bytes)` files.
pub fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    for (name, filename, data) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}
