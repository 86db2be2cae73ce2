//! Mesa de Partes server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use mesa_partes_lib::api::{self, ApiDoc};
use mesa_partes_lib::config::Config;
use mesa_partes_lib::db::DbPool;
use mesa_partes_lib::middleware::RequestLogger;
use mesa_partes_lib::services::{BlobStore, Mailer, S3Storage, mailer};

/// Perform health check (for Docker healthcheck).
async fn health_check() -> bool {
    // Simple check - just verify we can load config
    Config::from_env().is_ok()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Check for --health-check flag (used by Docker HEALTHCHECK)
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|arg| arg == "--health-check") {
        dotenvy::dotenv().ok();
        std::process::exit(if health_check().await { 0 } else { 1 });
    }

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL, S3 credentials, MPV_SESSION_SECRET and RESEND_API_KEY must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Mesa de Partes Virtual");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    let pool = match DbPool::new(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };
    info!("Database connection established");

    if let Err(e) = pool.run_migrations().await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }
    info!("Database migrations complete");

    let storage: Arc<dyn BlobStore> = match S3Storage::new(&config.storage).await {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            std::process::exit(1);
        }
    };
    info!("Object storage ready (bucket: {})", config.storage.bucket);

    let mailer: Arc<dyn Mailer> = match mailer::from_settings(&config.mail) {
        Ok(mailer) => Arc::from(mailer),
        Err(e) => {
            error!("Failed to initialize mailer: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Submission limits: {}MB per file, {} supplementary files",
        config.limits.max_file_size / 1024 / 1024,
        config.limits.max_supplementary_files
    );

    let bind_address = config.bind_address();
    let is_development = config.is_development();
    let public_url = config.mail.public_url.clone();

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!("Starting server at http://{} ({} workers)", bind_address, cpus);
        cpus
    };

    let pool = web::Data::new(pool);
    let config = web::Data::new(config);
    let storage = web::Data::from(storage);
    let mailer = web::Data::from(mailer);

    let server = HttpServer::new(move || {
        // The citizen site and the admin panel call the API from the browser
        // with the session cookie, so credentials are allowed for its origin.
        let cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);
        let cors = if is_development {
            cors.allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
        } else {
            cors.allowed_origin(&public_url)
        };

        App::new()
            // Add CORS middleware (must be before other middleware)
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(pool.clone())
            .app_data(config.clone())
            .app_data(storage.clone())
            .app_data(mailer.clone())
            .app_data(api::json_config())
            .service(web::scope("/api/v1").configure(api::configure_routes))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    });

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
