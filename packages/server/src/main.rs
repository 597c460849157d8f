// ABOUTME: Procura server entry point
// ABOUTME: Environment config, storage init, admin bootstrap, and the axum serve loop

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use procura_api::AppState;
use procura_attachments::LocalUploader;
use procura_storage::db::DbConfig;
use procura_users::ensure_admin;

mod config;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let db_config = DbConfig {
        path: config.database_path.clone(),
        ..DbConfig::default()
    };
    let pool = procura_storage::connect(&db_config).await?;
    procura_storage::initialize(&pool).await?;

    if ensure_admin(&pool, &config.admin_email, &config.admin_password).await? {
        info!("Seeded admin account {}", config.admin_email);
    }

    let uploader = Arc::new(LocalUploader::new(config.uploads_dir.clone()));
    let state = AppState::new(pool, uploader);

    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<axum::http::HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let app = procura_api::create_router(state)
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!("Procura listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
