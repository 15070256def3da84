use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use dotenvy::dotenv;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::auth::service::AuthConfig;

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))
}

/// Assemble the router over an existing pool.
pub fn build_app(db: DatabaseConnection, auth: &configs::AuthConfig) -> Router {
    let state = ServerState::new(
        db,
        AuthConfig { jwt_secret: auth.jwt_secret.clone(), token_ttl_hours: auth.token_ttl_hours },
    );
    routes::build_router(state, build_cors())
}

/// Public entry: load configuration, connect, and run the HTTP server
pub async fn run() -> Result<(), StartupError> {
    dotenv().ok();
    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    models::db::ping(&db).await.map_err(|e| StartupError::Database(e.to_string()))?;
    migration::verify_schema(&db).await.map_err(|e| {
        StartupError::Database(format!("{e}; run `migrate up` first"))
    })?;

    let app = build_app(db, &cfg.auth);
    let addr = bind_addr(&cfg)?;
    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(anyhow::Error::from)?;
    axum::serve(listener, app).await.map_err(anyhow::Error::from)?;
    Ok(())
}
