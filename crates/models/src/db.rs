use std::time::Duration;

use configs::DatabaseConfig;
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use tracing::info;

pub fn connect_options(cfg: &DatabaseConfig) -> ConnectOptions {
    let mut opt = ConnectOptions::new(cfg.url.clone());
    opt.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .sqlx_logging(cfg.sqlx_logging);
    opt
}

pub async fn connect_with_config(cfg: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(connect_options(cfg)).await?;
    info!(max_connections = cfg.max_connections, "database pool ready");
    Ok(db)
}

/// Single-connection pool: session-scoped state (the migration advisory
/// lock) and DDL must run on the same session.
pub async fn connect_for_migrations(cfg: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = connect_options(cfg);
    opt.max_connections(1).min_connections(1);
    Database::connect(opt).await
}

pub async fn ping(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.query_one(Statement::from_string(db.get_database_backend(), "SELECT 1".to_string()))
        .await?;
    Ok(())
}

/// In-memory SQLite database with every migration applied. Backs the test
/// suites of the service and server crates.
pub async fn connect_memory() -> anyhow::Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    // one connection: each sqlite memory connection is its own database
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
