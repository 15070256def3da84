//! Migrator registering schema migrations in dependency order.
//!
//! Applied migrations are recorded in `seaql_migrations`, but every step is
//! written check-then-apply so the registry can also be replayed against a
//! legacy database that predates the version table. Indexes are applied last.
pub use sea_orm_migration::prelude::*;

use sea_orm_migration::sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

pub mod errors;
pub mod lock;
pub mod schema_ops;
pub mod sql_script;
pub mod verify;

mod m20240101_000001_create_restaurants;
mod m20240101_000002_create_users;
mod m20240101_000003_create_reviews;
mod m20240101_000004_create_deleted_reviews;
mod m20240101_000005_create_manager_responses;
mod m20240101_000006_create_error_reports;
mod m20240102_000001_evolve_legacy_columns;
mod m20240102_000002_add_indexes;

use errors::MigrateError;
use lock::{MigrationLock, LOCK_NAME};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_restaurants::Migration),
            Box::new(m20240101_000002_create_users::Migration),
            Box::new(m20240101_000003_create_reviews::Migration),
            Box::new(m20240101_000004_create_deleted_reviews::Migration),
            Box::new(m20240101_000005_create_manager_responses::Migration),
            Box::new(m20240101_000006_create_error_reports::Migration),
            Box::new(m20240102_000001_evolve_legacy_columns::Migration),
            // Indexes should always be applied last
            Box::new(m20240102_000002_add_indexes::Migration),
        ]
    }
}

/// Seconds to wait for a concurrent run to finish before giving up.
pub const LOCK_TIMEOUT_SECS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationState {
    pub name: String,
    pub applied: bool,
}

/// Apply pending migrations under the advisory lock, then verify the
/// resulting schema against the expected catalogue.
pub async fn run_up(db: &DatabaseConnection) -> Result<(), MigrateError> {
    let guard = MigrationLock::acquire(db, LOCK_NAME, LOCK_TIMEOUT_SECS).await?;
    let result = up_and_verify(db).await;
    if let Err(e) = &result {
        error!(error = %e, "migration run failed; already applied steps stay in place, re-run to continue");
    }
    release_after(db, guard, result).await
}

/// Release `guard`, keeping the run's own error when both fail.
pub async fn release_after<T>(
    db: &DatabaseConnection,
    guard: MigrationLock,
    result: Result<T, MigrateError>,
) -> Result<T, MigrateError> {
    match (guard.release(db).await, result) {
        (Ok(()), result) => result,
        (Err(release_err), Ok(_)) => Err(release_err),
        (Err(release_err), Err(run_err)) => {
            warn!(error = %release_err, "migration lock release failed after an error");
            Err(run_err)
        }
    }
}

async fn up_and_verify(db: &DatabaseConnection) -> Result<(), MigrateError> {
    let pending = Migrator::get_pending_migrations(db).await?;
    info!(pending = pending.len(), "applying migrations");
    Migrator::up(db, None).await?;
    verify_schema(db).await
}

/// Fail with `SchemaIncomplete` when any expected object is absent.
pub async fn verify_schema(db: &DatabaseConnection) -> Result<(), MigrateError> {
    let manager = SchemaManager::new(db);
    let missing = verify::verify(&manager).await?;
    if missing.is_empty() {
        info!("schema verified");
        return Ok(());
    }
    Err(MigrateError::SchemaIncomplete(missing.iter().map(ToString::to_string).collect()))
}

/// Registered migrations with their applied flag, in registry order.
pub async fn status(db: &DatabaseConnection) -> Result<Vec<MigrationState>, MigrateError> {
    let applied: Vec<String> = Migrator::get_applied_migrations(db)
        .await?
        .iter()
        .map(|m| m.name().to_string())
        .collect();
    Ok(Migrator::migrations()
        .iter()
        .map(|m| MigrationState { name: m.name().to_string(), applied: applied.iter().any(|a| a == m.name()) })
        .collect())
}

#[cfg(test)]
mod tests;
