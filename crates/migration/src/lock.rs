//! Session advisory lock serialising concurrent migration runs.
//!
//! MySQL `GET_LOCK` is bound to the session that took it, so callers must
//! hold the lock on a single-connection pool (see `models::db::connect_for_migrations`).
//! Other backends get a no-op guard.

use sea_orm_migration::sea_orm::{ConnectionTrait, DbBackend, Statement, Value};
use tracing::{info, warn};

use crate::errors::MigrateError;

pub const LOCK_NAME: &str = "restaurant_reviews_migrate";

#[derive(Debug)]
pub struct MigrationLock {
    name: String,
    held: bool,
}

impl MigrationLock {
    /// Wait up to `timeout_secs` for the named lock.
    pub async fn acquire<C: ConnectionTrait>(conn: &C, name: &str, timeout_secs: u32) -> Result<Self, MigrateError> {
        if conn.get_database_backend() != DbBackend::MySql {
            return Ok(Self { name: name.to_string(), held: false });
        }
        let stmt = Statement::from_sql_and_values(
            DbBackend::MySql,
            "SELECT GET_LOCK(?, ?) AS acquired",
            vec![Value::from(name), Value::from(timeout_secs as i64)],
        );
        let row = conn
            .query_one(stmt)
            .await?
            .ok_or_else(|| MigrateError::Lock(format!("GET_LOCK({name}) returned no row")))?;
        let acquired: Option<i64> = row.try_get("", "acquired")?;
        match acquired {
            Some(1) => {
                info!(lock = name, "migration lock acquired");
                Ok(Self { name: name.to_string(), held: true })
            }
            Some(_) => Err(MigrateError::Lock(format!(
                "another migration holds {name}; gave up after {timeout_secs}s"
            ))),
            None => Err(MigrateError::Lock(format!("GET_LOCK({name}) failed"))),
        }
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub async fn release<C: ConnectionTrait>(self, conn: &C) -> Result<(), MigrateError> {
        if !self.held {
            return Ok(());
        }
        let stmt = Statement::from_sql_and_values(
            DbBackend::MySql,
            "SELECT RELEASE_LOCK(?) AS released",
            vec![Value::from(self.name.as_str())],
        );
        match conn.query_one(stmt).await {
            Ok(_) => {
                info!(lock = %self.name, "migration lock released");
                Ok(())
            }
            Err(e) => {
                // The lock dies with the session anyway.
                warn!(lock = %self.name, error = %e, "failed to release migration lock");
                Err(e.into())
            }
        }
    }
}
