use sea_orm_migration::prelude::DbErr;
use thiserror::Error;

use crate::schema_ops::{classify, ErrorClass};

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("database error: {0}")]
    Db(#[from] DbErr),
    #[error("migration lock: {0}")]
    Lock(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("schema is missing {} object(s): {}", .0.len(), .0.join(", "))]
    SchemaIncomplete(Vec<String>),
}

impl MigrateError {
    /// Connectivity failures get remediation hints in the CLI.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, MigrateError::Db(e) if classify(e) == ErrorClass::Connectivity)
    }
}
