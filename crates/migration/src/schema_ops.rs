//! Check-then-apply schema primitives.
//!
//! Every operation first asks the live schema (`INFORMATION_SCHEMA` on MySQL,
//! `pragma_table_info` / `sqlite_master` on SQLite) whether the object already
//! exists and only mutates when it does not. A duplicate-object error raised
//! anyway (another operator got there first) is classified as benign and
//! swallowed.

use sea_orm_migration::prelude::*;
use tracing::{debug, info, warn};

/// Result of an idempotent schema step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    Applied,
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenignKind {
    DuplicateColumn,
    DuplicateIndex,
    DuplicateTable,
}

/// Error taxonomy for schema work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Object already exists; log and continue.
    Benign(BenignKind),
    /// Cannot reach or authenticate against the server.
    Connectivity,
    /// Anything else aborts the run.
    Fatal,
}

pub fn classify(err: &DbErr) -> ErrorClass {
    match err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => ErrorClass::Connectivity,
        other => classify_message(&other.to_string()),
    }
}

/// Classify a driver error message.
///
/// MySQL: 1060 `ER_DUP_FIELDNAME`, 1061 `ER_DUP_KEYNAME`, 1050
/// `ER_TABLE_EXISTS_ERROR`, 1045 access denied, 1049 unknown database,
/// 2002/2003 cannot connect. SQLite reports duplicates in prose.
pub fn classify_message(msg: &str) -> ErrorClass {
    let m = msg.to_ascii_lowercase();
    if m.contains("duplicate column name") {
        ErrorClass::Benign(BenignKind::DuplicateColumn)
    } else if m.contains("duplicate key name") || (m.contains("index") && m.contains("already exists")) {
        ErrorClass::Benign(BenignKind::DuplicateIndex)
    } else if m.contains("table") && m.contains("already exists") {
        ErrorClass::Benign(BenignKind::DuplicateTable)
    } else if m.contains("access denied")
        || m.contains("unknown database")
        || m.contains("connection refused")
        || m.contains("can't connect")
        || m.contains("pool timed out")
    {
        ErrorClass::Connectivity
    } else {
        ErrorClass::Fatal
    }
}

/// Remediation hints printed alongside connectivity failures.
pub fn connectivity_hint() -> &'static str {
    "check that the database server is running and that DB_HOST, DB_PORT, DB_USER, DB_PASSWORD and DB_NAME (or DATABASE_URL) are correct"
}

/// Turn a benign error into `AlreadyPresent`, pass everything else through.
fn swallow_benign(err: DbErr, what: &str) -> Result<EnsureOutcome, DbErr> {
    match classify(&err) {
        ErrorClass::Benign(kind) => {
            warn!(object = what, ?kind, error = %err, "schema object appeared concurrently; continuing");
            Ok(EnsureOutcome::AlreadyPresent)
        }
        _ => Err(err),
    }
}

/// Add `def` to `table` unless the column already exists.
pub async fn ensure_column(manager: &SchemaManager<'_>, table: &str, mut def: ColumnDef) -> Result<EnsureOutcome, DbErr> {
    let column = def.get_column_name();
    let what = format!("{table}.{column}");
    if manager.has_column(table, &column).await? {
        debug!(object = %what, "column present");
        return Ok(EnsureOutcome::AlreadyPresent);
    }
    let stmt = Table::alter().table(Alias::new(table)).add_column(&mut def).to_owned();
    match manager.alter_table(stmt).await {
        Ok(()) => {
            info!(object = %what, "column added");
            Ok(EnsureOutcome::Applied)
        }
        Err(e) => swallow_benign(e, &what),
    }
}

/// Create the index `name` on `table` unless it already exists.
pub async fn ensure_index(
    manager: &SchemaManager<'_>,
    table: &str,
    name: &str,
    stmt: IndexCreateStatement,
) -> Result<EnsureOutcome, DbErr> {
    let what = format!("{table}#{name}");
    if manager.has_index(table, name).await? {
        debug!(object = %what, "index present");
        return Ok(EnsureOutcome::AlreadyPresent);
    }
    match manager.create_index(stmt).await {
        Ok(()) => {
            info!(object = %what, "index created");
            Ok(EnsureOutcome::Applied)
        }
        Err(e) => swallow_benign(e, &what),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mysql_duplicates_are_benign() {
        assert_eq!(
            classify_message("error returned from database: 1060 (42S21): Duplicate column name 'deleted'"),
            ErrorClass::Benign(BenignKind::DuplicateColumn)
        );
        assert_eq!(
            classify_message("error returned from database: 1061 (42000): Duplicate key name 'idx_reviews_restaurant'"),
            ErrorClass::Benign(BenignKind::DuplicateIndex)
        );
        assert_eq!(
            classify_message("1050 (42S01): Table 'reviews' already exists"),
            ErrorClass::Benign(BenignKind::DuplicateTable)
        );
    }

    #[test]
    fn sqlite_duplicates_are_benign() {
        assert_eq!(
            classify_message("error returned from database: (code: 1) duplicate column name: deleted"),
            ErrorClass::Benign(BenignKind::DuplicateColumn)
        );
        assert_eq!(
            classify_message("error returned from database: (code: 1) index idx_users_role already exists"),
            ErrorClass::Benign(BenignKind::DuplicateIndex)
        );
    }

    #[test]
    fn credentials_and_reachability_are_connectivity() {
        assert_eq!(
            classify_message("1045 (28000): Access denied for user 'root'@'localhost'"),
            ErrorClass::Connectivity
        );
        assert_eq!(classify_message("1049 (42000): Unknown database 'reviews'"), ErrorClass::Connectivity);
        assert_eq!(classify_message("Connection refused (os error 111)"), ErrorClass::Connectivity);
    }

    #[test]
    fn everything_else_is_fatal() {
        assert_eq!(
            classify_message("1064 (42000): You have an error in your SQL syntax"),
            ErrorClass::Fatal
        );
        assert_eq!(classify(&DbErr::Custom("boom".into())), ErrorClass::Fatal);
    }
}
