use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use sea_orm::DatabaseConnection;
use tracing::{error, info};

use migration::errors::MigrateError;
use migration::lock::{MigrationLock, LOCK_NAME};
use migration::schema_ops::{classify, connectivity_hint, ErrorClass};
use models::user::Role;

/// Schema tool for the restaurant reviews database.
#[derive(Debug, Parser)]
#[command(name = "migrate", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations and verify the resulting schema
    Up,
    /// List registered migrations and whether each one is applied
    Status,
    /// Check that every expected table, column and index exists
    Verify,
    /// Run a raw SQL script, skipping statements whose objects already exist
    ApplySql {
        file: PathBuf,
    },
    /// Assign a role to an existing account (bootstraps the first head_admin)
    GrantRole {
        #[arg(long)]
        email: String,
        #[arg(long, value_parser = parse_role)]
        role: Role,
        #[arg(long)]
        restaurant_id: Option<i32>,
    },
}

fn parse_role(s: &str) -> Result<Role, String> {
    s.parse::<Role>().map_err(|e| e.to_string())
}

async fn apply_sql(db: &DatabaseConnection, file: &Path) -> anyhow::Result<()> {
    let sql = std::fs::read_to_string(file).map_err(MigrateError::from)?;
    let guard = MigrationLock::acquire(db, LOCK_NAME, migration::LOCK_TIMEOUT_SECS).await?;
    let result = migration::sql_script::apply_script(db, &sql).await.map_err(MigrateError::from);
    let report = migration::release_after(db, guard, result).await?;
    info!(file = %file.display(), applied = report.applied, skipped = report.skipped, "script applied");
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = configs::AppConfig::load_database()?;
    let db = models::db::connect_for_migrations(&cfg).await.map_err(MigrateError::from)?;

    match cli.command {
        Command::Up => migration::run_up(&db).await?,
        Command::Status => {
            for m in migration::status(&db).await? {
                let mark = if m.applied { "applied" } else { "pending" };
                println!("{mark:<8} {}", m.name);
            }
        }
        Command::Verify => migration::verify_schema(&db).await?,
        Command::ApplySql { file } => apply_sql(&db, &file).await?,
        Command::GrantRole { email, role, restaurant_id } => {
            let user = service::user_admin_service::grant_role_by_email(&db, &email, role, restaurant_id).await?;
            info!(user_id = user.id, email = %user.email, role = %user.role, "role granted");
        }
    }
    db.close().await.map_err(MigrateError::from)?;
    Ok(())
}

fn is_connectivity(err: &anyhow::Error) -> bool {
    if let Some(m) = err.downcast_ref::<MigrateError>() {
        return m.is_connectivity();
    }
    err.downcast_ref::<sea_orm::DbErr>().is_some_and(|e| classify(e) == ErrorClass::Connectivity)
}

fn main() -> ExitCode {
    dotenv().ok();
    common::utils::logging::init_logging_json();
    let cli = Cli::parse();

    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_connectivity(&e) => {
            error!(error = %e, hint = connectivity_hint(), "cannot reach the database");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, "migrate failed");
            ExitCode::FAILURE
        }
    }
}
