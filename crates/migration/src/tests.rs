use sea_orm_migration::sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};

use super::*;
use crate::schema_ops::{ensure_column, ensure_index, EnsureOutcome};
use crate::sql_script::apply_script;
use crate::verify::Missing;

async fn memory_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    Database::connect(opt).await.expect("connect sqlite memory")
}

const LEGACY_SCHEMA: &str = r#"
CREATE TABLE restaurants (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    address TEXT,
    description TEXT,
    image_url TEXT,
    created_at TEXT,
    updated_at TEXT
);
CREATE TABLE users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    created_at TEXT,
    updated_at TEXT
);
CREATE TABLE reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER,
    restaurant_id INTEGER NOT NULL,
    content TEXT NOT NULL,
    rating INTEGER NOT NULL,
    created_at TEXT,
    updated_at TEXT
);
INSERT INTO restaurants (name, address) VALUES ('Blue Door; Bistro', 'Main st. 1');
INSERT INTO restaurants (name, address) VALUES ('Blue door bistro', 'Main st. 2');
INSERT INTO restaurants (name) VALUES ('Пельменная №1');
INSERT INTO users (name, email, password) VALUES ('Ann', 'ann@example.com', 'x');
INSERT INTO reviews (user_id, restaurant_id, content, rating) VALUES (1, 1, 'tasty', 5);
"#;

#[tokio::test]
async fn fresh_database_migrates_and_verifies() {
    let db = memory_db().await;
    run_up(&db).await.expect("run up");

    let manager = SchemaManager::new(&db);
    assert!(verify::verify(&manager).await.unwrap().is_empty());

    let states = status(&db).await.unwrap();
    assert_eq!(states.len(), Migrator::migrations().len());
    assert!(states.iter().all(|s| s.applied));
}

#[tokio::test]
async fn replay_without_version_table_changes_nothing() {
    let db = memory_db().await;
    run_up(&db).await.expect("first run");

    // Operator wiped the version table: every step must be re-checked and skipped.
    db.execute_unprepared("DELETE FROM seaql_migrations").await.unwrap();
    run_up(&db).await.expect("second run");
    run_up(&db).await.expect("third run is a no-op");

    let manager = SchemaManager::new(&db);
    assert!(verify::verify(&manager).await.unwrap().is_empty());
}

#[tokio::test]
async fn legacy_schema_is_evolved_and_backfilled() {
    let db = memory_db().await;
    let report = apply_script(&db, LEGACY_SCHEMA).await.unwrap();
    assert_eq!(report.applied, 8);

    let manager = SchemaManager::new(&db);
    let before = verify::verify(&manager).await.unwrap();
    assert!(before.contains(&Missing::Column { table: "reviews".into(), column: "deleted".into() }));
    assert!(before.contains(&Missing::Table("manager_responses".into())));

    run_up(&db).await.expect("migrate legacy");
    assert!(verify::verify(&manager).await.unwrap().is_empty());

    let rows = db
        .query_all(sea_orm_migration::sea_orm::Statement::from_string(
            db.get_database_backend(),
            "SELECT id, slug FROM restaurants ORDER BY id".to_string(),
        ))
        .await
        .unwrap();
    let slugs: Vec<String> = rows.iter().map(|r| r.try_get::<String>("", "slug").unwrap()).collect();
    assert_eq!(slugs, vec!["blue-door-bistro", "blue-door-bistro-2", "пельменная-1"]);

    let review = db
        .query_one(sea_orm_migration::sea_orm::Statement::from_string(
            db.get_database_backend(),
            "SELECT type, deleted FROM reviews WHERE id = 1".to_string(),
        ))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(review.try_get::<String>("", "type").unwrap(), "inRestaurant");
    assert!(!review.try_get::<bool>("", "deleted").unwrap());

    let user = db
        .query_one(sea_orm_migration::sea_orm::Statement::from_string(
            db.get_database_backend(),
            "SELECT role, is_blocked FROM users WHERE id = 1".to_string(),
        ))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.try_get::<String>("", "role").unwrap(), "user");
    assert!(!user.try_get::<bool>("", "is_blocked").unwrap());
}

const LEGACY_WITH_ROLES: &str = r#"
CREATE TABLE restaurants (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT,
    updated_at TEXT
);
CREATE TABLE users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    role TEXT,
    restaurant_id INTEGER,
    created_at TEXT,
    updated_at TEXT
);
INSERT INTO restaurants (name) VALUES ('Cafe');
INSERT INTO restaurants (name) VALUES ('Cafe 3');
INSERT INTO restaurants (name) VALUES ('CAFE');
INSERT INTO users (name, email, password, role, restaurant_id) VALUES ('Mod', 'mod@example.com', 'x', 'moderator', NULL);
INSERT INTO users (name, email, password, role, restaurant_id) VALUES ('Nul', 'nul@example.com', 'x', NULL, 2);
INSERT INTO users (name, email, password, role, restaurant_id) VALUES ('Ann', 'ann@example.com', 'x', 'user', 1);
INSERT INTO users (name, email, password, role, restaurant_id) VALUES ('Max', 'max@example.com', 'x', 'manager', 1);
"#;

async fn column_values(db: &DatabaseConnection, sql: &str) -> Vec<(Option<String>, Option<i32>)> {
    db.query_all(sea_orm_migration::sea_orm::Statement::from_string(db.get_database_backend(), sql.to_string()))
        .await
        .unwrap()
        .iter()
        .map(|r| (r.try_get::<Option<String>>("", "a").unwrap(), r.try_get::<Option<i32>>("", "b").unwrap()))
        .collect()
}

#[tokio::test]
async fn legacy_roles_slugs_and_manager_links_are_repaired() {
    let db = memory_db().await;
    apply_script(&db, LEGACY_WITH_ROLES).await.unwrap();

    run_up(&db).await.expect("migrate legacy with colliding slugs");
    let manager = SchemaManager::new(&db);
    assert!(verify::verify(&manager).await.unwrap().is_empty());

    let slugs = column_values(&db, "SELECT slug AS a, id AS b FROM restaurants ORDER BY id").await;
    let slugs: Vec<String> = slugs.into_iter().filter_map(|(s, _)| s).collect();
    assert_eq!(slugs, vec!["cafe", "cafe-3", "cafe-3-2"]);

    let users = column_values(&db, "SELECT role AS a, restaurant_id AS b FROM users ORDER BY id").await;
    assert_eq!(
        users,
        vec![
            (Some("user".to_string()), None),
            (Some("user".to_string()), None),
            (Some("user".to_string()), None),
            (Some("manager".to_string()), Some(1)),
        ]
    );
}

#[tokio::test]
async fn ensure_primitives_are_idempotent() {
    let db = memory_db().await;
    db.execute_unprepared("CREATE TABLE t (id INTEGER PRIMARY KEY)").await.unwrap();
    let manager = SchemaManager::new(&db);

    let col = || ColumnDef::new(Alias::new("flag")).boolean().not_null().default(false).to_owned();
    assert_eq!(ensure_column(&manager, "t", col()).await.unwrap(), EnsureOutcome::Applied);
    assert_eq!(ensure_column(&manager, "t", col()).await.unwrap(), EnsureOutcome::AlreadyPresent);

    let idx = || Index::create().name("idx_t_flag").table(Alias::new("t")).col(Alias::new("flag")).to_owned();
    assert_eq!(ensure_index(&manager, "t", "idx_t_flag", idx()).await.unwrap(), EnsureOutcome::Applied);
    assert_eq!(ensure_index(&manager, "t", "idx_t_flag", idx()).await.unwrap(), EnsureOutcome::AlreadyPresent);
}

#[tokio::test]
async fn script_swallows_duplicate_column_and_stops_on_syntax_error() {
    let db = memory_db().await;
    let report = apply_script(
        &db,
        "CREATE TABLE t (id INTEGER PRIMARY KEY, note TEXT);\nALTER TABLE t ADD COLUMN note TEXT;\nINSERT INTO t (note) VALUES ('a;b');",
    )
    .await
    .unwrap();
    assert_eq!(report, sql_script::ScriptReport { applied: 2, skipped: 1 });

    let err = apply_script(&db, "SELEC nonsense;").await.unwrap_err();
    assert_eq!(schema_ops::classify(&err), schema_ops::ErrorClass::Fatal);
}

#[tokio::test]
async fn lock_is_noop_off_mysql() {
    let db = memory_db().await;
    let guard = MigrationLock::acquire(&db, LOCK_NAME, 1).await.unwrap();
    assert!(!guard.is_held());
    guard.release(&db).await.unwrap();
}

#[tokio::test]
async fn release_after_keeps_the_run_error() {
    let db = memory_db().await;
    let guard = MigrationLock::acquire(&db, LOCK_NAME, 1).await.unwrap();
    let res: Result<(), MigrateError> = release_after(&db, guard, Err(MigrateError::Lock("step failed".into()))).await;
    assert!(matches!(res, Err(MigrateError::Lock(msg)) if msg == "step failed"));

    let guard = MigrationLock::acquire(&db, LOCK_NAME, 1).await.unwrap();
    assert_eq!(release_after(&db, guard, Ok(7)).await.unwrap(), 7);
}
