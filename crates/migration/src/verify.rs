//! Expected schema catalogue and a read-only comparison against a live
//! database.

use sea_orm_migration::prelude::*;

pub const EXPECTED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "restaurants",
        &[
            "id", "name", "slug", "address", "description", "image_url", "category", "price_range", "rating",
            "is_active", "deleted", "created_at", "updated_at",
        ],
    ),
    (
        "users",
        &[
            "id", "name", "email", "password", "role", "is_blocked", "blocked_reason", "restaurant_id",
            "created_at", "updated_at",
        ],
    ),
    (
        "reviews",
        &[
            "id", "user_id", "restaurant_id", "content", "rating", "type", "deleted", "responded_by",
            "response_text", "response_date", "created_at", "updated_at",
        ],
    ),
    (
        "deleted_reviews",
        &[
            "id", "original_id", "user_id", "restaurant_id", "content", "rating", "type", "deleted_by",
            "deletion_reason", "original_created_at", "deleted_at",
        ],
    ),
    ("manager_responses", &["id", "review_id", "manager_id", "response_text", "created_at", "updated_at"]),
    (
        "error_reports",
        &[
            "id", "review_id", "reporter_id", "reason", "status", "resolved_by", "resolution_note", "resolved_at",
            "created_at",
        ],
    ),
];

pub const EXPECTED_INDEXES: &[(&str, &str)] = &[
    ("restaurants", "uniq_restaurants_slug"),
    ("restaurants", "idx_restaurants_category"),
    ("users", "idx_users_role"),
    ("reviews", "idx_reviews_restaurant"),
    ("reviews", "idx_reviews_user"),
    ("deleted_reviews", "idx_deleted_reviews_original"),
    ("error_reports", "idx_error_reports_status"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    Table(String),
    Column { table: String, column: String },
    Index { table: String, index: String },
}

impl std::fmt::Display for Missing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Missing::Table(t) => write!(f, "table {t}"),
            Missing::Column { table, column } => write!(f, "column {table}.{column}"),
            Missing::Index { table, index } => write!(f, "index {table}#{index}"),
        }
    }
}

/// List every expected table, column and index absent from the live schema.
pub async fn verify(manager: &SchemaManager<'_>) -> Result<Vec<Missing>, DbErr> {
    let mut missing = Vec::new();
    for (table, columns) in EXPECTED_COLUMNS {
        if !manager.has_table(*table).await? {
            missing.push(Missing::Table(ToString::to_string(&table)));
            continue;
        }
        for column in columns.iter() {
            if !manager.has_column(*table, *column).await? {
                missing.push(Missing::Column { table: ToString::to_string(&table), column: ToString::to_string(&column) });
            }
        }
    }
    for (table, index) in EXPECTED_INDEXES {
        if missing.iter().any(|m| matches!(m, Missing::Table(t) if t == table)) {
            continue;
        }
        if !manager.has_index(*table, *index).await? {
            missing.push(Missing::Index { table: ToString::to_string(&table), index: ToString::to_string(&index) });
        }
    }
    Ok(missing)
}
