//! Bring tables created by older deployments up to the current shape.
//!
//! Early schemas lacked moderation, soft-delete and manager columns. Each
//! column is added only when missing, then rows are backfilled so the
//! invariants the application relies on hold for old data too. On a fresh
//! database every step reports `AlreadyPresent` and the backfills touch
//! nothing.
use std::collections::HashSet;

use sea_orm_migration::{prelude::*, schema::*};
use sea_orm_migration::sea_orm::ConnectionTrait;
use tracing::info;

use crate::schema_ops::ensure_column;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // restaurants
        ensure_column(manager, "restaurants", string_len_null(Restaurants::Slug, 255)).await?;
        ensure_column(manager, "restaurants", string_len_null(Restaurants::Category, 64)).await?;
        ensure_column(manager, "restaurants", string_len_null(Restaurants::PriceRange, 16)).await?;
        ensure_column(manager, "restaurants", double(Restaurants::Rating).default(0.0).to_owned()).await?;
        ensure_column(manager, "restaurants", boolean(Restaurants::IsActive).default(true).to_owned()).await?;
        ensure_column(manager, "restaurants", boolean(Restaurants::Deleted).default(false).to_owned()).await?;

        // users
        ensure_column(manager, "users", string_len(Users::Role, 16).default("user").to_owned()).await?;
        ensure_column(manager, "users", boolean(Users::IsBlocked).default(false).to_owned()).await?;
        ensure_column(manager, "users", string_len_null(Users::BlockedReason, 512)).await?;
        ensure_column(manager, "users", integer_null(Users::RestaurantId)).await?;

        // reviews
        ensure_column(manager, "reviews", string_len(Reviews::Type, 16).default("inRestaurant").to_owned()).await?;
        ensure_column(manager, "reviews", boolean(Reviews::Deleted).default(false).to_owned()).await?;
        ensure_column(manager, "reviews", integer_null(Reviews::RespondedBy)).await?;
        ensure_column(manager, "reviews", text_null(Reviews::ResponseText)).await?;
        ensure_column(manager, "reviews", timestamp_with_time_zone_null(Reviews::ResponseDate)).await?;

        backfill_review_types(manager).await?;
        backfill_roles(manager).await?;
        clear_non_manager_restaurants(manager).await?;
        backfill_slugs(manager).await?;
        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        // Columns added here also exist in the create migrations; dropping
        // them would break a fresh schema.
        Ok(())
    }
}

async fn backfill_review_types(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    let db = manager.get_connection();
    let stmt = Query::update()
        .table(Reviews::Table)
        .value(Reviews::Type, "inRestaurant")
        .cond_where(
            Cond::any()
                .add(Expr::col(Reviews::Type).is_null())
                .add(Expr::col(Reviews::Type).is_not_in(["inRestaurant", "delivery"])),
        )
        .to_owned();
    let res = db.execute(manager.get_database_backend().build(&stmt)).await?;
    if res.rows_affected() > 0 {
        info!(rows = res.rows_affected(), "backfilled review type");
    }

    let stmt = Query::update()
        .table(Reviews::Table)
        .value(Reviews::Deleted, false)
        .and_where(Expr::col(Reviews::Deleted).is_null())
        .to_owned();
    let res = db.execute(manager.get_database_backend().build(&stmt)).await?;
    if res.rows_affected() > 0 {
        info!(rows = res.rows_affected(), "backfilled review deleted flag");
    }
    Ok(())
}

/// Unknown or missing roles become `user`; must run before the
/// restaurant_id cleanup, which compares against the role.
async fn backfill_roles(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    let db = manager.get_connection();
    let stmt = Query::update()
        .table(Users::Table)
        .value(Users::Role, "user")
        .cond_where(
            Cond::any()
                .add(Expr::col(Users::Role).is_null())
                .add(Expr::col(Users::Role).is_not_in(KNOWN_ROLES)),
        )
        .to_owned();
    let res = db.execute(manager.get_database_backend().build(&stmt)).await?;
    if res.rows_affected() > 0 {
        info!(rows = res.rows_affected(), "reset unknown user roles to user");
    }
    Ok(())
}

async fn clear_non_manager_restaurants(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    let db = manager.get_connection();
    let stmt = Query::update()
        .table(Users::Table)
        .value(Users::RestaurantId, Option::<i32>::None)
        .and_where(Expr::col(Users::Role).ne("manager"))
        .and_where(Expr::col(Users::RestaurantId).is_not_null())
        .to_owned();
    let res = db.execute(manager.get_database_backend().build(&stmt)).await?;
    if res.rows_affected() > 0 {
        info!(rows = res.rows_affected(), "cleared restaurant_id on non-manager users");
    }
    Ok(())
}

async fn backfill_slugs(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    let db = manager.get_connection();
    let backend = manager.get_database_backend();

    let taken_q = Query::select()
        .column(Restaurants::Slug)
        .from(Restaurants::Table)
        .and_where(Expr::col(Restaurants::Slug).is_not_null())
        .and_where(Expr::col(Restaurants::Slug).ne(""))
        .to_owned();
    let mut taken: HashSet<String> = HashSet::new();
    for row in db.query_all(backend.build(&taken_q)).await? {
        taken.insert(row.try_get::<String>("", "slug")?);
    }

    let missing_q = Query::select()
        .columns([Restaurants::Id, Restaurants::Name])
        .from(Restaurants::Table)
        .cond_where(
            Cond::any()
                .add(Expr::col(Restaurants::Slug).is_null())
                .add(Expr::col(Restaurants::Slug).eq("")),
        )
        .order_by(Restaurants::Id, Order::Asc)
        .to_owned();
    let rows = db.query_all(backend.build(&missing_q)).await?;
    for row in rows {
        let id: i32 = row.try_get("", "id")?;
        let name: String = row.try_get("", "name")?;
        let slug = unique_slug(&name, id, &taken);
        taken.insert(slug.clone());
        let upd = Query::update()
            .table(Restaurants::Table)
            .value(Restaurants::Slug, slug.clone())
            .and_where(Expr::col(Restaurants::Id).eq(id))
            .to_owned();
        db.execute(backend.build(&upd)).await?;
        info!(restaurant_id = id, %slug, "backfilled slug");
    }
    Ok(())
}

const KNOWN_ROLES: [&str; 4] = ["user", "manager", "admin", "head_admin"];

/// Slug for a legacy row; names that collide or slugify to nothing fall
/// back to an id suffix, then to a counter until the slug is free.
fn unique_slug(name: &str, id: i32, taken: &HashSet<String>) -> String {
    let base = match common::slug::slugify(name) {
        Ok(s) if !taken.contains(&s) => return s,
        Ok(s) => format!("{s}-{id}"),
        Err(_) => format!("restaurant-{id}"),
    };
    if !taken.contains(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or(base)
}

#[derive(DeriveIden)]
enum Restaurants { Table, Id, Name, Slug, Category, PriceRange, Rating, IsActive, Deleted }

#[derive(DeriveIden)]
enum Users { Table, Role, IsBlocked, BlockedReason, RestaurantId }

#[derive(DeriveIden)]
enum Reviews { Table, Type, Deleted, RespondedBy, ResponseText, ResponseDate }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_slug_suffixes_collisions() {
        let mut taken = HashSet::new();
        assert_eq!(unique_slug("Blue Door", 3, &taken), "blue-door");
        taken.insert("blue-door".to_string());
        assert_eq!(unique_slug("Blue  Door!", 7, &taken), "blue-door-7");
        assert_eq!(unique_slug("???", 9, &taken), "restaurant-9");
    }

    #[test]
    fn unique_slug_skips_suffixes_already_taken() {
        let taken: HashSet<String> = ["cafe", "cafe-3", "cafe-3-2", "restaurant-4"].iter().map(|s| ToString::to_string(s)).collect();
        assert_eq!(unique_slug("CAFE", 3, &taken), "cafe-3-3");
        assert_eq!(unique_slug("!!!", 4, &taken), "restaurant-4-2");
    }
}
