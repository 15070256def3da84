//! Restaurant catalogue: public listing and admin maintenance.

use sea_orm::DatabaseConnection;
use tracing::{info, instrument};

use models::restaurant::{self, NewRestaurant, RestaurantFilter, RestaurantPatch};
use models::review;

use crate::access::require_admin_write;
use crate::auth::domain::AuthUser;
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

/// List active restaurants with filters and pagination.
#[instrument(skip(db))]
pub async fn list_restaurants(
    db: &DatabaseConnection,
    filter: &RestaurantFilter,
    opts: Pagination,
) -> Result<Page<restaurant::Model>, ServiceError> {
    if let Some(r) = filter.min_rating {
        if !(0.0..=5.0).contains(&r) {
            return Err(ServiceError::Validation("min_rating must be within 0..=5".into()));
        }
    }
    let norm = opts.normalize();
    let (items, total) = restaurant::search(db, filter, norm.0, norm.1).await?;
    Ok(Page::new(items, total, norm))
}

pub async fn get_by_slug(db: &DatabaseConnection, slug: &str) -> Result<restaurant::Model, ServiceError> {
    Ok(restaurant::find_by_slug(db, slug).await?)
}

/// Live reviews of a live restaurant, newest first.
pub async fn list_reviews(db: &DatabaseConnection, restaurant_id: i32) -> Result<Vec<review::Model>, ServiceError> {
    restaurant::find_live(db, restaurant_id).await?;
    Ok(review::list_for_restaurant(db, restaurant_id).await?)
}

pub async fn categories(db: &DatabaseConnection) -> Result<Vec<String>, ServiceError> {
    Ok(restaurant::categories(db).await?)
}

#[instrument(skip(db, actor, input), fields(actor_id = actor.id, name = %input.name))]
pub async fn create_restaurant(
    db: &DatabaseConnection,
    actor: &AuthUser,
    input: NewRestaurant,
) -> Result<restaurant::Model, ServiceError> {
    require_admin_write(actor)?;
    let created = restaurant::create(db, input).await?;
    info!(restaurant_id = created.id, slug = ?created.slug, "restaurant_created");
    Ok(created)
}

#[instrument(skip(db, actor, patch), fields(actor_id = actor.id))]
pub async fn update_restaurant(
    db: &DatabaseConnection,
    actor: &AuthUser,
    id: i32,
    patch: RestaurantPatch,
) -> Result<restaurant::Model, ServiceError> {
    require_admin_write(actor)?;
    let updated = restaurant::update(db, id, patch).await?;
    info!(restaurant_id = id, slug = ?updated.slug, "restaurant_updated");
    Ok(updated)
}

#[instrument(skip(db, actor), fields(actor_id = actor.id))]
pub async fn delete_restaurant(db: &DatabaseConnection, actor: &AuthUser, id: i32) -> Result<(), ServiceError> {
    require_admin_write(actor)?;
    restaurant::soft_delete(db, id).await?;
    info!(restaurant_id = id, "restaurant_deleted");
    Ok(())
}

/// Rename a category on every restaurant; returns the number of rows changed.
#[instrument(skip(db, actor), fields(actor_id = actor.id))]
pub async fn rename_category(db: &DatabaseConnection, actor: &AuthUser, from: &str, to: &str) -> Result<u64, ServiceError> {
    require_admin_write(actor)?;
    let n = restaurant::rename_category(db, from, to).await?;
    if n == 0 {
        return Err(ServiceError::not_found("category"));
    }
    info!(from, to, rows = n, "category_renamed");
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_restaurant, seed_user};
    use models::user::Role;

    #[tokio::test]
    async fn admin_only_maintenance() -> anyhow::Result<()> {
        let db = get_db().await?;
        let user = seed_user(&db, "u@x.io", Role::User, None).await?;
        let admin = seed_user(&db, "a@x.io", Role::Admin, None).await?;

        let input = NewRestaurant { name: "Green Leaf".into(), ..Default::default() };
        assert!(matches!(create_restaurant(&db, &user, input.clone()).await, Err(ServiceError::Forbidden(_))));
        let r = create_restaurant(&db, &admin, input).await?;
        assert_eq!(r.slug.as_deref(), Some("green-leaf"));

        delete_restaurant(&db, &admin, r.id).await?;
        assert!(matches!(get_by_slug(&db, "green-leaf").await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn listing_is_paginated() -> anyhow::Result<()> {
        let db = get_db().await?;
        for name in ["A1", "A2", "A3"] {
            seed_restaurant(&db, name).await?;
        }
        let page = list_restaurants(&db, &RestaurantFilter::default(), Pagination { page: 2, per_page: 2 }).await?;
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "A3");

        let bad = RestaurantFilter { min_rating: Some(9.0), ..Default::default() };
        assert!(matches!(list_restaurants(&db, &bad, Pagination::default()).await, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn rename_unknown_category_is_not_found() -> anyhow::Result<()> {
        let db = get_db().await?;
        let admin = seed_user(&db, "a@x.io", Role::HeadAdmin, None).await?;
        seed_restaurant(&db, "Cozy").await?;
        assert_eq!(rename_category(&db, &admin, "bistro", "brasserie").await?, 1);
        assert!(matches!(rename_category(&db, &admin, "nope", "x").await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
