#![cfg(test)]
use sea_orm::DatabaseConnection;

use models::restaurant::{self, NewRestaurant};
use models::user::{self, Role};

use crate::auth::domain::AuthUser;

/// Fresh in-memory database with every migration applied; each test gets
/// its own.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    models::db::connect_memory().await
}

pub async fn seed_restaurant(db: &DatabaseConnection, name: &str) -> Result<restaurant::Model, anyhow::Error> {
    Ok(restaurant::create(
        db,
        NewRestaurant { name: name.into(), category: Some("bistro".into()), price_range: Some("$$".into()), ..Default::default() },
    )
    .await?)
}

/// Insert a user with the given role; the password hash is a placeholder.
pub async fn seed_user(
    db: &DatabaseConnection,
    email: &str,
    role: Role,
    restaurant_id: Option<i32>,
) -> Result<AuthUser, anyhow::Error> {
    let u = user::create(db, "Seed", email, "$argon2id$v=19$placeholder").await?;
    let u = if role == Role::User { u } else { user::set_role(db, u.id, role, restaurant_id).await? };
    Ok(u.into())
}
