//! Account administration: listing, blocking and role changes.

use sea_orm::DatabaseConnection;
use tracing::{info, instrument, warn};

use models::user::{self, Role};

use crate::access::{require_admin, require_head_admin, require_outranks};
use crate::auth::domain::AuthUser;
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

pub async fn list_users(
    db: &DatabaseConnection,
    actor: &AuthUser,
    opts: Pagination,
) -> Result<Page<user::Model>, ServiceError> {
    require_admin(actor)?;
    let norm = opts.normalize();
    let (items, total) = user::list(db, norm.0, norm.1).await?;
    Ok(Page::new(items, total, norm))
}

#[instrument(skip(db, actor, reason), fields(actor_id = actor.id))]
pub async fn block_user(db: &DatabaseConnection, actor: &AuthUser, target_id: i32, reason: &str) -> Result<user::Model, ServiceError> {
    let target = user::find_by_id(db, target_id).await?;
    require_outranks(actor, target.id, target.role)?;
    let blocked = user::block(db, target_id, reason).await?;
    warn!(target_id, "user_blocked");
    Ok(blocked)
}

#[instrument(skip(db, actor), fields(actor_id = actor.id))]
pub async fn unblock_user(db: &DatabaseConnection, actor: &AuthUser, target_id: i32) -> Result<user::Model, ServiceError> {
    let target = user::find_by_id(db, target_id).await?;
    require_outranks(actor, target.id, target.role)?;
    let unblocked = user::unblock(db, target_id).await?;
    info!(target_id, "user_unblocked");
    Ok(unblocked)
}

/// Head admins assign roles; managers must come with a restaurant.
#[instrument(skip(db, actor), fields(actor_id = actor.id))]
pub async fn set_role(
    db: &DatabaseConnection,
    actor: &AuthUser,
    target_id: i32,
    role: Role,
    restaurant_id: Option<i32>,
) -> Result<user::Model, ServiceError> {
    require_head_admin(actor)?;
    let target = user::find_by_id(db, target_id).await?;
    require_outranks(actor, target.id, target.role)?;
    let updated = user::set_role(db, target_id, role, restaurant_id).await?;
    info!(target_id, role = %role, restaurant_id = ?updated.restaurant_id, "user_role_changed");
    Ok(updated)
}

/// Operator path used by the `migrate grant-role` command; no caller checks.
#[instrument(skip(db))]
pub async fn grant_role_by_email(
    db: &DatabaseConnection,
    email: &str,
    role: Role,
    restaurant_id: Option<i32>,
) -> Result<user::Model, ServiceError> {
    let target = user::find_by_email(db, email)
        .await?
        .ok_or_else(|| ServiceError::not_found("user"))?;
    let updated = user::set_role(db, target.id, role, restaurant_id).await?;
    info!(user_id = updated.id, role = %role, "role_granted");
    Ok(updated)
}
