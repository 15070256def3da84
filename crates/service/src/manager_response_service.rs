//! Manager replies to reviews. The reply text is mirrored onto the review
//! row so review listings carry it without a join.

use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{info, instrument};

use models::manager_response;
use models::review;
use models::user::Role;

use crate::access::{require_active, require_restaurant_staff};
use crate::auth::domain::AuthUser;
use crate::errors::ServiceError;

/// Managers see their own restaurant; admins see everything or filter by
/// `restaurant_id`.
#[instrument(skip(db, actor), fields(actor_id = actor.id))]
pub async fn list_responses(
    db: &DatabaseConnection,
    actor: &AuthUser,
    restaurant_id: Option<i32>,
) -> Result<Vec<manager_response::Model>, ServiceError> {
    let scope = match actor.role {
        r if r.is_admin() => restaurant_id,
        Role::Manager => {
            let own = actor
                .restaurant_id
                .ok_or_else(|| ServiceError::forbidden("manager has no restaurant"))?;
            if restaurant_id.is_some_and(|rid| rid != own) {
                return Err(ServiceError::forbidden("not the manager of this restaurant"));
            }
            Some(own)
        }
        _ => return Err(ServiceError::forbidden("manager role required")),
    };
    Ok(manager_response::list(db, scope).await?)
}

#[instrument(skip(db, actor, text), fields(actor_id = actor.id))]
pub async fn respond(
    db: &DatabaseConnection,
    actor: &AuthUser,
    review_id: i32,
    text: &str,
) -> Result<manager_response::Model, ServiceError> {
    require_active(actor)?;
    let txn = db.begin().await?;
    let target = review::find_live(&txn, review_id).await?;
    require_restaurant_staff(actor, target.restaurant_id)?;
    let created = manager_response::create(&txn, review_id, actor.id, text).await?;
    review::set_response(&txn, review_id, actor.id, &created.response_text).await?;
    txn.commit().await?;
    info!(response_id = created.id, review_id, "manager_response_created");
    Ok(created)
}

/// Edit a reply. Allowed for its author and for admins.
#[instrument(skip(db, actor, text), fields(actor_id = actor.id))]
pub async fn update_response(
    db: &DatabaseConnection,
    actor: &AuthUser,
    id: i32,
    text: &str,
) -> Result<manager_response::Model, ServiceError> {
    require_active(actor)?;
    let txn = db.begin().await?;
    let existing = manager_response::find_by_id(&txn, id).await?;
    if existing.manager_id != actor.id && !actor.role.is_admin() {
        return Err(ServiceError::forbidden("only the author or an admin can edit a response"));
    }
    let updated = manager_response::update_text(&txn, id, text).await?;
    review::set_response(&txn, updated.review_id, existing.manager_id, &updated.response_text).await?;
    txn.commit().await?;
    info!(response_id = id, "manager_response_updated");
    Ok(updated)
}
