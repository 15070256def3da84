//! Review lifecycle. Every change refreshes the restaurant rating inside
//! the same transaction.

use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{info, instrument};

use models::review::{self, NewReview, ReviewPatch};
use models::{deleted_review, error_report, restaurant};

use crate::access::require_active;
use crate::auth::domain::AuthUser;
use crate::errors::ServiceError;

#[instrument(skip(db, actor, input), fields(actor_id = actor.id, restaurant_id = input.restaurant_id))]
pub async fn create_review(db: &DatabaseConnection, actor: &AuthUser, input: NewReview) -> Result<review::Model, ServiceError> {
    require_active(actor)?;
    let txn = db.begin().await?;
    let created = review::create(&txn, actor.id, input).await?;
    let rating = restaurant::recompute_rating(&txn, created.restaurant_id).await?;
    txn.commit().await?;
    info!(review_id = created.id, rating, "review_created");
    Ok(created)
}

/// Only the author may edit a review.
#[instrument(skip(db, actor, patch), fields(actor_id = actor.id))]
pub async fn update_review(
    db: &DatabaseConnection,
    actor: &AuthUser,
    id: i32,
    patch: ReviewPatch,
) -> Result<review::Model, ServiceError> {
    require_active(actor)?;
    let txn = db.begin().await?;
    let existing = review::find_live(&txn, id).await?;
    if existing.user_id != Some(actor.id) {
        return Err(ServiceError::forbidden("only the author can edit a review"));
    }
    let updated = review::update(&txn, id, patch).await?;
    let rating = restaurant::recompute_rating(&txn, updated.restaurant_id).await?;
    txn.commit().await?;
    info!(review_id = id, rating, "review_updated");
    Ok(updated)
}

/// Archive then soft-delete. Allowed for the author and for admins.
#[instrument(skip(db, actor, reason), fields(actor_id = actor.id))]
pub async fn delete_review(
    db: &DatabaseConnection,
    actor: &AuthUser,
    id: i32,
    reason: Option<String>,
) -> Result<(), ServiceError> {
    require_active(actor)?;
    let txn = db.begin().await?;
    let existing = review::find_live(&txn, id).await?;
    if existing.user_id != Some(actor.id) && !actor.role.is_admin() {
        return Err(ServiceError::forbidden("only the author or an admin can delete a review"));
    }
    deleted_review::archive(&txn, &existing, actor.id, reason).await?;
    review::mark_deleted(&txn, id).await?;
    let rating = restaurant::recompute_rating(&txn, existing.restaurant_id).await?;
    txn.commit().await?;
    info!(review_id = id, restaurant_id = existing.restaurant_id, rating, "review_deleted");
    Ok(())
}

/// Flag a review for moderation.
#[instrument(skip(db, actor, reason), fields(actor_id = actor.id))]
pub async fn report_review(
    db: &DatabaseConnection,
    actor: &AuthUser,
    review_id: i32,
    reason: &str,
) -> Result<error_report::Model, ServiceError> {
    require_active(actor)?;
    let report = error_report::create(db, review_id, actor.id, reason).await?;
    info!(report_id = report.id, review_id, "review_reported");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_restaurant, seed_user};
    use models::review::ReviewType;
    use models::user::{self, Role};

    fn new_review(restaurant_id: i32, rating: i32) -> NewReview {
        NewReview { restaurant_id, content: "nice place".into(), rating, review_type: ReviewType::InRestaurant }
    }

    #[tokio::test]
    async fn rating_follows_review_changes() -> anyhow::Result<()> {
        let db = get_db().await?;
        let r = seed_restaurant(&db, "Rated").await?;
        let ann = seed_user(&db, "ann@x.io", Role::User, None).await?;
        let bob = seed_user(&db, "bob@x.io", Role::User, None).await?;

        let a = create_review(&db, &ann, new_review(r.id, 5)).await?;
        create_review(&db, &bob, new_review(r.id, 2)).await?;
        assert_eq!(restaurant::find_live(&db, r.id).await?.rating, 3.5);

        update_review(&db, &ann, a.id, ReviewPatch { rating: Some(4), ..Default::default() }).await?;
        assert_eq!(restaurant::find_live(&db, r.id).await?.rating, 3.0);

        delete_review(&db, &ann, a.id, Some("changed my mind".into())).await?;
        assert_eq!(restaurant::find_live(&db, r.id).await?.rating, 2.0);
        let archived = deleted_review::find_by_original(&db, a.id).await?.expect("archived");
        assert_eq!(archived.deletion_reason.as_deref(), Some("changed my mind"));
        Ok(())
    }

    #[tokio::test]
    async fn only_author_edits_and_admin_may_delete() -> anyhow::Result<()> {
        let db = get_db().await?;
        let r = seed_restaurant(&db, "Guarded").await?;
        let ann = seed_user(&db, "ann@x.io", Role::User, None).await?;
        let eve = seed_user(&db, "eve@x.io", Role::User, None).await?;
        let admin = seed_user(&db, "adm@x.io", Role::Admin, None).await?;
        let a = create_review(&db, &ann, new_review(r.id, 4)).await?;

        let edit = update_review(&db, &eve, a.id, ReviewPatch { content: Some("hacked".into()), ..Default::default() }).await;
        assert!(matches!(edit, Err(ServiceError::Forbidden(_))));
        assert!(matches!(delete_review(&db, &eve, a.id, None).await, Err(ServiceError::Forbidden(_))));

        delete_review(&db, &admin, a.id, None).await?;
        assert!(matches!(delete_review(&db, &admin, a.id, None).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_rating_and_blocked_author_are_rejected() -> anyhow::Result<()> {
        let db = get_db().await?;
        let r = seed_restaurant(&db, "Strict").await?;
        let ann = seed_user(&db, "ann@x.io", Role::User, None).await?;
        assert!(matches!(create_review(&db, &ann, new_review(r.id, 6)).await, Err(ServiceError::Validation(_))));

        let blocked: AuthUser = user::block(&db, ann.id, "spam").await?.into();
        assert!(matches!(create_review(&db, &blocked, new_review(r.id, 3)).await, Err(ServiceError::Forbidden(_))));
        Ok(())
    }

    #[tokio::test]
    async fn report_creates_pending_entry() -> anyhow::Result<()> {
        let db = get_db().await?;
        let r = seed_restaurant(&db, "Reported").await?;
        let ann = seed_user(&db, "ann@x.io", Role::User, None).await?;
        let a = create_review(&db, &ann, new_review(r.id, 1)).await?;
        let report = report_review(&db, &ann, a.id, "spam link").await?;
        assert_eq!(report.status, error_report::ReportStatus::Pending);
        assert!(matches!(report_review(&db, &ann, a.id, " ").await, Err(ServiceError::Validation(_))));
        Ok(())
    }
}
