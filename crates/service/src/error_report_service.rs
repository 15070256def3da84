//! Moderation queue for reported reviews.

use sea_orm::DatabaseConnection;
use tracing::{info, instrument};

use models::error_report::{self, ReportStatus};

use crate::access::{require_admin, require_admin_write};
use crate::auth::domain::AuthUser;
use crate::errors::ServiceError;

pub async fn list_reports(
    db: &DatabaseConnection,
    actor: &AuthUser,
    status: Option<ReportStatus>,
) -> Result<Vec<error_report::Model>, ServiceError> {
    require_admin(actor)?;
    Ok(error_report::list(db, status).await?)
}

#[instrument(skip(db, actor, note), fields(actor_id = actor.id))]
pub async fn resolve_report(
    db: &DatabaseConnection,
    actor: &AuthUser,
    id: i32,
    status: ReportStatus,
    note: Option<String>,
) -> Result<error_report::Model, ServiceError> {
    require_admin_write(actor)?;
    let closed = error_report::resolve(db, id, actor.id, status, note).await?;
    info!(report_id = id, status = ?closed.status, "error_report_closed");
    Ok(closed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review_service::{create_review, report_review};
    use crate::test_support::{get_db, seed_restaurant, seed_user};
    use models::review::{NewReview, ReviewType};
    use models::user::Role;

    #[tokio::test]
    async fn admin_resolves_pending_reports() -> anyhow::Result<()> {
        let db = get_db().await?;
        let r = seed_restaurant(&db, "Flagged").await?;
        let ann = seed_user(&db, "ann@x.io", Role::User, None).await?;
        let admin = seed_user(&db, "adm@x.io", Role::Admin, None).await?;
        let rv = create_review(
            &db,
            &ann,
            NewReview { restaurant_id: r.id, content: "rude".into(), rating: 1, review_type: ReviewType::InRestaurant },
        )
        .await?;
        let report = report_review(&db, &ann, rv.id, "insults staff").await?;

        assert!(matches!(list_reports(&db, &ann, None).await, Err(ServiceError::Forbidden(_))));
        assert_eq!(list_reports(&db, &admin, Some(ReportStatus::Pending)).await?.len(), 1);

        assert!(matches!(
            resolve_report(&db, &admin, report.id, ReportStatus::Pending, None).await,
            Err(ServiceError::Validation(_))
        ));
        let closed = resolve_report(&db, &admin, report.id, ReportStatus::Resolved, Some("removed".into())).await?;
        assert_eq!(closed.resolved_by, Some(admin.id));
        assert!(list_reports(&db, &admin, Some(ReportStatus::Pending)).await?.is_empty());
        assert!(matches!(
            resolve_report(&db, &admin, report.id, ReportStatus::Rejected, None).await,
            Err(ServiceError::Conflict(_))
        ));
        Ok(())
    }
}
