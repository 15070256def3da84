use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::review;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "resolved")]
    Resolved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "error_reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub review_id: i32,
    pub reporter_id: Option<i32>,
    #[sea_orm(column_type = "Text")]
    pub reason: String,
    pub status: ReportStatus,
    pub resolved_by: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub resolution_note: Option<String>,
    pub resolved_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Review,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Review => Entity::belongs_to(review::Entity)
                .from(Column::ReviewId)
                .to(review::Column::Id)
                .into(),
        }
    }
}

impl Related<review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create<C: ConnectionTrait>(db: &C, review_id: i32, reporter_id: i32, reason: &str) -> Result<Model, ModelError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(ModelError::Validation("reason required".into()));
    }
    review::find_live(db, review_id).await?;
    let am = ActiveModel {
        review_id: Set(review_id),
        reporter_id: Set(Some(reporter_id)),
        reason: Set(reason.to_string()),
        status: Set(ReportStatus::Pending),
        resolved_by: Set(None),
        resolution_note: Set(None),
        resolved_at: Set(None),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub async fn list<C: ConnectionTrait>(db: &C, status: Option<ReportStatus>) -> Result<Vec<Model>, ModelError> {
    let mut q = Entity::find();
    if let Some(s) = status {
        q = q.filter(Column::Status.eq(s));
    }
    Ok(q.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id).all(db).await?)
}

/// Close a pending report as `resolved` or `rejected`.
pub async fn resolve<C: ConnectionTrait>(
    db: &C,
    id: i32,
    resolver_id: i32,
    status: ReportStatus,
    note: Option<String>,
) -> Result<Model, ModelError> {
    if status == ReportStatus::Pending {
        return Err(ModelError::Validation("status must be resolved or rejected".into()));
    }
    let found = Entity::find_by_id(id).one(db).await?.ok_or(ModelError::NotFound("error report"))?;
    if found.status != ReportStatus::Pending {
        return Err(ModelError::Conflict(format!("error report {id} already closed")));
    }
    let mut am: ActiveModel = found.into();
    am.status = Set(status);
    am.resolved_by = Set(Some(resolver_id));
    am.resolution_note = Set(note);
    am.resolved_at = Set(Some(Utc::now().into()));
    Ok(am.update(db).await?)
}
