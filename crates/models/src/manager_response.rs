use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, JoinType, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{review, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "manager_responses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub review_id: i32,
    pub manager_id: i32,
    #[sea_orm(column_type = "Text")]
    pub response_text: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Review,
    Manager,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Review => Entity::belongs_to(review::Entity)
                .from(Column::ReviewId)
                .to(review::Column::Id)
                .into(),
            Relation::Manager => Entity::belongs_to(user::Entity)
                .from(Column::ManagerId)
                .to(user::Column::Id)
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

fn validate_text(text: &str) -> Result<String, ModelError> {
    let t = text.trim();
    if t.is_empty() {
        return Err(ModelError::Validation("response_text required".into()));
    }
    Ok(t.to_string())
}

/// At most one response exists per review; a second one is a conflict.
pub async fn create<C: ConnectionTrait>(db: &C, review_id: i32, manager_id: i32, text: &str) -> Result<Model, ModelError> {
    let text = validate_text(text)?;
    if find_by_review(db, review_id).await?.is_some() {
        return Err(ModelError::Conflict(format!("review {review_id} already has a response")));
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        review_id: Set(review_id),
        manager_id: Set(manager_id),
        response_text: Set(text),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<Model, ModelError> {
    Entity::find_by_id(id).one(db).await?.ok_or(ModelError::NotFound("manager response"))
}

pub async fn find_by_review<C: ConnectionTrait>(db: &C, review_id: i32) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::ReviewId.eq(review_id)).one(db).await?)
}

pub async fn update_text<C: ConnectionTrait>(db: &C, id: i32, text: &str) -> Result<Model, ModelError> {
    let text = validate_text(text)?;
    let mut am: ActiveModel = find_by_id(db, id).await?.into();
    am.response_text = Set(text);
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Responses newest first, optionally limited to one restaurant's reviews.
pub async fn list<C: ConnectionTrait>(db: &C, restaurant_id: Option<i32>) -> Result<Vec<Model>, ModelError> {
    let mut q = Entity::find()
        .join(JoinType::InnerJoin, Relation::Review.def())
        .filter(review::Column::Deleted.eq(false));
    if let Some(rid) = restaurant_id {
        q = q.filter(review::Column::RestaurantId.eq(rid));
    }
    Ok(q.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id).all(db).await?)
}
