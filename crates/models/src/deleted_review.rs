//! Archive of removed reviews. Rows are append-only and carry no foreign
//! keys so they survive the users and restaurants they reference.
use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::review;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deleted_reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub original_id: i32,
    pub user_id: Option<i32>,
    pub restaurant_id: i32,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub rating: i32,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub review_type: review::ReviewType,
    pub deleted_by: Option<i32>,
    pub deletion_reason: Option<String>,
    pub original_created_at: DateTimeWithTimeZone,
    pub deleted_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub async fn archive<C: ConnectionTrait>(
    db: &C,
    original: &review::Model,
    deleted_by: i32,
    reason: Option<String>,
) -> Result<Model, ModelError> {
    let am = ActiveModel {
        original_id: Set(original.id),
        user_id: Set(original.user_id),
        restaurant_id: Set(original.restaurant_id),
        content: Set(original.content.clone()),
        rating: Set(original.rating),
        review_type: Set(original.review_type),
        deleted_by: Set(Some(deleted_by)),
        deletion_reason: Set(reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty())),
        original_created_at: Set(original.created_at),
        deleted_at: Set(Utc::now().into()),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_original<C: ConnectionTrait>(db: &C, original_id: i32) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find()
        .filter(Column::OriginalId.eq(original_id))
        .one(db)
        .await?)
}
