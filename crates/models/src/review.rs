use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{restaurant, user};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ReviewType {
    #[default]
    #[sea_orm(string_value = "inRestaurant")]
    #[serde(rename = "inRestaurant")]
    InRestaurant,
    #[sea_orm(string_value = "delivery")]
    #[serde(rename = "delivery")]
    Delivery,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: Option<i32>,
    pub restaurant_id: i32,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub rating: i32,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub review_type: ReviewType,
    pub deleted: bool,
    pub responded_by: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub response_text: Option<String>,
    pub response_date: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Restaurant,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::Restaurant => Entity::belongs_to(restaurant::Entity)
                .from(Column::RestaurantId)
                .to(restaurant::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_rating(rating: i32) -> Result<(), ModelError> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(ModelError::Validation(format!("rating must be between 1 and 5, got {rating}")))
    }
}

pub fn validate_content(content: &str) -> Result<(), ModelError> {
    if content.trim().is_empty() {
        return Err(ModelError::Validation("content required".into()));
    }
    Ok(())
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewReview {
    pub restaurant_id: i32,
    pub content: String,
    pub rating: i32,
    #[serde(rename = "type", default)]
    pub review_type: ReviewType,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReviewPatch {
    pub content: Option<String>,
    pub rating: Option<i32>,
    #[serde(rename = "type")]
    pub review_type: Option<ReviewType>,
}

/// Insert a review for a live restaurant. Rating refresh is the caller's job.
pub async fn create<C: ConnectionTrait>(db: &C, user_id: i32, input: NewReview) -> Result<Model, ModelError> {
    validate_rating(input.rating)?;
    validate_content(&input.content)?;
    restaurant::find_live(db, input.restaurant_id).await?;
    let now = Utc::now().into();
    let am = ActiveModel {
        user_id: Set(Some(user_id)),
        restaurant_id: Set(input.restaurant_id),
        content: Set(input.content.trim().to_string()),
        rating: Set(input.rating),
        review_type: Set(input.review_type),
        deleted: Set(false),
        responded_by: Set(None),
        response_text: Set(None),
        response_date: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub async fn find_live<C: ConnectionTrait>(db: &C, id: i32) -> Result<Model, ModelError> {
    Entity::find_by_id(id)
        .filter(Column::Deleted.eq(false))
        .one(db)
        .await?
        .ok_or(ModelError::NotFound("review"))
}

/// Live reviews of a restaurant, newest first.
pub async fn list_for_restaurant<C: ConnectionTrait>(db: &C, restaurant_id: i32) -> Result<Vec<Model>, ModelError> {
    Ok(Entity::find()
        .filter(Column::RestaurantId.eq(restaurant_id))
        .filter(Column::Deleted.eq(false))
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .all(db)
        .await?)
}

pub async fn update<C: ConnectionTrait>(db: &C, id: i32, patch: ReviewPatch) -> Result<Model, ModelError> {
    let mut am: ActiveModel = find_live(db, id).await?.into();
    if let Some(rating) = patch.rating {
        validate_rating(rating)?;
        am.rating = Set(rating);
    }
    if let Some(content) = patch.content {
        validate_content(&content)?;
        am.content = Set(content.trim().to_string());
    }
    if let Some(t) = patch.review_type {
        am.review_type = Set(t);
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn mark_deleted<C: ConnectionTrait>(db: &C, id: i32) -> Result<Model, ModelError> {
    let mut am: ActiveModel = find_live(db, id).await?.into();
    am.deleted = Set(true);
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Mirror a manager reply onto the review row.
pub async fn set_response<C: ConnectionTrait>(db: &C, id: i32, manager_id: i32, text: &str) -> Result<Model, ModelError> {
    let mut am: ActiveModel = find_live(db, id).await?.into();
    let now = Utc::now().into();
    am.responded_by = Set(Some(manager_id));
    am.response_text = Set(Some(text.to_string()));
    am.response_date = Set(Some(now));
    am.updated_at = Set(now);
    Ok(am.update(db).await?)
}
