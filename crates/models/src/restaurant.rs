use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::prelude::*, Condition, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};

use common::slug::{is_valid_slug, slugify};

use crate::errors::ModelError;
use crate::review;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "restaurants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(unique)]
    pub slug: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub price_range: Option<String>,
    pub rating: f64,
    pub is_active: bool,
    pub deleted: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Review,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Review => Entity::has_many(review::Entity).into(),
        }
    }
}

impl Related<review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Input for a new restaurant; the slug is always derived from `name`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewRestaurant {
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub price_range: Option<String>,
}

/// Partial update; `None` leaves a field untouched.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RestaurantPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub price_range: Option<String>,
    pub is_active: Option<bool>,
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    let n = name.trim();
    if n.is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    if n.chars().count() > 255 {
        return Err(ModelError::Validation("name too long (<=255)".into()));
    }
    Ok(())
}

/// Price range is written as one to four `$` signs.
pub fn validate_price_range(p: &str) -> Result<(), ModelError> {
    if (1..=4).contains(&p.len()) && p.chars().all(|c| c == '$') {
        return Ok(());
    }
    Err(ModelError::Validation("price_range must be one to four '$'".into()))
}

pub fn validate_category(c: &str) -> Result<(), ModelError> {
    let c = c.trim();
    if c.is_empty() || c.chars().count() > 64 {
        return Err(ModelError::Validation("category must be 1..=64 characters".into()));
    }
    Ok(())
}

pub fn derive_slug(name: &str) -> Result<String, ModelError> {
    slugify(name).map_err(|e| ModelError::Validation(e.to_string()))
}

async fn ensure_unique<C: ConnectionTrait>(db: &C, name: &str, slug: &str, except: Option<i32>) -> Result<(), ModelError> {
    let mut q = Entity::find().filter(
        Condition::any()
            .add(Column::Name.eq(name))
            .add(Column::Slug.eq(slug)),
    );
    if let Some(id) = except {
        q = q.filter(Column::Id.ne(id));
    }
    if q.one(db).await?.is_some() {
        return Err(ModelError::Conflict(format!("restaurant name or slug already used: {slug}")));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(db: &C, input: NewRestaurant) -> Result<Model, ModelError> {
    validate_name(&input.name)?;
    if let Some(p) = &input.price_range { validate_price_range(p)?; }
    if let Some(c) = &input.category { validate_category(c)?; }
    let name = input.name.trim().to_string();
    let slug = derive_slug(&name)?;
    ensure_unique(db, &name, &slug, None).await?;

    let now = Utc::now().into();
    let am = ActiveModel {
        name: Set(name),
        slug: Set(Some(slug)),
        address: Set(input.address),
        description: Set(input.description),
        image_url: Set(input.image_url),
        category: Set(input.category.map(|c| c.trim().to_string())),
        price_range: Set(input.price_range),
        rating: Set(0.0),
        is_active: Set(true),
        deleted: Set(false),
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
        .ok_or(ModelError::NotFound("restaurant"))
}

/// Public lookup: only active, non-deleted rows resolve by slug.
pub async fn find_by_slug<C: ConnectionTrait>(db: &C, slug: &str) -> Result<Model, ModelError> {
    if !is_valid_slug(slug) {
        return Err(ModelError::NotFound("restaurant"));
    }
    Entity::find()
        .filter(Column::Slug.eq(slug))
        .filter(Column::Deleted.eq(false))
        .filter(Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or(ModelError::NotFound("restaurant"))
}

/// Apply a patch. Renaming re-derives the slug.
pub async fn update<C: ConnectionTrait>(db: &C, id: i32, patch: RestaurantPatch) -> Result<Model, ModelError> {
    let found = find_live(db, id).await?;
    let mut am: ActiveModel = found.into();
    if let Some(name) = patch.name {
        validate_name(&name)?;
        let name = name.trim().to_string();
        let slug = derive_slug(&name)?;
        ensure_unique(db, &name, &slug, Some(id)).await?;
        am.name = Set(name);
        am.slug = Set(Some(slug));
    }
    if let Some(p) = patch.price_range {
        validate_price_range(&p)?;
        am.price_range = Set(Some(p));
    }
    if let Some(c) = patch.category {
        validate_category(&c)?;
        am.category = Set(Some(c.trim().to_string()));
    }
    if let Some(a) = patch.address { am.address = Set(Some(a)); }
    if let Some(d) = patch.description { am.description = Set(Some(d)); }
    if let Some(i) = patch.image_url { am.image_url = Set(Some(i)); }
    if let Some(active) = patch.is_active { am.is_active = Set(active); }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn soft_delete<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), ModelError> {
    let mut am: ActiveModel = find_live(db, id).await?.into();
    am.deleted = Set(true);
    am.is_active = Set(false);
    am.updated_at = Set(Utc::now().into());
    am.update(db).await?;
    Ok(())
}

/// Recompute `rating` as the mean of live reviews, rounded to two
/// decimals; 0 when there are none.
pub async fn recompute_rating<C: ConnectionTrait>(db: &C, id: i32) -> Result<f64, ModelError> {
    // averaged here: MySQL AVG over INT yields DECIMAL
    let ratings: Vec<i32> = review::Entity::find()
        .select_only()
        .column(review::Column::Rating)
        .filter(review::Column::RestaurantId.eq(id))
        .filter(review::Column::Deleted.eq(false))
        .into_tuple()
        .all(db)
        .await?;
    let avg = if ratings.is_empty() {
        0.0
    } else {
        ratings.iter().map(|r| f64::from(*r)).sum::<f64>() / ratings.len() as f64
    };
    let rating = (avg * 100.0).round() / 100.0;
    let mut am: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ModelError::NotFound("restaurant"))?
        .into();
    am.rating = Set(rating);
    am.update(db).await?;
    Ok(rating)
}

/// Rename a category on every restaurant carrying it; returns rows touched.
pub async fn rename_category<C: ConnectionTrait>(db: &C, from: &str, to: &str) -> Result<u64, ModelError> {
    validate_category(to)?;
    let res = Entity::update_many()
        .col_expr(Column::Category, Expr::value(to.trim()))
        .col_expr(Column::UpdatedAt, Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(Utc::now())))
        .filter(Column::Category.eq(from))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

/// Distinct categories of live, active restaurants, sorted.
pub async fn categories<C: ConnectionTrait>(db: &C) -> Result<Vec<String>, ModelError> {
    let rows: Vec<Option<String>> = Entity::find()
        .select_only()
        .column(Column::Category)
        .distinct()
        .filter(Column::Deleted.eq(false))
        .filter(Column::IsActive.eq(true))
        .filter(Column::Category.is_not_null())
        .order_by_asc(Column::Category)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows.into_iter().flatten().collect())
}

/// Filters for the public restaurant listing.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RestaurantFilter {
    pub category: Option<String>,
    pub price_range: Option<String>,
    pub min_rating: Option<f64>,
    pub q: Option<String>,
}

/// One page of active, non-deleted restaurants ordered by name, plus the
/// total match count.
pub async fn search<C: ConnectionTrait>(
    db: &C,
    filter: &RestaurantFilter,
    page_idx: u64,
    per_page: u64,
) -> Result<(Vec<Model>, u64), ModelError> {
    let mut q = Entity::find()
        .filter(Column::Deleted.eq(false))
        .filter(Column::IsActive.eq(true));
    if let Some(c) = filter.category.as_deref().filter(|c| !c.is_empty()) {
        q = q.filter(Column::Category.eq(c));
    }
    if let Some(p) = filter.price_range.as_deref().filter(|p| !p.is_empty()) {
        q = q.filter(Column::PriceRange.eq(p));
    }
    if let Some(r) = filter.min_rating {
        q = q.filter(Column::Rating.gte(r));
    }
    if let Some(term) = filter.q.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        q = q.filter(Column::Name.contains(term));
    }
    let paginator = q.order_by_asc(Column::Name).paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok((items, total))
}
