use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::restaurant;

/// Account role, ordered by privilege.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "head_admin")]
    HeadAdmin,
}

impl Role {
    pub fn rank(self) -> u8 {
        match self {
            Role::User => 0,
            Role::Manager => 1,
            Role::Admin => 2,
            Role::HeadAdmin => 3,
        }
    }

    pub fn outranks(self, other: Role) -> bool {
        self.rank() > other.rank()
    }

    pub fn is_admin(self) -> bool {
        self.rank() >= Role::Admin.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Manager => "manager",
            Role::Admin => "admin",
            Role::HeadAdmin => "head_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            "head_admin" => Ok(Role::HeadAdmin),
            other => Err(ModelError::Validation(format!("unknown role: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub is_blocked: bool,
    pub blocked_reason: Option<String>,
    pub restaurant_id: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Restaurant,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Restaurant => Entity::belongs_to(restaurant::Entity)
                .from(Column::RestaurantId)
                .to(restaurant::Column::Id)
                .into(),
        }
    }
}

impl Related<restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let e = email.trim();
    match e.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && e.len() <= 255 => Ok(()),
        _ => Err(ModelError::Validation("invalid email".into())),
    }
}

/// `password_hash` must already be a PHC string; hashing lives in the
/// service layer.
pub async fn create<C: ConnectionTrait>(db: &C, name: &str, email: &str, password_hash: &str) -> Result<Model, ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    validate_email(email)?;
    let email = normalize_email(email);
    if find_by_email(db, &email).await?.is_some() {
        return Err(ModelError::Conflict(format!("email already registered: {email}")));
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        name: Set(name.trim().to_string()),
        email: Set(email),
        password: Set(password_hash.to_string()),
        role: Set(Role::User),
        is_blocked: Set(false),
        blocked_reason: Set(None),
        restaurant_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> Result<Model, ModelError> {
    Entity::find_by_id(id).one(db).await?.ok_or(ModelError::NotFound("user"))
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find()
        .filter(Column::Email.eq(normalize_email(email)))
        .one(db)
        .await?)
}

/// One page of users ordered by id, plus the total count.
pub async fn list<C: ConnectionTrait>(db: &C, page_idx: u64, per_page: u64) -> Result<(Vec<Model>, u64), ModelError> {
    let paginator = Entity::find().order_by_asc(Column::Id).paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok((items, total))
}

pub async fn block<C: ConnectionTrait>(db: &C, id: i32, reason: &str) -> Result<Model, ModelError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(ModelError::Validation("block reason required".into()));
    }
    let mut am: ActiveModel = find_by_id(db, id).await?.into();
    am.is_blocked = Set(true);
    am.blocked_reason = Set(Some(reason.to_string()));
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn unblock<C: ConnectionTrait>(db: &C, id: i32) -> Result<Model, ModelError> {
    let mut am: ActiveModel = find_by_id(db, id).await?.into();
    am.is_blocked = Set(false);
    am.blocked_reason = Set(None);
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Change a role. Managers must reference a live restaurant; every other
/// role has its `restaurant_id` cleared.
pub async fn set_role<C: ConnectionTrait>(db: &C, id: i32, role: Role, restaurant_id: Option<i32>) -> Result<Model, ModelError> {
    let restaurant_id = match (role, restaurant_id) {
        (Role::Manager, Some(rid)) => Some(restaurant::find_live(db, rid).await?.id),
        (Role::Manager, None) => {
            return Err(ModelError::Validation("manager role requires restaurant_id".into()));
        }
        (_, _) => None,
    };
    let mut am: ActiveModel = find_by_id(db, id).await?.into();
    am.role = Set(role);
    am.restaurant_id = Set(restaurant_id);
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}
