use serde::Deserialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RegisterRequest { pub name: String, pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(Deserialize, ToSchema)]
pub struct NewReviewDoc {
    pub restaurant_id: i32,
    pub content: String,
    /// 1..=5
    pub rating: i32,
    /// inRestaurant or delivery
    #[serde(rename = "type")]
    pub review_type: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ReviewPatchDoc {
    pub content: Option<String>,
    pub rating: Option<i32>,
    #[serde(rename = "type")]
    pub review_type: Option<String>,
}

#[derive(ToSchema)]
pub struct ReportDoc { pub reason: String }

#[derive(ToSchema)]
pub struct ResponseDoc { pub response_text: String }

#[derive(ToSchema)]
pub struct ResolveDoc {
    /// resolved or rejected
    pub status: String,
    pub resolution_note: Option<String>,
}

#[derive(ToSchema)]
pub struct BlockDoc { pub reason: String }

#[derive(ToSchema)]
pub struct RoleDoc {
    /// user, manager, admin or head_admin
    pub role: String,
    /// required when role is manager
    pub restaurant_id: Option<i32>,
}

#[derive(ToSchema)]
pub struct NewRestaurantDoc {
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    /// one to four '$'
    pub price_range: Option<String>,
}

#[derive(ToSchema)]
pub struct RestaurantPatchDoc {
    pub name: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub price_range: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(ToSchema)]
pub struct RenameCategoryDoc { pub from: String, pub to: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::restaurants::list,
        crate::routes::restaurants::get_by_slug,
        crate::routes::restaurants::reviews,
        crate::routes::restaurants::categories,
        crate::routes::reviews::create,
        crate::routes::reviews::update,
        crate::routes::reviews::delete,
        crate::routes::reviews::report,
        crate::routes::reviews::respond,
        crate::routes::reviews::list_responses,
        crate::routes::reviews::update_response,
        crate::routes::admin::list_reports,
        crate::routes::admin::resolve_report,
        crate::routes::admin::list_users,
        crate::routes::admin::block_user,
        crate::routes::admin::unblock_user,
        crate::routes::admin::set_role,
        crate::routes::admin::create_restaurant,
        crate::routes::admin::update_restaurant,
        crate::routes::admin::delete_restaurant,
        crate::routes::admin::rename_category,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            NewReviewDoc,
            ReviewPatchDoc,
            ReportDoc,
            ResponseDoc,
            ResolveDoc,
            BlockDoc,
            RoleDoc,
            NewRestaurantDoc,
            RestaurantPatchDoc,
            RenameCategoryDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "restaurants"),
        (name = "reviews"),
        (name = "responses"),
        (name = "admin")
    )
)]
pub struct ApiDoc;
