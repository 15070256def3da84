//! Administration endpoints. Rank checks live in the service layer.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use models::error_report::{self, ReportStatus};
use models::restaurant::{self, NewRestaurant, RestaurantPatch};
use models::user::{self, Role};
use service::auth::domain::AuthUser;
use service::pagination::{Page, Pagination};
use service::{error_report_service, restaurant_service, user_admin_service};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportsQuery {
    /// pending, resolved or rejected
    #[param(value_type = Option<String>)]
    pub status: Option<ReportStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveInput {
    pub status: ReportStatus,
    pub resolution_note: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UsersQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct BlockInput {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleInput {
    pub role: Role,
    pub restaurant_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct RenameCategoryInput {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct RenameCategoryOutput {
    pub updated: u64,
}

#[utoipa::path(get, path = "/admin/error-reports", tag = "admin", params(ReportsQuery), responses((status = 200, description = "Reports"), (status = 403, description = "Forbidden")))]
pub async fn list_reports(
    State(state): State<ServerState>,
    Extension(actor): Extension<AuthUser>,
    Query(q): Query<ReportsQuery>,
) -> Result<Json<Vec<error_report::Model>>, JsonApiError> {
    Ok(Json(error_report_service::list_reports(&state.db, &actor, q.status).await?))
}

#[utoipa::path(post, path = "/admin/error-reports/{id}/resolve", tag = "admin", params(("id" = i32, Path, description = "Report id")), request_body = crate::openapi::ResolveDoc, responses((status = 200, description = "Closed"), (status = 409, description = "Already closed")))]
pub async fn resolve_report(
    State(state): State<ServerState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(input): Json<ResolveInput>,
) -> Result<Json<error_report::Model>, JsonApiError> {
    let closed = error_report_service::resolve_report(&state.db, &actor, id, input.status, input.resolution_note).await?;
    Ok(Json(closed))
}

#[utoipa::path(get, path = "/admin/users", tag = "admin", params(UsersQuery), responses((status = 200, description = "One page of users"), (status = 403, description = "Forbidden")))]
pub async fn list_users(
    State(state): State<ServerState>,
    Extension(actor): Extension<AuthUser>,
    Query(q): Query<UsersQuery>,
) -> Result<Json<Page<user::Model>>, JsonApiError> {
    let opts = Pagination::from_query(q.page, q.per_page);
    Ok(Json(user_admin_service::list_users(&state.db, &actor, opts).await?))
}

#[utoipa::path(post, path = "/admin/users/{id}/block", tag = "admin", params(("id" = i32, Path, description = "User id")), request_body = crate::openapi::BlockDoc, responses((status = 200, description = "Blocked"), (status = 400, description = "Reason required"), (status = 403, description = "Insufficient rank")))]
pub async fn block_user(
    State(state): State<ServerState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(input): Json<BlockInput>,
) -> Result<Json<user::Model>, JsonApiError> {
    Ok(Json(user_admin_service::block_user(&state.db, &actor, id, &input.reason).await?))
}

#[utoipa::path(post, path = "/admin/users/{id}/unblock", tag = "admin", params(("id" = i32, Path, description = "User id")), responses((status = 200, description = "Unblocked"), (status = 403, description = "Insufficient rank")))]
pub async fn unblock_user(
    State(state): State<ServerState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<user::Model>, JsonApiError> {
    Ok(Json(user_admin_service::unblock_user(&state.db, &actor, id).await?))
}

#[utoipa::path(put, path = "/admin/users/{id}/role", tag = "admin", params(("id" = i32, Path, description = "User id")), request_body = crate::openapi::RoleDoc, responses((status = 200, description = "Role changed"), (status = 403, description = "head_admin only")))]
pub async fn set_role(
    State(state): State<ServerState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(input): Json<RoleInput>,
) -> Result<Json<user::Model>, JsonApiError> {
    Ok(Json(user_admin_service::set_role(&state.db, &actor, id, input.role, input.restaurant_id).await?))
}

#[utoipa::path(post, path = "/admin/restaurants", tag = "admin", request_body = crate::openapi::NewRestaurantDoc, responses((status = 201, description = "Created"), (status = 409, description = "Name or slug taken")))]
pub async fn create_restaurant(
    State(state): State<ServerState>,
    Extension(actor): Extension<AuthUser>,
    Json(input): Json<NewRestaurant>,
) -> Result<(StatusCode, Json<restaurant::Model>), JsonApiError> {
    let created = restaurant_service::create_restaurant(&state.db, &actor, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/admin/restaurants/{id}", tag = "admin", params(("id" = i32, Path, description = "Restaurant id")), request_body = crate::openapi::RestaurantPatchDoc, responses((status = 200, description = "Updated"), (status = 404, description = "Not Found")))]
pub async fn update_restaurant(
    State(state): State<ServerState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(patch): Json<RestaurantPatch>,
) -> Result<Json<restaurant::Model>, JsonApiError> {
    Ok(Json(restaurant_service::update_restaurant(&state.db, &actor, id, patch).await?))
}

#[utoipa::path(delete, path = "/admin/restaurants/{id}", tag = "admin", params(("id" = i32, Path, description = "Restaurant id")), responses((status = 204, description = "Soft deleted"), (status = 404, description = "Not Found")))]
pub async fn delete_restaurant(
    State(state): State<ServerState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, JsonApiError> {
    restaurant_service::delete_restaurant(&state.db, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(put, path = "/admin/categories", tag = "admin", request_body = crate::openapi::RenameCategoryDoc, responses((status = 200, description = "Renamed"), (status = 404, description = "Unknown category")))]
pub async fn rename_category(
    State(state): State<ServerState>,
    Extension(actor): Extension<AuthUser>,
    Json(input): Json<RenameCategoryInput>,
) -> Result<Json<RenameCategoryOutput>, JsonApiError> {
    let updated = restaurant_service::rename_category(&state.db, &actor, &input.from, &input.to).await?;
    Ok(Json(RenameCategoryOutput { updated }))
}
