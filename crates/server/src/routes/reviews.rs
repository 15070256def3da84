//! Review, report and manager-response endpoints. All require a caller.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use models::review::{self, NewReview, ReviewPatch};
use models::{error_report, manager_response};
use service::auth::domain::AuthUser;
use service::{manager_response_service, review_service};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[derive(Debug, Default, Deserialize)]
pub struct DeleteReviewInput {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReportInput {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct ResponseInput {
    pub response_text: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ResponsesQuery {
    pub restaurant_id: Option<i32>,
}

#[utoipa::path(post, path = "/api/reviews", tag = "reviews", request_body = crate::openapi::NewReviewDoc, responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 403, description = "Blocked")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(actor): Extension<AuthUser>,
    Json(input): Json<NewReview>,
) -> Result<(StatusCode, Json<review::Model>), JsonApiError> {
    let created = review_service::create_review(&state.db, &actor, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/api/reviews/{id}", tag = "reviews", params(("id" = i32, Path, description = "Review id")), request_body = crate::openapi::ReviewPatchDoc, responses((status = 200, description = "Updated"), (status = 403, description = "Not the author")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(patch): Json<ReviewPatch>,
) -> Result<Json<review::Model>, JsonApiError> {
    Ok(Json(review_service::update_review(&state.db, &actor, id, patch).await?))
}

/// The body is optional; `{"reason": "..."}` is archived with the review.
#[utoipa::path(delete, path = "/api/reviews/{id}", tag = "reviews", params(("id" = i32, Path, description = "Review id")), responses((status = 204, description = "Archived and deleted"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")))]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<i32>,
    input: Option<Json<DeleteReviewInput>>,
) -> Result<StatusCode, JsonApiError> {
    let reason = input.and_then(|Json(i)| i.reason);
    review_service::delete_review(&state.db, &actor, id, reason).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/api/reviews/{id}/report", tag = "reviews", params(("id" = i32, Path, description = "Review id")), request_body = crate::openapi::ReportDoc, responses((status = 201, description = "Reported"), (status = 404, description = "Not Found")))]
pub async fn report(
    State(state): State<ServerState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(input): Json<ReportInput>,
) -> Result<(StatusCode, Json<error_report::Model>), JsonApiError> {
    let created = review_service::report_review(&state.db, &actor, id, &input.reason).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(post, path = "/api/reviews/{id}/response", tag = "responses", params(("id" = i32, Path, description = "Review id")), request_body = crate::openapi::ResponseDoc, responses((status = 201, description = "Created"), (status = 403, description = "Forbidden"), (status = 409, description = "Already answered")))]
pub async fn respond(
    State(state): State<ServerState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(input): Json<ResponseInput>,
) -> Result<(StatusCode, Json<manager_response::Model>), JsonApiError> {
    let created = manager_response_service::respond(&state.db, &actor, id, &input.response_text).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/manager-responses", tag = "responses", params(ResponsesQuery), responses((status = 200, description = "Responses visible to the caller"), (status = 403, description = "Forbidden")))]
pub async fn list_responses(
    State(state): State<ServerState>,
    Extension(actor): Extension<AuthUser>,
    Query(q): Query<ResponsesQuery>,
) -> Result<Json<Vec<manager_response::Model>>, JsonApiError> {
    Ok(Json(manager_response_service::list_responses(&state.db, &actor, q.restaurant_id).await?))
}

#[utoipa::path(put, path = "/api/manager-responses/{id}", tag = "responses", params(("id" = i32, Path, description = "Response id")), request_body = crate::openapi::ResponseDoc, responses((status = 200, description = "Updated"), (status = 403, description = "Forbidden")))]
pub async fn update_response(
    State(state): State<ServerState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(input): Json<ResponseInput>,
) -> Result<Json<manager_response::Model>, JsonApiError> {
    Ok(Json(manager_response_service::update_response(&state.db, &actor, id, &input.response_text).await?))
}
