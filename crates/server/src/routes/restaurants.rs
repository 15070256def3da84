//! Public catalogue endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use models::restaurant::{self, RestaurantFilter};
use models::review;
use service::pagination::{Page, Pagination};
use service::restaurant_service;

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    pub category: Option<String>,
    pub price_range: Option<String>,
    pub min_rating: Option<f64>,
    /// Substring of the restaurant name
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListQuery {
    fn split(self) -> (RestaurantFilter, Pagination) {
        let opts = Pagination::from_query(self.page, self.per_page);
        let filter = RestaurantFilter {
            category: self.category,
            price_range: self.price_range,
            min_rating: self.min_rating,
            q: self.q,
        };
        (filter, opts)
    }
}

#[utoipa::path(get, path = "/api/restaurants", tag = "restaurants", params(ListQuery), responses((status = 200, description = "One page of restaurants"), (status = 400, description = "Bad filter")))]
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Page<restaurant::Model>>, JsonApiError> {
    let (filter, opts) = q.split();
    Ok(Json(restaurant_service::list_restaurants(&state.db, &filter, opts).await?))
}

#[utoipa::path(get, path = "/api/restaurants/{slug}", tag = "restaurants", params(("slug" = String, Path, description = "Restaurant slug")), responses((status = 200, description = "Restaurant"), (status = 404, description = "Not Found")))]
pub async fn get_by_slug(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
) -> Result<Json<restaurant::Model>, JsonApiError> {
    Ok(Json(restaurant_service::get_by_slug(&state.db, &slug).await?))
}

#[utoipa::path(get, path = "/api/restaurants/{id}/reviews", tag = "restaurants", params(("id" = i32, Path, description = "Restaurant id")), responses((status = 200, description = "Live reviews, newest first"), (status = 404, description = "Not Found")))]
pub async fn reviews(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<review::Model>>, JsonApiError> {
    Ok(Json(restaurant_service::list_reviews(&state.db, id).await?))
}

#[utoipa::path(get, path = "/api/categories", tag = "restaurants", responses((status = 200, description = "Distinct categories")))]
pub async fn categories(State(state): State<ServerState>) -> Result<Json<Vec<String>>, JsonApiError> {
    Ok(Json(restaurant_service::categories(&state.db).await?))
}
