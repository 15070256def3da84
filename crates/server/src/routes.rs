use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

pub mod admin;
pub mod auth;
pub mod restaurants;
pub mod reviews;

use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(crate::openapi::ApiDoc::openapi())
}

/// Build the full application router, including public, authenticated and admin routes
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    // Public routes (health, auth entry points, catalogue, docs)
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/api/restaurants", get(restaurants::list))
        .route("/api/restaurants/:restaurant", get(restaurants::get_by_slug))
        .route("/api/restaurants/:restaurant/reviews", get(restaurants::reviews))
        .route("/api/categories", get(restaurants::categories))
        .route("/api-docs/openapi.json", get(openapi_json));

    // Routes that need a resolved caller
    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/api/reviews", post(reviews::create))
        .route("/api/reviews/:id", put(reviews::update).delete(reviews::delete))
        .route("/api/reviews/:id/report", post(reviews::report))
        .route("/api/reviews/:id/response", post(reviews::respond))
        .route("/api/manager-responses", get(reviews::list_responses))
        .route("/api/manager-responses/:id", put(reviews::update_response))
        .route("/admin/error-reports", get(admin::list_reports))
        .route("/admin/error-reports/:id/resolve", post(admin::resolve_report))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:id/block", post(admin::block_user))
        .route("/admin/users/:id/unblock", post(admin::unblock_user))
        .route("/admin/users/:id/role", put(admin::set_role))
        .route("/admin/restaurants", post(admin::create_restaurant))
        .route("/admin/restaurants/:id", put(admin::update_restaurant).delete(admin::delete_restaurant))
        .route("/admin/categories", put(admin::rename_category))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_user));

    public
        .merge(protected)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status code and latency
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
