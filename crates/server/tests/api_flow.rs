use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;

use models::restaurant::{self, NewRestaurant};
use models::user::{self, Role};
use server::routes::{self, auth::ServerState};
use service::auth::service::AuthConfig;

const PASSWORD: &str = "S3curePass!";

async fn build_app() -> anyhow::Result<(Router, DatabaseConnection)> {
    let db = models::db::connect_memory().await?;
    let state = ServerState::new(db.clone(), AuthConfig { jwt_secret: "test-secret".into(), token_ttl_hours: 1 });
    Ok((routes::build_router(state, tower_http::cors::CorsLayer::very_permissive()), db))
}

async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req.header(header::CONTENT_TYPE, "application/json").body(Body::from(serde_json::to_vec(&b)?))?,
        None => req.body(Body::empty())?,
    };
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

/// Register and log in, returning (user id, token).
async fn signup(app: &Router, email: &str) -> anyhow::Result<(i32, String)> {
    let (status, body) = send(app, "POST", "/auth/register", None, Some(json!({"name": "Tester", "email": email, "password": PASSWORD}))).await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["id"].as_i64().unwrap_or_default() as i32;
    let (status, body) = send(app, "POST", "/auth/login", None, Some(json!({"email": email, "password": PASSWORD}))).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    Ok((id, body["token"].as_str().unwrap_or_default().to_string()))
}

async fn seed_restaurant(db: &DatabaseConnection) -> anyhow::Result<restaurant::Model> {
    Ok(restaurant::create(
        db,
        NewRestaurant { name: "Chez Test".into(), category: Some("bistro".into()), price_range: Some("$$".into()), ..Default::default() },
    )
    .await?)
}

#[tokio::test]
async fn register_login_and_me() -> anyhow::Result<()> {
    let (app, _db) = build_app().await?;
    let (id, token) = signup(&app, "diner@example.com").await?;

    let (status, me) = send(&app, "GET", "/auth/me", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], json!(id));
    assert_eq!(me["role"], json!("user"));
    assert!(me.get("password").is_none());

    let (status, _) = send(&app, "GET", "/auth/me", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, "GET", "/auth/me", Some("garbage"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "POST", "/auth/register", None, Some(json!({"name": "Again", "email": "DINER@example.com", "password": PASSWORD}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&app, "POST", "/auth/login", None, Some(json!({"email": "diner@example.com", "password": "wrong-password"}))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn login_sets_cookie_accepted_by_protected_routes() -> anyhow::Result<()> {
    let (app, _db) = build_app().await?;
    send(&app, "POST", "/auth/register", None, Some(json!({"name": "C", "email": "c@example.com", "password": PASSWORD}))).await?;
    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"email": "c@example.com", "password": PASSWORD}))?))?;
    let resp = app.clone().oneshot(req).await?;
    let cookie = resp.headers().get(header::SET_COOKIE).and_then(|v| v.to_str().ok()).unwrap_or_default().to_string();
    assert!(cookie.starts_with("auth_token="), "{cookie}");
    let pair = cookie.split(';').next().unwrap_or_default().to_string();

    let req = Request::builder().uri("/auth/me").header(header::COOKIE, pair.clone()).body(Body::empty())?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder().method("POST").uri("/auth/logout").header(header::COOKIE, pair).body(Body::empty())?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let cleared = resp.headers().get(header::SET_COOKIE).and_then(|v| v.to_str().ok()).unwrap_or_default();
    assert!(cleared.starts_with("auth_token="), "{cleared}");
    Ok(())
}

#[tokio::test]
async fn review_lifecycle_updates_restaurant_rating() -> anyhow::Result<()> {
    let (app, db) = build_app().await?;
    let r = seed_restaurant(&db).await?;
    let (_, token) = signup(&app, "critic@example.com").await?;

    let (status, _) = send(&app, "POST", "/api/reviews", Some(&token), Some(json!({"restaurant_id": r.id, "content": "too good", "rating": 6}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, review) = send(&app, "POST", "/api/reviews", Some(&token), Some(json!({"restaurant_id": r.id, "content": "solid", "rating": 4, "type": "delivery"}))).await?;
    assert_eq!(status, StatusCode::CREATED, "{review}");
    assert_eq!(review["type"], json!("delivery"));
    let review_id = review["id"].as_i64().unwrap_or_default();

    let slug = r.slug.clone().unwrap_or_default();
    let (status, fetched) = send(&app, "GET", &format!("/api/restaurants/{slug}"), None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["rating"], json!(4.0));

    let (status, listed) = send(&app, "GET", &format!("/api/restaurants/{}/reviews", r.id), None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let (status, _) = send(&app, "DELETE", &format!("/api/reviews/{review_id}"), Some(&token), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, listed) = send(&app, "GET", &format!("/api/restaurants/{}/reviews", r.id), None, None).await?;
    assert_eq!(listed.as_array().map(Vec::len), Some(0));
    let (_, fetched) = send(&app, "GET", &format!("/api/restaurants/{slug}"), None, None).await?;
    assert_eq!(fetched["rating"], json!(0.0));

    let (status, _) = send(&app, "GET", "/api/restaurants/no-such-place", None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn manager_can_answer_once() -> anyhow::Result<()> {
    let (app, db) = build_app().await?;
    let r = seed_restaurant(&db).await?;
    let (_, critic) = signup(&app, "critic@example.com").await?;
    let (manager_id, manager) = signup(&app, "boss@example.com").await?;
    user::set_role(&db, manager_id, Role::Manager, Some(r.id)).await?;

    let (_, review) = send(&app, "POST", "/api/reviews", Some(&critic), Some(json!({"restaurant_id": r.id, "content": "slow service", "rating": 2}))).await?;
    let review_id = review["id"].as_i64().unwrap_or_default();
    let uri = format!("/api/reviews/{review_id}/response");

    let (status, _) = send(&app, "POST", &uri, Some(&critic), Some(json!({"response_text": "nope"}))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, created) = send(&app, "POST", &uri, Some(&manager), Some(json!({"response_text": "Sorry, we are on it"}))).await?;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    let (status, _) = send(&app, "POST", &uri, Some(&manager), Some(json!({"response_text": "again"}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, mine) = send(&app, "GET", "/api/manager-responses", Some(&manager), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn admin_blocks_lower_ranked_users_only() -> anyhow::Result<()> {
    let (app, db) = build_app().await?;
    let (user_id, user_token) = signup(&app, "plain@example.com").await?;
    let (admin_id, admin) = signup(&app, "admin@example.com").await?;
    let (head_id, _) = signup(&app, "head@example.com").await?;
    user::set_role(&db, admin_id, Role::Admin, None).await?;
    user::set_role(&db, head_id, Role::HeadAdmin, None).await?;

    let (status, _) = send(&app, "GET", "/admin/users", Some(&user_token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "POST", &format!("/admin/users/{head_id}/block"), Some(&admin), Some(json!({"reason": "coup"}))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "POST", &format!("/admin/users/{user_id}/block"), Some(&admin), Some(json!({"reason": ""}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, blocked) = send(&app, "POST", &format!("/admin/users/{user_id}/block"), Some(&admin), Some(json!({"reason": "spam"}))).await?;
    assert_eq!(status, StatusCode::OK, "{blocked}");

    let (status, _) = send(&app, "POST", "/auth/login", None, Some(json!({"email": "plain@example.com", "password": PASSWORD}))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, page) = send(&app, "GET", "/admin/users?page=1&per_page=2", Some(&admin), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], json!(3));
    assert_eq!(page["items"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn health_and_openapi_are_public() -> anyhow::Result<()> {
    let (app, _db) = build_app().await?;
    let (status, body) = send(&app, "GET", "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));

    let (status, doc) = send(&app, "GET", "/api-docs/openapi.json", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"].get("/api/reviews").is_some());
    Ok(())
}
