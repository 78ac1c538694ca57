#![allow(dead_code)]

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use masnaa::masnaa_cache::AppCache;
use masnaa::masnaa_config::{JwtConfig, RateLimitConfig};
use masnaa::router::init_router;
use masnaa::state::AppState;
use masnaa_core::hash_password;
use masnaa_core::permissions::{Action, Module};
use masnaa_models::{RoleId, SupplierId, UserId};
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const TEST_PASSWORD: &str = "factory-pass-123";

pub fn test_state(pool: PgPool) -> AppState {
    let jwt_config = JwtConfig::with_secret(TEST_JWT_SECRET).unwrap();
    let mut state = AppState::new(pool, jwt_config, AppCache::local(Duration::from_secs(300)));
    state.rate_limit_config = RateLimitConfig::disabled();
    state
}

/// Seeds the permission catalog and default roles, then builds the router.
pub async fn setup_test_app(pool: PgPool) -> Router {
    masnaa_cli::seeder::seed_rbac(&pool).await.unwrap();
    init_router(test_state(pool))
}

pub fn generate_unique_email() -> String {
    format!("user-{}@factory.test", Uuid::new_v4().simple())
}

/// Inserts an active user with [`TEST_PASSWORD`] and no roles.
pub async fn create_test_user(pool: &PgPool, email: &str) -> UserId {
    let hashed = hash_password(TEST_PASSWORD).unwrap();
    sqlx::query_scalar("INSERT INTO users (email, name, password) VALUES ($1, $2, $3) RETURNING id")
        .bind(email)
        .bind("Test User")
        .bind(hashed)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn role_id(pool: &PgPool, name: &str) -> RoleId {
    sqlx::query_scalar("SELECT id FROM roles WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Creates an active role holding exactly `grants`.
pub async fn create_test_role(pool: &PgPool, name: &str, grants: &[(Module, Action)]) -> RoleId {
    let id: RoleId = sqlx::query_scalar("INSERT INTO roles (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap();

    for (module, action) in grants {
        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id)
             SELECT $1, id FROM permissions WHERE module = $2 AND action = $3",
        )
        .bind(id)
        .bind(module.as_str())
        .bind(action.as_str())
        .execute(pool)
        .await
        .unwrap();
    }
    id
}

pub async fn assign_role(pool: &PgPool, user_id: UserId, role_id: RoleId) {
    sqlx::query(
        "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)
         ON CONFLICT (user_id, role_id) DO UPDATE SET is_active = TRUE",
    )
    .bind(user_id)
    .bind(role_id)
    .execute(pool)
    .await
    .unwrap();
}

/// A user holding the seeded role `role`.
pub async fn create_user_with_role(pool: &PgPool, role: &str) -> (UserId, String) {
    let email = generate_unique_email();
    let user_id = create_test_user(pool, &email).await;
    let role = role_id(pool, role).await;
    assign_role(pool, user_id, role).await;
    (user_id, email)
}

pub async fn create_supplier(pool: &PgPool, name: &str) -> SupplierId {
    sqlx::query_scalar("INSERT INTO suppliers (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn login(app: &Router, email: &str, password: &str) -> TestResponse {
    send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await
}

/// Logs in with [`TEST_PASSWORD`] and returns the session token.
pub async fn login_token(app: &Router, email: &str) -> String {
    let response = login(app, email, TEST_PASSWORD).await;
    assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
    response.body["token"].as_str().unwrap().to_string()
}
