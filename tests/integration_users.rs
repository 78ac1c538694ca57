mod common;

use axum::http::StatusCode;
use common::{
    TEST_PASSWORD, create_test_role, create_test_user, create_user_with_role,
    generate_unique_email, login, login_token, role_id, send, setup_test_app,
};
use masnaa_core::Message;
use masnaa_core::permissions::{Action, Module};
use serde_json::{Value, json};
use sqlx::PgPool;

async fn admin(pool: &PgPool, app: &axum::Router) -> (masnaa_models::UserId, String) {
    let (id, email) = create_user_with_role(pool, "admin").await;
    (id, login_token(app, &email).await)
}

fn active_role_names(roles: &Value) -> Vec<String> {
    let mut names: Vec<String> = roles
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r["is_active"] == true)
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    names
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_user_with_roles(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let (_, token) = admin(&pool, &app).await;
    let warehouse = role_id(&pool, "warehouse").await;

    let email = generate_unique_email();
    let response = send(
        &app,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({
            "name": "Store Keeper",
            "email": email,
            "password": "keeper-pass-1",
            "role_ids": [warehouse]
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["email"], email);
    assert_eq!(response.body["role"], "warehouse");
    assert_eq!(active_role_names(&response.body["roles"]), vec!["warehouse"]);
    assert!(response.body.get("password").is_none());

    let logged_in = login(&app, &email, "keeper-pass-1").await;
    assert_eq!(logged_in.status, StatusCode::OK);
    assert_eq!(logged_in.body["role"], "warehouse");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_email_conflicts(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let (_, token) = admin(&pool, &app).await;
    let email = generate_unique_email();
    create_test_user(&pool, &email).await;

    let response = send(
        &app,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({ "name": "Twin", "email": email.to_uppercase(), "password": "twin-pass-1" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error_en"], "Email is already in use");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_user_validation(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let (_, token) = admin(&pool, &app).await;

    let short_password = send(
        &app,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({ "name": "A", "email": generate_unique_email(), "password": "short" })),
    )
    .await;
    assert_eq!(short_password.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(short_password.body["error"], Message::ValidationFailed.ar());
    assert_eq!(
        short_password.body["error_en"],
        "Password must be at least 8 characters"
    );

    let blank_name = send(
        &app,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({ "name": "  ", "email": generate_unique_email(), "password": "long-enough" })),
    )
    .await;
    assert_eq!(blank_name.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(blank_name.body["error_en"], "name must not be blank");

    let missing_email = send(
        &app,
        "POST",
        "/api/users",
        Some(&token),
        Some(json!({ "name": "A", "password": "long-enough" })),
    )
    .await;
    assert_eq!(missing_email.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing_email.body["error"], Message::InvalidRequestBody.ar());
    assert_eq!(missing_email.body["error_en"], "email is required");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_users_filters(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let (_, token) = admin(&pool, &app).await;

    let inactive_email = generate_unique_email();
    let inactive = create_test_user(&pool, &inactive_email).await;
    sqlx::query("UPDATE users SET is_active = FALSE, name = 'Night Shift' WHERE id = $1")
        .bind(inactive)
        .execute(&pool)
        .await
        .unwrap();

    let inactive_only = send(&app, "GET", "/api/users?is_active=false", Some(&token), None).await;
    assert_eq!(inactive_only.status, StatusCode::OK);
    assert_eq!(inactive_only.body["meta"]["total"], 1);
    assert_eq!(inactive_only.body["data"][0]["email"], inactive_email);

    let by_name = send(&app, "GET", "/api/users?search=night", Some(&token), None).await;
    assert_eq!(by_name.body["meta"]["total"], 1);

    let paged = send(&app, "GET", "/api/users?limit=1", Some(&token), None).await;
    assert_eq!(paged.body["data"].as_array().unwrap().len(), 1);
    assert_eq!(paged.body["meta"]["has_more"], true);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_user_profile(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let (_, token) = admin(&pool, &app).await;
    let user_id = create_test_user(&pool, &generate_unique_email()).await;

    let new_email = generate_unique_email();
    let response = send(
        &app,
        "PUT",
        &format!("/api/users/{user_id}"),
        Some(&token),
        Some(json!({ "name": "Line Supervisor", "email": new_email })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "Line Supervisor");
    assert_eq!(response.body["email"], new_email);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deactivate_and_reactivate_user(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let (admin_id, token) = admin(&pool, &app).await;
    let email = generate_unique_email();
    let user_id = create_test_user(&pool, &email).await;

    let deactivated = send(
        &app,
        "PATCH",
        &format!("/api/users/{user_id}/status"),
        Some(&token),
        Some(json!({ "is_active": false })),
    )
    .await;
    assert_eq!(deactivated.status, StatusCode::OK);
    assert_eq!(login(&app, &email, TEST_PASSWORD).await.status, StatusCode::UNAUTHORIZED);

    send(
        &app,
        "PATCH",
        &format!("/api/users/{user_id}/status"),
        Some(&token),
        Some(json!({ "is_active": true })),
    )
    .await;
    assert_eq!(login(&app, &email, TEST_PASSWORD).await.status, StatusCode::OK);

    let self_deactivation = send(
        &app,
        "PATCH",
        &format!("/api/users/{admin_id}/status"),
        Some(&token),
        Some(json!({ "is_active": false })),
    )
    .await;
    assert_eq!(self_deactivation.status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_password_reset(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let (_, token) = admin(&pool, &app).await;
    let email = generate_unique_email();
    let user_id = create_test_user(&pool, &email).await;

    let response = send(
        &app,
        "PUT",
        &format!("/api/users/{user_id}/password"),
        Some(&token),
        Some(json!({ "new_password": "reset-by-admin" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(login(&app, &email, "reset-by-admin").await.status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_replace_role_set(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let (_, token) = admin(&pool, &app).await;
    let (user_id, _) = create_user_with_role(&pool, "viewer").await;
    let purchasing = role_id(&pool, "purchasing").await;
    let accountant = role_id(&pool, "accountant").await;
    let uri = format!("/api/users/{user_id}/roles");

    let replaced = send(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "role_ids": [purchasing, accountant, purchasing] })),
    )
    .await;
    assert_eq!(replaced.status, StatusCode::OK);
    assert_eq!(active_role_names(&replaced.body), vec!["accountant", "purchasing"]);
    // The viewer assignment is kept, deactivated.
    assert_eq!(replaced.body.as_array().unwrap().len(), 3);

    let legacy: String = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(legacy, "purchasing");

    let cleared = send(&app, "PUT", &uri, Some(&token), Some(json!({ "role_ids": [] }))).await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert!(active_role_names(&cleared.body).is_empty());

    let unknown = send(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "role_ids": [uuid::Uuid::new_v4()] })),
    )
    .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_assign_and_revoke_role(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let (_, token) = admin(&pool, &app).await;
    let role = create_test_role(&pool, "Dispatch", &[(Module::PurchaseOrders, Action::Read)]).await;
    let email = generate_unique_email();
    let user_id = create_test_user(&pool, &email).await;
    let user = login_token(&app, &email).await;

    let forbidden = send(&app, "GET", "/api/purchase-orders", Some(&user), None).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let assigned = send(
        &app,
        "POST",
        &format!("/api/users/{user_id}/roles"),
        Some(&token),
        Some(json!({ "role_id": role })),
    )
    .await;
    assert_eq!(assigned.status, StatusCode::OK);
    assert_eq!(active_role_names(&assigned.body), vec!["Dispatch"]);

    // Permissions follow the assignment without a new login.
    let allowed = send(&app, "GET", "/api/purchase-orders", Some(&user), None).await;
    assert_eq!(allowed.status, StatusCode::OK);

    let revoked = send(
        &app,
        "DELETE",
        &format!("/api/users/{user_id}/roles/{role}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(revoked.status, StatusCode::OK);
    assert_eq!(revoked.body[0]["is_active"], false);

    let forbidden_again = send(&app, "GET", "/api/purchase-orders", Some(&user), None).await;
    assert_eq!(forbidden_again.status, StatusCode::FORBIDDEN);

    let roles = send(&app, "GET", &format!("/api/users/{user_id}/roles"), Some(&token), None).await;
    assert_eq!(roles.status, StatusCode::OK);
    assert_eq!(roles.body.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_users_cannot_be_deleted(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let (_, token) = admin(&pool, &app).await;
    let user_id = create_test_user(&pool, &generate_unique_email()).await;

    let response = send(&app, "DELETE", &format!("/api/users/{user_id}"), Some(&token), None).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}
