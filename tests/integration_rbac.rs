mod common;

use axum::http::StatusCode;
use common::{
    assign_role, create_test_role, create_test_user, create_user_with_role,
    generate_unique_email, login_token, send, setup_test_app,
};
use masnaa::modules::permissions::service::resolve_permissions;
use masnaa_core::permissions::{Action, Module};
use serde_json::json;
use sqlx::PgPool;

async fn check(app: &axum::Router, token: &str, module: &str, action: &str) -> bool {
    let response = send(
        app,
        "GET",
        &format!("/api/permissions/check?module={module}&action={action}"),
        Some(token),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    response.body["allowed"].as_bool().unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_editor_role_end_to_end(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let (_, admin_email) = create_user_with_role(&pool, "admin").await;
    let admin = login_token(&app, &admin_email).await;

    let created = send(
        &app,
        "POST",
        "/api/roles",
        Some(&admin),
        Some(json!({
            "name": "Editor",
            "permissions": [{ "module": "content", "action": "update" }]
        })),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let editor_id = created.body["id"].as_str().unwrap().to_string();

    let email = generate_unique_email();
    let user_id = create_test_user(&pool, &email).await;
    let assigned = send(
        &app,
        "POST",
        &format!("/api/users/{user_id}/roles"),
        Some(&admin),
        Some(json!({ "role_id": editor_id })),
    )
    .await;
    assert_eq!(assigned.status, StatusCode::OK);

    let user = login_token(&app, &email).await;
    assert!(check(&app, &user, "content", "update").await);
    assert!(!check(&app, &user, "content", "delete").await);
    assert!(check(&app, &user, "content", "edit").await);
    assert!(!check(&app, &user, "content", "approve").await);
    assert!(!check(&app, &user, "content", "duplicate").await);

    let mine = send(&app, "GET", "/api/permissions/me", Some(&user), None).await;
    assert_eq!(mine.status, StatusCode::OK);
    assert_eq!(mine.body["roles"], json!(["Editor"]));
    assert_eq!(
        mine.body["permissions"],
        json!([{ "module": "content", "action": "update" }])
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deactivating_role_removes_its_grants(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let (_, admin_email) = create_user_with_role(&pool, "admin").await;
    let admin = login_token(&app, &admin_email).await;

    let editor = create_test_role(&pool, "Editor", &[(Module::Content, Action::Update)]).await;
    let email = generate_unique_email();
    let user_id = create_test_user(&pool, &email).await;
    assign_role(&pool, user_id, editor).await;
    let user = login_token(&app, &email).await;

    assert!(check(&app, &user, "content", "update").await);

    let response = send(
        &app,
        "PATCH",
        &format!("/api/roles/{editor}/status"),
        Some(&admin),
        Some(json!({ "is_active": false })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["is_active"], false);

    // The session token still carries the old role name; permissions do not.
    assert!(!check(&app, &user, "content", "update").await);
    assert!(resolve_permissions(&pool, user_id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deactivating_one_assignment_keeps_other_roles(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let (_, admin_email) = create_user_with_role(&pool, "admin").await;
    let admin = login_token(&app, &admin_email).await;

    let editor = create_test_role(
        &pool,
        "Editor",
        &[(Module::Content, Action::Update), (Module::Content, Action::Read)],
    )
    .await;
    let reader = create_test_role(&pool, "Reader", &[(Module::Content, Action::Read)]).await;

    let email = generate_unique_email();
    let user_id = create_test_user(&pool, &email).await;
    assign_role(&pool, user_id, editor).await;
    assign_role(&pool, user_id, reader).await;

    let response = send(
        &app,
        "PATCH",
        &format!("/api/users/{user_id}/roles/{editor}"),
        Some(&admin),
        Some(json!({ "is_active": false })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    let map = resolve_permissions(&pool, user_id).await.unwrap();
    assert!(map.allows(Module::Content, Action::Read));
    assert!(!map.allows(Module::Content, Action::Update));
    assert_eq!(map.len(), 1);

    // Re-activating restores exactly the editor grants.
    send(
        &app,
        "PATCH",
        &format!("/api/users/{user_id}/roles/{editor}"),
        Some(&admin),
        Some(json!({ "is_active": true })),
    )
    .await;
    let map = resolve_permissions(&pool, user_id).await.unwrap();
    assert!(map.allows(Module::Content, Action::Update));
    assert_eq!(map.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_union_over_roles_without_double_counting(pool: PgPool) {
    setup_test_app(pool.clone()).await;

    let a = create_test_role(
        &pool,
        "Buyer",
        &[(Module::Suppliers, Action::Read), (Module::PurchaseOrders, Action::Create)],
    )
    .await;
    let b = create_test_role(
        &pool,
        "Auditor",
        &[(Module::Suppliers, Action::Read), (Module::Reports, Action::Export)],
    )
    .await;

    let user_id = create_test_user(&pool, &generate_unique_email()).await;
    assign_role(&pool, user_id, a).await;
    assign_role(&pool, user_id, b).await;

    let map = resolve_permissions(&pool, user_id).await.unwrap();
    assert_eq!(map.len(), 3);
    assert!(map.allows(Module::Reports, Action::Export));
    assert!(map.allows(Module::PurchaseOrders, Action::Create));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_routes_enforce_permissions(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let (_, viewer_email) = create_user_with_role(&pool, "viewer").await;
    let viewer = login_token(&app, &viewer_email).await;

    let list = send(&app, "GET", "/api/suppliers", Some(&viewer), None).await;
    assert_eq!(list.status, StatusCode::OK);

    let create = send(
        &app,
        "POST",
        "/api/suppliers",
        Some(&viewer),
        Some(json!({ "name": "Delta Steel" })),
    )
    .await;
    assert_eq!(create.status, StatusCode::FORBIDDEN);
    assert_eq!(
        create.body["error_en"],
        "You do not have permission to perform this action"
    );

    let roles = send(&app, "GET", "/api/roles", Some(&viewer), None).await;
    assert_eq!(roles.status, StatusCode::FORBIDDEN);

    let users = send(&app, "GET", "/api/users", Some(&viewer), None).await;
    assert_eq!(users.status, StatusCode::FORBIDDEN);

    let anonymous = send(&app, "GET", "/api/suppliers", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_user_without_roles_has_no_permissions(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let email = generate_unique_email();
    create_test_user(&pool, &email).await;
    let token = login_token(&app, &email).await;

    let me = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(me.body["role"], "member");
    assert_eq!(me.body["roles"], json!([]));
    assert_eq!(me.body["permissions"], json!({}));

    let catalog = send(&app, "GET", "/api/permissions/catalog", Some(&token), None).await;
    assert_eq!(catalog.status, StatusCode::OK);
    assert_eq!(catalog.body["clientActions"]["view"], "read");
    assert_eq!(catalog.body["clientActions"]["print"], "export");
    assert!(catalog.body["clientActions"]["approve"].is_null());
}
