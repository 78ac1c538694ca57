mod common;

use axum::http::StatusCode;
use common::{
    assign_role, create_test_role, create_test_user, create_user_with_role,
    generate_unique_email, login_token, send, setup_test_app,
};
use masnaa_core::Message;
use masnaa_core::permissions::{Action, Module};
use serde_json::{Value, json};
use sqlx::PgPool;

async fn admin_token(pool: &PgPool, app: &axum::Router) -> String {
    let (_, email) = create_user_with_role(pool, "admin").await;
    login_token(app, &email).await
}

fn permission_pairs(role: &Value) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = role["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| {
            (
                p["module"].as_str().unwrap().to_string(),
                p["action"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    pairs.sort();
    pairs
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_role_name_conflicts(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let admin = admin_token(&pool, &app).await;

    let body = json!({ "name": "Quality Control" });
    let first = send(&app, "POST", "/api/roles", Some(&admin), Some(body.clone())).await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = send(&app, "POST", "/api/roles", Some(&admin), Some(body)).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["error_en"], "A role with this name already exists");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_blank_role_name_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let admin = admin_token(&pool, &app).await;

    let blank = json!({ "name": "   " });
    let created = send(&app, "POST", "/api/roles", Some(&admin), Some(blank)).await;
    assert_eq!(created.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(created.body["error"], Message::ValidationFailed.ar());
    assert_eq!(created.body["error_en"], "name must not be blank");

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles WHERE name = ''")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 0);

    let packing = json!({ "name": "Packing" });
    let role = send(&app, "POST", "/api/roles", Some(&admin), Some(packing)).await;
    let id = role.body["id"].as_str().unwrap().to_string();
    let renamed = send(
        &app,
        "PUT",
        &format!("/api/roles/{id}"),
        Some(&admin),
        Some(json!({ "name": "\t " })),
    )
    .await;
    assert_eq!(renamed.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rename_to_existing_name_conflicts(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let admin = admin_token(&pool, &app).await;
    let role = create_test_role(&pool, "Packing", &[]).await;

    let response = send(
        &app,
        "PUT",
        &format!("/api/roles/{role}"),
        Some(&admin),
        Some(json!({ "name": "viewer" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_set_permissions_is_idempotent(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let admin = admin_token(&pool, &app).await;
    let role = create_test_role(&pool, "Packing", &[(Module::Reports, Action::Read)]).await;

    let body = json!({
        "permissions": [
            { "module": "purchase_orders", "action": "read" },
            { "module": "purchase_orders", "action": "update" },
            { "module": "purchase_orders", "action": "read" }
        ]
    });
    let uri = format!("/api/roles/{role}/permissions");

    let first = send(&app, "PUT", &uri, Some(&admin), Some(body.clone())).await;
    assert_eq!(first.status, StatusCode::OK);
    let second = send(&app, "PUT", &uri, Some(&admin), Some(body)).await;
    assert_eq!(second.status, StatusCode::OK);

    let expected = vec![
        ("purchase_orders".to_string(), "read".to_string()),
        ("purchase_orders".to_string(), "update".to_string()),
    ];
    assert_eq!(permission_pairs(&first.body), expected);
    assert_eq!(permission_pairs(&second.body), expected);

    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM role_permissions WHERE role_id = $1")
        .bind(role)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(links, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_permission_rejected_atomically(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let admin = admin_token(&pool, &app).await;
    let role = create_test_role(&pool, "Packing", &[(Module::Reports, Action::Read)]).await;

    for bad in [
        json!({ "module": "content", "action": "approve" }),
        json!({ "module": "warehouse", "action": "read" }),
        json!({ "module": "roles", "action": "export" }),
    ] {
        let response = send(
            &app,
            "PUT",
            &format!("/api/roles/{role}/permissions"),
            Some(&admin),
            Some(json!({ "permissions": [{ "module": "content", "action": "read" }, bad] })),
        )
        .await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.body["error_en"], "Unknown permission requested");
    }

    let role = send(&app, "GET", &format!("/api/roles/{role}"), Some(&admin), None).await;
    assert_eq!(
        permission_pairs(&role.body),
        vec![("reports".to_string(), "read".to_string())]
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_role_with_active_assignments(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let admin = admin_token(&pool, &app).await;
    let role = create_test_role(&pool, "Temporary", &[(Module::Content, Action::Read)]).await;
    let user_id = create_test_user(&pool, &generate_unique_email()).await;
    assign_role(&pool, user_id, role).await;

    let refused = send(&app, "DELETE", &format!("/api/roles/{role}"), Some(&admin), None).await;
    assert_eq!(refused.status, StatusCode::CONFLICT);
    assert_eq!(
        refused.body["error_en"],
        "Role is assigned to active users and cannot be deleted"
    );

    let forced = send(
        &app,
        "DELETE",
        &format!("/api/roles/{role}?force=true"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(forced.status, StatusCode::OK);
    assert_eq!(forced.body["deactivated_assignments"], 1);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_roles WHERE role_id = $1")
        .bind(role)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);

    let gone = send(&app, "GET", &format!("/api/roles/{role}"), Some(&admin), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_role_with_only_inactive_assignments(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let admin = admin_token(&pool, &app).await;
    let role = create_test_role(&pool, "Seasonal", &[]).await;
    let user_id = create_test_user(&pool, &generate_unique_email()).await;
    assign_role(&pool, user_id, role).await;
    sqlx::query("UPDATE user_roles SET is_active = FALSE WHERE role_id = $1")
        .bind(role)
        .execute(&pool)
        .await
        .unwrap();

    let response = send(&app, "DELETE", &format!("/api/roles/{role}"), Some(&admin), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["deactivated_assignments"], 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_roles_reports_assignment_counts(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let admin = admin_token(&pool, &app).await;

    let response = send(&app, "GET", "/api/roles?search=admin", Some(&admin), None).await;
    assert_eq!(response.status, StatusCode::OK);

    let data = response.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], "admin");
    assert_eq!(data[0]["active_assignments"], 1);
    assert_eq!(response.body["meta"]["total"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_missing_role_is_not_found(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let admin = admin_token(&pool, &app).await;

    let response = send(
        &app,
        "GET",
        &format!("/api/roles/{}", uuid::Uuid::new_v4()),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error_en"], "Role not found");
}
