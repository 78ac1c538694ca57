use axum::{
    Json,
    extract::{Query, State},
};
use masnaa_core::AppError;
use masnaa_core::permissions;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

use super::model::{
    CatalogResponse, MyPermissionsResponse, PermissionCheckParams, PermissionCheckResponse,
};
use super::service;

#[utoipa::path(
    get,
    path = "/api/permissions/catalog",
    responses(
        (status = 200, description = "Modules, actions and every catalogued permission", body = CatalogResponse),
        (status = 401, description = "Unauthorized", body = masnaa_core::ErrorResponse)
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn get_catalog(_auth_user: AuthUser) -> Json<CatalogResponse> {
    Json(CatalogResponse::build())
}

#[utoipa::path(
    get,
    path = "/api/permissions/me",
    responses(
        (status = 200, description = "The caller's effective permissions and active roles", body = MyPermissionsResponse),
        (status = 401, description = "Unauthorized", body = masnaa_core::ErrorResponse)
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn get_my_permissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<MyPermissionsResponse>, AppError> {
    let access = service::resolve_access(&state.db, auth_user.user_id()).await?;
    Ok(Json(access.into_response()))
}

#[utoipa::path(
    get,
    path = "/api/permissions/check",
    params(PermissionCheckParams),
    responses(
        (status = 200, description = "Whether the caller may perform the action", body = PermissionCheckResponse),
        (status = 401, description = "Unauthorized", body = masnaa_core::ErrorResponse)
    ),
    tag = "Permissions",
    security(("bearer_auth" = []))
)]
pub async fn check_permission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<PermissionCheckParams>,
) -> Result<Json<PermissionCheckResponse>, AppError> {
    let map = service::resolve_permissions(&state.db, auth_user.user_id()).await?;
    let allowed = permissions::check_permission(&map, &params.module, &params.action);
    Ok(Json(PermissionCheckResponse { allowed }))
}
