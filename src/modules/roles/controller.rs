use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use masnaa_core::{AppError, ErrorResponse};
use masnaa_models::RoleId;

use crate::middleware::auth::{
    RequireRolesCreate, RequireRolesDelete, RequireRolesRead, RequireRolesUpdate,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{
    CreateRoleDto, DeleteRoleParams, DeleteRoleResponse, PaginatedRolesResponse,
    RoleFilterParams, RoleWithPermissions, SetActiveDto, SetRolePermissionsDto, UpdateRoleDto,
};
use super::service;

#[utoipa::path(
    get,
    path = "/api/roles",
    params(RoleFilterParams),
    responses(
        (status = 200, description = "List of roles with their permissions", body = PaginatedRolesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn get_roles(
    State(state): State<AppState>,
    _auth: RequireRolesRead,
    Query(params): Query<RoleFilterParams>,
) -> Result<Json<PaginatedRolesResponse>, AppError> {
    let result = service::get_roles(&state.db, params).await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    params(
        ("id" = Uuid, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Role details", body = RoleWithPermissions),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Role not found", body = ErrorResponse)
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn get_role(
    State(state): State<AppState>,
    _auth: RequireRolesRead,
    Path(id): Path<RoleId>,
) -> Result<Json<RoleWithPermissions>, AppError> {
    let role = service::get_role(&state.db, id).await?;
    Ok(Json(role))
}

#[utoipa::path(
    post,
    path = "/api/roles",
    request_body = CreateRoleDto,
    responses(
        (status = 201, description = "Role created", body = RoleWithPermissions),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 409, description = "Role name already exists", body = ErrorResponse),
        (status = 422, description = "Validation error or unknown permission", body = ErrorResponse)
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn create_role(
    State(state): State<AppState>,
    _auth: RequireRolesCreate,
    ValidatedJson(dto): ValidatedJson<CreateRoleDto>,
) -> Result<(StatusCode, Json<RoleWithPermissions>), AppError> {
    let role = service::create_role(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

#[utoipa::path(
    put,
    path = "/api/roles/{id}",
    params(
        ("id" = Uuid, Path, description = "Role ID")
    ),
    request_body = UpdateRoleDto,
    responses(
        (status = 200, description = "Role updated", body = RoleWithPermissions),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Role not found", body = ErrorResponse),
        (status = 409, description = "Role name already exists", body = ErrorResponse)
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn update_role(
    State(state): State<AppState>,
    _auth: RequireRolesUpdate,
    Path(id): Path<RoleId>,
    ValidatedJson(dto): ValidatedJson<UpdateRoleDto>,
) -> Result<Json<RoleWithPermissions>, AppError> {
    let role = service::update_role(&state.db, id, dto).await?;
    Ok(Json(role))
}

#[utoipa::path(
    patch,
    path = "/api/roles/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Role ID")
    ),
    request_body = SetActiveDto,
    responses(
        (status = 200, description = "Role activation changed", body = RoleWithPermissions),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Role not found", body = ErrorResponse)
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn set_role_active(
    State(state): State<AppState>,
    _auth: RequireRolesUpdate,
    Path(id): Path<RoleId>,
    ValidatedJson(dto): ValidatedJson<SetActiveDto>,
) -> Result<Json<RoleWithPermissions>, AppError> {
    let role = service::set_role_active(&state.db, id, dto.is_active).await?;
    Ok(Json(role))
}

#[utoipa::path(
    put,
    path = "/api/roles/{id}/permissions",
    params(
        ("id" = Uuid, Path, description = "Role ID")
    ),
    request_body = SetRolePermissionsDto,
    responses(
        (status = 200, description = "Permission set replaced", body = RoleWithPermissions),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Role not found", body = ErrorResponse),
        (status = 422, description = "Unknown permission", body = ErrorResponse)
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn set_role_permissions(
    State(state): State<AppState>,
    _auth: RequireRolesUpdate,
    Path(id): Path<RoleId>,
    ValidatedJson(dto): ValidatedJson<SetRolePermissionsDto>,
) -> Result<Json<RoleWithPermissions>, AppError> {
    let role = service::set_role_permissions(&state.db, id, &dto.permissions).await?;
    Ok(Json(role))
}

#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    params(
        ("id" = Uuid, Path, description = "Role ID"),
        DeleteRoleParams
    ),
    responses(
        (status = 200, description = "Role deleted", body = DeleteRoleResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Role not found", body = ErrorResponse),
        (status = 409, description = "Role has active assignments", body = ErrorResponse)
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn delete_role(
    State(state): State<AppState>,
    _auth: RequireRolesDelete,
    Path(id): Path<RoleId>,
    Query(params): Query<DeleteRoleParams>,
) -> Result<Json<DeleteRoleResponse>, AppError> {
    let result = service::delete_role(&state.db, id, params.force).await?;
    Ok(Json(result))
}
