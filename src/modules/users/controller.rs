use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use masnaa_core::{AppError, ErrorResponse};
use masnaa_models::{RoleId, UserId};

use crate::middleware::auth::{RequireUsersCreate, RequireUsersRead, RequireUsersUpdate};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{
    AssignRoleDto, AssignedRole, CreateUserDto, MessageResponse, PaginatedUsersResponse,
    ResetPasswordDto, SetActiveDto, SetUserRolesDto, UpdateUserDto, UserFilterParams,
    UserWithRoles,
};
use super::service;

#[utoipa::path(
    get,
    path = "/api/users",
    params(UserFilterParams),
    responses(
        (status = 200, description = "Paginated users with their role assignments", body = PaginatedUsersResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn get_users(
    State(state): State<AppState>,
    _auth: RequireUsersRead,
    Query(params): Query<UserFilterParams>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let users = service::get_users(&state.db, params).await?;
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = UserWithRoles),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    _auth: RequireUsersRead,
    Path(id): Path<UserId>,
) -> Result<Json<UserWithRoles>, AppError> {
    let user = service::get_user(&state.db, id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = UserWithRoles),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Unknown role in role_ids", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    RequireUsersCreate(auth_user): RequireUsersCreate,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<UserWithRoles>), AppError> {
    let user = service::create_user(&state.db, dto, auth_user.user_id()).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = UserWithRoles),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    _auth: RequireUsersUpdate,
    Path(id): Path<UserId>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<UserWithRoles>, AppError> {
    let user = service::update_user(&state.db, id, dto).await?;
    Ok(Json(user))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}/status",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = SetActiveDto,
    responses(
        (status = 200, description = "User activation changed", body = UserWithRoles),
        (status = 400, description = "Cannot deactivate own account", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn set_user_active(
    State(state): State<AppState>,
    RequireUsersUpdate(auth_user): RequireUsersUpdate,
    Path(id): Path<UserId>,
    ValidatedJson(dto): ValidatedJson<SetActiveDto>,
) -> Result<Json<UserWithRoles>, AppError> {
    let user =
        service::set_user_active(&state.db, id, dto.is_active, auth_user.user_id()).await?;
    Ok(Json(user))
}

/// Administrator password reset (no current password required)
#[utoipa::path(
    put,
    path = "/api/users/{id}/password",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = ResetPasswordDto,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn reset_password(
    State(state): State<AppState>,
    _auth: RequireUsersUpdate,
    Path(id): Path<UserId>,
    ValidatedJson(dto): ValidatedJson<ResetPasswordDto>,
) -> Result<Json<MessageResponse>, AppError> {
    service::reset_password(&state.db, id, &dto.new_password).await?;
    Ok(Json(MessageResponse::new("Password reset successfully")))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/roles",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "All role assignments of the user", body = Vec<AssignedRole>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "User Roles",
    security(("bearer_auth" = []))
)]
pub async fn get_user_roles(
    State(state): State<AppState>,
    _auth: RequireUsersRead,
    Path(id): Path<UserId>,
) -> Result<Json<Vec<AssignedRole>>, AppError> {
    let roles = service::get_user_roles(&state.db, id).await?;
    Ok(Json(roles))
}

/// Replace the user's active role set
#[utoipa::path(
    put,
    path = "/api/users/{id}/roles",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = SetUserRolesDto,
    responses(
        (status = 200, description = "Role set replaced", body = Vec<AssignedRole>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "User or role not found", body = ErrorResponse)
    ),
    tag = "User Roles",
    security(("bearer_auth" = []))
)]
pub async fn set_user_roles(
    State(state): State<AppState>,
    RequireUsersUpdate(auth_user): RequireUsersUpdate,
    Path(id): Path<UserId>,
    ValidatedJson(dto): ValidatedJson<SetUserRolesDto>,
) -> Result<Json<Vec<AssignedRole>>, AppError> {
    let roles = service::set_user_roles(&state.db, id, &dto.role_ids, auth_user.user_id()).await?;
    Ok(Json(roles))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/roles",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = AssignRoleDto,
    responses(
        (status = 200, description = "Role assigned", body = Vec<AssignedRole>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "User or role not found", body = ErrorResponse)
    ),
    tag = "User Roles",
    security(("bearer_auth" = []))
)]
pub async fn assign_role(
    State(state): State<AppState>,
    RequireUsersUpdate(auth_user): RequireUsersUpdate,
    Path(id): Path<UserId>,
    ValidatedJson(dto): ValidatedJson<AssignRoleDto>,
) -> Result<Json<Vec<AssignedRole>>, AppError> {
    let roles = service::assign_role(&state.db, id, dto.role_id, auth_user.user_id()).await?;
    Ok(Json(roles))
}

#[utoipa::path(
    patch,
    path = "/api/users/{id}/roles/{role_id}",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ("role_id" = Uuid, Path, description = "Role ID")
    ),
    request_body = SetActiveDto,
    responses(
        (status = 200, description = "Assignment activation changed", body = Vec<AssignedRole>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    ),
    tag = "User Roles",
    security(("bearer_auth" = []))
)]
pub async fn set_assignment_active(
    State(state): State<AppState>,
    _auth: RequireUsersUpdate,
    Path((id, role_id)): Path<(UserId, RoleId)>,
    ValidatedJson(dto): ValidatedJson<SetActiveDto>,
) -> Result<Json<Vec<AssignedRole>>, AppError> {
    let roles = service::set_assignment_active(&state.db, id, role_id, dto.is_active).await?;
    Ok(Json(roles))
}

/// Revoke a role (the assignment is deactivated, not removed)
#[utoipa::path(
    delete,
    path = "/api/users/{id}/roles/{role_id}",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ("role_id" = Uuid, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Role revoked", body = Vec<AssignedRole>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    ),
    tag = "User Roles",
    security(("bearer_auth" = []))
)]
pub async fn revoke_role(
    State(state): State<AppState>,
    _auth: RequireUsersUpdate,
    Path((id, role_id)): Path<(UserId, RoleId)>,
) -> Result<Json<Vec<AssignedRole>>, AppError> {
    let roles = service::revoke_role(&state.db, id, role_id).await?;
    Ok(Json(roles))
}
