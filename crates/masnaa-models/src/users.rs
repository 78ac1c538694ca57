//! User domain models and DTOs.

use chrono::{DateTime, Utc};
use masnaa_core::serde::empty_string_as_none;
use masnaa_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{RoleId, UserId};
use crate::value_types::Email;

/// A user account. The password hash is never part of this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub is_active: bool,
    /// Legacy single-role label. Informational only; authorization uses role assignments.
    pub role: String,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A role as seen through one of the user's assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AssignedRole {
    pub role_id: RoleId,
    pub name: String,
    pub priority: i32,
    /// Whether the role itself is active.
    pub role_is_active: bool,
    /// Whether this user's assignment is active.
    pub is_active: bool,
    pub assigned_at: DateTime<Utc>,
    pub assigned_by: Option<UserId>,
}

impl AssignedRole {
    /// The assignment contributes permissions only when both flags are set.
    pub fn is_effective(&self) -> bool {
        self.is_active && self.role_is_active
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserWithRoles {
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<AssignedRole>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "crate::value_types::not_blank")
    )]
    pub name: String,
    pub email: Email,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    /// Roles assigned (active) on creation.
    #[serde(default)]
    pub role_ids: Vec<RoleId>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "crate::value_types::not_blank")
    )]
    pub name: Option<String>,
    pub email: Option<Email>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetActiveDto {
    pub is_active: bool,
}

/// Admin-initiated password reset.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordDto {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Replaces the user's active role set.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetUserRolesDto {
    pub role_ids: Vec<RoleId>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AssignRoleDto {
    pub role_id: RoleId,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilterParams {
    /// Case-insensitive match on name or email
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<UserWithRoles>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_dto_validation() {
        let dto = CreateUserDto {
            name: "Warehouse Clerk".to_string(),
            email: Email::new("clerk@factory.example").unwrap(),
            password: "longenough".to_string(),
            role_ids: vec![],
            is_active: None,
        };
        assert!(dto.validate().is_ok());

        let short_password = CreateUserDto {
            password: "short".to_string(),
            ..dto.clone()
        };
        assert!(short_password.validate().is_err());

        let empty_name = CreateUserDto {
            name: String::new(),
            ..dto
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_create_user_rejects_bad_email() {
        let body = r#"{"name":"A","email":"nope","password":"longenough"}"#;
        assert!(serde_json::from_str::<CreateUserDto>(body).is_err());
    }

    #[test]
    fn test_effective_assignment() {
        let mut assignment = AssignedRole {
            role_id: RoleId::new(),
            name: "viewer".to_string(),
            priority: 10,
            role_is_active: true,
            is_active: true,
            assigned_at: Utc::now(),
            assigned_by: None,
        };
        assert!(assignment.is_effective());
        assignment.role_is_active = false;
        assert!(!assignment.is_effective());
    }
}
