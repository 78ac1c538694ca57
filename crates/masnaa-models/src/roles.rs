//! Role and permission models and DTOs.

use chrono::{DateTime, Utc};
use masnaa_core::serde::empty_string_as_none;
use masnaa_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{PermissionId, RoleId};

/// A catalog permission as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Permission {
    pub id: PermissionId,
    pub module: String,
    pub action: String,
    pub label_en: String,
    pub label_ar: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    /// Higher ranks first when choosing a user's primary role.
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
    /// Number of active user assignments.
    pub active_assignments: i64,
}

/// A `(module, action)` pair as submitted by a client.
///
/// Kept as free strings so that unknown pairs reach catalog validation and are
/// reported as such rather than as a malformed body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct PermissionRef {
    #[schema(example = "suppliers")]
    pub module: String,
    #[schema(example = "read")]
    pub action: String,
}

impl PermissionRef {
    pub fn new(module: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            action: action.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRoleDto {
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "crate::value_types::not_blank")
    )]
    pub name: String,
    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,
    pub is_active: Option<bool>,
    #[validate(range(min = 0, max = 1000))]
    pub priority: Option<i32>,
    /// Initial permission set
    pub permissions: Option<Vec<PermissionRef>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleDto {
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "crate::value_types::not_blank")
    )]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 1000))]
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetRolePermissionsDto {
    pub permissions: Vec<PermissionRef>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoleFilterParams {
    /// Case-insensitive match on role name
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteRoleParams {
    /// Deactivate active assignments and delete anyway
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteRoleResponse {
    pub message: String,
    /// Active assignments that were deactivated by a forced delete.
    pub deactivated_assignments: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedRolesResponse {
    pub data: Vec<RoleWithPermissions>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_role_dto_validation() {
        let dto = CreateRoleDto {
            name: "Editor".to_string(),
            description: Some("Edits published content".to_string()),
            is_active: None,
            priority: Some(20),
            permissions: Some(vec![PermissionRef::new("content", "update")]),
        };
        assert!(dto.validate().is_ok());

        let empty_name = CreateRoleDto {
            name: String::new(),
            ..dto.clone()
        };
        assert!(empty_name.validate().is_err());

        let blank_name = CreateRoleDto {
            name: "   ".to_string(),
            ..dto.clone()
        };
        let errors = blank_name.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));

        let negative_priority = CreateRoleDto {
            priority: Some(-1),
            ..dto
        };
        assert!(negative_priority.validate().is_err());
    }

    #[test]
    fn test_update_role_dto_validation() {
        let long_description = UpdateRoleDto {
            name: None,
            description: Some("x".repeat(501)),
            priority: None,
        };
        assert!(long_description.validate().is_err());

        let blank_rename = UpdateRoleDto {
            name: Some(" \t ".to_string()),
            description: None,
            priority: None,
        };
        assert!(blank_rename.validate().is_err());
    }

    #[test]
    fn test_unknown_pairs_still_parse() {
        let dto: SetRolePermissionsDto =
            serde_json::from_str(r#"{"permissions":[{"module":"nope","action":"approve"}]}"#)
                .unwrap();
        assert_eq!(dto.permissions[0], PermissionRef::new("nope", "approve"));
    }
}
