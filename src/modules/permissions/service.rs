use std::collections::BTreeMap;

use masnaa_auth::{RankedRole, rank_roles};
use masnaa_core::permissions::{Action, Module, PermissionMap, RoleGrant};
use masnaa_core::{AppError, Message};
use masnaa_models::{MyPermissionsResponse, RoleId, UserId};
use sqlx::{FromRow, PgPool};
use tracing::{instrument, warn};

/// What a user may do right now, as stored.
#[derive(Debug, Clone, Default)]
pub struct UserAccess {
    pub permissions: PermissionMap,
    /// Active roles through active assignments, highest privilege first.
    pub roles: Vec<RankedRole>,
}

impl UserAccess {
    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.name.clone()).collect()
    }

    pub fn into_response(self) -> MyPermissionsResponse {
        let roles = self.role_names();
        MyPermissionsResponse::new(&self.permissions, roles)
    }
}

#[derive(Debug, FromRow)]
struct GrantRow {
    role_id: RoleId,
    role_name: String,
    priority: i32,
    role_is_active: bool,
    assignment_is_active: bool,
    module: Option<String>,
    action: Option<String>,
}

fn parse_pair(module: &str, action: &str) -> Option<(Module, Action)> {
    match (module.parse::<Module>(), action.parse::<Action>()) {
        (Ok(module), Ok(action)) => Some((module, action)),
        _ => {
            warn!(%module, %action, "Ignoring stored permission outside the catalog");
            None
        }
    }
}

fn fold_rows(rows: Vec<GrantRow>) -> UserAccess {
    // role_id -> (grant, ranked role)
    let mut by_role: BTreeMap<RoleId, (RoleGrant, RankedRole)> = BTreeMap::new();

    for row in rows {
        let (grant, _) = by_role.entry(row.role_id).or_insert_with(|| {
            (
                RoleGrant {
                    role_active: row.role_is_active,
                    assignment_active: row.assignment_is_active,
                    permissions: Vec::new(),
                },
                RankedRole::new(row.role_name.clone(), row.priority),
            )
        });

        if let (Some(module), Some(action)) = (row.module.as_deref(), row.action.as_deref())
            && let Some(pair) = parse_pair(module, action)
        {
            grant.permissions.push(pair);
        }
    }

    let mut roles: Vec<RankedRole> = by_role
        .values()
        .filter(|(grant, _)| grant.role_active && grant.assignment_active)
        .map(|(_, role)| role.clone())
        .collect();
    rank_roles(&mut roles);

    let permissions = PermissionMap::from_role_grants(by_role.into_values().map(|(g, _)| g));

    UserAccess { permissions, roles }
}

/// Loads the user's roles and effective permissions in one query.
///
/// Every assignment is read, active or not; [`PermissionMap::from_role_grants`]
/// applies the activation rule. Deactivated users resolve to nothing.
#[instrument(skip(db), fields(user.id = %user_id))]
pub async fn resolve_access(db: &PgPool, user_id: UserId) -> Result<UserAccess, AppError> {
    let rows: Vec<GrantRow> = sqlx::query_as(
        "SELECT r.id AS role_id,
                r.name AS role_name,
                r.priority,
                r.is_active AS role_is_active,
                ur.is_active AS assignment_is_active,
                p.module,
                p.action
         FROM users u
         JOIN user_roles ur ON ur.user_id = u.id
         JOIN roles r ON r.id = ur.role_id
         LEFT JOIN role_permissions rp ON rp.role_id = r.id
         LEFT JOIN permissions p ON p.id = rp.permission_id
         WHERE u.id = $1 AND u.is_active = TRUE",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(fold_rows(rows))
}

pub async fn resolve_permissions(db: &PgPool, user_id: UserId) -> Result<PermissionMap, AppError> {
    Ok(resolve_access(db, user_id).await?.permissions)
}

/// 401 unless the user still exists and is active.
#[instrument(skip(db), fields(user.id = %user_id))]
pub async fn ensure_active_user(db: &PgPool, user_id: UserId) -> Result<(), AppError> {
    let is_active: Option<bool> = sqlx::query_scalar("SELECT is_active FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await?;

    match is_active {
        Some(true) => Ok(()),
        _ => Err(AppError::unauthorized(Message::SessionExpired)),
    }
}
