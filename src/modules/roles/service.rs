use std::collections::{BTreeSet, HashMap};

use masnaa_core::permissions::{Action, Module};
use masnaa_core::{AppError, Message, PaginationMeta};
use masnaa_models::RoleId;
use masnaa_observability::track_role_permissions_replaced;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{info, instrument};

use super::model::{
    CreateRoleDto, DeleteRoleResponse, PaginatedRolesResponse, Permission, PermissionRef, Role,
    RoleFilterParams, RoleWithPermissions, UpdateRoleDto,
};

const ROLE_COLUMNS: &str = "id, name, description, is_active, priority, created_at, updated_at";
const ROLES_NAME_KEY: &str = "roles_name_key";

/// Checks every pair against the catalog and collapses duplicates.
///
/// Fails as a whole on the first unknown pair; nothing is written.
pub fn validate_permission_refs(refs: &[PermissionRef]) -> Result<Vec<(Module, Action)>, AppError> {
    let mut pairs = BTreeSet::new();
    for r in refs {
        let module = r.module.parse::<Module>();
        let action = r.action.parse::<Action>();
        match (module, action) {
            (Ok(module), Ok(action)) if module.supports(action) => {
                pairs.insert((module, action));
            }
            _ => {
                return Err(AppError::unprocessable(Message::UnknownPermission));
            }
        }
    }
    Ok(pairs.into_iter().collect())
}

fn map_name_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
        && db_err.constraint() == Some(ROLES_NAME_KEY)
    {
        return AppError::conflict(Message::RoleNameTaken);
    }
    AppError::from(e)
}

async fn name_taken(db: &PgPool, name: &str, except: Option<RoleId>) -> Result<bool, AppError> {
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM roles WHERE name = $1 AND ($2::uuid IS NULL OR id <> $2))",
    )
    .bind(name)
    .bind(except)
    .fetch_one(db)
    .await?;
    Ok(taken)
}

/// Replaces the role's links with `pairs` inside the caller's transaction.
async fn replace_links(
    tx: &mut Transaction<'_, Postgres>,
    role_id: RoleId,
    pairs: &[(Module, Action)],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
        .bind(role_id)
        .execute(&mut **tx)
        .await?;

    if pairs.is_empty() {
        return Ok(());
    }

    let modules: Vec<&str> = pairs.iter().map(|(m, _)| m.as_str()).collect();
    let actions: Vec<&str> = pairs.iter().map(|(_, a)| a.as_str()).collect();

    let inserted = sqlx::query(
        "INSERT INTO role_permissions (role_id, permission_id)
         SELECT $1, p.id
         FROM permissions p
         JOIN UNNEST($2::text[], $3::text[]) AS wanted(module, action)
           ON wanted.module = p.module AND wanted.action = p.action
         ON CONFLICT (role_id, permission_id) DO NOTHING",
    )
    .bind(role_id)
    .bind(&modules)
    .bind(&actions)
    .execute(&mut **tx)
    .await?
    .rows_affected();

    // Catalogued but missing from the table means the seeder has not run.
    if inserted as usize != pairs.len() {
        return Err(AppError::internal(anyhow::anyhow!(
            "permission catalog out of sync: {} of {} pairs present",
            inserted,
            pairs.len()
        )));
    }

    Ok(())
}

async fn lock_role(tx: &mut Transaction<'_, Postgres>, role_id: RoleId) -> Result<(), AppError> {
    let exists: Option<RoleId> = sqlx::query_scalar("SELECT id FROM roles WHERE id = $1 FOR UPDATE")
        .bind(role_id)
        .fetch_optional(&mut **tx)
        .await?;
    exists
        .map(|_| ())
        .ok_or_else(|| AppError::not_found(Message::RoleNotFound))
}

#[derive(FromRow)]
struct RolePermissionRow {
    role_id: RoleId,
    #[sqlx(flatten)]
    permission: Permission,
}

async fn permissions_for(
    db: &PgPool,
    role_ids: &[RoleId],
) -> Result<HashMap<RoleId, Vec<Permission>>, AppError> {
    let rows: Vec<RolePermissionRow> = sqlx::query_as(
        "SELECT rp.role_id, p.id, p.module, p.action, p.label_en, p.label_ar
         FROM role_permissions rp
         JOIN permissions p ON p.id = rp.permission_id
         WHERE rp.role_id = ANY($1)
         ORDER BY p.module, p.action",
    )
    .bind(role_ids)
    .fetch_all(db)
    .await?;

    let mut grouped: HashMap<RoleId, Vec<Permission>> = HashMap::new();
    for row in rows {
        grouped.entry(row.role_id).or_default().push(row.permission);
    }
    Ok(grouped)
}

async fn active_assignment_counts(
    db: &PgPool,
    role_ids: &[RoleId],
) -> Result<HashMap<RoleId, i64>, AppError> {
    let rows: Vec<(RoleId, i64)> = sqlx::query_as(
        "SELECT role_id, COUNT(*) FROM user_roles
         WHERE role_id = ANY($1) AND is_active = TRUE
         GROUP BY role_id",
    )
    .bind(role_ids)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().collect())
}

async fn with_permissions(
    db: &PgPool,
    roles: Vec<Role>,
) -> Result<Vec<RoleWithPermissions>, AppError> {
    let ids: Vec<RoleId> = roles.iter().map(|r| r.id).collect();
    let mut permissions = permissions_for(db, &ids).await?;
    let counts = active_assignment_counts(db, &ids).await?;

    Ok(roles
        .into_iter()
        .map(|role| RoleWithPermissions {
            permissions: permissions.remove(&role.id).unwrap_or_default(),
            active_assignments: counts.get(&role.id).copied().unwrap_or(0),
            role,
        })
        .collect())
}

#[instrument(skip(db))]
pub async fn get_role(db: &PgPool, role_id: RoleId) -> Result<RoleWithPermissions, AppError> {
    let role = sqlx::query_as::<_, Role>(&format!("SELECT {ROLE_COLUMNS} FROM roles WHERE id = $1"))
        .bind(role_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(Message::RoleNotFound))?;

    with_permissions(db, vec![role])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found(Message::RoleNotFound))
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, params: &'a RoleFilterParams) {
    builder.push(" WHERE 1=1");
    if let Some(is_active) = params.is_active {
        builder.push(" AND is_active = ").push_bind(is_active);
    }
    if let Some(search) = params.search.as_deref() {
        builder
            .push(" AND name ILIKE ")
            .push_bind(format!("%{}%", search.trim()));
    }
}

#[instrument(skip(db))]
pub async fn get_roles(
    db: &PgPool,
    params: RoleFilterParams,
) -> Result<PaginatedRolesResponse, AppError> {
    let limit = params.pagination.limit();
    let offset = params.pagination.offset();

    let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM roles");
    push_filters(&mut count_query, &params);
    let total: i64 = count_query.build_query_scalar().fetch_one(db).await?;

    let mut query = QueryBuilder::new(format!("SELECT {ROLE_COLUMNS} FROM roles"));
    push_filters(&mut query, &params);
    query
        .push(" ORDER BY priority DESC, name LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let roles: Vec<Role> = query.build_query_as().fetch_all(db).await?;

    let data = with_permissions(db, roles).await?;
    let meta = PaginationMeta::new(&params.pagination, total, data.len());

    Ok(PaginatedRolesResponse { data, meta })
}

#[instrument(skip(db, dto), fields(role.name = %dto.name))]
pub async fn create_role(db: &PgPool, dto: CreateRoleDto) -> Result<RoleWithPermissions, AppError> {
    let name = dto.name.trim().to_string();
    let pairs = dto
        .permissions
        .as_deref()
        .map(validate_permission_refs)
        .transpose()?;

    if name_taken(db, &name, None).await? {
        return Err(AppError::conflict(Message::RoleNameTaken));
    }

    let mut tx = db.begin().await?;

    let role_id: RoleId = sqlx::query_scalar(
        "INSERT INTO roles (name, description, is_active, priority)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(&name)
    .bind(&dto.description)
    .bind(dto.is_active.unwrap_or(true))
    .bind(dto.priority.unwrap_or(0))
    .fetch_one(&mut *tx)
    .await
    .map_err(map_name_conflict)?;

    if let Some(pairs) = &pairs {
        replace_links(&mut tx, role_id, pairs).await?;
    }

    tx.commit().await?;

    info!(role.id = %role_id, "Role created");
    get_role(db, role_id).await
}

#[instrument(skip(db, dto))]
pub async fn update_role(
    db: &PgPool,
    role_id: RoleId,
    dto: UpdateRoleDto,
) -> Result<RoleWithPermissions, AppError> {
    let name = dto.name.as_deref().map(str::trim);
    if let Some(name) = name
        && name_taken(db, name, Some(role_id)).await?
    {
        return Err(AppError::conflict(Message::RoleNameTaken));
    }

    let updated = sqlx::query(
        "UPDATE roles
         SET name = COALESCE($1, name),
             description = COALESCE($2, description),
             priority = COALESCE($3, priority),
             updated_at = NOW()
         WHERE id = $4",
    )
    .bind(name)
    .bind(&dto.description)
    .bind(dto.priority)
    .bind(role_id)
    .execute(db)
    .await
    .map_err(map_name_conflict)?
    .rows_affected();

    if updated == 0 {
        return Err(AppError::not_found(Message::RoleNotFound));
    }

    get_role(db, role_id).await
}

/// Deactivating a role removes its grants from every holder at once; the
/// assignments themselves are kept.
#[instrument(skip(db))]
pub async fn set_role_active(
    db: &PgPool,
    role_id: RoleId,
    is_active: bool,
) -> Result<RoleWithPermissions, AppError> {
    let updated = sqlx::query("UPDATE roles SET is_active = $1, updated_at = NOW() WHERE id = $2")
        .bind(is_active)
        .bind(role_id)
        .execute(db)
        .await?
        .rows_affected();

    if updated == 0 {
        return Err(AppError::not_found(Message::RoleNotFound));
    }

    info!(role.id = %role_id, is_active, "Role activation changed");
    get_role(db, role_id).await
}

/// Atomically replaces the role's permission set. Re-submitting the same set is a
/// no-op in effect.
#[instrument(skip(db, refs), fields(requested = refs.len()))]
pub async fn set_role_permissions(
    db: &PgPool,
    role_id: RoleId,
    refs: &[PermissionRef],
) -> Result<RoleWithPermissions, AppError> {
    let pairs = validate_permission_refs(refs)?;

    let mut tx = db.begin().await?;
    lock_role(&mut tx, role_id).await?;
    replace_links(&mut tx, role_id, &pairs).await?;
    sqlx::query("UPDATE roles SET updated_at = NOW() WHERE id = $1")
        .bind(role_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!(role.id = %role_id, permissions = pairs.len(), "Role permissions replaced");
    track_role_permissions_replaced();

    get_role(db, role_id).await
}

/// Deletes a role.
///
/// Refused with 409 while active assignments reference it, unless `force` is set,
/// in which case those assignments are deactivated first in the same transaction.
/// Permission links and inactive assignments cascade.
#[instrument(skip(db))]
pub async fn delete_role(
    db: &PgPool,
    role_id: RoleId,
    force: bool,
) -> Result<DeleteRoleResponse, AppError> {
    let mut tx = db.begin().await?;
    lock_role(&mut tx, role_id).await?;

    let active: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM user_roles WHERE role_id = $1 AND is_active = TRUE",
    )
    .bind(role_id)
    .fetch_one(&mut *tx)
    .await?;

    let deactivated_assignments = if active > 0 {
        if !force {
            return Err(AppError::conflict(Message::RoleInUse));
        }
        sqlx::query(
            "UPDATE user_roles SET is_active = FALSE, updated_at = NOW()
             WHERE role_id = $1 AND is_active = TRUE",
        )
        .bind(role_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
    } else {
        0
    };

    sqlx::query("DELETE FROM roles WHERE id = $1")
        .bind(role_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(role.id = %role_id, deactivated_assignments, force, "Role deleted");
    Ok(DeleteRoleResponse {
        message: "Role deleted".to_string(),
        deactivated_assignments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_validate_dedups() {
        let pairs = validate_permission_refs(&[
            PermissionRef::new("content", "update"),
            PermissionRef::new("content", "update"),
            PermissionRef::new("content", "read"),
        ])
        .unwrap();
        assert_eq!(
            pairs,
            vec![
                (Module::Content, Action::Read),
                (Module::Content, Action::Update)
            ]
        );
    }

    #[test]
    fn test_validate_rejects_unknown_module() {
        let err = validate_permission_refs(&[PermissionRef::new("inventory", "read")]).unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.message(), Some(Message::UnknownPermission));
    }

    #[test]
    fn test_validate_rejects_client_vocabulary() {
        // Client names are translated at the edge only; roles hold persisted names.
        let err = validate_permission_refs(&[PermissionRef::new("content", "view")]).unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(validate_permission_refs(&[PermissionRef::new("content", "approve")]).is_err());
    }

    #[test]
    fn test_validate_rejects_uncatalogued_pair() {
        let unsupported = Module::ALL
            .iter()
            .flat_map(|m| Action::ALL.iter().map(move |a| (*m, *a)))
            .find(|(m, a)| !m.supports(*a));

        if let Some((module, action)) = unsupported {
            let refs = [PermissionRef::new(module.as_str(), action.as_str())];
            assert!(validate_permission_refs(&refs).is_err());
        }
    }

    #[test]
    fn test_empty_set_is_valid() {
        assert!(validate_permission_refs(&[]).unwrap().is_empty());
    }
}
