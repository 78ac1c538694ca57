use std::collections::HashMap;

use masnaa_auth::{RankedRole, primary_role};
use masnaa_core::{AppError, Message, PaginationMeta, hash_password};
use masnaa_models::{RoleId, UserId};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{info, instrument};

use crate::modules::auth::service::USER_COLUMNS;

use super::model::{
    AssignedRole, CreateUserDto, PaginatedUsersResponse, UpdateUserDto, User, UserFilterParams,
    UserWithRoles,
};

const USERS_EMAIL_KEY: &str = "users_email_key";

const ASSIGNED_ROLE_QUERY: &str = "SELECT ur.user_id, ur.role_id, r.name, r.priority,
            r.is_active AS role_is_active, ur.is_active, ur.assigned_at, ur.assigned_by
     FROM user_roles ur
     JOIN roles r ON r.id = ur.role_id
     WHERE ur.user_id = ANY($1)
     ORDER BY r.priority DESC, r.name";

fn map_email_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
        && db_err.constraint() == Some(USERS_EMAIL_KEY)
    {
        return AppError::conflict(Message::EmailTaken);
    }
    AppError::from(e)
}

#[derive(FromRow)]
struct AssignmentRow {
    user_id: UserId,
    #[sqlx(flatten)]
    role: AssignedRole,
}

async fn assignments_for(
    db: &PgPool,
    user_ids: &[UserId],
) -> Result<HashMap<UserId, Vec<AssignedRole>>, AppError> {
    let rows: Vec<AssignmentRow> = sqlx::query_as(ASSIGNED_ROLE_QUERY)
        .bind(user_ids)
        .fetch_all(db)
        .await?;

    let mut grouped: HashMap<UserId, Vec<AssignedRole>> = HashMap::new();
    for row in rows {
        grouped.entry(row.user_id).or_default().push(row.role);
    }
    Ok(grouped)
}

async fn with_roles(db: &PgPool, users: Vec<User>) -> Result<Vec<UserWithRoles>, AppError> {
    let ids: Vec<UserId> = users.iter().map(|u| u.id).collect();
    let mut assignments = assignments_for(db, &ids).await?;

    Ok(users
        .into_iter()
        .map(|user| UserWithRoles {
            roles: assignments.remove(&user.id).unwrap_or_default(),
            user,
        })
        .collect())
}

async fn lock_user(tx: &mut Transaction<'_, Postgres>, user_id: UserId) -> Result<(), AppError> {
    let exists: Option<UserId> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;
    exists
        .map(|_| ())
        .ok_or_else(|| AppError::not_found(Message::UserNotFound))
}

async fn ensure_roles_exist(
    tx: &mut Transaction<'_, Postgres>,
    role_ids: &[RoleId],
) -> Result<(), AppError> {
    let found: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles WHERE id = ANY($1)")
        .bind(role_ids)
        .fetch_one(&mut **tx)
        .await?;
    if found as usize != role_ids.len() {
        return Err(AppError::not_found(Message::RoleNotFound));
    }
    Ok(())
}

/// Activates (or creates) an assignment for every listed role.
async fn upsert_assignments(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    role_ids: &[RoleId],
    assigned_by: UserId,
) -> Result<(), AppError> {
    if role_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        "INSERT INTO user_roles (user_id, role_id, is_active, assigned_by)
         SELECT $1, role_id, TRUE, $3 FROM UNNEST($2::uuid[]) AS wanted(role_id)
         ON CONFLICT ON CONSTRAINT user_roles_user_role_key
         DO UPDATE SET is_active = TRUE, assigned_by = EXCLUDED.assigned_by, updated_at = NOW()
         WHERE user_roles.is_active = FALSE",
    )
    .bind(user_id)
    .bind(role_ids)
    .bind(assigned_by)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Keeps the legacy `users.role` label in line with the primary active role.
async fn sync_role_label(tx: &mut Transaction<'_, Postgres>, user_id: UserId) -> Result<(), AppError> {
    let rows: Vec<(String, i32)> = sqlx::query_as(
        "SELECT r.name, r.priority
         FROM user_roles ur
         JOIN roles r ON r.id = ur.role_id
         WHERE ur.user_id = $1 AND ur.is_active = TRUE AND r.is_active = TRUE",
    )
    .bind(user_id)
    .fetch_all(&mut **tx)
    .await?;

    let ranked: Vec<RankedRole> = rows
        .into_iter()
        .map(|(name, priority)| RankedRole::new(name, priority))
        .collect();

    sqlx::query("UPDATE users SET role = $1, updated_at = NOW() WHERE id = $2")
        .bind(primary_role(&ranked))
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[instrument(skip(db))]
pub async fn get_user(db: &PgPool, user_id: UserId) -> Result<UserWithRoles, AppError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(Message::UserNotFound))?;

    with_roles(db, vec![user])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found(Message::UserNotFound))
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, params: &'a UserFilterParams) {
    builder.push(" WHERE 1=1");
    if let Some(is_active) = params.is_active {
        builder.push(" AND is_active = ").push_bind(is_active);
    }
    if let Some(search) = params.search.as_deref() {
        let pattern = format!("%{}%", search.trim());
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[instrument(skip(db))]
pub async fn get_users(
    db: &PgPool,
    params: UserFilterParams,
) -> Result<PaginatedUsersResponse, AppError> {
    let limit = params.pagination.limit();
    let offset = params.pagination.offset();

    let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM users");
    push_filters(&mut count_query, &params);
    let total: i64 = count_query.build_query_scalar().fetch_one(db).await?;

    let mut query = QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users"));
    push_filters(&mut query, &params);
    query
        .push(" ORDER BY created_at DESC, id LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    let users: Vec<User> = query.build_query_as().fetch_all(db).await?;

    let data = with_roles(db, users).await?;
    let meta = PaginationMeta::new(&params.pagination, total, data.len());

    Ok(PaginatedUsersResponse { data, meta })
}

/// Creates a user with a hashed password and, optionally, an initial set of
/// active role assignments.
#[instrument(skip(db, dto), fields(user.email = %dto.email))]
pub async fn create_user(
    db: &PgPool,
    dto: CreateUserDto,
    created_by: UserId,
) -> Result<UserWithRoles, AppError> {
    let hashed = hash_password(&dto.password)?;

    let mut tx = db.begin().await?;

    let user_id: UserId = sqlx::query_scalar(
        "INSERT INTO users (email, name, password, is_active)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(&dto.email)
    .bind(dto.name.trim())
    .bind(&hashed)
    .bind(dto.is_active.unwrap_or(true))
    .fetch_one(&mut *tx)
    .await
    .map_err(map_email_conflict)?;

    if !dto.role_ids.is_empty() {
        let mut role_ids = dto.role_ids.clone();
        role_ids.sort();
        role_ids.dedup();
        ensure_roles_exist(&mut tx, &role_ids).await?;
        upsert_assignments(&mut tx, user_id, &role_ids, created_by).await?;
        sync_role_label(&mut tx, user_id).await?;
    }

    tx.commit().await?;

    info!(user.id = %user_id, "User created");
    get_user(db, user_id).await
}

#[instrument(skip(db, dto))]
pub async fn update_user(
    db: &PgPool,
    user_id: UserId,
    dto: UpdateUserDto,
) -> Result<UserWithRoles, AppError> {
    let updated = sqlx::query(
        "UPDATE users
         SET name = COALESCE($1, name),
             email = COALESCE($2, email),
             updated_at = NOW()
         WHERE id = $3",
    )
    .bind(dto.name.as_deref().map(str::trim))
    .bind(&dto.email)
    .bind(user_id)
    .execute(db)
    .await
    .map_err(map_email_conflict)?
    .rows_affected();

    if updated == 0 {
        return Err(AppError::not_found(Message::UserNotFound));
    }

    get_user(db, user_id).await
}

/// Deactivated users cannot log in and existing sessions stop authenticating on
/// their next request.
#[instrument(skip(db))]
pub async fn set_user_active(
    db: &PgPool,
    user_id: UserId,
    is_active: bool,
    acting_user: UserId,
) -> Result<UserWithRoles, AppError> {
    if !is_active && user_id == acting_user {
        return Err(AppError::bad_request(Message::CannotDeactivateSelf));
    }

    let updated = sqlx::query("UPDATE users SET is_active = $1, updated_at = NOW() WHERE id = $2")
        .bind(is_active)
        .bind(user_id)
        .execute(db)
        .await?
        .rows_affected();

    if updated == 0 {
        return Err(AppError::not_found(Message::UserNotFound));
    }

    info!(user.id = %user_id, is_active, "User activation changed");
    get_user(db, user_id).await
}

#[instrument(skip(db, new_password))]
pub async fn reset_password(
    db: &PgPool,
    user_id: UserId,
    new_password: &str,
) -> Result<(), AppError> {
    let hashed = hash_password(new_password)?;

    let updated = sqlx::query("UPDATE users SET password = $1, updated_at = NOW() WHERE id = $2")
        .bind(&hashed)
        .bind(user_id)
        .execute(db)
        .await?
        .rows_affected();

    if updated == 0 {
        return Err(AppError::not_found(Message::UserNotFound));
    }

    info!(user.id = %user_id, "Password reset by administrator");
    Ok(())
}

/// Every assignment the user has, active or not.
#[instrument(skip(db))]
pub async fn get_user_roles(db: &PgPool, user_id: UserId) -> Result<Vec<AssignedRole>, AppError> {
    Ok(get_user(db, user_id).await?.roles)
}

/// Makes `role_ids` the user's active role set in one transaction: listed roles
/// are assigned or re-activated, every other assignment is deactivated.
#[instrument(skip(db, role_ids), fields(requested = role_ids.len()))]
pub async fn set_user_roles(
    db: &PgPool,
    user_id: UserId,
    role_ids: &[RoleId],
    assigned_by: UserId,
) -> Result<Vec<AssignedRole>, AppError> {
    let mut wanted = role_ids.to_vec();
    wanted.sort();
    wanted.dedup();

    let mut tx = db.begin().await?;
    lock_user(&mut tx, user_id).await?;
    ensure_roles_exist(&mut tx, &wanted).await?;

    sqlx::query(
        "UPDATE user_roles SET is_active = FALSE, updated_at = NOW()
         WHERE user_id = $1 AND is_active = TRUE AND NOT (role_id = ANY($2))",
    )
    .bind(user_id)
    .bind(&wanted)
    .execute(&mut *tx)
    .await?;

    upsert_assignments(&mut tx, user_id, &wanted, assigned_by).await?;
    sync_role_label(&mut tx, user_id).await?;
    tx.commit().await?;

    info!(user.id = %user_id, roles = wanted.len(), "User role set replaced");
    get_user_roles(db, user_id).await
}

#[instrument(skip(db))]
pub async fn assign_role(
    db: &PgPool,
    user_id: UserId,
    role_id: RoleId,
    assigned_by: UserId,
) -> Result<Vec<AssignedRole>, AppError> {
    let mut tx = db.begin().await?;
    lock_user(&mut tx, user_id).await?;
    ensure_roles_exist(&mut tx, &[role_id]).await?;
    upsert_assignments(&mut tx, user_id, &[role_id], assigned_by).await?;
    sync_role_label(&mut tx, user_id).await?;
    tx.commit().await?;

    info!(user.id = %user_id, role.id = %role_id, "Role assigned");
    get_user_roles(db, user_id).await
}

/// Toggles one assignment. Only that role's grants are affected.
#[instrument(skip(db))]
pub async fn set_assignment_active(
    db: &PgPool,
    user_id: UserId,
    role_id: RoleId,
    is_active: bool,
) -> Result<Vec<AssignedRole>, AppError> {
    let mut tx = db.begin().await?;

    let updated = sqlx::query(
        "UPDATE user_roles SET is_active = $1, updated_at = NOW()
         WHERE user_id = $2 AND role_id = $3",
    )
    .bind(is_active)
    .bind(user_id)
    .bind(role_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(AppError::not_found(Message::RoleNotFound));
    }

    sync_role_label(&mut tx, user_id).await?;
    tx.commit().await?;

    info!(user.id = %user_id, role.id = %role_id, is_active, "Role assignment changed");
    get_user_roles(db, user_id).await
}

/// Revoking keeps the assignment row, deactivated.
pub async fn revoke_role(
    db: &PgPool,
    user_id: UserId,
    role_id: RoleId,
) -> Result<Vec<AssignedRole>, AppError> {
    set_assignment_active(db, user_id, role_id, false).await
}
