use masnaa_core::hash_password;
use masnaa_models::{Email, UserId};
use sqlx::PgPool;
use tracing::info;

use super::SeedError;

#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Creates an active user holding the `admin` role.
///
/// Runs [`seed_rbac`](super::seed_rbac) first so the role exists on a fresh database.
pub async fn create_admin(db: &PgPool, account: &AdminAccount) -> Result<UserId, SeedError> {
    let email = Email::new(&account.email).map_err(|e| SeedError::InvalidInput(e.to_string()))?;
    if account.name.trim().is_empty() {
        return Err(SeedError::InvalidInput("name must not be empty".into()));
    }
    if account.password.len() < 8 {
        return Err(SeedError::InvalidInput(
            "password must be at least 8 characters".into(),
        ));
    }

    super::seed_rbac(db).await?;

    let hashed = hash_password(&account.password)
        .map_err(|e| SeedError::InvalidInput(format!("failed to hash password: {}", e.error)))?;

    let mut tx = db.begin().await?;

    let user_id: Option<UserId> = sqlx::query_scalar(
        "INSERT INTO users (email, name, password, role)
         VALUES ($1, $2, $3, 'admin')
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(&email)
    .bind(account.name.trim())
    .bind(&hashed)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(user_id) = user_id else {
        return Err(SeedError::UserExists(email.into_inner()));
    };

    sqlx::query(
        "INSERT INTO user_roles (user_id, role_id)
         SELECT $1, id FROM roles WHERE name = 'admin'
         ON CONFLICT (user_id, role_id) DO UPDATE SET is_active = TRUE, updated_at = NOW()",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(%user_id, email = %email, "Admin account created");
    Ok(user_id)
}
