use sqlx::{Postgres, Transaction};

/// Version last applied for `name`, if any. Locks the row until commit.
pub async fn applied_version(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT version FROM seed_history WHERE name = $1 FOR UPDATE")
        .bind(name)
        .fetch_optional(&mut **tx)
        .await
}

pub async fn record(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    version: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO seed_history (name, version) VALUES ($1, $2)
         ON CONFLICT (name) DO UPDATE SET version = EXCLUDED.version, applied_at = NOW()",
    )
    .bind(name)
    .bind(version)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
