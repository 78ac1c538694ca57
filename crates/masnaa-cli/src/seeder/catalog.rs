//! Writes the compiled-in permission catalog to the `permissions` table.

use masnaa_core::permissions::{Action, Module, catalog, is_catalogued};
use sqlx::{Postgres, Transaction};
use tracing::{debug, warn};

/// Upserts every catalog entry (refreshing labels) and deletes rows that are no
/// longer catalogued, which also drops their role links.
///
/// Returns `(entries synced, stale rows removed)`.
pub async fn sync_catalog(tx: &mut Transaction<'_, Postgres>) -> Result<(usize, u64), sqlx::Error> {
    let entries = catalog();

    for entry in &entries {
        sqlx::query(
            "INSERT INTO permissions (module, action, label_en, label_ar)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (module, action)
             DO UPDATE SET label_en = EXCLUDED.label_en,
                           label_ar = EXCLUDED.label_ar,
                           updated_at = NOW()
             WHERE permissions.label_en IS DISTINCT FROM EXCLUDED.label_en
                OR permissions.label_ar IS DISTINCT FROM EXCLUDED.label_ar",
        )
        .bind(entry.module.as_str())
        .bind(entry.action.as_str())
        .bind(&entry.label_en)
        .bind(&entry.label_ar)
        .execute(&mut **tx)
        .await?;
    }

    let existing: Vec<(uuid::Uuid, String, String)> =
        sqlx::query_as("SELECT id, module, action FROM permissions")
            .fetch_all(&mut **tx)
            .await?;

    let stale: Vec<uuid::Uuid> = existing
        .into_iter()
        .filter(|(_, module, action)| {
            match (module.parse::<Module>(), action.parse::<Action>()) {
                (Ok(module), Ok(action)) => !is_catalogued(module, action),
                _ => true,
            }
        })
        .map(|(id, module, action)| {
            warn!(%module, %action, "Removing permission no longer in the catalog");
            id
        })
        .collect();

    let removed = if stale.is_empty() {
        0
    } else {
        sqlx::query("DELETE FROM permissions WHERE id = ANY($1)")
            .bind(&stale)
            .execute(&mut **tx)
            .await?
            .rows_affected()
    };

    debug!(synced = entries.len(), removed, "Permission catalog synchronised");
    Ok((entries.len(), removed))
}
