//! Idempotent, versioned seeding.
//!
//! [`seed_rbac`] is the single entry point for reference data: it synchronises the
//! permission catalog and installs the default roles. Every step can run any number
//! of times; the default-role definitions carry a version recorded in
//! `seed_history`, so an upgraded definition is re-applied exactly once.

mod admin;
mod catalog;
mod history;
mod roles;
mod suppliers;

use std::time::Instant;

use sqlx::PgPool;
use tracing::info;

pub use admin::{AdminAccount, create_admin};
pub use catalog::sync_catalog;
pub use roles::{DEFAULT_ROLES, DefaultRole, ROLES_SEED_VERSION, seed_default_roles};
pub use suppliers::{clear_purchase_orders, seed_demo_suppliers};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    InvalidInput(String),

    #[error("a user with email {0} already exists")]
    UserExists(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub permissions_synced: usize,
    pub permissions_removed: u64,
    /// Whether the default-role definitions were (re)applied on this run.
    pub roles_applied: bool,
}

/// Synchronises the catalog and default roles in one transaction.
pub async fn seed_rbac(db: &PgPool) -> Result<SeedReport, SeedError> {
    let start_time = Instant::now();
    let mut tx = db.begin().await?;

    let (permissions_synced, permissions_removed) = catalog::sync_catalog(&mut tx).await?;
    let roles_applied = roles::seed_default_roles(&mut tx).await?;

    tx.commit().await?;

    info!(
        permissions_synced,
        permissions_removed,
        roles_applied,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "RBAC seed complete"
    );

    Ok(SeedReport {
        permissions_synced,
        permissions_removed,
        roles_applied,
    })
}
