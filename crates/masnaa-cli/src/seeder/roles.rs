//! Default roles and their permission sets.

use masnaa_core::permissions::Action::{Create, Delete, Export, Read, Update};
use masnaa_core::permissions::{Action, Module, catalog};
use sqlx::{Postgres, Transaction};
use tracing::{debug, info};

use super::history;

/// Bump when a definition in [`DEFAULT_ROLES`] changes.
pub const ROLES_SEED_VERSION: i32 = 1;
const ROLES_SEED_NAME: &str = "default_roles";

pub struct DefaultRole {
    pub name: &'static str,
    pub description: &'static str,
    pub priority: i32,
    /// `None` grants the whole catalog.
    pub grants: Option<&'static [(Module, &'static [Action])]>,
}

const FULL: &[Action] = &[Create, Read, Update, Delete, Export];

pub const DEFAULT_ROLES: &[DefaultRole] = &[
    DefaultRole {
        name: "admin",
        description: "Full access to every module",
        priority: 100,
        grants: None,
    },
    DefaultRole {
        name: "manager",
        description: "Runs purchasing and suppliers; read access to administration",
        priority: 80,
        grants: Some(&[
            (Module::Suppliers, FULL),
            (Module::PurchaseOrders, FULL),
            (Module::Content, FULL),
            (Module::Reports, &[Read, Export]),
            (Module::Users, &[Read]),
            (Module::Roles, &[Read]),
            (Module::Settings, &[Read]),
        ]),
    },
    DefaultRole {
        name: "purchasing",
        description: "Creates and maintains purchase orders and suppliers",
        priority: 60,
        grants: Some(&[
            (Module::Suppliers, &[Create, Read, Update, Export]),
            (Module::PurchaseOrders, &[Create, Read, Update, Export]),
            (Module::Reports, &[Read]),
        ]),
    },
    DefaultRole {
        name: "warehouse",
        description: "Receives goods against purchase orders",
        priority: 40,
        grants: Some(&[
            (Module::PurchaseOrders, &[Read, Update]),
            (Module::Suppliers, &[Read]),
        ]),
    },
    DefaultRole {
        name: "accountant",
        description: "Reviews and exports purchasing records",
        priority: 30,
        grants: Some(&[
            (Module::PurchaseOrders, &[Read, Export]),
            (Module::Suppliers, &[Read, Export]),
            (Module::Reports, &[Read, Export]),
        ]),
    },
    DefaultRole {
        name: "viewer",
        description: "Read-only access",
        priority: 10,
        grants: Some(&[
            (Module::Suppliers, &[Read]),
            (Module::PurchaseOrders, &[Read]),
            (Module::Reports, &[Read]),
            (Module::Content, &[Read]),
        ]),
    },
];

impl DefaultRole {
    /// Flattened `(module, action)` pairs, restricted to what the catalog supports.
    pub fn permissions(&self) -> Vec<(Module, Action)> {
        match self.grants {
            None => catalog().into_iter().map(|e| (e.module, e.action)).collect(),
            Some(grants) => grants
                .iter()
                .flat_map(|(module, actions)| actions.iter().map(move |a| (*module, *a)))
                .filter(|(module, action)| module.supports(*action))
                .collect(),
        }
    }
}

async fn upsert_role(
    tx: &mut Transaction<'_, Postgres>,
    role: &DefaultRole,
) -> Result<uuid::Uuid, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO roles (name, description, priority)
         VALUES ($1, $2, $3)
         ON CONFLICT (name)
         DO UPDATE SET description = EXCLUDED.description,
                       priority = EXCLUDED.priority,
                       updated_at = NOW()
         RETURNING id",
    )
    .bind(role.name)
    .bind(role.description)
    .bind(role.priority)
    .fetch_one(&mut **tx)
    .await
}

async fn link_permissions(
    tx: &mut Transaction<'_, Postgres>,
    role_id: uuid::Uuid,
    pairs: &[(Module, Action)],
) -> Result<u64, sqlx::Error> {
    let modules: Vec<&str> = pairs.iter().map(|(m, _)| m.as_str()).collect();
    let actions: Vec<&str> = pairs.iter().map(|(_, a)| a.as_str()).collect();

    let result = sqlx::query(
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
    .await?;

    Ok(result.rows_affected())
}

/// Installs the default roles.
///
/// When the recorded version is current, only the admin role is touched: it is
/// topped up with any catalog entries added since. Otherwise every default role is
/// upserted and its permission set replaced with the definition above. Roles the
/// operator created are never modified.
///
/// Returns whether the full definitions were applied.
pub async fn seed_default_roles(tx: &mut Transaction<'_, Postgres>) -> Result<bool, sqlx::Error> {
    let applied = history::applied_version(tx, ROLES_SEED_NAME).await?;
    let up_to_date = applied.is_some_and(|v| v >= ROLES_SEED_VERSION);

    if up_to_date {
        if let Some(admin) = DEFAULT_ROLES.iter().find(|r| r.grants.is_none()) {
            let admin_id: Option<uuid::Uuid> =
                sqlx::query_scalar("SELECT id FROM roles WHERE name = $1")
                    .bind(admin.name)
                    .fetch_optional(&mut **tx)
                    .await?;
            if let Some(admin_id) = admin_id {
                let added = link_permissions(tx, admin_id, &admin.permissions()).await?;
                debug!(added, "Admin role topped up with catalog permissions");
            }
        }
        return Ok(false);
    }

    for role in DEFAULT_ROLES {
        let role_id = upsert_role(tx, role).await?;
        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut **tx)
            .await?;
        let linked = link_permissions(tx, role_id, &role.permissions()).await?;
        debug!(role = role.name, linked, "Default role applied");
    }

    history::record(tx, ROLES_SEED_NAME, ROLES_SEED_VERSION).await?;
    info!(
        version = ROLES_SEED_VERSION,
        previous = ?applied,
        "Default roles applied"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_holds_whole_catalog() {
        let admin = &DEFAULT_ROLES[0];
        assert_eq!(admin.name, "admin");
        assert_eq!(admin.permissions().len(), catalog().len());
    }

    #[test]
    fn test_priorities_follow_precedence() {
        let priorities: Vec<i32> = DEFAULT_ROLES.iter().map(|r| r.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(priorities, sorted);
    }

    #[test]
    fn test_default_grants_are_catalogued() {
        for role in DEFAULT_ROLES {
            for (module, action) in role.permissions() {
                assert!(module.supports(action), "{} grants {module}.{action}", role.name);
            }
        }
    }

    #[test]
    fn test_viewer_is_read_only() {
        let viewer = DEFAULT_ROLES.iter().find(|r| r.name == "viewer").unwrap();
        assert!(viewer.permissions().iter().all(|(_, a)| *a == Action::Read));
    }
}
