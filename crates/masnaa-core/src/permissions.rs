//! Permission catalog and permission-map evaluation.
//!
//! A permission is a `(module, action)` pair. The catalog below is the complete set of
//! pairs the system recognizes; the seeder writes it to the `permissions` table and
//! role edits are validated against it.
//!
//! Two action vocabularies exist. The persisted one ([`Action`]) is what roles hold.
//! The client-facing one (`view`, `edit`, `print`, `create`, `delete`, `duplicate`,
//! `approve`) is only translated at the edge via [`translate_action`]; it never
//! reaches the database.
//!
//! # Example
//!
//! ```ignore
//! use masnaa_core::permissions::{Action, Module, PermissionMap, check_permission};
//!
//! let mut map = PermissionMap::default();
//! map.grant(Module::Suppliers, Action::Update);
//!
//! assert!(check_permission(&map, "suppliers", "edit"));
//! assert!(!check_permission(&map, "suppliers", "delete"));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Functional area a permission is scoped to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Users,
    Roles,
    Suppliers,
    PurchaseOrders,
    Reports,
    Settings,
    Content,
}

/// Persisted action vocabulary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Export,
}

const CRUD_EXPORT: &[Action] = &[
    Action::Create,
    Action::Read,
    Action::Update,
    Action::Delete,
    Action::Export,
];
const CRUD: &[Action] = &[Action::Create, Action::Read, Action::Update, Action::Delete];

impl Module {
    pub const ALL: [Module; 7] = [
        Module::Users,
        Module::Roles,
        Module::Suppliers,
        Module::PurchaseOrders,
        Module::Reports,
        Module::Settings,
        Module::Content,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Roles => "roles",
            Self::Suppliers => "suppliers",
            Self::PurchaseOrders => "purchase_orders",
            Self::Reports => "reports",
            Self::Settings => "settings",
            Self::Content => "content",
        }
    }

    pub fn label_en(&self) -> &'static str {
        match self {
            Self::Users => "Users",
            Self::Roles => "Roles",
            Self::Suppliers => "Suppliers",
            Self::PurchaseOrders => "Purchase Orders",
            Self::Reports => "Reports",
            Self::Settings => "Settings",
            Self::Content => "Content",
        }
    }

    pub fn label_ar(&self) -> &'static str {
        match self {
            Self::Users => "المستخدمين",
            Self::Roles => "الأدوار",
            Self::Suppliers => "الموردين",
            Self::PurchaseOrders => "أوامر الشراء",
            Self::Reports => "التقارير",
            Self::Settings => "الإعدادات",
            Self::Content => "المحتوى",
        }
    }

    /// Actions this module supports.
    pub fn actions(&self) -> &'static [Action] {
        match self {
            Self::Users | Self::Suppliers | Self::PurchaseOrders | Self::Content => CRUD_EXPORT,
            Self::Roles => CRUD,
            Self::Reports => &[Action::Read, Action::Export],
            Self::Settings => &[Action::Read, Action::Update],
        }
    }

    pub fn supports(&self, action: Action) -> bool {
        self.actions().contains(&action)
    }
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::Export,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Export => "export",
        }
    }

    pub fn label_en(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Read => "View",
            Self::Update => "Edit",
            Self::Delete => "Delete",
            Self::Export => "Print / Export",
        }
    }

    pub fn label_ar(&self) -> &'static str {
        match self {
            Self::Create => "إنشاء",
            Self::Read => "عرض",
            Self::Update => "تعديل",
            Self::Delete => "حذف",
            Self::Export => "طباعة / تصدير",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not part of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownName {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for Module {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Module::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownName {
                kind: "module",
                value: s.to_string(),
            })
    }
}

impl FromStr for Action {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownName {
                kind: "action",
                value: s.to_string(),
            })
    }
}

/// One catalog entry with its labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CatalogEntry {
    pub module: Module,
    pub action: Action,
    pub label_en: String,
    pub label_ar: String,
}

impl CatalogEntry {
    fn new(module: Module, action: Action) -> Self {
        Self {
            module,
            action,
            label_en: format!("{} {}", action.label_en(), module.label_en()),
            label_ar: format!("{} {}", action.label_ar(), module.label_ar()),
        }
    }
}

/// Every `(module, action)` pair the system recognizes, in catalog order.
pub fn catalog() -> Vec<CatalogEntry> {
    Module::ALL
        .iter()
        .flat_map(|module| {
            module
                .actions()
                .iter()
                .map(move |action| CatalogEntry::new(*module, *action))
        })
        .collect()
}

pub fn is_catalogued(module: Module, action: Action) -> bool {
    module.supports(action)
}

/// Translates a client-facing action name to the persisted vocabulary.
///
/// `duplicate` and `approve` have no persisted counterpart and, like any unknown
/// name, translate to `None`, which callers must treat as a denial. Persisted names
/// pass through unchanged.
pub fn translate_action(client_action: &str) -> Option<Action> {
    match client_action {
        "view" | "read" => Some(Action::Read),
        "edit" | "update" => Some(Action::Update),
        "print" | "export" => Some(Action::Export),
        "create" => Some(Action::Create),
        "delete" => Some(Action::Delete),
        _ => None,
    }
}

/// A role's contribution to a user's effective permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    pub role_active: bool,
    pub assignment_active: bool,
    pub permissions: Vec<(Module, Action)>,
}

/// Effective permissions of a user: `module -> {actions}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMap(BTreeMap<Module, BTreeSet<Action>>);

impl PermissionMap {
    /// Union of the permissions held by roles whose assignment and role are both active.
    pub fn from_role_grants<I>(grants: I) -> Self
    where
        I: IntoIterator<Item = RoleGrant>,
    {
        let mut map = Self::default();
        for grant in grants {
            if !(grant.role_active && grant.assignment_active) {
                continue;
            }
            for (module, action) in grant.permissions {
                map.grant(module, action);
            }
        }
        map
    }

    pub fn grant(&mut self, module: Module, action: Action) {
        self.0.entry(module).or_default().insert(action);
    }

    pub fn allows(&self, module: Module, action: Action) -> bool {
        self.0
            .get(&module)
            .is_some_and(|actions| actions.contains(&action))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct `(module, action)` pairs.
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (Module, Action)> + '_ {
        self.0
            .iter()
            .flat_map(|(module, actions)| actions.iter().map(move |action| (*module, *action)))
    }

    /// Actions grouped under their module name.
    pub fn grouped(&self) -> BTreeMap<String, Vec<Action>> {
        self.0
            .iter()
            .map(|(module, actions)| (module.as_str().to_string(), actions.iter().copied().collect()))
            .collect()
    }
}

/// Deny-by-default check that accepts client-facing module and action names.
pub fn check_permission(map: &PermissionMap, module: &str, client_action: &str) -> bool {
    let Ok(module) = module.parse::<Module>() else {
        return false;
    };
    let Some(action) = translate_action(client_action) else {
        return false;
    };
    map.allows(module, action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(perms: &[(Module, Action)]) -> RoleGrant {
        RoleGrant {
            role_active: true,
            assignment_active: true,
            permissions: perms.to_vec(),
        }
    }

    #[test]
    fn test_translation_table() {
        assert_eq!(translate_action("view"), Some(Action::Read));
        assert_eq!(translate_action("edit"), Some(Action::Update));
        assert_eq!(translate_action("print"), Some(Action::Export));
        assert_eq!(translate_action("create"), Some(Action::Create));
        assert_eq!(translate_action("delete"), Some(Action::Delete));
        assert_eq!(translate_action("duplicate"), None);
        assert_eq!(translate_action("approve"), None);
    }

    #[test]
    fn test_translation_unknown_denies() {
        assert_eq!(translate_action(""), None);
        assert_eq!(translate_action("VIEW"), None);
        assert_eq!(translate_action("drop table"), None);
    }

    #[test]
    fn test_catalog_pairs_are_unique() {
        let entries = catalog();
        let unique: BTreeSet<(Module, Action)> =
            entries.iter().map(|e| (e.module, e.action)).collect();
        assert_eq!(unique.len(), entries.len());
        assert!(entries.iter().all(|e| is_catalogued(e.module, e.action)));
    }

    #[test]
    fn test_catalog_labels() {
        let entry = catalog()
            .into_iter()
            .find(|e| e.module == Module::Suppliers && e.action == Action::Create)
            .unwrap();
        assert_eq!(entry.label_en, "Create Suppliers");
        assert_eq!(entry.label_ar, "إنشاء الموردين");
    }

    #[test]
    fn test_module_round_trip_names() {
        for module in Module::ALL {
            assert_eq!(module.as_str().parse::<Module>().unwrap(), module);
        }
        assert!("inventory".parse::<Module>().is_err());
    }

    #[test]
    fn test_union_collapses_duplicates() {
        let map = PermissionMap::from_role_grants([
            grant(&[(Module::Suppliers, Action::Read), (Module::Suppliers, Action::Update)]),
            grant(&[(Module::Suppliers, Action::Read), (Module::Reports, Action::Export)]),
        ]);
        assert_eq!(map.len(), 3);
        assert!(map.allows(Module::Suppliers, Action::Read));
        assert!(map.allows(Module::Suppliers, Action::Update));
        assert!(map.allows(Module::Reports, Action::Export));
    }

    #[test]
    fn test_inactive_assignment_or_role_grants_nothing() {
        let mut revoked = grant(&[(Module::Users, Action::Delete)]);
        revoked.assignment_active = false;
        let mut disabled = grant(&[(Module::Roles, Action::Update)]);
        disabled.role_active = false;
        let kept = grant(&[(Module::Users, Action::Read)]);

        let map = PermissionMap::from_role_grants([revoked, disabled, kept]);
        assert!(!map.allows(Module::Users, Action::Delete));
        assert!(!map.allows(Module::Roles, Action::Update));
        assert!(map.allows(Module::Users, Action::Read));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_deactivating_one_role_keeps_shared_grants_from_others() {
        let editor = grant(&[(Module::Content, Action::Update), (Module::Content, Action::Read)]);
        let viewer = grant(&[(Module::Content, Action::Read)]);
        let mut editor_revoked = editor.clone();
        editor_revoked.assignment_active = false;

        let before = PermissionMap::from_role_grants([editor, viewer.clone()]);
        let after = PermissionMap::from_role_grants([editor_revoked, viewer]);

        assert!(before.allows(Module::Content, Action::Update));
        assert!(!after.allows(Module::Content, Action::Update));
        assert!(after.allows(Module::Content, Action::Read));
    }

    #[test]
    fn test_role_without_links_grants_nothing() {
        let map = PermissionMap::from_role_grants([grant(&[])]);
        assert!(map.is_empty());
    }

    #[test]
    fn test_check_permission_uses_client_vocabulary() {
        let map = PermissionMap::from_role_grants([grant(&[(Module::Content, Action::Update)])]);
        assert!(check_permission(&map, "content", "update"));
        assert!(check_permission(&map, "content", "edit"));
        assert!(!check_permission(&map, "content", "delete"));
        assert!(!check_permission(&map, "content", "approve"));
        assert!(!check_permission(&map, "warehouse", "edit"));
    }

    #[test]
    fn test_grouped_and_serialized_shape() {
        let map = PermissionMap::from_role_grants([grant(&[
            (Module::PurchaseOrders, Action::Read),
            (Module::PurchaseOrders, Action::Create),
        ])]);
        let grouped = map.grouped();
        assert_eq!(
            grouped.get("purchase_orders"),
            Some(&vec![Action::Create, Action::Read])
        );

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["purchase_orders"], serde_json::json!(["create", "read"]));
    }
}
