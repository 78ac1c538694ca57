//! Response shapes for the permission catalog and the caller's own permissions.

use std::collections::BTreeMap;

use masnaa_core::permissions::{Action, CatalogEntry, Module, PermissionMap, catalog};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModuleInfo {
    pub key: Module,
    pub label_en: String,
    pub label_ar: String,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActionInfo {
    pub label_en: String,
    pub label_ar: String,
}

/// `GET /api/permissions/catalog`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CatalogResponse {
    pub modules: Vec<ModuleInfo>,
    /// Persisted actions and their labels.
    pub actions: BTreeMap<String, ActionInfo>,
    /// Client vocabulary mapped to persisted actions; `null` means always denied.
    #[serde(rename = "clientActions")]
    #[schema(value_type = Object)]
    pub client_actions: BTreeMap<String, Option<Action>>,
    pub permissions: Vec<CatalogEntry>,
}

/// Client-side action names accepted by the check endpoint.
pub const CLIENT_ACTIONS: [&str; 7] = [
    "view",
    "create",
    "edit",
    "delete",
    "print",
    "duplicate",
    "approve",
];

impl CatalogResponse {
    pub fn build() -> Self {
        let modules = Module::ALL
            .iter()
            .map(|module| ModuleInfo {
                key: *module,
                label_en: module.label_en().to_string(),
                label_ar: module.label_ar().to_string(),
                actions: module.actions().to_vec(),
            })
            .collect();

        let actions = Action::ALL
            .iter()
            .map(|action| {
                (
                    action.as_str().to_string(),
                    ActionInfo {
                        label_en: action.label_en().to_string(),
                        label_ar: action.label_ar().to_string(),
                    },
                )
            })
            .collect();

        let client_actions = CLIENT_ACTIONS
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    masnaa_core::permissions::translate_action(name),
                )
            })
            .collect();

        Self {
            modules,
            actions,
            client_actions,
            permissions: catalog(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PermissionPair {
    pub module: Module,
    pub action: Action,
}

/// `GET /api/permissions/me`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MyPermissionsResponse {
    pub permissions: Vec<PermissionPair>,
    #[serde(rename = "groupedPermissions")]
    pub grouped_permissions: BTreeMap<String, Vec<Action>>,
    /// Active role names, highest privilege first.
    pub roles: Vec<String>,
}

impl MyPermissionsResponse {
    pub fn new(map: &PermissionMap, roles: Vec<String>) -> Self {
        Self {
            permissions: map
                .pairs()
                .map(|(module, action)| PermissionPair { module, action })
                .collect(),
            grouped_permissions: map.grouped(),
            roles,
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PermissionCheckParams {
    /// Module key, e.g. `suppliers`
    pub module: String,
    /// Client or persisted action name, e.g. `view` or `read`
    pub action: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PermissionCheckResponse {
    pub allowed: bool,
}
