pub use masnaa_models::permissions::{
    ActionInfo, CatalogResponse, ModuleInfo, MyPermissionsResponse, PermissionCheckParams,
    PermissionCheckResponse, PermissionPair,
};
