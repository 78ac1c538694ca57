pub use masnaa_models::roles::{
    CreateRoleDto, DeleteRoleParams, DeleteRoleResponse, PaginatedRolesResponse, Permission,
    PermissionRef, Role, RoleFilterParams, RoleWithPermissions, SetRolePermissionsDto,
    UpdateRoleDto,
};
pub use masnaa_models::users::SetActiveDto;
