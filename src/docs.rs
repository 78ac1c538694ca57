use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use masnaa_core::{ErrorResponse, PaginationMeta, PaginationParams};
use masnaa_models::auth::{
    ChangePasswordDto, LoginRequest, LoginResponse, MeResponse, MessageResponse,
};
use masnaa_models::permissions::{
    ActionInfo, CatalogResponse, ModuleInfo, MyPermissionsResponse, PermissionCheckResponse,
    PermissionPair,
};
use masnaa_models::purchase_orders::{
    ClearPurchaseOrdersResponse, CreatePurchaseOrderDto, NextOrderNumberResponse,
    PaginatedPurchaseOrdersResponse, PurchaseOrder, PurchaseOrderDetail, PurchaseOrderItem,
    PurchaseOrderItemDto, PurchaseOrderStatus, PurchaseOrderSummary, UpdatePurchaseOrderDto,
};
use masnaa_models::roles::{
    CreateRoleDto, DeleteRoleResponse, PaginatedRolesResponse, Permission, PermissionRef, Role,
    RoleWithPermissions, SetRolePermissionsDto, UpdateRoleDto,
};
use masnaa_models::suppliers::{
    CreateSupplierDto, PaginatedSuppliersResponse, Supplier, UpdateSupplierDto,
};
use masnaa_models::users::{
    AssignRoleDto, AssignedRole, CreateUserDto, PaginatedUsersResponse, ResetPasswordDto,
    SetActiveDto, SetUserRolesDto, UpdateUserDto, User, UserWithRoles,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::logout_user,
        crate::modules::auth::controller::get_me,
        crate::modules::auth::controller::change_password,
        crate::modules::permissions::controller::get_catalog,
        crate::modules::permissions::controller::get_my_permissions,
        crate::modules::permissions::controller::check_permission,
        crate::modules::roles::controller::get_roles,
        crate::modules::roles::controller::get_role,
        crate::modules::roles::controller::create_role,
        crate::modules::roles::controller::update_role,
        crate::modules::roles::controller::set_role_active,
        crate::modules::roles::controller::set_role_permissions,
        crate::modules::roles::controller::delete_role,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::set_user_active,
        crate::modules::users::controller::reset_password,
        crate::modules::users::controller::get_user_roles,
        crate::modules::users::controller::set_user_roles,
        crate::modules::users::controller::assign_role,
        crate::modules::users::controller::set_assignment_active,
        crate::modules::users::controller::revoke_role,
        crate::modules::suppliers::controller::get_suppliers,
        crate::modules::suppliers::controller::get_supplier,
        crate::modules::suppliers::controller::create_supplier,
        crate::modules::suppliers::controller::update_supplier,
        crate::modules::suppliers::controller::set_supplier_active,
        crate::modules::suppliers::controller::delete_supplier,
        crate::modules::purchase_orders::controller::get_purchase_orders,
        crate::modules::purchase_orders::controller::next_order_number,
        crate::modules::purchase_orders::controller::get_purchase_order,
        crate::modules::purchase_orders::controller::create_purchase_order,
        crate::modules::purchase_orders::controller::update_purchase_order,
        crate::modules::purchase_orders::controller::delete_purchase_order,
        crate::modules::purchase_orders::controller::clear_purchase_orders,
    ),
    components(
        schemas(
            ErrorResponse,
            PaginationMeta,
            PaginationParams,
            LoginRequest,
            LoginResponse,
            MeResponse,
            MessageResponse,
            ChangePasswordDto,
            CatalogResponse,
            ModuleInfo,
            ActionInfo,
            PermissionPair,
            MyPermissionsResponse,
            PermissionCheckResponse,
            Role,
            Permission,
            PermissionRef,
            RoleWithPermissions,
            CreateRoleDto,
            UpdateRoleDto,
            SetRolePermissionsDto,
            DeleteRoleResponse,
            PaginatedRolesResponse,
            User,
            AssignedRole,
            UserWithRoles,
            CreateUserDto,
            UpdateUserDto,
            SetActiveDto,
            ResetPasswordDto,
            SetUserRolesDto,
            AssignRoleDto,
            PaginatedUsersResponse,
            Supplier,
            CreateSupplierDto,
            UpdateSupplierDto,
            PaginatedSuppliersResponse,
            PurchaseOrder,
            PurchaseOrderStatus,
            PurchaseOrderItem,
            PurchaseOrderSummary,
            PurchaseOrderDetail,
            PurchaseOrderItemDto,
            CreatePurchaseOrderDto,
            UpdatePurchaseOrderDto,
            PaginatedPurchaseOrdersResponse,
            NextOrderNumberResponse,
            ClearPurchaseOrdersResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login, logout and the current session"),
        (name = "Permissions", description = "Permission catalog and effective permissions"),
        (name = "Roles", description = "Roles and their permission sets"),
        (name = "Users", description = "User administration"),
        (name = "User Roles", description = "Role assignments per user"),
        (name = "Suppliers", description = "Supplier management"),
        (name = "Purchase Orders", description = "Purchase orders and order numbering")
    ),
    info(
        title = "Masnaa API",
        version = "0.1.0",
        description = "Factory ERP back end: role-based access control, suppliers and purchase orders. Error bodies carry Arabic (`error`) and English (`error_en`) messages.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_module() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/api/auth/login",
            "/api/permissions/catalog",
            "/api/roles/{id}/permissions",
            "/api/users/{id}/roles/{role_id}",
            "/api/suppliers/{id}/status",
            "/api/purchase-orders/next-number",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        for schema in ["CatalogResponse", "PurchaseOrderItemDto", "ErrorResponse"] {
            assert!(components.schemas.contains_key(schema), "missing {schema}");
        }
    }
}
