//! # Masnaa Models
//!
//! Domain models and DTOs for the Masnaa ERP API: database rows, request bodies
//! (validated with `validator`), query parameters and response shapes.
//!
//! # Modules
//!
//! - [`ids`]: typed UUID wrappers per entity
//! - [`value_types`]: validated primitives ([`Email`](value_types::Email))
//! - [`auth`]: login, session profile, password change
//! - [`users`]: users and their role assignments
//! - [`roles`]: roles and role-permission links
//! - [`permissions`]: catalog and "my permissions" responses
//! - [`suppliers`]: suppliers
//! - [`purchase_orders`]: purchase orders, items, order numbers

pub mod auth;
pub mod ids;
pub mod permissions;
pub mod purchase_orders;
pub mod roles;
pub mod suppliers;
pub mod users;
pub mod value_types;

pub use auth::{ChangePasswordDto, LoginRequest, LoginResponse, MeResponse, MessageResponse};
pub use ids::{
    PermissionId, PurchaseOrderId, PurchaseOrderItemId, RoleId, SupplierId, UserId, UserRoleId,
};
pub use permissions::{
    CatalogResponse, MyPermissionsResponse, PermissionCheckParams, PermissionCheckResponse,
};
pub use purchase_orders::{
    ClearPurchaseOrdersResponse, CreatePurchaseOrderDto, NextOrderNumberResponse, PurchaseOrder,
    PurchaseOrderDetail, PurchaseOrderFilterParams, PurchaseOrderItem, PurchaseOrderItemDto,
    PurchaseOrderStatus, PurchaseOrderSummary, PaginatedPurchaseOrdersResponse,
    UpdatePurchaseOrderDto, format_order_number,
};
pub use roles::{
    CreateRoleDto, DeleteRoleParams, DeleteRoleResponse, PaginatedRolesResponse, Permission,
    PermissionRef, Role, RoleFilterParams, RoleWithPermissions, SetRolePermissionsDto,
    UpdateRoleDto,
};
pub use suppliers::{
    CreateSupplierDto, PaginatedSuppliersResponse, Supplier, SupplierFilterParams,
    UpdateSupplierDto,
};
pub use users::{
    AssignRoleDto, AssignedRole, CreateUserDto, PaginatedUsersResponse, ResetPasswordDto,
    SetActiveDto, SetUserRolesDto, UpdateUserDto, User, UserFilterParams, UserWithRoles,
};
pub use value_types::Email;
