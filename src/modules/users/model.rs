pub use masnaa_models::users::{
    AssignRoleDto, AssignedRole, CreateUserDto, PaginatedUsersResponse, ResetPasswordDto,
    SetActiveDto, SetUserRolesDto, UpdateUserDto, User, UserFilterParams, UserWithRoles,
};
pub use masnaa_models::auth::MessageResponse;
