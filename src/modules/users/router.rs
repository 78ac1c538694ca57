use axum::{
    Router,
    routing::{get, patch, put},
};

use crate::state::AppState;

use super::controller::{
    assign_role, create_user, get_user, get_user_roles, get_users, reset_password, revoke_role,
    set_assignment_active, set_user_active, set_user_roles, update_user,
};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_users).post(create_user))
        .route("/{id}", get(get_user).put(update_user))
        .route("/{id}/status", patch(set_user_active))
        .route("/{id}/password", put(reset_password))
        .route(
            "/{id}/roles",
            get(get_user_roles).put(set_user_roles).post(assign_role),
        )
        .route(
            "/{id}/roles/{role_id}",
            patch(set_assignment_active).delete(revoke_role),
        )
}
