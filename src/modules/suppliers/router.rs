use axum::{
    Router,
    routing::{get, patch},
};

use crate::state::AppState;

use super::controller::{
    create_supplier, delete_supplier, get_supplier, get_suppliers, set_supplier_active,
    update_supplier,
};

pub fn init_suppliers_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_suppliers).post(create_supplier))
        .route(
            "/{id}",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
        .route("/{id}/status", patch(set_supplier_active))
}
