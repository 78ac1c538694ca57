use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    clear_purchase_orders, create_purchase_order, delete_purchase_order, get_purchase_order,
    get_purchase_orders, next_order_number, update_purchase_order,
};

pub fn init_purchase_orders_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(get_purchase_orders)
                .post(create_purchase_order)
                .delete(clear_purchase_orders),
        )
        .route("/next-number", get(next_order_number))
        .route(
            "/{id}",
            get(get_purchase_order)
                .put(update_purchase_order)
                .delete(delete_purchase_order),
        )
}
