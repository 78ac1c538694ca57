pub mod auth;
pub mod permissions;
pub mod purchase_orders;
pub mod roles;
pub mod suppliers;
pub mod users;
