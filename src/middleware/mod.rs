//! Request extractors for authentication and authorization.
//!
//! # Flow
//!
//! 1. Client sends the `auth-token` cookie or `Authorization: Bearer <token>`
//! 2. [`AuthUser`](auth::AuthUser) verifies the token and that the account is active
//! 3. A `RequireXxx` extractor resolves the caller's permissions from the database and
//!    checks the `(module, action)` it was declared with
//! 4. The handler runs only if every check passed
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::{AuthUser, RequireSuppliersCreate};
//!
//! // Any authenticated user
//! async fn me(auth_user: AuthUser) -> impl IntoResponse { /* ... */ }
//!
//! // Requires suppliers.create
//! async fn create_supplier(
//!     RequireSuppliersCreate(auth_user): RequireSuppliersCreate,
//! ) -> impl IntoResponse { /* ... */ }
//! ```

pub mod auth;
