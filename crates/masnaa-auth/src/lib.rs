//! # Masnaa Auth
//!
//! Session tokens for the Masnaa ERP API:
//!
//! - [`claims`]: the JWT payload (`userId`, `email`, `name`, `role`, `roles`)
//! - [`jwt`]: signing and verifying session tokens
//! - [`roles`]: picking the primary role among a user's active roles
//! - [`cookie`]: the `Set-Cookie` values for the session cookie

pub mod claims;
pub mod cookie;
pub mod jwt;
pub mod roles;

pub use claims::SessionClaims;
pub use cookie::{clear_session_cookie, session_cookie};
pub use jwt::{SessionSubject, create_session_token, verify_session_token};
pub use roles::{DEFAULT_ROLE, RankedRole, primary_role, rank_roles};
