//! # Masnaa Core
//!
//! Foundational types shared by every Masnaa crate:
//!
//! - [`errors`]: `AppError` with localized JSON responses
//! - [`i18n`]: Arabic/English user-facing messages
//! - [`permissions`]: the `(module, action)` catalog and permission-map evaluation
//! - [`pagination`]: list pagination parameters and metadata
//! - [`password`]: bcrypt hashing and verification
//! - [`serde`]: query-string deserialization helpers

pub mod errors;
pub mod i18n;
pub mod pagination;
pub mod password;
pub mod permissions;
pub mod serde;

pub use errors::{AppError, Detailed, ErrorResponse};
pub use i18n::Message;
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_against_dummy, verify_password};
pub use permissions::{Action, Module, PermissionMap, RoleGrant, check_permission};
