//! User administration and role assignment.
//!
//! Users are never deleted, only deactivated. Each user may hold many roles; every
//! assignment carries its own `is_active` flag so a single role can be suspended
//! without touching the others.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
