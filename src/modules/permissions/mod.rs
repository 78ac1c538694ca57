//! Permission catalog, the caller's own permissions, and the resolver used by every
//! permission-checking extractor.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
