//! Credential check, session issuing and self-service profile endpoints.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
