//! Purchase orders: header, items, status workflow and `PO-YYYY-MM-NNNN` numbering.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
