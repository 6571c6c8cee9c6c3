//! Warehouse storage
//!
//! Tracker events, cookie events and blocklist entries live in a SQL warehouse
//! reached through SeaORM (SQLite, MySQL/MariaDB, PostgreSQL).

pub mod backend;
pub mod models;

pub use backend::{Warehouse, infer_backend_from_url};
pub use models::*;
