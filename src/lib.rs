//! Macro tracking service: a per-user food catalog, a dated entry ledger,
//! versioned nutrition goals, and the aggregation that ties them together.

pub mod app;
pub mod auth;
pub mod config;
pub mod date;
pub mod entries;
pub mod error;
pub mod foods;
pub mod goals;
pub mod import;
pub mod nutrition;
pub mod state;
pub mod store;
pub mod validate;
