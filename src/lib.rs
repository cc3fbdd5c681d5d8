pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod migrator;
pub mod rate_limit;
pub mod risk;
pub mod store;
pub mod telemetry;
pub mod validation;

pub use sea_orm;
