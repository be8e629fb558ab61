//! Document-field engine
//!
//! This crate ties the lower layers together:
//! - [`Database`]: the four tables (users, products, orders, logs) opened
//!   from an [`EngineConfig`]
//! - [`QueryService`]: containment, path-range and relational searches
//! - [`MutationService`]: versioned read-modify-write on single rows
//! - [`LogService`]: log paging, search, analytics and retention
//! - [`seed`]: demo data
//!
//! Services are cheap to clone and hold only an `Arc<Database>`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod database;
pub mod logs;
pub mod mutation;
pub mod query;
pub mod seed;

pub use database::{
    Database, DatabaseBuilder, EngineConfig, IndexConfig, Table, CONFIG_FILE_NAME,
    MAX_LOG_RETENTION_DAYS,
};
pub use logs::{ErrorAnalytics, HourlyErrorCount, LogPage, LogService, RecentError, ERROR_LEVEL};
pub use mutation::MutationService;
pub use query::{sort_records, Predicate, QueryService, RecordOrder};
pub use seed::{clear_all, seed_demo, SeedSummary};
