//! Database: the four tables behind one handle
//!
//! A `Database` owns one [`RecordStore`] per entity kind plus the engine
//! configuration. Services borrow it through an `Arc`:
//!
//! ```text
//! let db = Database::open_in_memory()?;
//! let queries = QueryService::new(db.clone());
//! let mutations = MutationService::new(db.clone());
//! ```
//!
//! After [`Database::shutdown`] every table access fails with
//! `StoreUnavailable`.

pub mod builder;
pub mod config;

pub use builder::DatabaseBuilder;
pub use config::{EngineConfig, IndexConfig, CONFIG_FILE_NAME, MAX_LOG_RETENTION_DAYS};

use docfield_core::{Error, LogEntry, Order, Product, Record, RecordStore, Result, User};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Record kinds stored in a [`Database`]
///
/// Selects the table for a record type, so services can be generic over
/// the entity kind.
pub trait Table: Record {
    /// This kind's store in `db`
    fn store(db: &Database) -> &Arc<dyn RecordStore<Self>>;

    /// Check that rows referenced by `row` exist
    fn check_references(_db: &Database, _row: &Self) -> Result<()> {
        Ok(())
    }
}

impl Table for User {
    fn store(db: &Database) -> &Arc<dyn RecordStore<Self>> {
        &db.users
    }
}

impl Table for Product {
    fn store(db: &Database) -> &Arc<dyn RecordStore<Self>> {
        &db.products
    }
}

impl Table for Order {
    fn store(db: &Database) -> &Arc<dyn RecordStore<Self>> {
        &db.orders
    }

    fn check_references(db: &Database, row: &Self) -> Result<()> {
        if db.store::<User>()?.get(row.user_id)?.is_none() {
            return Err(Error::validation(format!(
                "order references missing user {}",
                row.user_id
            )));
        }
        Ok(())
    }
}

impl Table for LogEntry {
    fn store(db: &Database) -> &Arc<dyn RecordStore<Self>> {
        &db.logs
    }
}

/// Handle to the four tables
pub struct Database {
    config: EngineConfig,
    users: Arc<dyn RecordStore<User>>,
    products: Arc<dyn RecordStore<Product>>,
    orders: Arc<dyn RecordStore<Order>>,
    logs: Arc<dyn RecordStore<LogEntry>>,
    open: AtomicBool,
}

impl Database {
    /// In-memory database with the default configuration
    pub fn open_in_memory() -> Result<Arc<Self>> {
        Self::open(EngineConfig::default())
    }

    /// In-memory database with the given configuration
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the configuration is invalid.
    pub fn open(config: EngineConfig) -> Result<Arc<Self>> {
        DatabaseBuilder::new(config).build()
    }

    /// In-memory database configured from `docfield.toml` in `dir`
    ///
    /// The file is created with defaults if it does not exist.
    pub fn open_with_config_dir(dir: &Path) -> Result<Arc<Self>> {
        let config = EngineConfig::load_or_create(dir)?;
        info!(target: "docfield::db", dir = %dir.display(), "Loaded configuration");
        Self::open(config)
    }

    /// Builder for injecting custom stores
    pub fn builder(config: EngineConfig) -> DatabaseBuilder {
        DatabaseBuilder::new(config)
    }

    pub(crate) fn from_parts(
        config: EngineConfig,
        users: Arc<dyn RecordStore<User>>,
        products: Arc<dyn RecordStore<Product>>,
        orders: Arc<dyn RecordStore<Order>>,
        logs: Arc<dyn RecordStore<LogEntry>>,
    ) -> Self {
        Database {
            config,
            users,
            products,
            orders,
            logs,
            open: AtomicBool::new(true),
        }
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Store for `R`
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` after shutdown.
    pub fn store<R: Table>(&self) -> Result<&dyn RecordStore<R>> {
        if !self.is_open() {
            return Err(Error::unavailable(format!(
                "database is shut down; {} unavailable",
                R::KIND.table_name()
            )));
        }
        Ok(&**R::store(self))
    }

    /// Whether the database accepts calls
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Stop accepting calls
    ///
    /// Idempotent. Rows are not persisted anywhere.
    pub fn shutdown(&self) -> Result<()> {
        if self.open.swap(false, Ordering::AcqRel) {
            info!(target: "docfield::db", "Database shut down");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("open", &self.is_open())
            .finish()
    }
}
