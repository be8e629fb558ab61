//! Database builder for injecting stores
//!
//! Tables not given a store explicitly get an in-memory store indexed per
//! the configuration's `[indexes]` table.

use std::sync::Arc;

use docfield_core::{LogEntry, Order, Product, Record, RecordStore, Result, User};
use docfield_storage::MemoryStore;
use tracing::info;

use super::{Database, EngineConfig};

// ============================================================================
// Database Builder Pattern
// ============================================================================

/// Builder for a [`Database`]
///
/// ```ignore
/// use docfield_engine::{Database, EngineConfig};
///
/// // Default in-memory tables
/// let db = Database::open_in_memory()?;
///
/// // Custom order store, default stores for the rest
/// let db = Database::builder(EngineConfig::default())
///     .orders(Arc::new(MyOrderStore::new()))
///     .build()?;
/// ```
pub struct DatabaseBuilder {
    config: EngineConfig,
    users: Option<Arc<dyn RecordStore<User>>>,
    products: Option<Arc<dyn RecordStore<Product>>>,
    orders: Option<Arc<dyn RecordStore<Order>>>,
    logs: Option<Arc<dyn RecordStore<LogEntry>>>,
}

impl DatabaseBuilder {
    /// Builder with no stores set
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            users: None,
            products: None,
            orders: None,
            logs: None,
        }
    }

    /// Use `store` for users
    pub fn users(mut self, store: Arc<dyn RecordStore<User>>) -> Self {
        self.users = Some(store);
        self
    }

    /// Use `store` for products
    pub fn products(mut self, store: Arc<dyn RecordStore<Product>>) -> Self {
        self.products = Some(store);
        self
    }

    /// Use `store` for orders
    pub fn orders(mut self, store: Arc<dyn RecordStore<Order>>) -> Self {
        self.orders = Some(store);
        self
    }

    /// Use `store` for logs
    pub fn logs(mut self, store: Arc<dyn RecordStore<LogEntry>>) -> Self {
        self.logs = Some(store);
        self
    }

    /// Validate the configuration and open the database
    pub fn build(self) -> Result<Arc<Database>> {
        self.config.validate()?;
        let indexes = &self.config.indexes;

        let users = or_memory(self.users, &indexes.users)?;
        let products = or_memory(self.products, &indexes.products)?;
        let orders = or_memory(self.orders, &indexes.orders)?;
        let logs = or_memory(self.logs, &indexes.logs)?;

        info!(
            target: "docfield::db",
            user_indexes = ?indexes.users,
            product_indexes = ?indexes.products,
            order_indexes = ?indexes.orders,
            log_indexes = ?indexes.logs,
            "Database opened"
        );
        Ok(Arc::new(Database::from_parts(
            self.config,
            users,
            products,
            orders,
            logs,
        )))
    }
}

fn or_memory<R: Record>(
    store: Option<Arc<dyn RecordStore<R>>>,
    indexed: &[String],
) -> Result<Arc<dyn RecordStore<R>>> {
    match store {
        Some(store) => Ok(store),
        None => Ok(Arc::new(MemoryStore::<R>::with_indexed_columns(indexed)?)),
    }
}
