//! Shared helpers for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's
//! main.rs.

#![allow(dead_code)]

use docfield::{
    seed_demo, Database, EngineConfig, IndexConfig, LogService, MutationService, Product,
    QueryService,
};
use std::sync::{Arc, Once};

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Install a test subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to warnings only.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Fixtures
// ============================================================================

/// Database plus one of each service
pub struct TestDb {
    pub db: Arc<Database>,
    pub queries: QueryService,
    pub mutations: MutationService,
    pub logs: LogService,
}

impl TestDb {
    /// Empty database with default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Empty database with no containment indices
    pub fn unindexed() -> Self {
        Self::with_config(EngineConfig {
            indexes: IndexConfig::none(),
            ..EngineConfig::default()
        })
    }

    pub fn with_config(config: EngineConfig) -> Self {
        init_tracing();
        Self::from_db(Database::open(config).expect("open database"))
    }

    pub fn from_db(db: Arc<Database>) -> Self {
        init_tracing();
        TestDb {
            queries: QueryService::new(db.clone()),
            mutations: MutationService::new(db.clone()),
            logs: LogService::new(db.clone()),
            db,
        }
    }

    /// Database holding the demo rows
    pub fn seeded() -> Self {
        let t = Self::new();
        seed_demo(&t.db).expect("seed demo data");
        t
    }

    /// Seeded product by exact name
    pub fn product_named(&self, name: &str) -> Product {
        self.queries
            .list::<Product>()
            .expect("list products")
            .into_iter()
            .find(|p| p.name == name)
            .unwrap_or_else(|| panic!("no product named {name}"))
    }
}

pub const MACBOOK: &str = "MacBook Pro 16\"";
pub const HEADPHONES: &str = "Sony WH-1000XM5";
pub const GALAXY: &str = "Samsung Galaxy S23 Ultra";
