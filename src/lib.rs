//! docfield - document-field query and partial-mutation engine
//!
//! Relational rows (users, products, orders, logs) carry semi-structured
//! document columns. docfield searches them by containment and by nested
//! path ranges, and updates them with narrow named patches under
//! optimistic versioning.
//!
//! # Quick Start
//!
//! ```ignore
//! use docfield::{Database, MutationService, QueryService, seed_demo};
//! use serde_json::json;
//!
//! let db = Database::open_in_memory()?;
//! seed_demo(&db)?;
//!
//! let queries = QueryService::new(db.clone());
//! let laptops = queries.products_by_specification("cpu", "Apple M2 Max")?;
//!
//! let mutations = MutationService::new(db.clone());
//! let product = mutations.add_tag(laptops[0].id, "gaming")?;
//! ```
//!
//! # Architecture
//!
//! - `docfield-core`: document values, containment, paths, patches, record
//!   kinds and the `RecordStore` trait
//! - `docfield-storage`: the in-memory versioned store with containment
//!   indices
//! - `docfield-engine`: database handle, services and configuration

pub use docfield_core::*;
pub use docfield_engine::*;
pub use docfield_storage::MemoryStore;
