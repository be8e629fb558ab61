//! Storage layer for docfield
//!
//! This crate implements the reference row store with:
//! - MemoryStore: DashMap-backed table implementing `RecordStore`
//! - Optimistic versioning under a table-level write lock
//! - Secondary indices (containment, unique key)
//! - MessagePack row encoding
//!
//! It is a collaborator for tests and embedding, not a durable storage
//! engine: there is no persistence and no multi-row transaction.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod index;
pub mod memory;

pub use codec::StoredRow;
pub use index::{ContainmentIndex, Term, UniqueIndex};
pub use memory::MemoryStore;
