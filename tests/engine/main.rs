//! Engine integration tests
//!
//! End-to-end behavior through the public services:
//! - queries: containment, path ranges, relational filters
//! - mutations: patches, tags, order status history
//! - concurrency: optimistic versioning under racing writers
//! - config: `docfield.toml` loading
//! - logs: paging, analytics, retention
//! - seeding: demo data and clearing
//! - scenarios: the documented worked examples

#[path = "../common/mod.rs"]
mod common;

mod concurrency;
mod logs;
mod mutations;
mod queries;
mod scenarios;
mod seeding;
