//! Relational storage - connection pool and repositories
//!
//! # Design Principles
//!
//! - Injected `PgPool`, no process-wide handles
//! - Counters adjusted storage-side - no read-then-write
//! - Edge mutations and their counter deltas share one transaction
//! - Absent rows are `Ok(None)`, never errors

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::create_pool;
pub use repos::*;
