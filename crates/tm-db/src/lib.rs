//! tm-db - Database abstraction layer for Tidemark
//!
//! This crate provides the synchronous `Database` trait the migration engine
//! executes statements through, and its DuckDB implementation.

pub mod duckdb;
pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Database;
