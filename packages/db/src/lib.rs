//! SurrealDB integration for the mail-delivery job system.
//!
//! This crate provides database connectivity and the repository for
//! persisting job records.
//!
//! # Features
//!
//! - `memory` (default): in-memory storage for development and tests
//! - `rocksdb`: RocksDB for persistent file-based storage

mod connection;
mod schema;
pub mod repositories;

pub use connection::{Database, DbConfig, DbError, get_db, init_db};
pub use schema::init_schema;

/// Initialize the database with the given configuration.
///
/// This should be called once at application startup.
pub async fn init(config: DbConfig) -> Result<(), DbError> {
    init_db(config).await?;
    init_schema().await?;
    Ok(())
}
