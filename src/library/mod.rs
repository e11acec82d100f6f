//! Document library persistence
//!
//! One `SQLite` database holds every imported document with its raw bytes and
//! reading position. The connection pool is opened once at startup and shared
//! by every operation; each operation is a single independent statement.

mod schema;
mod store;

use std::path::Path;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use crate::Result;

pub use schema::SCHEMA_VERSION;
pub use store::{Document, DocumentInfo, DocumentRepo};

/// Library connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

/// Pooled library connection
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Open the library database and run migrations
///
/// # Errors
///
/// Returns error if the database cannot be opened or initialized
pub fn init<P: AsRef<Path>>(path: P) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(path);
    let pool = Pool::builder().max_size(4).build(manager)?;

    let conn = pool.get()?;
    schema::init(&conn)?;

    tracing::info!(version = SCHEMA_VERSION, "library initialized");
    Ok(pool)
}

/// Open an in-memory library (for testing)
///
/// # Errors
///
/// Returns error if the database cannot be initialized
pub fn init_memory() -> Result<DbPool> {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager)?;

    let conn = pool.get()?;
    schema::init(&conn)?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_memory() {
        let pool = init_memory().unwrap();
        let _conn = pool.get().unwrap();
    }
}
