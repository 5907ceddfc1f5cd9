//! SQLite backend for the Cestas registry.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. One [`SqliteStore`] is one connection;
//! [`SqliteConnector`] opens a fresh one per request.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use schema::quote_identifier;
pub use store::{DatabaseConfig, SqliteConnector, SqliteStore};
