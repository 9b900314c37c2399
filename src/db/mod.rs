//! Database module
//!
//! SQLite store for schools, published meals and the food catalog.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};
