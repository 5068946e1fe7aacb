//! PostgreSQL storage for the facts table.

pub mod connection;
pub mod database;
pub mod store;
pub mod table;

pub use connection::{ConnectionSettings, Target};
pub use database::{DatabaseState, ensure_database};
pub use store::{FactStore, StoreSettings};
pub use table::FactsTable;
