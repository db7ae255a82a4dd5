//! Adapters implementing the domain's repository and query ports.
//!
//! - [`InMemoryCatalogStore`]: process-local storage for tests and local runs
//! - [`PostgresCatalogStore`]: sqlx-backed storage

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::{Result, StoreError};
pub use memory::{InMemoryCatalogStore, WriteOp};
pub use postgres::PostgresCatalogStore;
