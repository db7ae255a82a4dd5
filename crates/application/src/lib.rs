//! Application layer for the POS catalog.
//!
//! Hosts the `UpdateProduct` use case, which applies a partial update to a
//! product and keeps its brew recipes in sync through the repository ports:
//! 1. Load the hydrated product
//! 2. Apply scalar fields and resolve referenced entities
//! 3. Reconcile brew recipes and write creates, updates and deletes
//! 4. Save the product root
//!
//! The whole invocation runs under a single deadline.

pub mod error;
pub mod params;
pub mod update_product;

pub use error::{InvalidParam, UpdateProductError};
pub use params::{CoffeeBrewParams, ProductParams};
pub use update_product::{CatalogPorts, DEFAULT_UPDATE_TIMEOUT, UpdateProduct};
