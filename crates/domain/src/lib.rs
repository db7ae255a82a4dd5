//! Domain layer for the POS catalog.
//!
//! This crate provides:
//! - Value objects (`ProductName`, `BrewName`, `Money`)
//! - The `Product` aggregate with its type-conditional `ProductKind`
//! - Referenced entities (`ProductCategory`, `CoffeeBean`, `Stock`)
//! - Repository and query ports implemented by the `store` crate
//! - Pure brew recipe reconciliation (`reconcile`)

pub mod catalog;
pub mod error;
pub mod product;
pub mod reconcile;
pub mod repository;

pub use catalog::{CoffeeBean, ProductCategory, Stock};
pub use common::{CoffeeBeanId, CoffeeBrewId, ProductCategoryId, ProductId, StockId};
pub use error::{RepositoryError, RepositoryResult, ValidationError};
pub use product::{
    BrewName, Money, Product, ProductCoffeeBrew, ProductKind, ProductName, ProductType,
};
pub use reconcile::{BrewPlan, CoffeeBrewParams, ReconcileError, reconcile};
pub use repository::{
    CoffeeBeanRepository, ProductCategoryRepository, ProductCoffeeBrewRepository,
    ProductQueryService, ProductRepository, StockRepository,
};
