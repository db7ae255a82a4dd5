//! Persistence and lookup ports.
//!
//! Implementations live in the `store` crate. Every lookup fails with
//! [`RepositoryError::NotFound`] on a missing id and with
//! [`RepositoryError::Persistence`] for anything else. Each call is atomic on
//! its own; nothing here spans several calls.

use async_trait::async_trait;
use common::{CoffeeBeanId, CoffeeBrewId, ProductCategoryId, ProductId, StockId};

use crate::catalog::{CoffeeBean, ProductCategory, Stock};
use crate::error::RepositoryResult;
use crate::product::{Product, ProductCoffeeBrew};

/// Read side: loads a fully hydrated product, brews included.
#[async_trait]
pub trait ProductQueryService: Send + Sync {
    async fn find_by_id(&self, id: ProductId) -> RepositoryResult<Product>;
}

/// Write side of the product aggregate root.
///
/// `save` stores the root's scalar fields and references; brew recipes are
/// written separately through [`ProductCoffeeBrewRepository`].
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: ProductId) -> RepositoryResult<Product>;

    async fn save(&self, product: &Product) -> RepositoryResult<()>;

    async fn delete(&self, id: ProductId) -> RepositoryResult<()>;
}

#[async_trait]
pub trait ProductCategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: ProductCategoryId) -> RepositoryResult<ProductCategory>;

    async fn save(&self, category: &ProductCategory) -> RepositoryResult<()>;

    async fn delete(&self, id: ProductCategoryId) -> RepositoryResult<()>;
}

#[async_trait]
pub trait CoffeeBeanRepository: Send + Sync {
    async fn find_by_id(&self, id: CoffeeBeanId) -> RepositoryResult<CoffeeBean>;

    async fn save(&self, bean: &CoffeeBean) -> RepositoryResult<()>;

    async fn delete(&self, id: CoffeeBeanId) -> RepositoryResult<()>;
}

#[async_trait]
pub trait StockRepository: Send + Sync {
    async fn find_by_id(&self, id: StockId) -> RepositoryResult<Stock>;

    async fn save(&self, stock: &Stock) -> RepositoryResult<()>;

    async fn delete(&self, id: StockId) -> RepositoryResult<()>;
}

/// Brew recipes, keyed by their own id. `save` inserts or replaces.
#[async_trait]
pub trait ProductCoffeeBrewRepository: Send + Sync {
    async fn find_by_id(&self, id: CoffeeBrewId) -> RepositoryResult<ProductCoffeeBrew>;

    /// Brews stored for `product_id` in insertion order, whatever the
    /// product's current type. An unknown product yields an empty list.
    async fn find_by_product(
        &self,
        product_id: ProductId,
    ) -> RepositoryResult<Vec<ProductCoffeeBrew>>;

    async fn save(&self, brew: &ProductCoffeeBrew) -> RepositoryResult<()>;

    async fn delete(&self, id: CoffeeBrewId) -> RepositoryResult<()>;
}
