use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CoffeeBeanId, CoffeeBrewId, ProductCategoryId, ProductId, StockId};
use domain::{
    CoffeeBean, CoffeeBeanRepository, Money, Product, ProductCategory, ProductCategoryRepository,
    ProductCoffeeBrew, ProductCoffeeBrewRepository, ProductKind, ProductName, ProductQueryService,
    ProductRepository, RepositoryError, RepositoryResult, Stock, StockRepository,
};
use tokio::sync::RwLock;

use crate::StoreError;

/// A write that reached the store, recorded in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    SaveProduct(ProductId),
    DeleteProduct(ProductId),
    SaveCategory(ProductCategoryId),
    DeleteCategory(ProductCategoryId),
    SaveBean(CoffeeBeanId),
    DeleteBean(CoffeeBeanId),
    SaveStock(StockId),
    DeleteStock(StockId),
    SaveBrew(CoffeeBrewId),
    DeleteBrew(CoffeeBrewId),
}

/// A product row: scalar fields plus references by id, as a database stores it.
#[derive(Debug, Clone)]
struct ProductRecord {
    name: ProductName,
    category_id: ProductCategoryId,
    amount: Money,
    coffee_bean_id: Option<CoffeeBeanId>,
    stock_id: Option<StockId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&Product> for ProductRecord {
    fn from(product: &Product) -> Self {
        let (coffee_bean_id, stock_id) = match product.kind() {
            ProductKind::Coffee { bean, .. } => (Some(bean.id()), None),
            ProductKind::Other { stock } => (None, Some(stock.id())),
        };
        Self {
            name: product.name().clone(),
            category_id: product.category().id(),
            amount: product.amount(),
            coffee_bean_id,
            stock_id,
            created_at: product.created_at(),
            updated_at: product.updated_at(),
        }
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    categories: HashMap<ProductCategoryId, ProductCategory>,
    beans: HashMap<CoffeeBeanId, CoffeeBean>,
    stocks: HashMap<StockId, Stock>,
    products: HashMap<ProductId, ProductRecord>,
    /// Kept in insertion order so hydrated products list recipes stably.
    brews: Vec<ProductCoffeeBrew>,
    writes: Vec<WriteOp>,
    /// Brew writes allowed before every further brew write fails.
    brew_write_budget: Option<usize>,
    fail_on_product_save: bool,
    latency: Option<Duration>,
}

impl CatalogState {
    fn hydrate(&self, id: ProductId) -> RepositoryResult<Product> {
        let record = self
            .products
            .get(&id)
            .ok_or_else(|| RepositoryError::not_found("Product", id))?;

        let category = self
            .categories
            .get(&record.category_id)
            .cloned()
            .ok_or_else(|| StoreError::corrupt("products", id, "category is missing"))?;

        let kind = match (record.coffee_bean_id, record.stock_id) {
            (Some(bean_id), None) => {
                let bean = self
                    .beans
                    .get(&bean_id)
                    .cloned()
                    .ok_or_else(|| StoreError::corrupt("products", id, "coffee bean is missing"))?;
                let brews = self
                    .brews
                    .iter()
                    .filter(|brew| brew.product_id() == id)
                    .cloned()
                    .collect();
                ProductKind::Coffee { bean, brews }
            }
            (None, Some(stock_id)) => {
                let stock = self
                    .stocks
                    .get(&stock_id)
                    .cloned()
                    .ok_or_else(|| StoreError::corrupt("products", id, "stock is missing"))?;
                ProductKind::Other { stock }
            }
            _ => {
                return Err(StoreError::corrupt(
                    "products",
                    id,
                    "exactly one of coffee bean and stock must be set",
                )
                .into());
            }
        };

        Ok(Product::restore(
            id,
            record.name.clone(),
            category,
            record.amount,
            kind,
            record.created_at,
            record.updated_at,
        ))
    }

    fn take_brew_write(&mut self) -> RepositoryResult<()> {
        match self.brew_write_budget {
            Some(0) => Err(StoreError::Injected("brew write").into()),
            Some(ref mut remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// In-memory catalog store for tests and local runs.
///
/// Implements every repository port over one shared state, so a product saved
/// through [`ProductRepository`] is visible through [`ProductQueryService`].
/// Every write is recorded and can be inspected with [`Self::writes`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogStore {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalogStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a product together with its category, bean or stock and brews.
    ///
    /// Seeding is not recorded as writes.
    pub async fn seed_product(&self, product: &Product) {
        let mut state = self.state.write().await;
        state
            .categories
            .insert(product.category().id(), product.category().clone());
        match product.kind() {
            ProductKind::Coffee { bean, brews } => {
                state.beans.insert(bean.id(), bean.clone());
                state.brews.retain(|brew| brew.product_id() != product.id());
                state.brews.extend(brews.iter().cloned());
            }
            ProductKind::Other { stock } => {
                state.stocks.insert(stock.id(), stock.clone());
            }
        }
        state.products.insert(product.id(), ProductRecord::from(product));
    }

    pub async fn seed_category(&self, category: &ProductCategory) {
        let mut state = self.state.write().await;
        state.categories.insert(category.id(), category.clone());
    }

    pub async fn seed_bean(&self, bean: &CoffeeBean) {
        let mut state = self.state.write().await;
        state.beans.insert(bean.id(), bean.clone());
    }

    pub async fn seed_stock(&self, stock: &Stock) {
        let mut state = self.state.write().await;
        state.stocks.insert(stock.id(), stock.clone());
    }

    /// Returns every write made through the ports, oldest first.
    pub async fn writes(&self) -> Vec<WriteOp> {
        self.state.read().await.writes.clone()
    }

    /// Returns the stored recipes of a product in insertion order.
    pub async fn brews_of(&self, product_id: ProductId) -> Vec<ProductCoffeeBrew> {
        self.state
            .read()
            .await
            .brews
            .iter()
            .filter(|brew| brew.product_id() == product_id)
            .cloned()
            .collect()
    }

    /// Lets `count` more brew writes succeed, then fails every later one.
    pub async fn fail_brew_writes_after(&self, count: usize) {
        self.state.write().await.brew_write_budget = Some(count);
    }

    /// Configures the store to fail product saves.
    pub async fn set_fail_on_product_save(&self, fail: bool) {
        self.state.write().await.fail_on_product_save = fail;
    }

    /// Delays every port call by `latency`.
    pub async fn set_latency(&self, latency: Duration) {
        self.state.write().await.latency = Some(latency);
    }

    async fn pause(&self) {
        let latency = self.state.read().await.latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ProductQueryService for InMemoryCatalogStore {
    async fn find_by_id(&self, id: ProductId) -> RepositoryResult<Product> {
        self.pause().await;
        self.state.read().await.hydrate(id)
    }
}

#[async_trait]
impl ProductRepository for InMemoryCatalogStore {
    async fn find_by_id(&self, id: ProductId) -> RepositoryResult<Product> {
        self.pause().await;
        self.state.read().await.hydrate(id)
    }

    async fn save(&self, product: &Product) -> RepositoryResult<()> {
        self.pause().await;
        let mut state = self.state.write().await;
        if state.fail_on_product_save {
            return Err(StoreError::Injected("product save").into());
        }
        state
            .products
            .insert(product.id(), ProductRecord::from(product));
        state.writes.push(WriteOp::SaveProduct(product.id()));
        Ok(())
    }

    async fn delete(&self, id: ProductId) -> RepositoryResult<()> {
        self.pause().await;
        let mut state = self.state.write().await;
        state
            .products
            .remove(&id)
            .ok_or_else(|| RepositoryError::not_found("Product", id))?;
        state.brews.retain(|brew| brew.product_id() != id);
        state.writes.push(WriteOp::DeleteProduct(id));
        Ok(())
    }
}

#[async_trait]
impl ProductCategoryRepository for InMemoryCatalogStore {
    async fn find_by_id(&self, id: ProductCategoryId) -> RepositoryResult<ProductCategory> {
        self.pause().await;
        self.state
            .read()
            .await
            .categories
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("ProductCategory", id))
    }

    async fn save(&self, category: &ProductCategory) -> RepositoryResult<()> {
        self.pause().await;
        let mut state = self.state.write().await;
        state.categories.insert(category.id(), category.clone());
        state.writes.push(WriteOp::SaveCategory(category.id()));
        Ok(())
    }

    async fn delete(&self, id: ProductCategoryId) -> RepositoryResult<()> {
        self.pause().await;
        let mut state = self.state.write().await;
        state
            .categories
            .remove(&id)
            .ok_or_else(|| RepositoryError::not_found("ProductCategory", id))?;
        state.writes.push(WriteOp::DeleteCategory(id));
        Ok(())
    }
}

#[async_trait]
impl CoffeeBeanRepository for InMemoryCatalogStore {
    async fn find_by_id(&self, id: CoffeeBeanId) -> RepositoryResult<CoffeeBean> {
        self.pause().await;
        self.state
            .read()
            .await
            .beans
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("CoffeeBean", id))
    }

    async fn save(&self, bean: &CoffeeBean) -> RepositoryResult<()> {
        self.pause().await;
        let mut state = self.state.write().await;
        state.beans.insert(bean.id(), bean.clone());
        state.writes.push(WriteOp::SaveBean(bean.id()));
        Ok(())
    }

    async fn delete(&self, id: CoffeeBeanId) -> RepositoryResult<()> {
        self.pause().await;
        let mut state = self.state.write().await;
        state
            .beans
            .remove(&id)
            .ok_or_else(|| RepositoryError::not_found("CoffeeBean", id))?;
        state.writes.push(WriteOp::DeleteBean(id));
        Ok(())
    }
}

#[async_trait]
impl StockRepository for InMemoryCatalogStore {
    async fn find_by_id(&self, id: StockId) -> RepositoryResult<Stock> {
        self.pause().await;
        self.state
            .read()
            .await
            .stocks
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("Stock", id))
    }

    async fn save(&self, stock: &Stock) -> RepositoryResult<()> {
        self.pause().await;
        let mut state = self.state.write().await;
        state.stocks.insert(stock.id(), stock.clone());
        state.writes.push(WriteOp::SaveStock(stock.id()));
        Ok(())
    }

    async fn delete(&self, id: StockId) -> RepositoryResult<()> {
        self.pause().await;
        let mut state = self.state.write().await;
        state
            .stocks
            .remove(&id)
            .ok_or_else(|| RepositoryError::not_found("Stock", id))?;
        state.writes.push(WriteOp::DeleteStock(id));
        Ok(())
    }
}

#[async_trait]
impl ProductCoffeeBrewRepository for InMemoryCatalogStore {
    async fn find_by_id(&self, id: CoffeeBrewId) -> RepositoryResult<ProductCoffeeBrew> {
        self.pause().await;
        self.state
            .read()
            .await
            .brews
            .iter()
            .find(|brew| brew.id() == id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("ProductCoffeeBrew", id))
    }

    async fn find_by_product(
        &self,
        product_id: ProductId,
    ) -> RepositoryResult<Vec<ProductCoffeeBrew>> {
        self.pause().await;
        Ok(self.brews_of(product_id).await)
    }

    async fn save(&self, brew: &ProductCoffeeBrew) -> RepositoryResult<()> {
        self.pause().await;
        let mut state = self.state.write().await;
        state.take_brew_write()?;
        match state.brews.iter_mut().find(|stored| stored.id() == brew.id()) {
            Some(stored) => *stored = brew.clone(),
            None => state.brews.push(brew.clone()),
        }
        state.writes.push(WriteOp::SaveBrew(brew.id()));
        Ok(())
    }

    async fn delete(&self, id: CoffeeBrewId) -> RepositoryResult<()> {
        self.pause().await;
        let mut state = self.state.write().await;
        state.take_brew_write()?;
        let position = state
            .brews
            .iter()
            .position(|brew| brew.id() == id)
            .ok_or_else(|| RepositoryError::not_found("ProductCoffeeBrew", id))?;
        state.brews.remove(position);
        state.writes.push(WriteOp::DeleteBrew(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coffee_product() -> Product {
        let category = ProductCategory::new("Coffee").unwrap();
        let bean = CoffeeBean::new("Kenya", 1500).unwrap();
        let mut product = Product::new(
            "Kenya AA",
            category,
            Money::from_minor(600),
            ProductKind::coffee(bean.clone()),
        )
        .unwrap();
        let brews = vec![
            ProductCoffeeBrew::new(product.id(), "Espresso", 18, Money::from_minor(300)).unwrap(),
            ProductCoffeeBrew::new(product.id(), "Pour over", 15, Money::from_minor(550)).unwrap(),
        ];
        product.set_kind(ProductKind::Coffee { bean, brews });
        product
    }

    #[tokio::test]
    async fn seeded_product_is_hydrated_with_brews() {
        let store = InMemoryCatalogStore::new();
        let product = coffee_product();
        store.seed_product(&product).await;

        let loaded = ProductQueryService::find_by_id(&store, product.id())
            .await
            .unwrap();

        assert_eq!(loaded, product);
        assert!(store.writes().await.is_empty());
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let store = InMemoryCatalogStore::new();
        let result = ProductQueryService::find_by_id(&store, ProductId::new()).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { entity: "Product", .. })));
    }

    #[tokio::test]
    async fn product_with_missing_reference_is_persistence_error() {
        let store = InMemoryCatalogStore::new();
        let product = coffee_product();
        store.seed_product(&product).await;
        CoffeeBeanRepository::delete(&store, product.coffee_bean().unwrap().id())
            .await
            .unwrap();

        let result = ProductQueryService::find_by_id(&store, product.id()).await;
        assert!(matches!(result, Err(RepositoryError::Persistence(_))));
    }

    #[tokio::test]
    async fn brew_save_inserts_then_replaces() {
        let store = InMemoryCatalogStore::new();
        let product_id = ProductId::new();
        let mut brew =
            ProductCoffeeBrew::new(product_id, "Latte", 20, Money::from_minor(400)).unwrap();

        ProductCoffeeBrewRepository::save(&store, &brew).await.unwrap();
        brew.set_bean_quantity_grams(22).unwrap();
        ProductCoffeeBrewRepository::save(&store, &brew).await.unwrap();

        let stored = store.brews_of(product_id).await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].bean_quantity_grams(), 22);
        assert_eq!(
            store.writes().await,
            vec![WriteOp::SaveBrew(brew.id()), WriteOp::SaveBrew(brew.id())]
        );
    }

    #[tokio::test]
    async fn brews_by_product_survive_switch_to_other() {
        let store = InMemoryCatalogStore::new();
        let mut product = coffee_product();
        store.seed_product(&product).await;
        let brews = product.brews().to_vec();
        let stock = Stock::new("Filters", 100).unwrap();
        store.seed_stock(&stock).await;

        product.set_kind(ProductKind::other(stock));
        ProductRepository::save(&store, &product).await.unwrap();

        let loaded = ProductQueryService::find_by_id(&store, product.id())
            .await
            .unwrap();
        assert!(loaded.brews().is_empty());
        let stored = ProductCoffeeBrewRepository::find_by_product(&store, product.id())
            .await
            .unwrap();
        assert_eq!(stored, brews);
        assert!(
            ProductCoffeeBrewRepository::find_by_product(&store, ProductId::new())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn delete_missing_brew_is_not_found() {
        let store = InMemoryCatalogStore::new();
        let result = ProductCoffeeBrewRepository::delete(&store, CoffeeBrewId::new()).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn brew_write_budget_fails_later_writes() {
        let store = InMemoryCatalogStore::new();
        let product_id = ProductId::new();
        store.fail_brew_writes_after(1).await;

        let first = ProductCoffeeBrew::new(product_id, "A", 10, Money::zero()).unwrap();
        let second = ProductCoffeeBrew::new(product_id, "B", 10, Money::zero()).unwrap();

        assert!(ProductCoffeeBrewRepository::save(&store, &first).await.is_ok());
        let result = ProductCoffeeBrewRepository::save(&store, &second).await;

        assert!(matches!(result, Err(RepositoryError::Persistence(_))));
        assert_eq!(store.brews_of(product_id).await.len(), 1);
    }

    #[tokio::test]
    async fn deleting_product_removes_its_brews() {
        let store = InMemoryCatalogStore::new();
        let product = coffee_product();
        store.seed_product(&product).await;

        ProductRepository::delete(&store, product.id()).await.unwrap();

        assert!(store.brews_of(product.id()).await.is_empty());
        assert_eq!(store.writes().await, vec![WriteOp::DeleteProduct(product.id())]);
    }

    #[tokio::test]
    async fn product_save_failure_is_injectable() {
        let store = InMemoryCatalogStore::new();
        let product = coffee_product();
        store.set_fail_on_product_save(true).await;

        let result = ProductRepository::save(&store, &product).await;

        assert!(matches!(result, Err(RepositoryError::Persistence(_))));
        assert!(store.writes().await.is_empty());
    }

    #[tokio::test]
    async fn other_product_round_trips_through_save() {
        let store = InMemoryCatalogStore::new();
        let category = ProductCategory::new("Food").unwrap();
        let stock = Stock::new("Madeleine", 20).unwrap();
        store.seed_category(&category).await;
        store.seed_stock(&stock).await;
        let product = Product::new(
            "Madeleine",
            category,
            Money::from_minor(250),
            ProductKind::other(stock),
        )
        .unwrap();

        ProductRepository::save(&store, &product).await.unwrap();
        let loaded = ProductRepository::find_by_id(&store, product.id())
            .await
            .unwrap();

        assert_eq!(loaded, product);
    }
}
