//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use domain::{
    CoffeeBean, CoffeeBeanRepository, CoffeeBrewId, Money, Product, ProductCategory,
    ProductCategoryRepository, ProductCoffeeBrew, ProductCoffeeBrewRepository, ProductKind,
    ProductQueryService, ProductRepository, ProductType, RepositoryError, Stock, StockRepository,
};
use serial_test::serial;
use sqlx::PgPool;
use store::PostgresCatalogStore;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_catalog_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresCatalogStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query(
        "TRUNCATE TABLE product_coffee_brews, products, product_categories, coffee_beans, stocks",
    )
    .execute(&pool)
    .await
    .unwrap();

    PostgresCatalogStore::new(pool)
}

/// Stores a coffee product's category and bean, then the product itself.
async fn save_coffee_product(store: &PostgresCatalogStore) -> Product {
    let category = ProductCategory::new("Coffee").unwrap();
    let bean = CoffeeBean::new("Ethiopia", 2000).unwrap();
    ProductCategoryRepository::save(store, &category).await.unwrap();
    CoffeeBeanRepository::save(store, &bean).await.unwrap();

    let product = Product::new(
        "Yirgacheffe",
        category,
        Money::from_minor(650),
        ProductKind::coffee(bean),
    )
    .unwrap();
    ProductRepository::save(store, &product).await.unwrap();
    product
}

#[tokio::test]
#[serial]
async fn save_and_load_coffee_product_with_brews() {
    let store = get_test_store().await;
    let product = save_coffee_product(&store).await;

    let espresso =
        ProductCoffeeBrew::new(product.id(), "Espresso", 18, Money::from_minor(350)).unwrap();
    let filter = ProductCoffeeBrew::new(product.id(), "Filter", 15, Money::from_minor(400)).unwrap();
    ProductCoffeeBrewRepository::save(&store, &espresso).await.unwrap();
    ProductCoffeeBrewRepository::save(&store, &filter).await.unwrap();

    let loaded = ProductQueryService::find_by_id(&store, product.id())
        .await
        .unwrap();

    assert_eq!(loaded.product_type(), ProductType::Coffee);
    assert_eq!(loaded.name().as_str(), "Yirgacheffe");
    assert_eq!(loaded.amount(), Money::from_minor(650));
    assert_eq!(loaded.brews(), &[espresso, filter]);
}

#[tokio::test]
#[serial]
async fn brew_upsert_keeps_position() {
    let store = get_test_store().await;
    let product = save_coffee_product(&store).await;

    let mut first = ProductCoffeeBrew::new(product.id(), "A", 10, Money::zero()).unwrap();
    let second = ProductCoffeeBrew::new(product.id(), "B", 12, Money::zero()).unwrap();
    ProductCoffeeBrewRepository::save(&store, &first).await.unwrap();
    ProductCoffeeBrewRepository::save(&store, &second).await.unwrap();

    first.set_name("A2").unwrap();
    ProductCoffeeBrewRepository::save(&store, &first).await.unwrap();

    let loaded = ProductRepository::find_by_id(&store, product.id())
        .await
        .unwrap();
    let names: Vec<_> = loaded.brews().iter().map(|b| b.name()).collect();
    assert_eq!(names, vec!["A2", "B"]);
}

#[tokio::test]
#[serial]
async fn save_other_product_and_switch_to_coffee() {
    let store = get_test_store().await;
    let category = ProductCategory::new("Retail").unwrap();
    let stock = Stock::new("Beans bag", 40).unwrap();
    let bean = CoffeeBean::new("Guatemala", 900).unwrap();
    ProductCategoryRepository::save(&store, &category).await.unwrap();
    StockRepository::save(&store, &stock).await.unwrap();
    CoffeeBeanRepository::save(&store, &bean).await.unwrap();

    let mut product = Product::new(
        "Bag",
        category,
        Money::from_minor(1200),
        ProductKind::other(stock.clone()),
    )
    .unwrap();
    ProductRepository::save(&store, &product).await.unwrap();

    let loaded = ProductQueryService::find_by_id(&store, product.id())
        .await
        .unwrap();
    assert_eq!(loaded.stock(), Some(&stock));

    product.set_kind(ProductKind::coffee(bean.clone()));
    ProductRepository::save(&store, &product).await.unwrap();

    let loaded = ProductQueryService::find_by_id(&store, product.id())
        .await
        .unwrap();
    assert_eq!(loaded.product_type(), ProductType::Coffee);
    assert_eq!(loaded.coffee_bean(), Some(&bean));
    assert!(loaded.stock().is_none());
}

#[tokio::test]
#[serial]
async fn brews_outlive_switch_to_other_and_back() {
    let store = get_test_store().await;
    let mut product = save_coffee_product(&store).await;
    let bean = product.coffee_bean().cloned().unwrap();
    let espresso =
        ProductCoffeeBrew::new(product.id(), "Espresso", 18, Money::from_minor(350)).unwrap();
    let americano =
        ProductCoffeeBrew::new(product.id(), "Americano", 20, Money::from_minor(380)).unwrap();
    ProductCoffeeBrewRepository::save(&store, &espresso).await.unwrap();
    ProductCoffeeBrewRepository::save(&store, &americano).await.unwrap();

    let stock = Stock::new("Drip bags", 25).unwrap();
    StockRepository::save(&store, &stock).await.unwrap();
    product.set_kind(ProductKind::other(stock));
    ProductRepository::save(&store, &product).await.unwrap();

    let loaded = ProductQueryService::find_by_id(&store, product.id())
        .await
        .unwrap();
    assert!(loaded.brews().is_empty());
    let stored = ProductCoffeeBrewRepository::find_by_product(&store, product.id())
        .await
        .unwrap();
    assert_eq!(stored, vec![espresso.clone(), americano.clone()]);

    // Back to coffee with only a new drip recipe.
    ProductCoffeeBrewRepository::delete(&store, espresso.id()).await.unwrap();
    ProductCoffeeBrewRepository::delete(&store, americano.id()).await.unwrap();
    let drip = ProductCoffeeBrew::new(product.id(), "Drip", 15, Money::from_minor(300)).unwrap();
    ProductCoffeeBrewRepository::save(&store, &drip).await.unwrap();
    product.set_kind(ProductKind::coffee(bean));
    ProductRepository::save(&store, &product).await.unwrap();

    let loaded = ProductQueryService::find_by_id(&store, product.id())
        .await
        .unwrap();
    assert_eq!(loaded.brews(), std::slice::from_ref(&drip));
    assert_eq!(
        ProductCoffeeBrewRepository::find_by_product(&store, product.id())
            .await
            .unwrap(),
        vec![drip]
    );
}

#[tokio::test]
#[serial]
async fn missing_rows_are_not_found() {
    let store = get_test_store().await;

    let result = ProductQueryService::find_by_id(&store, domain::ProductId::new()).await;
    assert!(matches!(result, Err(RepositoryError::NotFound { entity: "Product", .. })));

    let result = ProductCategoryRepository::find_by_id(&store, domain::ProductCategoryId::new()).await;
    assert!(matches!(result, Err(RepositoryError::NotFound { .. })));

    let result = ProductCoffeeBrewRepository::delete(&store, CoffeeBrewId::new()).await;
    assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
}

#[tokio::test]
#[serial]
async fn deleting_product_cascades_to_brews() {
    let store = get_test_store().await;
    let product = save_coffee_product(&store).await;
    let brew = ProductCoffeeBrew::new(product.id(), "Cortado", 16, Money::from_minor(380)).unwrap();
    ProductCoffeeBrewRepository::save(&store, &brew).await.unwrap();

    ProductRepository::delete(&store, product.id()).await.unwrap();

    let result = ProductCoffeeBrewRepository::find_by_id(&store, brew.id()).await;
    assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
}

#[tokio::test]
#[serial]
async fn brew_for_unknown_product_is_persistence_error() {
    let store = get_test_store().await;
    let brew =
        ProductCoffeeBrew::new(domain::ProductId::new(), "Orphan", 10, Money::zero()).unwrap();

    let result = ProductCoffeeBrewRepository::save(&store, &brew).await;

    assert!(matches!(result, Err(RepositoryError::Persistence(_))));
}
