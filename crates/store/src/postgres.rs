use async_trait::async_trait;
use common::{CoffeeBeanId, CoffeeBrewId, ProductCategoryId, ProductId, StockId};
use domain::{
    CoffeeBean, CoffeeBeanRepository, Money, Product, ProductCategory, ProductCategoryRepository,
    ProductCoffeeBrew, ProductCoffeeBrewRepository, ProductKind, ProductName, ProductQueryService,
    ProductRepository, ProductType, RepositoryError, RepositoryResult, Stock, StockRepository,
};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::debug;
use uuid::Uuid;

use crate::{Result, StoreError};

const PRODUCT_SELECT: &str = r#"
    SELECT p.id, p.name, p.amount, p.product_type, p.created_at, p.updated_at,
           c.id AS category_id, c.name AS category_name,
           b.id AS bean_id, b.name AS bean_name, b.gram_quantity AS bean_gram_quantity,
           s.id AS stock_id, s.name AS stock_name, s.quantity AS stock_quantity
    FROM products p
    JOIN product_categories c ON c.id = p.category_id
    LEFT JOIN coffee_beans b ON b.id = p.coffee_bean_id
    LEFT JOIN stocks s ON s.id = p.stock_id
    WHERE p.id = $1
"#;

/// PostgreSQL-backed catalog store implementing every repository port.
#[derive(Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    /// Creates a new PostgreSQL catalog store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    async fn load_product(&self, id: ProductId) -> Result<Option<Product>> {
        let Some(row) = sqlx::query(PRODUCT_SELECT)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let brews = self.fetch_brews(id).await?;
        row_to_product(&row, brews).map(Some)
    }

    async fn fetch_brews(&self, product_id: ProductId) -> Result<Vec<ProductCoffeeBrew>> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, name, bean_quantity_grams, amount
            FROM product_coffee_brews
            WHERE product_id = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(product_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_brew).collect()
    }

    async fn delete_row(
        &self,
        table: &'static str,
        entity: &'static str,
        id: Uuid,
    ) -> RepositoryResult<()> {
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(entity, id));
        }
        debug!(table, %id, "row deleted");
        Ok(())
    }
}

fn to_u32(table: &'static str, id: Uuid, column: &str, value: i64) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| StoreError::corrupt(table, id, format!("{column} out of range: {value}")))
}

fn row_to_bean(row: &PgRow) -> Result<CoffeeBean> {
    let id: Uuid = row.try_get("id")?;
    let grams = to_u32("coffee_beans", id, "gram_quantity", row.try_get("gram_quantity")?)?;
    CoffeeBean::with_id(
        CoffeeBeanId::from_uuid(id),
        row.try_get::<String, _>("name")?,
        grams,
    )
    .map_err(|e| StoreError::corrupt("coffee_beans", id, e))
}

fn row_to_stock(row: &PgRow) -> Result<Stock> {
    let id: Uuid = row.try_get("id")?;
    let quantity = to_u32("stocks", id, "quantity", row.try_get("quantity")?)?;
    Stock::with_id(
        StockId::from_uuid(id),
        row.try_get::<String, _>("name")?,
        quantity,
    )
    .map_err(|e| StoreError::corrupt("stocks", id, e))
}

fn row_to_product(row: &PgRow, brews: Vec<ProductCoffeeBrew>) -> Result<Product> {
    let id: Uuid = row.try_get("id")?;

    let name = ProductName::new(row.try_get::<String, _>("name")?)
        .map_err(|e| StoreError::corrupt("products", id, e))?;
    let category = ProductCategory::with_id(
        ProductCategoryId::from_uuid(row.try_get("category_id")?),
        row.try_get::<String, _>("category_name")?,
    )
    .map_err(|e| StoreError::corrupt("product_categories", id, e))?;

    let product_type: ProductType = row
        .try_get::<String, _>("product_type")?
        .parse()
        .map_err(|e| StoreError::corrupt("products", id, e))?;

    let kind = match product_type {
        ProductType::Coffee => {
            let bean_id: Option<Uuid> = row.try_get("bean_id")?;
            let bean_id = bean_id
                .ok_or_else(|| StoreError::corrupt("products", id, "coffee bean is missing"))?;
            let grams = to_u32(
                "coffee_beans",
                bean_id,
                "gram_quantity",
                row.try_get("bean_gram_quantity")?,
            )?;
            let bean = CoffeeBean::with_id(
                CoffeeBeanId::from_uuid(bean_id),
                row.try_get::<String, _>("bean_name")?,
                grams,
            )
            .map_err(|e| StoreError::corrupt("coffee_beans", bean_id, e))?;
            ProductKind::Coffee { bean, brews }
        }
        ProductType::Other => {
            let stock_id: Option<Uuid> = row.try_get("stock_id")?;
            let stock_id =
                stock_id.ok_or_else(|| StoreError::corrupt("products", id, "stock is missing"))?;
            let quantity = to_u32("stocks", stock_id, "quantity", row.try_get("stock_quantity")?)?;
            let stock = Stock::with_id(
                StockId::from_uuid(stock_id),
                row.try_get::<String, _>("stock_name")?,
                quantity,
            )
            .map_err(|e| StoreError::corrupt("stocks", stock_id, e))?;
            ProductKind::Other { stock }
        }
    };

    Ok(Product::restore(
        ProductId::from_uuid(id),
        name,
        category,
        Money::from_minor(row.try_get("amount")?),
        kind,
        row.try_get("created_at")?,
        row.try_get("updated_at")?,
    ))
}

fn row_to_brew(row: &PgRow) -> Result<ProductCoffeeBrew> {
    let id: Uuid = row.try_get("id")?;
    let grams = to_u32(
        "product_coffee_brews",
        id,
        "bean_quantity_grams",
        row.try_get("bean_quantity_grams")?,
    )?;

    ProductCoffeeBrew::with_id(
        CoffeeBrewId::from_uuid(id),
        ProductId::from_uuid(row.try_get("product_id")?),
        row.try_get::<String, _>("name")?,
        grams,
        Money::from_minor(row.try_get("amount")?),
    )
    .map_err(|e| StoreError::corrupt("product_coffee_brews", id, e))
}

#[async_trait]
impl ProductQueryService for PostgresCatalogStore {
    async fn find_by_id(&self, id: ProductId) -> RepositoryResult<Product> {
        self.load_product(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Product", id))
    }
}

#[async_trait]
impl ProductRepository for PostgresCatalogStore {
    async fn find_by_id(&self, id: ProductId) -> RepositoryResult<Product> {
        self.load_product(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Product", id))
    }

    async fn save(&self, product: &Product) -> RepositoryResult<()> {
        let bean_id = product.coffee_bean().map(|bean| bean.id().as_uuid());
        let stock_id = product.stock().map(|stock| stock.id().as_uuid());

        sqlx::query(
            r#"
            INSERT INTO products (id, name, category_id, amount, product_type, coffee_bean_id, stock_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                category_id = EXCLUDED.category_id,
                amount = EXCLUDED.amount,
                product_type = EXCLUDED.product_type,
                coffee_bean_id = EXCLUDED.coffee_bean_id,
                stock_id = EXCLUDED.stock_id,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(product.id().as_uuid())
        .bind(product.name().as_str())
        .bind(product.category().id().as_uuid())
        .bind(product.amount().minor())
        .bind(product.product_type().as_str())
        .bind(bean_id)
        .bind(stock_id)
        .bind(product.created_at())
        .bind(product.updated_at())
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        debug!(product_id = %product.id(), "product saved");
        Ok(())
    }

    async fn delete(&self, id: ProductId) -> RepositoryResult<()> {
        self.delete_row("products", "Product", id.as_uuid()).await
    }
}

#[async_trait]
impl ProductCategoryRepository for PostgresCatalogStore {
    async fn find_by_id(&self, id: ProductCategoryId) -> RepositoryResult<ProductCategory> {
        let row = sqlx::query("SELECT id, name FROM product_categories WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from)?
            .ok_or_else(|| RepositoryError::not_found("ProductCategory", id))?;

        let name: String = row.try_get("name").map_err(StoreError::from)?;
        let category = ProductCategory::with_id(id, name)
            .map_err(|e| StoreError::corrupt("product_categories", id, e))?;
        Ok(category)
    }

    async fn save(&self, category: &ProductCategory) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO product_categories (id, name) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name
            "#,
        )
        .bind(category.id().as_uuid())
        .bind(category.name())
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;
        Ok(())
    }

    async fn delete(&self, id: ProductCategoryId) -> RepositoryResult<()> {
        self.delete_row("product_categories", "ProductCategory", id.as_uuid())
            .await
    }
}

#[async_trait]
impl CoffeeBeanRepository for PostgresCatalogStore {
    async fn find_by_id(&self, id: CoffeeBeanId) -> RepositoryResult<CoffeeBean> {
        let row = sqlx::query("SELECT id, name, gram_quantity FROM coffee_beans WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from)?
            .ok_or_else(|| RepositoryError::not_found("CoffeeBean", id))?;

        Ok(row_to_bean(&row)?)
    }

    async fn save(&self, bean: &CoffeeBean) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO coffee_beans (id, name, gram_quantity) VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, gram_quantity = EXCLUDED.gram_quantity
            "#,
        )
        .bind(bean.id().as_uuid())
        .bind(bean.name())
        .bind(i64::from(bean.gram_quantity()))
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;
        Ok(())
    }

    async fn delete(&self, id: CoffeeBeanId) -> RepositoryResult<()> {
        self.delete_row("coffee_beans", "CoffeeBean", id.as_uuid()).await
    }
}

#[async_trait]
impl StockRepository for PostgresCatalogStore {
    async fn find_by_id(&self, id: StockId) -> RepositoryResult<Stock> {
        let row = sqlx::query("SELECT id, name, quantity FROM stocks WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from)?
            .ok_or_else(|| RepositoryError::not_found("Stock", id))?;

        Ok(row_to_stock(&row)?)
    }

    async fn save(&self, stock: &Stock) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stocks (id, name, quantity) VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, quantity = EXCLUDED.quantity
            "#,
        )
        .bind(stock.id().as_uuid())
        .bind(stock.name())
        .bind(i64::from(stock.quantity()))
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;
        Ok(())
    }

    async fn delete(&self, id: StockId) -> RepositoryResult<()> {
        self.delete_row("stocks", "Stock", id.as_uuid()).await
    }
}

#[async_trait]
impl ProductCoffeeBrewRepository for PostgresCatalogStore {
    async fn find_by_id(&self, id: CoffeeBrewId) -> RepositoryResult<ProductCoffeeBrew> {
        let row = sqlx::query(
            r#"
            SELECT id, product_id, name, bean_quantity_grams, amount
            FROM product_coffee_brews
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)?
        .ok_or_else(|| RepositoryError::not_found("ProductCoffeeBrew", id))?;

        Ok(row_to_brew(&row)?)
    }

    async fn find_by_product(
        &self,
        product_id: ProductId,
    ) -> RepositoryResult<Vec<ProductCoffeeBrew>> {
        Ok(self.fetch_brews(product_id).await?)
    }

    async fn save(&self, brew: &ProductCoffeeBrew) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO product_coffee_brews (id, product_id, name, bean_quantity_grams, amount)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                bean_quantity_grams = EXCLUDED.bean_quantity_grams,
                amount = EXCLUDED.amount
            "#,
        )
        .bind(brew.id().as_uuid())
        .bind(brew.product_id().as_uuid())
        .bind(brew.name())
        .bind(i64::from(brew.bean_quantity_grams()))
        .bind(brew.amount().minor())
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        debug!(brew_id = %brew.id(), product_id = %brew.product_id(), "coffee brew saved");
        Ok(())
    }

    async fn delete(&self, id: CoffeeBrewId) -> RepositoryResult<()> {
        self.delete_row("product_coffee_brews", "ProductCoffeeBrew", id.as_uuid())
            .await
    }
}
