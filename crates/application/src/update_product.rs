//! The product update use case.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use common::ProductId;
use domain::{
    BrewPlan, CoffeeBean, CoffeeBeanRepository, Product, ProductCategoryRepository,
    ProductCoffeeBrewRepository, ProductKind, ProductQueryService, ProductRepository,
    ProductType, RepositoryError, Stock, StockRepository, ValidationError, reconcile,
};
use tracing::{debug, info, warn};

use crate::error::{InvalidParam, UpdateProductError};
use crate::params::ProductParams;

/// Deadline applied to one update unless configured otherwise.
pub const DEFAULT_UPDATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Handles to every port the use case talks to.
#[derive(Clone)]
pub struct CatalogPorts {
    pub query: Arc<dyn ProductQueryService>,
    pub products: Arc<dyn ProductRepository>,
    pub categories: Arc<dyn ProductCategoryRepository>,
    pub beans: Arc<dyn CoffeeBeanRepository>,
    pub stocks: Arc<dyn StockRepository>,
    pub brews: Arc<dyn ProductCoffeeBrewRepository>,
}

impl CatalogPorts {
    /// Uses one store for every port.
    pub fn from_store<S>(store: S) -> Self
    where
        S: ProductQueryService
            + ProductRepository
            + ProductCategoryRepository
            + CoffeeBeanRepository
            + StockRepository
            + ProductCoffeeBrewRepository
            + 'static,
    {
        let store = Arc::new(store);
        Self {
            query: store.clone(),
            products: store.clone(),
            categories: store.clone(),
            beans: store.clone(),
            stocks: store.clone(),
            brews: store,
        }
    }
}

/// Applies partial updates to products.
///
/// One call loads the product, applies the supplied fields, syncs brew
/// recipes through the brew repository and saves the root. Writes are issued
/// one by one with no enclosing transaction: a failure stops the sequence and
/// leaves earlier writes in place. Re-running the same update converges
/// because the brew diff is computed against what is stored.
#[derive(Clone)]
pub struct UpdateProduct {
    ports: CatalogPorts,
    timeout: Duration,
}

impl UpdateProduct {
    pub fn new(ports: CatalogPorts) -> Self {
        Self {
            ports,
            timeout: DEFAULT_UPDATE_TIMEOUT,
        }
    }

    /// Sets the deadline covering a whole invocation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Applies `params` to the product `id` and returns the saved product.
    ///
    /// When the deadline expires the in-flight call is dropped and nothing
    /// further is attempted.
    #[tracing::instrument(skip_all, fields(product_id = %id))]
    pub async fn execute(
        &self,
        id: ProductId,
        params: ProductParams,
    ) -> Result<Product, UpdateProductError> {
        metrics::counter!("product_updates_total").increment(1);
        let started = Instant::now();

        let result = tokio::time::timeout(self.timeout, self.apply(id, params))
            .await
            .unwrap_or_else(|_| Err(UpdateProductError::Timeout(self.timeout)));

        metrics::histogram!("product_update_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        match &result {
            Ok(product) => info!(
                product_type = %product.product_type(),
                brews = product.brews().len(),
                "product updated"
            ),
            Err(err) => {
                metrics::counter!("product_update_failures_total", "reason" => err.reason())
                    .increment(1);
                warn!(error = %err, reason = err.reason(), "product update failed");
            }
        }

        result
    }

    async fn apply(
        &self,
        id: ProductId,
        params: ProductParams,
    ) -> Result<Product, UpdateProductError> {
        let mut product = self.ports.query.find_by_id(id).await.map_err(|err| {
            if err.is_not_found() {
                UpdateProductError::NotFound(id)
            } else {
                UpdateProductError::Repository(err)
            }
        })?;

        if let Some(name) = params.name {
            product.set_name(name).map_err(InvalidParam::from)?;
        }

        if let Some(category_id) = params.category_id
            && category_id != product.category().id()
        {
            let category = self
                .ports
                .categories
                .find_by_id(category_id)
                .await
                .map_err(lookup_error)?;
            debug!(%category_id, "category resolved");
            product.set_category(category);
        }

        // Any transition between types is allowed.
        let target = params
            .product_type
            .unwrap_or_else(|| product.product_type());

        let current_bean = product.coffee_bean().map(CoffeeBean::id);
        let resolved_bean = match params.coffee_bean_id {
            Some(bean_id) if current_bean != Some(bean_id) => {
                let bean = self
                    .ports
                    .beans
                    .find_by_id(bean_id)
                    .await
                    .map_err(lookup_error)?;
                debug!(%bean_id, "coffee bean resolved");
                Some(bean)
            }
            _ => None,
        };

        let kind = match target {
            ProductType::Coffee => {
                let bean = resolved_bean
                    .or_else(|| product.coffee_bean().cloned())
                    .ok_or_else(|| {
                        InvalidParam::from(ValidationError::new(
                            "coffee_bean_id",
                            "required when switching to coffee",
                        ))
                    })?;

                // An Other product is loaded without brews, but any stored
                // while it was Coffee are still there.
                let current = if product.product_type() == ProductType::Other {
                    let stored = self.ports.brews.find_by_product(id).await?;
                    debug!(stored = stored.len(), "stored brews loaded");
                    stored
                } else {
                    product.brews().to_vec()
                };
                let brews = match params.coffee_brews {
                    Some(desired) => {
                        let plan =
                            reconcile(id, &current, &desired).map_err(InvalidParam::from)?;
                        self.write_brews(&plan).await?;
                        plan.apply(&current)
                    }
                    None => current,
                };
                ProductKind::Coffee { bean, brews }
            }
            ProductType::Other => {
                let current_stock = product.stock().map(Stock::id);
                let stock = match params.stock_id {
                    Some(stock_id) if current_stock != Some(stock_id) => {
                        let stock = self
                            .ports
                            .stocks
                            .find_by_id(stock_id)
                            .await
                            .map_err(lookup_error)?;
                        debug!(%stock_id, "stock resolved");
                        stock
                    }
                    _ => product.stock().cloned().ok_or_else(|| {
                        InvalidParam::from(ValidationError::new(
                            "stock_id",
                            "required when switching to other",
                        ))
                    })?,
                };
                if params.coffee_brews.is_some() {
                    debug!("coffee brews ignored for a non-coffee product");
                }
                ProductKind::Other { stock }
            }
        };
        product.set_kind(kind);

        if let Some(amount) = params.amount {
            product.set_amount(amount);
        }

        product.touch(Utc::now());
        self.ports.products.save(&product).await?;

        Ok(product)
    }

    /// Writes creates, then updates, then deletes. Stops at the first failure.
    async fn write_brews(&self, plan: &BrewPlan) -> Result<(), RepositoryError> {
        if plan.is_empty() {
            return Ok(());
        }
        info!(
            creates = plan.creates.len(),
            updates = plan.updates.len(),
            deletes = plan.deletes.len(),
            "applying brew plan"
        );

        for brew in &plan.creates {
            self.ports.brews.save(brew).await?;
            metrics::counter!("coffee_brew_writes_total", "op" => "create").increment(1);
        }
        for brew in &plan.updates {
            self.ports.brews.save(brew).await?;
            metrics::counter!("coffee_brew_writes_total", "op" => "update").increment(1);
        }
        for &brew_id in &plan.deletes {
            self.ports.brews.delete(brew_id).await?;
            metrics::counter!("coffee_brew_writes_total", "op" => "delete").increment(1);
        }
        Ok(())
    }
}

/// A miss on a caller-supplied id is a parameter error; anything else is not.
fn lookup_error(err: RepositoryError) -> UpdateProductError {
    if err.is_not_found() {
        InvalidParam::NotFound(err).into()
    } else {
        UpdateProductError::Repository(err)
    }
}
