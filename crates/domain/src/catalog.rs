//! Entities a product refers to but does not own.

use common::{CoffeeBeanId, ProductCategoryId, StockId};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::product::validate_name;

/// A menu category (e.g. "Coffee", "Food").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCategory {
    id: ProductCategoryId,
    name: String,
}

impl ProductCategory {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_id(ProductCategoryId::new(), name)
    }

    pub fn with_id(id: ProductCategoryId, name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_name("product_category_name", &name)?;
        Ok(Self { id, name })
    }

    pub fn id(&self) -> ProductCategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A coffee bean the shop roasts or buys.
///
/// `gram_quantity` is the amount currently on hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoffeeBean {
    id: CoffeeBeanId,
    name: String,
    gram_quantity: u32,
}

impl CoffeeBean {
    pub fn new(name: impl Into<String>, gram_quantity: u32) -> Result<Self, ValidationError> {
        Self::with_id(CoffeeBeanId::new(), name, gram_quantity)
    }

    pub fn with_id(
        id: CoffeeBeanId,
        name: impl Into<String>,
        gram_quantity: u32,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_name("coffee_bean_name", &name)?;
        Ok(Self {
            id,
            name,
            gram_quantity,
        })
    }

    pub fn id(&self) -> CoffeeBeanId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gram_quantity(&self) -> u32 {
        self.gram_quantity
    }
}

/// A counted stock item backing non-coffee products (cakes, bottled drinks).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    id: StockId,
    name: String,
    quantity: u32,
}

impl Stock {
    pub fn new(name: impl Into<String>, quantity: u32) -> Result<Self, ValidationError> {
        Self::with_id(StockId::new(), name, quantity)
    }

    pub fn with_id(
        id: StockId,
        name: impl Into<String>,
        quantity: u32,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_name("stock_name", &name)?;
        Ok(Self { id, name, quantity })
    }

    pub fn id(&self) -> StockId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}
