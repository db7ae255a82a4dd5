//! Product discriminant and the associated data each variant carries.

use serde::{Deserialize, Serialize};

use super::ProductCoffeeBrew;
use crate::catalog::{CoffeeBean, Stock};
use crate::error::ValidationError;

/// Which associated-data branch of a product is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// Brewed to order from a coffee bean, priced per brew recipe.
    Coffee,

    /// Sold from a counted stock.
    Other,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Coffee => "coffee",
            ProductType::Other => "other",
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "coffee" => Ok(ProductType::Coffee),
            "other" => Ok(ProductType::Other),
            _ => Err(ValidationError::new(
                "product_type",
                format!("unknown product type '{s}'"),
            )),
        }
    }
}

/// Type-conditional data of a product.
///
/// A coffee product has a bean and its brew recipes; any other product has a
/// stock. There is no way to build a coffee product holding a stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductKind {
    Coffee {
        bean: CoffeeBean,
        brews: Vec<ProductCoffeeBrew>,
    },
    Other {
        stock: Stock,
    },
}

impl ProductKind {
    /// A coffee product with no brew recipes yet.
    pub fn coffee(bean: CoffeeBean) -> Self {
        ProductKind::Coffee {
            bean,
            brews: Vec::new(),
        }
    }

    pub fn other(stock: Stock) -> Self {
        ProductKind::Other { stock }
    }

    pub fn product_type(&self) -> ProductType {
        match self {
            ProductKind::Coffee { .. } => ProductType::Coffee,
            ProductKind::Other { .. } => ProductType::Other,
        }
    }
}
