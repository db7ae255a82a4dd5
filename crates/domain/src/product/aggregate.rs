//! Product aggregate implementation.

use chrono::{DateTime, Utc};
use common::ProductId;
use serde::{Deserialize, Serialize};

use super::{Money, ProductCoffeeBrew, ProductKind, ProductName, ProductType};
use crate::catalog::{CoffeeBean, ProductCategory, Stock};
use crate::error::ValidationError;

/// Product aggregate root.
///
/// Every change to a product's brew recipes goes through this type. Which
/// associated data is present depends on [`ProductKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: ProductName,
    category: ProductCategory,

    /// Price-like amount; used by every product type.
    amount: Money,

    kind: ProductKind,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates a new product with a fresh id.
    pub fn new(
        name: impl Into<String>,
        category: ProductCategory,
        amount: Money,
        kind: ProductKind,
    ) -> Result<Self, ValidationError> {
        let now = Utc::now();
        Ok(Self {
            id: ProductId::new(),
            name: ProductName::new(name)?,
            category,
            amount,
            kind,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds a product loaded from storage.
    pub fn restore(
        id: ProductId,
        name: ProductName,
        category: ProductCategory,
        amount: Money,
        kind: ProductKind,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            category,
            amount,
            kind,
            created_at,
            updated_at,
        }
    }
}

// Query methods
impl Product {
    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &ProductName {
        &self.name
    }

    pub fn category(&self) -> &ProductCategory {
        &self.category
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn kind(&self) -> &ProductKind {
        &self.kind
    }

    pub fn product_type(&self) -> ProductType {
        self.kind.product_type()
    }

    /// Returns the bean of a coffee product.
    pub fn coffee_bean(&self) -> Option<&CoffeeBean> {
        match &self.kind {
            ProductKind::Coffee { bean, .. } => Some(bean),
            ProductKind::Other { .. } => None,
        }
    }

    /// Returns the currently hydrated brew recipes; empty for non-coffee products.
    pub fn brews(&self) -> &[ProductCoffeeBrew] {
        match &self.kind {
            ProductKind::Coffee { brews, .. } => brews,
            ProductKind::Other { .. } => &[],
        }
    }

    /// Returns the stock of a non-coffee product.
    pub fn stock(&self) -> Option<&Stock> {
        match &self.kind {
            ProductKind::Other { stock } => Some(stock),
            ProductKind::Coffee { .. } => None,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

// Mutation methods
impl Product {
    /// Renames the product. The name is unchanged if validation fails.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        self.name.set(name)
    }

    pub fn set_amount(&mut self, amount: Money) {
        self.amount = amount;
    }

    /// Replaces the category. The caller has already resolved it.
    pub fn set_category(&mut self, category: ProductCategory) {
        self.category = category;
    }

    /// Replaces the whole associated-data branch.
    pub fn set_kind(&mut self, kind: ProductKind) {
        self.kind = kind;
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
