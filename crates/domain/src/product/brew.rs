//! Coffee brew recipes owned by a coffee product.

use common::{CoffeeBrewId, ProductId};
use serde::{Deserialize, Serialize};

use super::{BrewName, Money};
use crate::error::ValidationError;

/// One way of brewing a coffee product, with its own bean dose and price.
///
/// A brew never outlives its product; `product_id` is a back-reference used by
/// storage, not an ownership link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCoffeeBrew {
    id: CoffeeBrewId,
    product_id: ProductId,
    name: BrewName,
    bean_quantity_grams: u32,
    amount: Money,
}

impl ProductCoffeeBrew {
    /// Creates a brew that has not been persisted yet.
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        bean_quantity_grams: u32,
        amount: Money,
    ) -> Result<Self, ValidationError> {
        Self::with_id(
            CoffeeBrewId::new(),
            product_id,
            name,
            bean_quantity_grams,
            amount,
        )
    }

    /// Rebuilds a brew with a known identity, validating every field.
    pub fn with_id(
        id: CoffeeBrewId,
        product_id: ProductId,
        name: impl Into<String>,
        bean_quantity_grams: u32,
        amount: Money,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            product_id,
            name: BrewName::new(name)?,
            bean_quantity_grams: check_grams(bean_quantity_grams)?,
            amount: check_amount(amount)?,
        })
    }

    pub fn id(&self) -> CoffeeBrewId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn bean_quantity_grams(&self) -> u32 {
        self.bean_quantity_grams
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        self.name.set(name)
    }

    pub fn set_bean_quantity_grams(&mut self, grams: u32) -> Result<(), ValidationError> {
        self.bean_quantity_grams = check_grams(grams)?;
        Ok(())
    }

    pub fn set_amount(&mut self, amount: Money) -> Result<(), ValidationError> {
        self.amount = check_amount(amount)?;
        Ok(())
    }
}

fn check_grams(grams: u32) -> Result<u32, ValidationError> {
    if grams == 0 {
        return Err(ValidationError::new(
            "bean_quantity_grams",
            "must be greater than 0",
        ));
    }
    Ok(grams)
}

fn check_amount(amount: Money) -> Result<Money, ValidationError> {
    if amount.is_negative() {
        return Err(ValidationError::new(
            "coffee_brew_amount",
            format!("{amount} is negative"),
        ));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_brew_is_bound_to_product() {
        let product_id = ProductId::new();
        let brew = ProductCoffeeBrew::new(product_id, "Espresso", 18, Money::from_minor(300))
            .unwrap();

        assert_eq!(brew.product_id(), product_id);
        assert_eq!(brew.name(), "Espresso");
        assert_eq!(brew.bean_quantity_grams(), 18);
        assert_eq!(brew.amount().minor(), 300);
    }

    #[test]
    fn test_zero_grams_rejected() {
        let err = ProductCoffeeBrew::new(ProductId::new(), "Espresso", 0, Money::zero())
            .unwrap_err();
        assert_eq!(err.field, "bean_quantity_grams");
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = ProductCoffeeBrew::new(ProductId::new(), "Espresso", 18, Money::from_minor(-1))
            .unwrap_err();
        assert_eq!(err.field, "coffee_brew_amount");
    }

    #[test]
    fn test_free_brew_allowed() {
        assert!(ProductCoffeeBrew::new(ProductId::new(), "Tasting", 5, Money::zero()).is_ok());
    }

    #[test]
    fn test_setters_leave_value_on_failure() {
        let mut brew =
            ProductCoffeeBrew::new(ProductId::new(), "Latte", 20, Money::from_minor(400)).unwrap();

        assert!(brew.set_name("").is_err());
        assert!(brew.set_bean_quantity_grams(0).is_err());
        assert!(brew.set_amount(Money::from_minor(-5)).is_err());

        assert_eq!(brew.name(), "Latte");
        assert_eq!(brew.bean_quantity_grams(), 20);
        assert_eq!(brew.amount().minor(), 400);
    }
}
