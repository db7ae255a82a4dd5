//! Input of the product update use case.

use common::{CoffeeBeanId, ProductCategoryId, StockId};
use domain::{Money, ProductType};

pub use domain::CoffeeBrewParams;

/// A partial product update.
///
/// `None` leaves a field alone; `Some` applies it, so an explicit zero amount
/// is distinguishable from an absent one. `coffee_brews: Some(vec![])`
/// removes every brew recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductParams {
    pub name: Option<String>,
    pub category_id: Option<ProductCategoryId>,
    pub product_type: Option<ProductType>,
    pub coffee_bean_id: Option<CoffeeBeanId>,
    pub coffee_brews: Option<Vec<CoffeeBrewParams>>,
    pub amount: Option<Money>,
    pub stock_id: Option<StockId>,
}
