//! Product aggregate and related types.

mod aggregate;
mod brew;
mod kind;
mod value_objects;

pub use aggregate::Product;
pub use brew::ProductCoffeeBrew;
pub use kind::{ProductKind, ProductType};
pub use value_objects::{BrewName, Money, ProductName};

pub(crate) use value_objects::validate_name;
