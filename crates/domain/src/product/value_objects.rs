//! Value objects for the catalog domain.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Checks that a name has at least one non-whitespace character.
pub(crate) fn validate_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

/// The display name of a product.
///
/// Assignment is all-or-nothing: a rejected value leaves the previous name in
/// place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductName(String);

impl ProductName {
    pub const FIELD: &'static str = "product_name";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        validate_name(Self::FIELD, &value)?;
        Ok(Self(value))
    }

    /// Replaces the name after validating the new value.
    pub fn set(&mut self, value: impl Into<String>) -> Result<(), ValidationError> {
        *self = Self::new(value)?;
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProductName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProductName> for String {
    fn from(name: ProductName) -> Self {
        name.0
    }
}

/// The name of a coffee brew recipe (e.g. "Espresso", "Pour over").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BrewName(String);

impl BrewName {
    pub const FIELD: &'static str = "coffee_brew_name";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        validate_name(Self::FIELD, &value)?;
        Ok(Self(value))
    }

    pub fn set(&mut self, value: impl Into<String>) -> Result<(), ValidationError> {
        *self = Self::new(value)?;
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BrewName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for BrewName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BrewName> for String {
    fn from(name: BrewName) -> Self {
        name.0
    }
}

/// A price in the smallest currency unit (yen has no subunit, so 300 is ¥300).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub fn from_minor(units: i64) -> Self {
        Self(units)
    }

    pub fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in minor units.
    pub fn minor(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
