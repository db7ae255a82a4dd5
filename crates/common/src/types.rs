use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a UUID-backed identifier newtype.
///
/// Each entity gets its own type so a stock id can never be passed where a
/// coffee bean id is expected.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }

            /// Parses an identifier from its hyphenated string form.
            pub fn parse_str(input: &str) -> Result<Self, uuid::Error> {
                Uuid::parse_str(input).map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse_str(s)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a product (the aggregate root).
    ProductId
);

entity_id!(
    /// Unique identifier for a product category.
    ProductCategoryId
);

entity_id!(
    /// Unique identifier for a coffee bean.
    CoffeeBeanId
);

entity_id!(
    /// Unique identifier for a stock entry.
    StockId
);

entity_id!(
    /// Unique identifier for a coffee brew recipe owned by a product.
    CoffeeBrewId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_id_new_creates_unique_ids() {
        let id1 = ProductId::new();
        let id2 = ProductId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn stock_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = StockId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn brew_id_parses_display_output() {
        let id = CoffeeBrewId::new();
        let parsed: CoffeeBrewId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_rejects_empty_string() {
        assert!(CoffeeBeanId::parse_str("").is_err());
    }

    #[test]
    fn category_id_serializes_as_plain_string() {
        let id = ProductCategoryId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
