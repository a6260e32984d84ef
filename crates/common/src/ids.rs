use serde::{Deserialize, Serialize};

/// Defines a newtype wrapper around an `i64` database identifier.
///
/// Wrapping prevents mixing up the different identifier spaces (an order ID
/// is never a valid product ID) while keeping the wire representation a
/// plain number.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from a raw database key.
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the underlying numeric key.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Unique identifier for an order.
    OrderId
);

define_id!(
    /// Unique identifier for a customer.
    CustomerId
);

define_id!(
    /// Unique identifier for a product.
    ProductId
);

define_id!(
    /// Unique identifier for a warehouse.
    WarehouseId
);

define_id!(
    /// Unique identifier for an inventory record.
    InventoryId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_preserves_value() {
        let id = ProductId::new(101);
        assert_eq!(id.as_i64(), 101);
        assert_eq!(id.to_string(), "101");
    }

    #[test]
    fn id_from_into_roundtrip() {
        let id: WarehouseId = 7.into();
        let raw: i64 = id.into();
        assert_eq!(raw, 7);
    }

    #[test]
    fn id_serialization_is_transparent() {
        let id = OrderId::new(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");

        let back: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn ids_are_ordered() {
        assert!(InventoryId::new(1) < InventoryId::new(2));
    }
}
