//! Order status state machine.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// ```text
/// PENDING ──► CONFIRMED ──► PROCESSING ──► SHIPPED ──► DELIVERED
///    │             │             │            │
///    └─────────────┴─────────────┴────────────┴──► CANCELLED / RETURNED
/// ```
///
/// DELIVERED and CANCELLED are terminal. Beyond that, only two transitions
/// are rejected outright: anything out of a terminal status, and moving a
/// SHIPPED order back to PENDING. There is deliberately no full legality
/// matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order created, inventory reserved, awaiting confirmation.
    #[default]
    Pending,

    /// Order confirmed by the customer or back office.
    Confirmed,

    /// Order is being picked and packed.
    Processing,

    /// Order has left the warehouse.
    Shipped,

    /// Order arrived at the customer (terminal).
    Delivered,

    /// Order was cancelled; its reservations have been released (terminal).
    Cancelled,

    /// Order was sent back after delivery.
    Returned,
}

impl OrderStatus {
    /// Returns true if no further status changes are allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns true if a transition from `self` to `next` is accepted.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        !(matches!(self, OrderStatus::Shipped) && matches!(next, OrderStatus::Pending))
    }

    /// Returns true if the order's fields and items may still be edited.
    pub fn can_update(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the order may be deleted.
    pub fn can_delete(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Cancelled)
    }

    /// Returns the status name as stored and serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Returned => "RETURNED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a string does not name a known order status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError(pub String);

impl std::fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown order status: {}", self.0)
    }
}

impl std::error::Error for ParseStatusError {}

impl std::str::FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "PROCESSING" => Ok(OrderStatus::Processing),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            "RETURNED" => Ok(OrderStatus::Returned),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Returned,
    ];

    #[test]
    fn test_default_status_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
        assert!(!OrderStatus::Returned.is_terminal());
    }

    #[test]
    fn test_no_transition_out_of_terminal() {
        for next in ALL {
            assert!(!OrderStatus::Delivered.can_transition_to(next));
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_shipped_cannot_regress_to_pending() {
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Pending));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_other_transitions_accepted() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Pending));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Returned.can_transition_to(OrderStatus::Processing));
    }

    #[test]
    fn test_can_update() {
        assert!(OrderStatus::Pending.can_update());
        assert!(OrderStatus::Shipped.can_update());
        assert!(!OrderStatus::Delivered.can_update());
        assert!(!OrderStatus::Cancelled.can_update());
    }

    #[test]
    fn test_can_delete_only_pending_or_cancelled() {
        assert!(OrderStatus::Pending.can_delete());
        assert!(OrderStatus::Cancelled.can_delete());
        assert!(!OrderStatus::Confirmed.can_delete());
        assert!(!OrderStatus::Delivered.can_delete());
    }

    #[test]
    fn test_display_and_parse_roundtrip() {
        for status in ALL {
            let parsed: OrderStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("SHIPPING".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_serialization_uses_screaming_case() {
        let json = serde_json::to_string(&OrderStatus::Pending).unwrap();
        assert_eq!(json, "\"PENDING\"");
    }
}
