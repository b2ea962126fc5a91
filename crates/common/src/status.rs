//! Order status state machine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The status of an order in its lifecycle.
///
/// Status transitions:
/// ```text
/// In Progress ──┬──► Dispatched ──► Delivered
///               │
///               └──► Cancelled
/// ```
///
/// `Delivered` and `Cancelled` are terminal. Which transitions a given actor
/// may request is enforced by the domain layer; this type only knows the
/// wire strings and the terminal set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order has been placed and is being prepared.
    #[default]
    #[serde(rename = "In Progress")]
    InProgress,

    /// Order has left the restaurant.
    #[serde(rename = "Dispatched")]
    Dispatched,

    /// Order reached the customer (terminal).
    #[serde(rename = "Delivered")]
    Delivered,

    /// Order was cancelled (terminal).
    #[serde(rename = "Cancelled")]
    Cancelled,
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown order status: {0}")]
pub struct ParseOrderStatusError(pub String);

impl OrderStatus {
    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns the status as its wire/storage string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::InProgress => "In Progress",
            OrderStatus::Dispatched => "Dispatched",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ParseOrderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "In Progress" => Ok(OrderStatus::InProgress),
            "Dispatched" => Ok(OrderStatus::Dispatched),
            "Delivered" => Ok(OrderStatus::Delivered),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(ParseOrderStatusError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_in_progress() {
        assert_eq!(OrderStatus::default(), OrderStatus::InProgress);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!OrderStatus::InProgress.is_terminal());
        assert!(!OrderStatus::Dispatched.is_terminal());
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn display_uses_wire_strings() {
        assert_eq!(OrderStatus::InProgress.to_string(), "In Progress");
        assert_eq!(OrderStatus::Dispatched.to_string(), "Dispatched");
        assert_eq!(OrderStatus::Delivered.to_string(), "Delivered");
        assert_eq!(OrderStatus::Cancelled.to_string(), "Cancelled");
    }

    #[test]
    fn parse_roundtrip() {
        for status in [
            OrderStatus::InProgress,
            OrderStatus::Dispatched,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
    }

    #[test]
    fn parse_unknown_fails() {
        let err = "Shipped".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err, ParseOrderStatusError("Shipped".to_string()));
    }

    #[test]
    fn json_uses_wire_strings() {
        let json = serde_json::to_string(&OrderStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let back: OrderStatus = serde_json::from_str("\"Cancelled\"").unwrap();
        assert_eq!(back, OrderStatus::Cancelled);
    }
}
