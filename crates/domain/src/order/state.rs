//! Persisted order status.

use serde::{Deserialize, Serialize};

use crate::error::OrderError;

/// The status recorded on an order row.
///
/// A row only ever exists for an accepted order, so `Confirmed` is the only
/// status this workflow writes. Rejected requests never produce a row, and a
/// failed stock update or event publish after commit leaves the order
/// `Confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Validated against the inventory and committed to the store.
    #[default]
    Confirmed,
}

impl OrderStatus {
    /// Returns the status as stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Confirmed => "confirmed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(OrderStatus::Confirmed),
            other => Err(OrderError::UnknownStatus(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_confirmed() {
        assert_eq!(OrderStatus::default(), OrderStatus::Confirmed);
    }

    #[test]
    fn test_column_value_round_trips() {
        let parsed: OrderStatus = OrderStatus::Confirmed.as_str().parse().unwrap();
        assert_eq!(parsed, OrderStatus::Confirmed);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let err = "pending".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err, OrderError::UnknownStatus("pending".to_string()));
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Confirmed).unwrap();
        assert_eq!(json, "\"confirmed\"");
    }
}
