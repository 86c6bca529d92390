//! Value objects for the order domain.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::OrderError;

/// Money amount represented in cents to avoid floating point issues.
///
/// On the wire money is a decimal number with two fractional digits
/// (`100.00`), matching the inventory service's price field and the
/// `total_price` of persisted orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Largest order total that can be persisted (`NUMERIC(12,2)`).
    pub const MAX_ORDER_TOTAL: Money = Money::from_cents(999_999_999_999);

    /// Creates a new Money amount from cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from a dollar value.
    pub const fn from_dollars(dollars: i64) -> Self {
        Self {
            cents: dollars * 100,
        }
    }

    /// Converts a decimal amount, rounding to the nearest cent.
    ///
    /// Returns `None` for non-finite values or amounts outside the `i64` cent range.
    pub fn from_decimal(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let cents = (amount * 100.0).round();
        if cents < i64::MIN as f64 || cents > i64::MAX as f64 {
            return None;
        }
        Some(Self {
            cents: cents as i64,
        })
    }

    /// Returns zero money.
    pub const fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub const fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the dollar portion (whole number).
    pub const fn dollars(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after dollars).
    pub const fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns the amount as a decimal number.
    pub fn as_decimal(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    pub fn checked_multiply(&self, quantity: Quantity) -> Option<Money> {
        self.cents
            .checked_mul(i64::from(quantity.get()))
            .map(Money::from_cents)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-{}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "{}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Money::from_decimal(amount)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid money amount: {amount}")))
    }
}

/// A strictly positive number of units, small enough for an `INTEGER` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quantity(i32);

impl Quantity {
    /// Validates a raw quantity.
    pub fn new(quantity: i64) -> Result<Self, OrderError> {
        match i32::try_from(quantity) {
            Ok(q) if q > 0 => Ok(Self(q)),
            _ => Err(OrderError::InvalidQuantity { quantity }),
        }
    }

    /// Returns the number of units.
    pub const fn get(&self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for Quantity {
    type Error = OrderError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Quantity::new(value)
    }
}

impl From<Quantity> for i64 {
    fn from(q: Quantity) -> Self {
        i64::from(q.0)
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_cents() {
        let money = Money::from_cents(1234);
        assert_eq!(money.cents(), 1234);
        assert_eq!(money.dollars(), 12);
        assert_eq!(money.cents_part(), 34);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(50000).to_string(), "500.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-12.34");
    }

    #[test]
    fn test_money_from_decimal_rounds_to_cents() {
        assert_eq!(Money::from_decimal(100.0), Some(Money::from_dollars(100)));
        assert_eq!(Money::from_decimal(19.99), Some(Money::from_cents(1999)));
        assert_eq!(Money::from_decimal(0.1 + 0.2), Some(Money::from_cents(30)));
        assert_eq!(Money::from_decimal(f64::NAN), None);
        assert_eq!(Money::from_decimal(f64::INFINITY), None);
    }

    #[test]
    fn test_money_checked_multiply() {
        let price = Money::from_dollars(100);
        let quantity = Quantity::new(5).unwrap();
        assert_eq!(price.checked_multiply(quantity), Some(Money::from_dollars(500)));

        let huge = Money::from_cents(i64::MAX / 2);
        assert_eq!(huge.checked_multiply(Quantity::new(3).unwrap()), None);
    }

    #[test]
    fn test_money_wire_format_is_decimal() {
        let json = serde_json::to_string(&Money::from_cents(1999)).unwrap();
        assert_eq!(json, "19.99");

        let parsed: Money = serde_json::from_str("100.00").unwrap();
        assert_eq!(parsed, Money::from_dollars(100));

        let integral: Money = serde_json::from_str("7").unwrap();
        assert_eq!(integral, Money::from_dollars(7));
    }

    #[test]
    fn test_quantity_must_be_positive() {
        assert!(Quantity::new(1).is_ok());
        assert_eq!(
            Quantity::new(0),
            Err(OrderError::InvalidQuantity { quantity: 0 })
        );
        assert!(Quantity::new(-3).is_err());
        assert!(Quantity::new(i64::from(i32::MAX) + 1).is_err());
    }

    #[test]
    fn test_quantity_rejects_zero_on_deserialize() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert_eq!(
            serde_json::from_str::<Quantity>("4").unwrap(),
            Quantity::new(4).unwrap()
        );
    }
}
