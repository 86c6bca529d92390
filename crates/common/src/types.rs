use serde::{Deserialize, Serialize};

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw integer identifier.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw integer value.
            pub const fn as_i64(&self) -> i64 {
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

integer_id!(
    /// Identifier of a persisted order, assigned by the order store.
    OrderId
);

integer_id!(
    /// Identifier of a product owned by the remote inventory service.
    ProductId
);

integer_id!(
    /// Identifier of the user placing an order.
    ///
    /// `0` is used for anonymous orders.
    UserId
);

impl UserId {
    /// The user id recorded when the caller does not supply one.
    pub const ANONYMOUS: UserId = UserId(0);
}

impl Default for UserId {
    fn default() -> Self {
        Self::ANONYMOUS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_preserve_raw_value() {
        assert_eq!(OrderId::new(42).as_i64(), 42);
        assert_eq!(i64::from(ProductId::from(7)), 7);
    }

    #[test]
    fn ids_serialize_as_bare_integers() {
        let json = serde_json::to_string(&ProductId::new(3)).unwrap();
        assert_eq!(json, "3");

        let id: OrderId = serde_json::from_str("19").unwrap();
        assert_eq!(id, OrderId::new(19));
    }

    #[test]
    fn user_id_defaults_to_anonymous() {
        assert_eq!(UserId::default(), UserId::ANONYMOUS);
        assert_eq!(UserId::default().as_i64(), 0);
    }

    #[test]
    fn display_prints_raw_value() {
        assert_eq!(UserId::new(12).to_string(), "12");
    }
}
