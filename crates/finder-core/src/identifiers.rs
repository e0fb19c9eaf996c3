//! Numeric identifiers assigned by the backend.
//!
//! The server uses 64-bit surrogate keys. Each record kind gets its own
//! newtype so an item id can never be passed where a claim id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! backend_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw backend key.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Raw backend key.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }
    };
}

backend_id!(
    /// Registered user
    UserId
);
backend_id!(
    /// Reported item
    ItemId
);
backend_id!(
    /// Ownership claim
    ClaimId
);
backend_id!(
    /// Item category
    CategoryId
);
backend_id!(
    /// Department (campus)
    DepartmentId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_bare_numbers() {
        let json = serde_json::to_string(&ItemId::new(42)).unwrap();
        assert_eq!(json, "42");
        let id: ClaimId = serde_json::from_str("7").unwrap();
        assert_eq!(id, ClaimId(7));
        assert_eq!(id.to_string(), "7");
    }
}
