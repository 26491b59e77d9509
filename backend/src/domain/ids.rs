//! Strongly typed entity identifiers.
//!
//! Identifiers are monotonically increasing integers assigned by the store;
//! "newest first" view ordering sorts descending on them.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw identifier value.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Raw identifier value.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Identifier of a registered user.
    UserId
);
define_id!(
    /// Identifier of a rentable item.
    ItemId
);
define_id!(
    /// Identifier of a listing (an owner's offer to rent out an item).
    ListingId
);
define_id!(
    /// Identifier of a rental request against a listing.
    RequestId
);
define_id!(
    /// Identifier of a favorite (a user's bookmark of a listing).
    FavoriteId
);
define_id!(
    /// Identifier of a complaint filed against a rental request.
    ComplaintId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_transparently() {
        let id = ListingId::new(42);
        let json = serde_json::to_string(&id).expect("serializes");
        assert_eq!(json, "42");
        let back: ListingId = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, id);
    }

    #[test]
    fn ids_order_by_value() {
        assert!(RequestId::new(2) > RequestId::new(1));
    }
}
