//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Declares a UUID-backed identifier with the usual constructors.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
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

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for an order (one purchase occasion).
    OrderId
);

uuid_id!(
    /// Unique identifier for a payment intent.
    PaymentIntentId
);

uuid_id!(
    /// Unique identifier for a recurring subscription.
    SubscriptionId
);

uuid_id!(
    /// Unique identifier for a saved payment method.
    PaymentMethodId
);

uuid_id!(
    /// Reference to a delivery address owned by the address book.
    AddressId
);

uuid_id!(
    /// Reference to a delivery window slot.
    DeliveryWindowId
);

impl AddressId {
    /// The all-zero address used when a subscription carries no shipping metadata.
    pub fn unset() -> Self {
        Self(Uuid::nil())
    }
}

impl DeliveryWindowId {
    /// The all-zero window used when a subscription carries no shipping metadata.
    pub fn unset() -> Self {
        Self(Uuid::nil())
    }
}

/// User identifier (the `sub` claim of the caller's token).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(PaymentIntentId::new(), PaymentIntentId::new());
        assert_ne!(OrderId::new(), OrderId::new());
    }

    #[test]
    fn id_round_trips_through_display_and_from_str() {
        let id = SubscriptionId::new();
        let parsed: SubscriptionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn from_str_rejects_non_uuid() {
        assert!("abc".parse::<PaymentIntentId>().is_err());
    }

    #[test]
    fn unset_address_is_nil_uuid() {
        assert!(AddressId::unset().as_uuid().is_nil());
        assert!(DeliveryWindowId::unset().as_uuid().is_nil());
    }

    #[test]
    fn user_id_rejects_blank() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("   ").is_err());
        assert_eq!(UserId::new("user-1").unwrap().as_str(), "user-1");
    }

    #[test]
    fn ids_serialize_transparently() {
        let uuid = Uuid::new_v4();
        let id = OrderId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }
}
