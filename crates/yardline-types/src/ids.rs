//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Carriers and login sessions carry strongly-typed IDs so the two can
//! never be mixed up at a call site. All IDs use UUID v7 (time-ordered),
//! which keeps the `carriers` table roughly in registration order.
//!
//! Loads and queue records are NOT identified by UUID: they are keyed by
//! their positional sequence number (`1..=N`).

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl core::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a carrier registration (one driver row).
    CarrierId
}

define_id! {
    /// Unique identifier for a login session.
    SessionId
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let carrier = CarrierId::new();
        let session = SessionId::new();
        assert_ne!(carrier.into_inner(), Uuid::nil());
        assert_ne!(session.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_parses_from_its_display_form() {
        let id = CarrierId::new();
        let parsed: CarrierId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn garbage_does_not_parse() {
        assert!("not-a-uuid".parse::<CarrierId>().is_err());
    }
}
