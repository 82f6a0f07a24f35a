//! Type-safe identifier wrappers around `u64`.
//!
//! Every simulated object has a strongly-typed ID so identifiers from
//! different collections cannot be mixed at compile time. IDs are allocated
//! from a monotonically increasing counter owned by the world, which makes
//! them double as a creation-order key: a higher ID was spawned later. The
//! merge protocol relies on that ordering for its size tie-break, and the
//! eviction policy relies on it to find the oldest animals.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around `u64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw counter value.
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// Return the inner counter value.
            pub const fn into_inner(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an animal (a non-player simulated actor).
    EntityId
}

define_id! {
    /// Unique identifier for a static hazard (rock, tree, pond).
    HazardId
}

define_id! {
    /// Unique identifier for a collectible power-up.
    PowerUpId
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ids_order_by_creation_counter() {
        let older = EntityId::from_raw(3);
        let newer = EntityId::from_raw(9);
        assert!(newer > older);
        assert_eq!(older.into_inner(), 3);
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = EntityId::from_raw(42);
        let json = serde_json::to_string(&original).unwrap();
        assert_eq!(json, "42");
        let restored: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn id_display_matches_counter() {
        let id = HazardId::from_raw(17);
        assert_eq!(id.to_string(), "17");
        assert_eq!(u64::from(id), 17);
    }
}
