//! Error types for the `menagerie-world` crate.
//!
//! All fallible lookups and relation updates in this crate return
//! [`WorldError`]. Callers in the per-frame path treat these as recoverable:
//! the offending entity is healed back to wandering and the error is logged.

use menagerie_types::EntityId;

/// Errors that can occur during world-state operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// No animal with the given id exists.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The animal exists but has already been consumed or absorbed this frame.
    #[error("entity {0} is no longer alive")]
    EntityDead(EntityId),

    /// An animal cannot be paired with itself.
    #[error("entity {0} cannot be paired with itself")]
    SelfPairing(EntityId),

    /// One side of a requested pairing already has a partner.
    #[error("entity {entity} is already paired with {partner}")]
    AlreadyPaired {
        /// The entity that is already paired.
        entity: EntityId,
        /// Its current partner.
        partner: EntityId,
    },
}
