//! World state for the Menagerie simulation.
//!
//! This crate owns every actor in the arena and the invariants that hold
//! between them: sizes stay inside their class band, the population stays
//! under its cap, and merge pairings are mutual and never dangle.
//!
//! # Modules
//!
//! - [`animal`] -- Transfer-spawned animals and their per-frame state.
//! - [`arena`] -- Square arena bounds, boundary reflection, random placement.
//! - [`error`] -- Error types for lookups and pairing updates.
//! - [`hazard`] -- Static obstacles and their scattering at world creation.
//! - [`player`] -- The player: natural and effective size, lives, invulnerability.
//! - [`powerup`] -- Collectible power-ups with a lifetime.
//! - [`sizing`] -- Value to size-class banding and size clamping.
//! - [`world_state`] -- [`WorldState`], the container passed to every
//!   per-frame component, with oldest-first eviction.

pub mod animal;
pub mod arena;
pub mod error;
pub mod hazard;
pub mod player;
pub mod powerup;
pub mod sizing;
pub mod world_state;

// Re-export primary types at crate root.
pub use animal::{Animal, AnimalParams, Sighting};
pub use arena::{Arena, BoundaryContact};
pub use error::WorldError;
pub use hazard::{Hazard, HazardLayout};
pub use player::{Player, PlayerParams};
pub use powerup::PowerUp;
pub use sizing::{MIN_SIZE, SizeBand};
pub use world_state::{CapacityPolicy, SpawnOutcome, Terrain, WorldParams, WorldState};
