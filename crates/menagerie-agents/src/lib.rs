//! Per-animal logic for the Menagerie simulation.
//!
//! Everything in this crate operates on a [`WorldState`] for one frame
//! without doing any I/O. It sits between `menagerie-world` (which owns the
//! actors) and `menagerie-core` (which orders the phases of a frame).
//!
//! # Modules
//!
//! - [`behavior`] -- The per-animal state machine and the [`FrameContext`]
//!   every update reads.
//! - [`collision`] -- Player-versus-animal contact: consume, bounce,
//!   contested consume, player hit.
//! - [`config`] -- Tunables for behavior, steering, collision, and merges,
//!   including dominance-scaled [`TierTable`]s.
//! - [`hunting`] -- Survival-mode hunts: prey search, pursuit, eat, grow.
//! - [`merge`] -- Alliance-mode partner pursuit and absorption.
//! - [`speed`] -- Fixed per-size-class speed profiles.
//! - [`steering`] -- Wander drift, hazard avoidance, hops, boundary
//!   reflection, player movement.
//! - [`threat`] -- Size-ratio classification and growth from eating.
//!
//! [`WorldState`]: menagerie_world::WorldState

pub mod behavior;
pub mod collision;
pub mod config;
pub mod hunting;
pub mod merge;
pub mod speed;
pub mod steering;
pub mod threat;

#[cfg(test)]
mod test_support;

// Re-export primary types at crate root for convenience.
pub use behavior::{FrameContext, PlayerView, Reaction, update_animal};
pub use collision::{ContactOutcome, resolve_player_contacts};
pub use config::{
    AgentConfig, BehaviorConfig, ChaseAttenuation, CollisionConfig, MergeConfig, SteeringConfig,
    Tier, TierTable,
};
pub use merge::{MergeOutcome, resolve_merge};
pub use speed::{SpeedProfile, base_speed};
pub use threat::{classify_threat, growth_for_value, size_ratio};
