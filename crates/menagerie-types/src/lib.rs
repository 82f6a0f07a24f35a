//! Shared type definitions for the Menagerie simulation.
//!
//! This crate is the single source of truth for the vocabulary shared by the
//! world, agent logic, orchestration, and the host collaborators. Snapshot
//! and effect types flow downstream to `TypeScript` via `ts-rs` for the
//! browser renderer.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe counter wrappers for animals, hazards, power-ups
//! - [`enums`] -- Transfer kinds, size classes, behavior states, modes
//! - [`geometry`] -- Ground-plane vector and angle helpers
//! - [`transfer`] -- Raw and validated transfer events
//! - [`structs`] -- Snapshots, effects, and the score summary

pub mod enums;
pub mod geometry;
pub mod ids;
pub mod structs;
pub mod transfer;

// Re-export all public types at crate root for convenience.
pub use enums::{
    ActorKind, BehaviorState, DifficultyMode, EvictionReason, PowerUpKind, SizeClass,
    ThreatLevel, TransferKind,
};
pub use geometry::{Vec2, turn_toward, wrap_angle};
pub use ids::{EntityId, HazardId, PowerUpId};
pub use structs::{
    Consumer, Effect, EntitySnapshot, HazardSnapshot, PlayerSnapshot, PowerUpSnapshot,
    ScoreSummary, WorldSnapshot,
};
pub use transfer::{MAX_TRANSFER_VALUE, RawTransfer, TransferAnomaly, TransferEvent};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the renderer-facing types.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::ids::EntityId::export_all();
        let _ = crate::ids::HazardId::export_all();
        let _ = crate::ids::PowerUpId::export_all();

        let _ = crate::enums::TransferKind::export_all();
        let _ = crate::enums::SizeClass::export_all();
        let _ = crate::enums::BehaviorState::export_all();
        let _ = crate::enums::DifficultyMode::export_all();
        let _ = crate::enums::ThreatLevel::export_all();
        let _ = crate::enums::ActorKind::export_all();
        let _ = crate::enums::PowerUpKind::export_all();
        let _ = crate::enums::EvictionReason::export_all();

        let _ = crate::geometry::Vec2::export_all();
        let _ = crate::transfer::TransferEvent::export_all();

        let _ = crate::structs::EntitySnapshot::export_all();
        let _ = crate::structs::PlayerSnapshot::export_all();
        let _ = crate::structs::HazardSnapshot::export_all();
        let _ = crate::structs::PowerUpSnapshot::export_all();
        let _ = crate::structs::WorldSnapshot::export_all();
        let _ = crate::structs::Consumer::export_all();
        let _ = crate::structs::Effect::export_all();
        let _ = crate::structs::ScoreSummary::export_all();
    }
}
