//! Snapshot, effect, and score types exposed to host collaborators.
//!
//! The renderer never touches simulation state directly: it reads a
//! [`WorldSnapshot`] each frame and reacts to drained [`Effect`]s for
//! one-shot feedback. The scoring collaborator pulls a [`ScoreSummary`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    ActorKind, BehaviorState, DifficultyMode, EvictionReason, PowerUpKind, SizeClass,
    ThreatLevel, TransferKind,
};
use crate::geometry::Vec2;
use crate::ids::{EntityId, HazardId, PowerUpId};

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Render-facing view of one animal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EntitySnapshot {
    /// Animal id.
    pub id: EntityId,
    /// Always [`ActorKind::Animal`] for entity snapshots.
    pub kind: ActorKind,
    /// Currency archetype.
    pub currency: TransferKind,
    /// Size class the animal was spawned in (or promoted to by a merge).
    pub size_class: SizeClass,
    /// Ground-plane position.
    pub position: Vec2,
    /// Height above the ground plane (non-zero while hopping).
    pub elevation: f32,
    /// Heading in radians.
    pub heading: f32,
    /// Current size.
    pub size: f32,
    /// Current behavior state.
    pub behavior_state: BehaviorState,
    /// How the animal compares to the player right now.
    pub threat: ThreatLevel,
}

/// Render-facing view of the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerSnapshot {
    /// Ground-plane position.
    pub position: Vec2,
    /// Heading in radians.
    pub heading: f32,
    /// Size from eating only.
    pub natural_size: f32,
    /// Natural size times the active power-up multiplier.
    pub effective_size: f32,
    /// Remaining lives.
    pub lives: u32,
    /// Whether contact with predators is currently harmless.
    pub invulnerable: bool,
    /// Whether the player is still in the game.
    pub alive: bool,
}

/// Render-facing view of a static hazard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HazardSnapshot {
    /// Hazard id.
    pub id: HazardId,
    /// Center position.
    pub position: Vec2,
    /// Collision radius.
    pub radius: f32,
}

/// Render-facing view of a power-up waiting to be collected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PowerUpSnapshot {
    /// Power-up id.
    pub id: PowerUpId,
    /// What collecting it does.
    pub kind: PowerUpKind,
    /// Center position.
    pub position: Vec2,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldSnapshot {
    /// Frame number the snapshot was taken after.
    pub frame: u64,
    /// Simulation time in seconds.
    pub time: f64,
    /// Current difficulty mode.
    pub mode: DifficultyMode,
    /// The player.
    pub player: PlayerSnapshot,
    /// Every live animal, in creation order.
    pub entities: Vec<EntitySnapshot>,
    /// Static hazards.
    pub hazards: Vec<HazardSnapshot>,
    /// Uncollected power-ups.
    pub power_ups: Vec<PowerUpSnapshot>,
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// Who consumed an animal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "by", content = "id", rename_all = "snake_case")]
pub enum Consumer {
    /// The player ate it.
    Player,
    /// Another animal ate it during a hunt.
    Animal(EntityId),
}

/// A discrete notification for one-shot visual or audio feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// An animal was admitted from the spawn queue.
    Spawned {
        /// The new animal.
        id: EntityId,
        /// Where it appeared.
        position: Vec2,
        /// Its starting size.
        size: f32,
    },
    /// An animal was eaten.
    Consumed {
        /// The eaten animal.
        id: EntityId,
        /// Who ate it.
        consumer: Consumer,
        /// Where it happened.
        position: Vec2,
        /// Transfer value of the eaten animal.
        value: f64,
    },
    /// Two animals were paired by the alliance protocol.
    Paired {
        /// The larger partner.
        first: EntityId,
        /// The smaller partner.
        second: EntityId,
    },
    /// Two partners merged into one.
    Merged {
        /// The animal that absorbed its partner.
        survivor: EntityId,
        /// The absorbed partner, now gone.
        absorbed: EntityId,
        /// The survivor's size after the merge.
        new_size: f32,
    },
    /// An animal was removed without being eaten.
    Evicted {
        /// The removed animal.
        id: EntityId,
        /// Why it was removed.
        reason: EvictionReason,
    },
    /// The player touched a predator and lost a life.
    PlayerHit {
        /// The predator.
        by: EntityId,
        /// Lives left after the hit.
        lives_left: u32,
    },
    /// The player respawned at the arena center.
    PlayerRespawned {
        /// Seconds of invulnerability granted.
        invulnerable_for: f32,
    },
    /// The player lost their last life.
    PlayerDied {
        /// Where it happened.
        position: Vec2,
    },
    /// The player collected a power-up.
    PowerUpCollected {
        /// The collected power-up.
        id: PowerUpId,
        /// Its kind.
        kind: PowerUpKind,
    },
    /// The difficulty mode changed.
    ModeChanged {
        /// Mode before the change.
        from: DifficultyMode,
        /// Mode after the change.
        to: DifficultyMode,
    },
    /// The simulation ended; no further frames change state.
    GameOver {
        /// Final score.
        score: ScoreSummary,
    },
}

// ---------------------------------------------------------------------------
// Score
// ---------------------------------------------------------------------------

/// Cumulative player score, pulled on demand by the scoring collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScoreSummary {
    /// Sum of transfer values of every animal the player ate.
    pub value_consumed: f64,
    /// Number of animals the player ate.
    pub entities_eaten: u32,
    /// Largest effective size the player reached.
    pub peak_size: f32,
    /// Simulation seconds survived.
    pub survival_seconds: f64,
}
