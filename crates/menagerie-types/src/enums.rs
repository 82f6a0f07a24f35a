//! Enumeration types for the Menagerie simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Transfer kinds
// ---------------------------------------------------------------------------

/// The currency of an incoming transfer event.
///
/// The kind drives the visual archetype of the spawned animal; it has no
/// effect on simulation stats. Unknown symbols are mapped to [`Other`]
/// instead of being rejected.
///
/// [`Other`]: TransferKind::Other
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    /// USD Coin.
    Usdc,
    /// Tether.
    Usdt,
    /// DAI.
    Dai,
    /// Any symbol the ingestion feed reports that is not recognised.
    Other,
}

impl TransferKind {
    /// Map a ticker symbol (case-insensitive) to a transfer kind.
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol.trim().to_ascii_uppercase().as_str() {
            "USDC" => Self::Usdc,
            "USDT" => Self::Usdt,
            "DAI" => Self::Dai,
            _ => Self::Other,
        }
    }

    /// Canonical ticker symbol for display.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Usdc => "USDC",
            Self::Usdt => "USDT",
            Self::Dai => "DAI",
            Self::Other => "OTHER",
        }
    }
}

// ---------------------------------------------------------------------------
// Size classes
// ---------------------------------------------------------------------------

/// Coarse size bucket derived from a transfer value.
///
/// Ordered from smallest to largest so that `max` and comparisons work
/// naturally when merges combine two classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    /// Dust transfers (`log10(value+1) < 1`).
    Tiny,
    /// Pocket change.
    Small,
    /// Everyday transfers.
    Medium,
    /// Noticeable transfers.
    Large,
    /// Whale-adjacent transfers.
    Huge,
    /// Whales.
    Colossal,
}

impl SizeClass {
    /// All classes, smallest first.
    pub const ALL: [Self; 6] = [
        Self::Tiny,
        Self::Small,
        Self::Medium,
        Self::Large,
        Self::Huge,
        Self::Colossal,
    ];

    /// The next class up, saturating at [`SizeClass::Colossal`].
    pub const fn promoted(self) -> Self {
        match self {
            Self::Tiny => Self::Small,
            Self::Small => Self::Medium,
            Self::Medium => Self::Large,
            Self::Large => Self::Huge,
            Self::Huge | Self::Colossal => Self::Colossal,
        }
    }
}

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// Per-entity behavior state.
///
/// Every animal starts in [`Wandering`] and cycles through the other states
/// until it is consumed, absorbed in a merge, or evicted.
///
/// [`Wandering`]: BehaviorState::Wandering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum BehaviorState {
    /// Free roaming with wander drift and obstacle avoidance.
    #[default]
    Wandering,
    /// Running away from a larger player.
    Fleeing,
    /// Pursuing a smaller player.
    Chasing,
    /// Pursuing a smaller animal (survival mode only).
    Hunting,
    /// Brief stop after catching prey.
    Eating,
    /// Brief pause while the body grows into its new size.
    Growing,
    /// Moving toward an assigned merge partner (alliance mode only).
    Merging,
}

impl BehaviorState {
    /// Whether the state belongs to the hunt cycle (hunting, eating, growing).
    pub const fn is_hunt_cycle(self) -> bool {
        matches!(self, Self::Hunting | Self::Eating | Self::Growing)
    }
}

/// Simulation-wide difficulty mode, owned by the difficulty controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum DifficultyMode {
    /// Animals only react to the player.
    #[default]
    Normal,
    /// Animals may hunt smaller animals to catch up with the player.
    Survival,
    /// Animals pair up and merge to challenge a dominant player.
    Alliance,
}

/// How an entity compares to the player, mirroring the collision bands.
///
/// Classification is a pure function of the two sizes, so evaluating it
/// twice with unchanged inputs always yields the same level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ThreatLevel {
    /// Safely edible (`ratio < 0.95`).
    Prey,
    /// Too close to call; contact bounces (`0.95 <= ratio < 1.05`).
    Even,
    /// Contested consume (`1.05 <= ratio < 1.2`).
    Risky,
    /// Contact costs the player a life (`ratio >= 1.2`).
    Predator,
}

// ---------------------------------------------------------------------------
// Actors and pickups
// ---------------------------------------------------------------------------

/// The kind of object a snapshot describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// A transfer-spawned animal.
    Animal,
    /// A static hazard.
    Hazard,
    /// A collectible power-up.
    PowerUp,
    /// The player.
    Player,
}

/// Temporary player power-ups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    /// Multiplies the player's effective size for a while.
    SizeBoost,
    /// Grants temporary invulnerability.
    Shield,
    /// Restores one life, up to the maximum.
    ExtraLife,
}

impl PowerUpKind {
    /// All power-up kinds, in spawn rotation order.
    pub const ALL: [Self; 3] = [Self::SizeBoost, Self::Shield, Self::ExtraLife];
}

/// Why an animal left the world without being eaten or merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum EvictionReason {
    /// Oldest-first batch eviction once the population neared its cap.
    PopulationCap,
    /// The world was reset.
    Restart,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_kind_from_symbol_is_case_insensitive() {
        assert_eq!(TransferKind::from_symbol("usdc"), TransferKind::Usdc);
        assert_eq!(TransferKind::from_symbol(" USDT "), TransferKind::Usdt);
        assert_eq!(TransferKind::from_symbol("Dai"), TransferKind::Dai);
        assert_eq!(TransferKind::from_symbol("PYUSD"), TransferKind::Other);
    }

    #[test]
    fn size_class_promotion_saturates() {
        assert_eq!(SizeClass::Tiny.promoted(), SizeClass::Small);
        assert_eq!(SizeClass::Colossal.promoted(), SizeClass::Colossal);
        assert!(SizeClass::Huge > SizeClass::Large);
    }

    #[test]
    fn hunt_cycle_states() {
        assert!(BehaviorState::Hunting.is_hunt_cycle());
        assert!(BehaviorState::Growing.is_hunt_cycle());
        assert!(!BehaviorState::Merging.is_hunt_cycle());
        assert_eq!(BehaviorState::default(), BehaviorState::Wandering);
    }

    #[test]
    fn enums_serialize_snake_case() {
        let json = serde_json::to_string(&BehaviorState::Merging).ok();
        assert_eq!(json.as_deref(), Some("\"merging\""));
        let json = serde_json::to_string(&DifficultyMode::Alliance).ok();
        assert_eq!(json.as_deref(), Some("\"alliance\""));
    }
}
