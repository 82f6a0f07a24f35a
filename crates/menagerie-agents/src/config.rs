//! Tunable parameters for per-animal logic.
//!
//! These mirror the `behavior`, `steering`, `collision`, and `merge` keys of
//! `menagerie-config.yaml`. Every struct implements [`Default`] with the
//! gameplay-tuned values and deserializes with missing keys falling back to
//! those defaults, so a config file only needs to name what it changes.
//!
//! Dominance-scaled constants are expressed as [`TierTable`]s rather than
//! hard-coded branches.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Tier tables
// ---------------------------------------------------------------------------

/// One step of a [`TierTable`]: applies while the input is below `below`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Tier<T> {
    /// Exclusive upper bound of the step.
    pub below: f32,
    /// Value for inputs in this step.
    pub value: T,
}

/// A step function over a ratio: the first tier whose `below` exceeds the
/// input wins, otherwise `otherwise`. Tiers must be listed in ascending order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TierTable<T> {
    /// Ascending steps.
    pub tiers: Vec<Tier<T>>,
    /// Value at or above the last step.
    pub otherwise: T,
}

impl<T: Copy> TierTable<T> {
    /// Build a table from `(below, value)` pairs.
    pub fn new(tiers: &[(f32, T)], otherwise: T) -> Self {
        Self {
            tiers: tiers
                .iter()
                .map(|&(below, value)| Tier { below, value })
                .collect(),
            otherwise,
        }
    }

    /// Value for `input`. NaN falls through to `otherwise`.
    pub fn lookup(&self, input: f32) -> T {
        self.tiers
            .iter()
            .find(|tier| input < tier.below)
            .map_or(self.otherwise, |tier| tier.value)
    }
}

/// Chase attenuation for one predator-ratio tier.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ChaseAttenuation {
    /// Multiplier on the nominal chase radius.
    pub radius: f32,
    /// Multiplier on the nominal chase speed.
    pub speed: f32,
}

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// Detection, fleeing, chasing, and hunting parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Flee radius as a fraction of the detection radius.
    pub flee_radius_factor: f32,
    /// Nominal chase radius as a fraction of the detection radius.
    pub chase_radius_factor: f32,
    /// Maximum proximity panic bonus on flee speed.
    pub max_panic_bonus: f32,
    /// Seconds a fleeing animal keeps running from the last sighting.
    pub flee_memory_secs: f64,
    /// Seconds of player velocity added to the chase aim point.
    pub predictive_lead_secs: f32,
    /// Heading turn rate while fleeing or chasing (fraction of arc per second).
    pub pursuit_turn_rate: f32,
    /// Rate at which speed relaxes back to cruising speed per second.
    pub speed_decay_rate: f32,
    /// Chase radius and speed multipliers by `animal / player` size ratio.
    pub chase_attenuation: TierTable<ChaseAttenuation>,
    /// Per-frame probability that a wandering animal starts a hunt.
    pub hunt_chance: f64,
    /// Seconds after a hunt before the next one may start.
    pub hunt_cooldown_secs: f64,
    /// Radius searched for prey.
    pub hunt_radius: f32,
    /// Prey must be at most this fraction of the hunter's size.
    pub prey_size_ratio: f32,
    /// Hunters give up when prey gets this many hunt radii away.
    pub hunt_give_up_factor: f32,
    /// Speed boost on top of the hunt speed.
    pub hunt_speed_boost: f32,
    /// Heading turn rate while hunting.
    pub hunt_turn_rate: f32,
    /// Extra distance beyond touching at which prey is caught.
    pub catch_margin: f32,
    /// Hunter growth per `log10(prey value + 1)`.
    pub hunter_growth_factor: f32,
    /// Seconds spent eating after a catch.
    pub eat_secs: f64,
    /// Seconds spent growing after eating.
    pub grow_secs: f64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            flee_radius_factor: 0.75,
            chase_radius_factor: 0.85,
            max_panic_bonus: 0.15,
            flee_memory_secs: 2.0,
            predictive_lead_secs: 0.3,
            pursuit_turn_rate: 4.0,
            speed_decay_rate: 1.5,
            chase_attenuation: TierTable::new(
                &[
                    (1.5, ChaseAttenuation { radius: 1.0, speed: 1.0 }),
                    (2.0, ChaseAttenuation { radius: 0.6, speed: 0.8 }),
                    (3.0, ChaseAttenuation { radius: 0.3, speed: 0.5 }),
                    (4.0, ChaseAttenuation { radius: 0.15, speed: 0.3 }),
                ],
                ChaseAttenuation { radius: 0.1, speed: 0.2 },
            ),
            hunt_chance: 0.05,
            hunt_cooldown_secs: 4.0,
            hunt_radius: 15.0,
            prey_size_ratio: 0.8,
            hunt_give_up_factor: 1.5,
            hunt_speed_boost: 1.15,
            hunt_turn_rate: 8.0,
            catch_margin: 0.5,
            hunter_growth_factor: 0.15,
            eat_secs: 0.3,
            grow_secs: 0.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Steering
// ---------------------------------------------------------------------------

/// Wander drift, obstacle avoidance, and hop parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Maximum wander drift in radians per second.
    pub wander_turn_rate: f32,
    /// Avoidance radius as a multiple of the animal's size (plus hazard radius).
    pub avoidance_radius_factor: f32,
    /// Fraction of the avoidance direction blended into the heading per frame.
    pub avoidance_damping: f32,
    /// Random jitter in radians applied when bouncing off a hazard.
    pub contact_jitter: f32,
    /// Upward speed of a hop.
    pub hop_impulse: f32,
    /// Seconds between hops.
    pub hop_cooldown_secs: f64,
    /// Downward acceleration pulling a hopping animal back to the ground.
    pub gravity: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            wander_turn_rate: 1.5,
            avoidance_radius_factor: 4.0,
            avoidance_damping: 0.15,
            contact_jitter: core::f32::consts::FRAC_PI_4,
            hop_impulse: 4.0,
            hop_cooldown_secs: 1.0,
            gravity: 9.8,
        }
    }
}

// ---------------------------------------------------------------------------
// Collision
// ---------------------------------------------------------------------------

/// Size-ratio bands for player-versus-animal contact.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Below this ratio the player eats the animal.
    pub consume_below: f32,
    /// Below this ratio (and above `consume_below`) the two bounce.
    pub bounce_below: f32,
    /// Below this ratio contact is contested; at or above the animal wins.
    pub contested_below: f32,
    /// Chance that a contested contact ends in a consume.
    pub contested_consume_chance: f64,
    /// Player growth per `log10(value + 1)` eaten.
    pub player_growth_factor: f32,
    /// Seconds of invulnerability after a respawn.
    pub respawn_invulnerability_secs: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            consume_below: 0.95,
            bounce_below: 1.05,
            contested_below: 1.2,
            contested_consume_chance: 0.7,
            player_growth_factor: 0.1,
            respawn_invulnerability_secs: 3.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Alliance merge movement and sizing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Extra distance beyond touching at which partners merge.
    pub merge_margin: f32,
    /// Chase-speed multiplier by how outmatched the animal is
    /// (`player / animal` size).
    pub panic_speed: TierTable<f32>,
    /// Merged size cap as a multiple of player size, by dominance factor.
    pub size_cap: TierTable<f32>,
    /// Heading turn rate while closing on a partner.
    pub merge_turn_rate: f32,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            merge_margin: 0.5,
            panic_speed: TierTable::new(&[(1.5, 1.0), (2.5, 1.3), (4.0, 1.6)], 2.0),
            size_cap: TierTable::new(&[(1.5, 1.1), (2.5, 1.3), (4.0, 1.5)], 1.8),
            merge_turn_rate: 6.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// All per-animal tunables, passed to behavior and collision each frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentConfig {
    /// Behavior parameters.
    pub behavior: BehaviorConfig,
    /// Steering parameters.
    pub steering: SteeringConfig,
    /// Collision parameters.
    pub collision: CollisionConfig,
    /// Merge parameters.
    pub merge: MergeConfig,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn tier_lookup_picks_first_matching_step() {
        let table = TierTable::new(&[(1.5, 1.0_f32), (2.5, 1.3)], 2.0);
        assert!((table.lookup(1.0) - 1.0).abs() < f32::EPSILON);
        assert!((table.lookup(1.5) - 1.3).abs() < f32::EPSILON);
        assert!((table.lookup(9.0) - 2.0).abs() < f32::EPSILON);
        assert!((table.lookup(f32::NAN) - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn default_attenuation_reaches_floor_at_four() {
        let config = BehaviorConfig::default();
        let at_three = config.chase_attenuation.lookup(3.0);
        assert!((at_three.radius - 0.15).abs() < f32::EPSILON);
        let extreme = config.chase_attenuation.lookup(4.0);
        assert!((extreme.radius - 0.1).abs() < f32::EPSILON);
        assert!((extreme.speed - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: CollisionConfig =
            serde_json::from_str(r#"{"contested_consume_chance": 0.5}"#).unwrap();
        assert!((config.contested_consume_chance - 0.5).abs() < f64::EPSILON);
        assert!((config.consume_below - 0.95).abs() < f32::EPSILON);
    }

    #[test]
    fn tier_tables_deserialize() {
        let table: TierTable<f32> = serde_json::from_str(
            r#"{"tiers": [{"below": 2.0, "value": 0.5}], "otherwise": 0.25}"#,
        )
        .unwrap();
        assert!((table.lookup(1.0) - 0.5).abs() < f32::EPSILON);
        assert!((table.lookup(3.0) - 0.25).abs() < f32::EPSILON);
    }
}
