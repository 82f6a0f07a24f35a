//! Configuration loading and typed config structures for the Menagerie simulation.
//!
//! The canonical configuration lives in `menagerie-config.yaml` at the
//! workspace root. Every section and field falls back to the gameplay-tuned
//! default when missing, so a file only has to name what it changes.
//!
//! The per-animal sections (`behavior`, `steering`, `collision`, `merge`)
//! deserialize straight into the `menagerie-agents` config types.

use std::path::Path;

use menagerie_agents::{
    AgentConfig, BehaviorConfig, CollisionConfig, MergeConfig, SteeringConfig, TierTable,
};
use menagerie_world::{CapacityPolicy, HazardLayout, PlayerParams, WorldParams};
use serde::Deserialize;

/// Environment variable that overrides `world.seed`.
pub const SEED_ENV_VAR: &str = "MENAGERIE_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `menagerie-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Arena, population, and hazard settings.
    #[serde(default)]
    pub world: WorldConfig,

    /// Spawn queue admission settings.
    #[serde(default)]
    pub spawn: SpawnConfig,

    /// Player settings.
    #[serde(default)]
    pub player: PlayerConfig,

    /// Detection, fleeing, chasing, and hunting.
    #[serde(default)]
    pub behavior: BehaviorConfig,

    /// Wander drift, hazard avoidance, hops.
    #[serde(default)]
    pub steering: SteeringConfig,

    /// Player-versus-animal contact bands.
    #[serde(default)]
    pub collision: CollisionConfig,

    /// Alliance merge movement and sizing.
    #[serde(default)]
    pub merge: MergeConfig,

    /// Difficulty sampling and the pairing protocol.
    #[serde(default)]
    pub difficulty: DifficultyConfig,

    /// Power-up spawning and effects.
    #[serde(default)]
    pub powerups: PowerUpConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `MENAGERIE_SEED` overrides `world.seed` when set to a valid `u64`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.world.apply_env_overrides();
        Ok(config)
    }

    /// Parameters for building a [`menagerie_world::WorldState`].
    pub const fn world_params(&self) -> WorldParams {
        WorldParams {
            half_extent: self.world.half_extent,
            capacity: CapacityPolicy {
                max_animals: self.world.max_animals,
                eviction_batch: self.world.eviction_batch,
                eviction_threshold: self.world.eviction_threshold,
            },
            hazards: HazardLayout {
                count: self.world.hazard_count,
                min_radius: self.world.hazard_min_radius,
                max_radius: self.world.hazard_max_radius,
                keep_out_radius: self.world.spawn_keep_out_radius,
            },
            player: PlayerParams {
                start_size: self.player.start_size,
                max_size: self.player.max_size,
                speed: self.player.speed,
                max_lives: self.player.max_lives,
            },
        }
    }

    /// The per-animal tunables, with the player's respawn invulnerability
    /// carried into the collision section.
    pub fn agent_config(&self) -> AgentConfig {
        let mut collision = self.collision.clone();
        collision.respawn_invulnerability_secs = self.player.respawn_invulnerability_secs;
        AgentConfig {
            behavior: self.behavior.clone(),
            steering: self.steering.clone(),
            collision,
            merge: self.merge.clone(),
        }
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Half the arena side length.
    #[serde(default = "default_half_extent")]
    pub half_extent: f32,

    /// Hard ceiling on stored animals.
    #[serde(default = "default_max_animals")]
    pub max_animals: usize,

    /// Oldest animals removed per eviction pass.
    #[serde(default = "default_eviction_batch")]
    pub eviction_batch: usize,

    /// Fraction of `max_animals` at which a spawn triggers eviction.
    #[serde(default = "default_eviction_threshold")]
    pub eviction_threshold: f64,

    /// Number of static hazards scattered at world creation.
    #[serde(default = "default_hazard_count")]
    pub hazard_count: u32,

    /// Smallest hazard radius.
    #[serde(default = "default_hazard_min_radius")]
    pub hazard_min_radius: f32,

    /// Largest hazard radius.
    #[serde(default = "default_hazard_max_radius")]
    pub hazard_max_radius: f32,

    /// Radius around the arena center kept clear of hazards.
    #[serde(default = "default_spawn_keep_out_radius")]
    pub spawn_keep_out_radius: f32,
}

impl WorldConfig {
    /// Apply `MENAGERIE_SEED` if present and parseable.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(SEED_ENV_VAR) {
            match val.trim().parse::<u64>() {
                Ok(seed) => self.seed = seed,
                Err(_) => {
                    tracing::warn!(value = %val, "ignoring unparseable {SEED_ENV_VAR}");
                }
            }
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            half_extent: default_half_extent(),
            max_animals: default_max_animals(),
            eviction_batch: default_eviction_batch(),
            eviction_threshold: default_eviction_threshold(),
            hazard_count: default_hazard_count(),
            hazard_min_radius: default_hazard_min_radius(),
            hazard_max_radius: default_hazard_max_radius(),
            spawn_keep_out_radius: default_spawn_keep_out_radius(),
        }
    }
}

/// Spawn queue configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpawnConfig {
    /// Minimum milliseconds between two admissions.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Pending entries kept before the oldest is dropped.
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,

    /// Desired fraction of admissions smaller than the player.
    #[serde(default = "default_target_smaller_ratio")]
    pub target_smaller_ratio: f64,

    /// Distance from the arena edge kept clear when placing new animals.
    #[serde(default = "default_spawn_margin")]
    pub spawn_margin: f32,
}

impl SpawnConfig {
    /// Minimum admission interval in seconds.
    pub fn min_interval_secs(&self) -> f64 {
        self.min_interval_ms as f64 / 1000.0
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            max_queue_size: default_max_queue_size(),
            target_smaller_ratio: default_target_smaller_ratio(),
            spawn_margin: default_spawn_margin(),
        }
    }
}

/// Player configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerConfig {
    /// Natural size at start and after restart.
    #[serde(default = "default_start_size")]
    pub start_size: f32,

    /// Largest natural size reachable by eating.
    #[serde(default = "default_max_size")]
    pub max_size: f32,

    /// Movement speed in units per second.
    #[serde(default = "default_player_speed")]
    pub speed: f32,

    /// Lives at start; also the cap for extra-life power-ups.
    #[serde(default = "default_max_lives")]
    pub max_lives: u32,

    /// Seconds of invulnerability after losing a life.
    #[serde(default = "default_respawn_invulnerability_secs")]
    pub respawn_invulnerability_secs: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start_size: default_start_size(),
            max_size: default_max_size(),
            speed: default_player_speed(),
            max_lives: default_max_lives(),
            respawn_invulnerability_secs: default_respawn_invulnerability_secs(),
        }
    }
}

/// Difficulty controller configuration.
///
/// Ratios are fractions of the live population; size factors are multiples
/// of the player's effective size. The dominance-keyed tables are indexed by
/// `player effective size / largest animal size`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DifficultyConfig {
    /// Seconds between two population samples.
    #[serde(default = "default_sample_interval_secs")]
    pub sample_interval_secs: f64,

    /// Population below which sampling is skipped.
    #[serde(default = "default_min_population")]
    pub min_population: usize,

    /// Animals smaller than this multiple of the player count as edible.
    #[serde(default = "default_edible_size_factor")]
    pub edible_size_factor: f32,

    /// Edible fraction above which survival mode starts.
    #[serde(default = "default_survival_enter_ratio")]
    pub survival_enter_ratio: f64,

    /// Edible fraction below which survival mode ends.
    #[serde(default = "default_survival_exit_ratio")]
    pub survival_exit_ratio: f64,

    /// Smaller-than-player fraction at or above which alliance mode may start.
    #[serde(default = "default_alliance_enter_ratio")]
    pub alliance_enter_ratio: f64,

    /// Largest animal must be below this multiple of the player to start alliance.
    #[serde(default = "default_alliance_enter_largest")]
    pub alliance_enter_largest: f32,

    /// Smaller-than-player fraction below which alliance mode ends.
    #[serde(default = "default_alliance_exit_ratio")]
    pub alliance_exit_ratio: f64,

    /// Alliance ends once the largest animal exceeds this multiple of the player.
    #[serde(default = "default_alliance_exit_largest")]
    pub alliance_exit_largest: f32,

    /// Candidates considered after each pairing anchor.
    #[serde(default = "default_pairing_lookahead")]
    pub pairing_lookahead: usize,

    /// Weight of size similarity in the partner score.
    #[serde(default = "default_similarity_weight")]
    pub similarity_weight: f32,

    /// Weight of post-merge size (relative to the player) in the partner score.
    #[serde(default = "default_effectiveness_weight")]
    pub effectiveness_weight: f32,

    /// Minimum combined pair size as a multiple of the player, by dominance.
    /// Falls as dominance grows so weaker pairs qualify.
    #[serde(default = "default_min_combined_size")]
    pub min_combined_size: TierTable<f32>,

    /// Pairs formed per pairing pass, by dominance.
    #[serde(default = "default_pair_cap")]
    pub pair_cap: TierTable<u32>,

    /// Animals above this multiple of the player count as competitive.
    #[serde(default = "default_competitive_size_factor")]
    pub competitive_size_factor: f32,

    /// Competitive animals wanted before the controller stops re-pairing.
    #[serde(default = "default_competitive_target")]
    pub competitive_target: usize,

    /// Seconds to wait before re-pairing after a merge, by dominance.
    #[serde(default = "default_repair_delay_secs")]
    pub repair_delay_secs: TierTable<f64>,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            sample_interval_secs: default_sample_interval_secs(),
            min_population: default_min_population(),
            edible_size_factor: default_edible_size_factor(),
            survival_enter_ratio: default_survival_enter_ratio(),
            survival_exit_ratio: default_survival_exit_ratio(),
            alliance_enter_ratio: default_alliance_enter_ratio(),
            alliance_enter_largest: default_alliance_enter_largest(),
            alliance_exit_ratio: default_alliance_exit_ratio(),
            alliance_exit_largest: default_alliance_exit_largest(),
            pairing_lookahead: default_pairing_lookahead(),
            similarity_weight: default_similarity_weight(),
            effectiveness_weight: default_effectiveness_weight(),
            min_combined_size: default_min_combined_size(),
            pair_cap: default_pair_cap(),
            competitive_size_factor: default_competitive_size_factor(),
            competitive_target: default_competitive_target(),
            repair_delay_secs: default_repair_delay_secs(),
        }
    }
}

/// Power-up configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PowerUpConfig {
    /// Seconds between power-up spawns.
    #[serde(default = "default_powerup_spawn_interval_secs")]
    pub spawn_interval_secs: f64,

    /// Seconds an uncollected power-up stays in the arena.
    #[serde(default = "default_powerup_lifetime_secs")]
    pub lifetime_secs: f64,

    /// Most power-ups waiting in the arena at once.
    #[serde(default = "default_powerup_max_active")]
    pub max_active: usize,

    /// Pickup radius.
    #[serde(default = "default_powerup_radius")]
    pub radius: f32,

    /// Effective-size multiplier granted by a size boost.
    #[serde(default = "default_size_boost_multiplier")]
    pub size_boost_multiplier: f32,

    /// Seconds a size boost lasts.
    #[serde(default = "default_size_boost_secs")]
    pub size_boost_secs: f64,

    /// Seconds of invulnerability granted by a shield.
    #[serde(default = "default_shield_secs")]
    pub shield_secs: f64,
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        Self {
            spawn_interval_secs: default_powerup_spawn_interval_secs(),
            lifetime_secs: default_powerup_lifetime_secs(),
            max_active: default_powerup_max_active(),
            radius: default_powerup_radius(),
            size_boost_multiplier: default_size_boost_multiplier(),
            size_boost_secs: default_size_boost_secs(),
            shield_secs: default_shield_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}
const fn default_half_extent() -> f32 {
    100.0
}
const fn default_max_animals() -> usize {
    500
}
const fn default_eviction_batch() -> usize {
    100
}
const fn default_eviction_threshold() -> f64 {
    0.9
}
const fn default_hazard_count() -> u32 {
    12
}
const fn default_hazard_min_radius() -> f32 {
    1.5
}
const fn default_hazard_max_radius() -> f32 {
    4.0
}
const fn default_spawn_keep_out_radius() -> f32 {
    12.0
}
const fn default_min_interval_ms() -> u64 {
    800
}
const fn default_max_queue_size() -> usize {
    200
}
const fn default_target_smaller_ratio() -> f64 {
    0.65
}
const fn default_spawn_margin() -> f32 {
    5.0
}
const fn default_start_size() -> f32 {
    1.0
}
const fn default_max_size() -> f32 {
    12.0
}
const fn default_player_speed() -> f32 {
    12.0
}
const fn default_max_lives() -> u32 {
    3
}
const fn default_respawn_invulnerability_secs() -> f64 {
    3.0
}
const fn default_sample_interval_secs() -> f64 {
    5.0
}
const fn default_min_population() -> usize {
    5
}
const fn default_edible_size_factor() -> f32 {
    1.2
}
const fn default_survival_enter_ratio() -> f64 {
    0.5
}
const fn default_survival_exit_ratio() -> f64 {
    0.35
}
const fn default_alliance_enter_ratio() -> f64 {
    0.9
}
const fn default_alliance_enter_largest() -> f32 {
    0.8
}
const fn default_alliance_exit_ratio() -> f64 {
    0.72
}
const fn default_alliance_exit_largest() -> f32 {
    0.9
}
const fn default_pairing_lookahead() -> usize {
    8
}
const fn default_similarity_weight() -> f32 {
    0.4
}
const fn default_effectiveness_weight() -> f32 {
    0.6
}
fn default_min_combined_size() -> TierTable<f32> {
    TierTable::new(&[(1.5, 0.9), (2.5, 0.7), (4.0, 0.5)], 0.3)
}
fn default_pair_cap() -> TierTable<u32> {
    TierTable::new(&[(1.5, 2), (2.5, 3), (4.0, 5)], 8)
}
const fn default_competitive_size_factor() -> f32 {
    0.8
}
const fn default_competitive_target() -> usize {
    2
}
fn default_repair_delay_secs() -> TierTable<f64> {
    TierTable::new(&[(1.5, 4.0), (2.5, 2.0), (4.0, 0.5)], 0.1)
}
const fn default_powerup_spawn_interval_secs() -> f64 {
    15.0
}
const fn default_powerup_lifetime_secs() -> f64 {
    20.0
}
const fn default_powerup_max_active() -> usize {
    3
}
const fn default_powerup_radius() -> f32 {
    1.0
}
const fn default_size_boost_multiplier() -> f32 {
    1.5
}
const fn default_size_boost_secs() -> f64 {
    8.0
}
const fn default_shield_secs() -> f64 {
    5.0
}
fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.max_animals, 500);
        assert_eq!(config.world.eviction_batch, 100);
        assert_eq!(config.spawn.min_interval_ms, 800);
        assert_eq!(config.spawn.max_queue_size, 200);
        assert!((config.spawn.target_smaller_ratio - 0.65).abs() < f64::EPSILON);
        assert_eq!(config.player.max_lives, 3);
        assert_eq!(config.difficulty.min_population, 5);
        assert_eq!(config.powerups.max_active, 3);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_partial_yaml() {
        let yaml = r"
world:
  half_extent: 60.0
  max_animals: 50
spawn:
  target_smaller_ratio: 0.7
collision:
  contested_consume_chance: 0.5
difficulty:
  pair_cap:
    tiers:
      - below: 2.0
        value: 1
    otherwise: 4
logging:
  json: true
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert!((config.world.half_extent - 60.0).abs() < f32::EPSILON);
        assert_eq!(config.world.max_animals, 50);
        assert_eq!(config.world.eviction_batch, 100);
        assert!((config.spawn.target_smaller_ratio - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.spawn.min_interval_ms, 800);
        assert!((config.collision.contested_consume_chance - 0.5).abs() < f64::EPSILON);
        assert!((config.collision.consume_below - 0.95).abs() < f32::EPSILON);
        assert_eq!(config.difficulty.pair_cap.lookup(1.0), 1);
        assert_eq!(config.difficulty.pair_cap.lookup(3.0), 4);
        assert!(config.logging.json);
    }

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = SimulationConfig::parse("{}").unwrap();
        let mut expected = SimulationConfig::default();
        expected.world.seed = config.world.seed;
        assert_eq!(config, expected);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config =
            SimulationConfig::parse(include_str!("../../../menagerie-config.yaml")).unwrap();
        let mut expected = SimulationConfig::default();
        expected.world.seed = config.world.seed;
        assert_eq!(config, expected);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = SimulationConfig::parse("world: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = SimulationConfig::from_file(Path::new("/nonexistent/menagerie.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn agent_config_carries_respawn_invulnerability() {
        let mut config = SimulationConfig::default();
        config.player.respawn_invulnerability_secs = 7.5;
        let agents = config.agent_config();
        assert!((agents.collision.respawn_invulnerability_secs - 7.5).abs() < f64::EPSILON);
    }

    #[test]
    fn world_params_follow_config() {
        let mut config = SimulationConfig::default();
        config.world.max_animals = 10;
        config.player.max_lives = 5;
        let params = config.world_params();
        assert_eq!(params.capacity.max_animals, 10);
        assert_eq!(params.capacity.soft_cap(), 9);
        assert_eq!(params.player.max_lives, 5);
    }
}
