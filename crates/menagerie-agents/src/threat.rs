//! Size-ratio classification shared by collision and the threat indicator.
//!
//! The ratio is always `animal size / player effective size`. The same bands
//! decide what happens on contact and how the renderer tints the animal, so
//! the indicator never lies about the outcome.

use menagerie_types::ThreatLevel;

use crate::config::CollisionConfig;

/// `animal / player` size ratio. A degenerate player size counts as the
/// smallest positive size so the ratio stays finite.
pub fn size_ratio(animal_size: f32, player_effective_size: f32) -> f32 {
    let player = if player_effective_size.is_finite() && player_effective_size > 0.0 {
        player_effective_size
    } else {
        f32::EPSILON
    };
    let ratio = animal_size / player;
    if ratio.is_finite() { ratio.max(0.0) } else { f32::MAX }
}

/// Growth from eating something worth `value`: `log10(value + 1) * factor`.
/// Anomalous values grow nothing.
pub fn growth_for_value(value: f64, factor: f32) -> f32 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }
    #[allow(clippy::cast_possible_truncation)]
    let magnitude = (value + 1.0).log10() as f32;
    (magnitude * factor).max(0.0)
}

/// Classify an animal relative to the player.
///
/// Pure: the same inputs always give the same level.
pub fn classify_threat(
    animal_size: f32,
    player_effective_size: f32,
    config: &CollisionConfig,
) -> ThreatLevel {
    let ratio = size_ratio(animal_size, player_effective_size);
    if ratio < config.consume_below {
        ThreatLevel::Prey
    } else if ratio < config.bounce_below {
        ThreatLevel::Even
    } else if ratio < config.contested_below {
        ThreatLevel::Risky
    } else {
        ThreatLevel::Predator
    }
}
