//! Motion: wander drift, obstacle avoidance, hops, and boundary handling.
//!
//! Behavior decides *where* an animal wants to go (a heading and a speed);
//! this module turns that into motion that respects the terrain. Every
//! animal goes through [`advance`] once per frame regardless of state, so
//! fleeing and chasing animals avoid hazards and stay inside the arena too.

use menagerie_types::{Vec2, turn_toward, wrap_angle};
use menagerie_world::{Animal, Hazard, Player, Terrain};
use rand::Rng;

use crate::config::SteeringConfig;

/// Smallest gap used in the inverse-square falloff.
const MIN_GAP: f32 = 0.1;

/// Random heading perturbation for one frame, bounded by the turn rate.
pub fn wander_drift(heading: f32, config: &SteeringConfig, dt: f32, rng: &mut impl Rng) -> f32 {
    let max_turn = (config.wander_turn_rate * dt).max(0.0);
    if max_turn <= 0.0 {
        return heading;
    }
    wrap_angle(heading + rng.random_range(-max_turn..=max_turn))
}

/// Sum of inverse-square repulsion from hazards within
/// `size * avoidance_radius_factor + hazard radius` of `position`.
pub fn avoidance_vector(
    position: Vec2,
    size: f32,
    hazards: &[Hazard],
    config: &SteeringConfig,
) -> Vec2 {
    let reach = size * config.avoidance_radius_factor;
    hazards.iter().fold(Vec2::ZERO, |acc, hazard| {
        let offset = position - hazard.position;
        let distance = offset.length();
        if distance > reach + hazard.radius {
            return acc;
        }
        let Some(away) = offset.normalized() else {
            return acc;
        };
        let gap = (distance - hazard.radius).max(MIN_GAP);
        acc + away * (1.0 / (gap * gap))
    })
}

/// Blend an avoidance vector into a heading, damped so repulsion from
/// several hazards cannot make the heading oscillate.
pub fn blend_avoidance(heading: f32, avoidance: Vec2, damping: f32) -> f32 {
    let strength = avoidance.length();
    if strength <= f32::EPSILON || !strength.is_finite() {
        return heading;
    }
    turn_toward(heading, avoidance.heading(), damping * strength.min(1.0))
}

/// Move an animal one frame along its heading and resolve terrain contact.
///
/// Returns `true` if the animal touched a hazard.
pub fn advance(
    animal: &mut Animal,
    terrain: Terrain<'_>,
    config: &SteeringConfig,
    now: f64,
    dt: f32,
    rng: &mut impl Rng,
) -> bool {
    if animal.speed > 0.0 {
        let avoidance = avoidance_vector(animal.position, animal.size(), terrain.hazards, config);
        animal.heading = blend_avoidance(animal.heading, avoidance, config.avoidance_damping);
        animal.position += Vec2::from_heading(animal.heading) * (animal.speed * dt);
    }

    let mut touched = false;
    for hazard in terrain.hazards {
        let Some(pushed) = hazard.push_out(animal.position, animal.radius()) else {
            continue;
        };
        touched = true;
        let away = (pushed - hazard.position).heading();
        let jitter = if config.contact_jitter > 0.0 {
            rng.random_range(-config.contact_jitter..=config.contact_jitter)
        } else {
            0.0
        };
        animal.heading = wrap_angle(away + jitter);
        animal.position = pushed;
        if now >= animal.hop_ready_at && animal.elevation <= 0.0 {
            animal.vertical_velocity = config.hop_impulse;
            animal.hop_ready_at = now + config.hop_cooldown_secs;
        }
    }

    integrate_hop(animal, config, dt);

    let contact = terrain.arena.reflect(animal.position, animal.heading);
    animal.position = contact.position;
    animal.heading = contact.heading;

    touched
}

/// Apply vertical velocity and gravity; land cleanly at zero elevation.
fn integrate_hop(animal: &mut Animal, config: &SteeringConfig, dt: f32) {
    if animal.elevation <= 0.0 && animal.vertical_velocity <= 0.0 {
        animal.elevation = 0.0;
        animal.vertical_velocity = 0.0;
        return;
    }
    animal.elevation += animal.vertical_velocity * dt;
    animal.vertical_velocity -= config.gravity * dt;
    if animal.elevation <= 0.0 || !animal.elevation.is_finite() {
        animal.elevation = 0.0;
        animal.vertical_velocity = 0.0;
    }
}

/// Move the player along its intent, keep it inside the arena, and push it
/// out of hazards. Hazards only ever push.
pub fn move_player(player: &mut Player, terrain: Terrain<'_>, dt: f32) {
    let speed = player.params().speed;
    let direction = player.intent.normalized();
    player.velocity = direction.map_or(Vec2::ZERO, |d| d * speed);
    if let Some(d) = direction {
        player.heading = d.heading();
    }
    let mut position = player.position + player.velocity * dt;
    let radius = player.radius();
    for hazard in terrain.hazards {
        if let Some(pushed) = hazard.push_out(position, radius) {
            position = pushed;
        }
    }
    player.position = terrain.arena.clamp(position);
}
