//! Player-versus-animal contact resolution.
//!
//! Contact is evaluated once per frame against every live animal whose
//! circle overlaps the player's. The outcome depends only on the size ratio
//! `animal / player effective size`:
//!
//! | Ratio       | Outcome                                          |
//! |-------------|--------------------------------------------------|
//! | < 0.95      | consume: animal dies, player grows               |
//! | 0.95 - 1.05 | bounce: both pushed apart by half the overlap    |
//! | 1.05 - 1.2  | contested: 70% consume, otherwise bounce         |
//! | >= 1.2      | player hit: lose a life, respawn or die          |
//!
//! Resolution stops for the frame after the player is hit.

use menagerie_types::{Consumer, Effect, EntityId, ThreatLevel, Vec2};
use menagerie_world::WorldState;
use rand::Rng;

use crate::config::CollisionConfig;
use crate::threat::{classify_threat, growth_for_value};

/// Outcome of a single player-animal contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    /// The player ate the animal.
    Consumed,
    /// The two bounced apart.
    Bounced,
    /// The player was hit.
    PlayerHit,
    /// Contact ignored (predator touched an invulnerable player).
    Ignored,
}

/// Resolve every player-animal contact for this frame.
pub fn resolve_player_contacts(
    world: &mut WorldState,
    config: &CollisionConfig,
    now: f64,
    rng: &mut impl Rng,
) -> Vec<Effect> {
    let mut effects = Vec::new();
    if !world.player.is_alive() {
        return effects;
    }

    for id in world.alive_ids() {
        let outcome = resolve_contact(world, id, config, now, rng, &mut effects);
        if outcome == Some(ContactOutcome::PlayerHit) {
            break;
        }
    }
    effects
}

/// Resolve contact between the player and one animal, if they touch.
pub fn resolve_contact(
    world: &mut WorldState,
    id: EntityId,
    config: &CollisionConfig,
    now: f64,
    rng: &mut impl Rng,
    effects: &mut Vec<Effect>,
) -> Option<ContactOutcome> {
    let (position, size, value) = {
        let animal = world.get_alive(id).ok()?;
        (animal.position, animal.radius(), animal.value)
    };
    let player_pos = world.player.position;
    let player_size = world.player.effective_size();
    let distance = position.distance(player_pos);
    let overlap = world.player.radius() + size - distance;
    if overlap < 0.0 {
        return None;
    }

    let outcome = match classify_threat(size, player_size, config) {
        ThreatLevel::Prey => consume(world, id, position, value, config, effects),
        ThreatLevel::Even => bounce(world, id, overlap),
        ThreatLevel::Risky => {
            let chance = config.contested_consume_chance.clamp(0.0, 1.0);
            if rng.random_bool(chance) {
                consume(world, id, position, value, config, effects)
            } else {
                bounce(world, id, overlap)
            }
        }
        ThreatLevel::Predator => hit_player(world, id, config, now, effects),
    };
    Some(outcome)
}

fn consume(
    world: &mut WorldState,
    id: EntityId,
    position: Vec2,
    value: f64,
    config: &CollisionConfig,
    effects: &mut Vec<Effect>,
) -> ContactOutcome {
    if world.kill(id).is_err() {
        return ContactOutcome::Ignored;
    }
    let growth = growth_for_value(value, config.player_growth_factor);
    let natural = world.player.grow(growth);
    tracing::debug!(entity = %id, value, natural_size = natural, "player ate animal");
    effects.push(Effect::Consumed {
        id,
        consumer: Consumer::Player,
        position,
        value,
    });
    ContactOutcome::Consumed
}

fn bounce(world: &mut WorldState, id: EntityId, overlap: f32) -> ContactOutcome {
    let player_pos = world.player.position;
    let arena = *world.arena();
    let Ok(animal) = world.get_alive_mut(id) else {
        return ContactOutcome::Ignored;
    };
    let direction = (animal.position - player_pos)
        .normalized()
        .unwrap_or_else(|| Vec2::new(1.0, 0.0));
    let push = direction * (overlap * 0.5);
    animal.position = arena.clamp(animal.position + push);
    world.player.position = arena.clamp(player_pos - push);
    ContactOutcome::Bounced
}

fn hit_player(
    world: &mut WorldState,
    id: EntityId,
    config: &CollisionConfig,
    now: f64,
    effects: &mut Vec<Effect>,
) -> ContactOutcome {
    if world.player.is_invulnerable(now) {
        return ContactOutcome::Ignored;
    }
    let position = world.player.position;
    let lives_left = world.player.lose_life();
    effects.push(Effect::PlayerHit { by: id, lives_left });

    if lives_left > 0 {
        let center = world.arena().center();
        world
            .player
            .respawn(center, now, config.respawn_invulnerability_secs);
        #[allow(clippy::cast_possible_truncation)]
        let invulnerable_for = config.respawn_invulnerability_secs as f32;
        effects.push(Effect::PlayerRespawned { invulnerable_for });
        tracing::info!(by = %id, lives_left, "player hit, respawning");
    } else {
        world.player.kill();
        effects.push(Effect::PlayerDied { position });
        tracing::info!(by = %id, "player died");
    }
    ContactOutcome::PlayerHit
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::test_support::{spawn_sized, world};

    #[test]
    fn small_animal_is_consumed_and_player_grows() {
        let mut world = world();
        let config = CollisionConfig::default();
        let id = spawn_sized(&mut world, 99.0, 0.5, Vec2::ZERO);
        let mut rng = SmallRng::seed_from_u64(1);

        let effects = resolve_player_contacts(&mut world, &config, 1.0, &mut rng);
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], Effect::Consumed { consumer: Consumer::Player, .. }));
        assert!(world.get_alive(id).is_err());
        assert!((world.player.natural_size() - 1.2).abs() < 1e-5);
    }

    #[test]
    fn even_animals_bounce_apart() {
        let mut world = world();
        let config = CollisionConfig::default();
        let id = spawn_sized(&mut world, 500.0, 1.0, Vec2::new(1.0, 0.0));
        let mut rng = SmallRng::seed_from_u64(1);

        let effects = resolve_player_contacts(&mut world, &config, 1.0, &mut rng);
        assert!(effects.is_empty());
        let animal = world.animal(id).unwrap();
        assert!(animal.alive);
        assert!((animal.position.x - 1.5).abs() < 1e-5);
        assert!((world.player.position.x + 0.5).abs() < 1e-5);
    }

    #[test]
    fn contested_contacts_consume_about_seventy_percent() {
        let config = CollisionConfig::default();
        let mut rng = SmallRng::seed_from_u64(77);
        let mut consumed = 0_u32;
        for _ in 0..1_000 {
            let mut world = world();
            let id = spawn_sized(&mut world, 500.0, 1.1, Vec2::new(0.5, 0.0));
            let mut effects = Vec::new();
            if resolve_contact(&mut world, id, &config, 1.0, &mut rng, &mut effects)
                == Some(ContactOutcome::Consumed)
            {
                consumed = consumed.saturating_add(1);
            }
        }
        assert!((600..=800).contains(&consumed), "consumed {consumed}");
    }

    #[test]
    fn predator_costs_a_life_and_respawns_player() {
        let mut world = world();
        let config = CollisionConfig::default();
        world.player.position = Vec2::new(20.0, 20.0);
        spawn_sized(&mut world, 5_000.0, 2.0, Vec2::new(21.0, 20.0));
        spawn_sized(&mut world, 5_000.0, 2.0, Vec2::new(19.0, 20.0));
        let mut rng = SmallRng::seed_from_u64(1);

        let effects = resolve_player_contacts(&mut world, &config, 1.0, &mut rng);
        assert_eq!(
            effects,
            vec![
                Effect::PlayerHit { by: EntityId::from_raw(1), lives_left: 2 },
                Effect::PlayerRespawned { invulnerable_for: 3.0 },
            ]
        );
        assert_eq!(world.player.position, Vec2::ZERO);
        assert!(world.player.is_invulnerable(3.9));
    }

    #[test]
    fn invulnerable_player_ignores_predators() {
        let mut world = world();
        let config = CollisionConfig::default();
        world.player.grant_invulnerability(5.0);
        spawn_sized(&mut world, 5_000.0, 2.0, Vec2::new(1.0, 0.0));
        let mut rng = SmallRng::seed_from_u64(1);

        let effects = resolve_player_contacts(&mut world, &config, 1.0, &mut rng);
        assert!(effects.is_empty());
        assert_eq!(world.player.lives(), 3);
    }

    #[test]
    fn last_life_ends_the_game() {
        let mut world = world();
        let config = CollisionConfig::default();
        world.player.lose_life();
        world.player.lose_life();
        spawn_sized(&mut world, 5_000.0, 2.0, Vec2::new(1.0, 0.0));
        let mut rng = SmallRng::seed_from_u64(1);

        let effects = resolve_player_contacts(&mut world, &config, 1.0, &mut rng);
        assert!(matches!(effects.last(), Some(Effect::PlayerDied { .. })));
        assert!(!world.player.is_alive());

        let again = resolve_player_contacts(&mut world, &config, 2.0, &mut rng);
        assert!(again.is_empty());
    }
}
