//! Animal-versus-animal hunting (survival mode only).
//!
//! A wandering animal occasionally looks for the nearest animal at most
//! `prey_size_ratio` of its size and pursues it. On catch the prey dies
//! immediately, the hunter eats for a moment, grows into its new size, and
//! then returns to wandering with a cooldown before the next hunt.

use menagerie_types::{
    BehaviorState, Consumer, DifficultyMode, Effect, EntityId, Vec2, turn_toward,
};
use menagerie_world::{Animal, WorldState, sizing};
use rand::Rng;

use crate::behavior::FrameContext;
use crate::speed;
use crate::threat::growth_for_value;

/// Leave the hunt cycle: finish any pending growth, drop the target, and
/// start the cooldown.
pub fn abandon(animal: &mut Animal, ctx: &FrameContext<'_>) {
    animal.reset_to_wandering();
    animal.hunt_ready_at = ctx.now + ctx.config.behavior.hunt_cooldown_secs;
}

/// Nearest live animal that `hunter` could hunt, if any.
pub fn find_prey(world: &WorldState, hunter: &Animal, ctx: &FrameContext<'_>) -> Option<EntityId> {
    let behavior = &ctx.config.behavior;
    let max_prey_size = hunter.size() * behavior.prey_size_ratio;
    world
        .alive()
        .filter(|other| other.id != hunter.id && other.size() <= max_prey_size)
        .map(|other| (other.id, other.position.distance(hunter.position)))
        .filter(|(_, distance)| *distance <= behavior.hunt_radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Roll for a new hunt. Returns `true` if the animal started hunting.
pub fn try_start_hunt(
    world: &mut WorldState,
    id: EntityId,
    ctx: &FrameContext<'_>,
    rng: &mut impl Rng,
) -> bool {
    if ctx.mode != DifficultyMode::Survival {
        return false;
    }
    let Ok(hunter) = world.get_alive(id) else {
        return false;
    };
    if hunter.state != BehaviorState::Wandering || ctx.now < hunter.hunt_ready_at {
        return false;
    }
    let chance = ctx.config.behavior.hunt_chance;
    if chance.is_nan() || chance <= 0.0 || !rng.random_bool(chance.min(1.0)) {
        return false;
    }
    let Some(prey) = find_prey(world, hunter, ctx) else {
        return false;
    };

    let Ok(hunter) = world.get_alive_mut(id) else {
        return false;
    };
    hunter.state = BehaviorState::Hunting;
    hunter.target = Some(prey);
    tracing::debug!(hunter = %id, prey = %prey, "hunt started");
    true
}

/// Advance an animal that is hunting, eating, or growing.
pub fn step_hunt_cycle(
    world: &mut WorldState,
    id: EntityId,
    ctx: &FrameContext<'_>,
) -> Option<Effect> {
    let state = world.get_alive(id).ok()?.state;
    match state {
        BehaviorState::Hunting => pursue(world, id, ctx),
        BehaviorState::Eating => {
            let animal = world.get_alive_mut(id).ok()?;
            animal.speed = 0.0;
            if ctx.now >= animal.state_until {
                animal.state = BehaviorState::Growing;
                animal.state_until = ctx.now + ctx.config.behavior.grow_secs;
            }
            None
        }
        BehaviorState::Growing => {
            let animal = world.get_alive_mut(id).ok()?;
            animal.speed = 0.0;
            if ctx.now >= animal.state_until {
                abandon(animal, ctx);
            } else {
                let remaining = (animal.state_until - ctx.now).max(f64::from(ctx.dt));
                #[allow(clippy::cast_possible_truncation)]
                let blend = (f64::from(ctx.dt) / remaining).clamp(0.0, 1.0) as f32;
                let size = animal.size();
                animal.set_size(size + (animal.growth_target - size) * blend);
            }
            None
        }
        _ => None,
    }
}

/// Chase the current prey; consume it on contact.
fn pursue(world: &mut WorldState, id: EntityId, ctx: &FrameContext<'_>) -> Option<Effect> {
    let behavior = &ctx.config.behavior;
    let (hunter_pos, hunter_size, target) = {
        let hunter = world.get_alive(id).ok()?;
        (hunter.position, hunter.size(), hunter.target)
    };

    let prey = target
        .and_then(|t| world.get_alive(t).ok())
        .map(|p| (p.id, p.position, p.size(), p.value));
    let lost = match prey {
        None => true,
        Some((_, position, _, _)) => {
            ctx.mode != DifficultyMode::Survival
                || hunter_pos.distance(position) > behavior.hunt_radius * behavior.hunt_give_up_factor
        }
    };
    if lost {
        let hunter = world.get_alive_mut(id).ok()?;
        abandon(hunter, ctx);
        return None;
    }
    let (prey_id, prey_pos, prey_size, prey_value) = prey?;

    let distance = hunter_pos.distance(prey_pos);
    if distance <= hunter_size + prey_size + behavior.catch_margin {
        return consume(world, id, prey_id, prey_pos, prey_value, ctx);
    }

    let hunter = world.get_alive_mut(id).ok()?;
    let toward = (prey_pos - hunter_pos).heading();
    hunter.heading = turn_toward(hunter.heading, toward, behavior.hunt_turn_rate * ctx.dt);
    hunter.speed = speed::profile(hunter.size_class).hunt * behavior.hunt_speed_boost;
    None
}

/// Kill the prey and put the hunter into the eating state.
fn consume(
    world: &mut WorldState,
    hunter_id: EntityId,
    prey_id: EntityId,
    position: Vec2,
    value: f64,
    ctx: &FrameContext<'_>,
) -> Option<Effect> {
    let behavior = &ctx.config.behavior;
    if let Err(error) = world.kill(prey_id) {
        tracing::warn!(hunter = %hunter_id, prey = %prey_id, %error, "prey vanished at catch");
        return None;
    }

    let hunter = world.get_alive_mut(hunter_id).ok()?;
    let growth = growth_for_value(value, behavior.hunter_growth_factor);
    hunter.growth_target = sizing::clamp_size(hunter.size() + growth, hunter.size_class);
    hunter.state = BehaviorState::Eating;
    hunter.state_until = ctx.now + behavior.eat_secs;
    hunter.target = None;
    hunter.speed = 0.0;
    tracing::debug!(
        hunter = %hunter_id,
        prey = %prey_id,
        growth_target = hunter.growth_target,
        "prey caught"
    );

    Some(Effect::Consumed {
        id: prey_id,
        consumer: Consumer::Animal(hunter_id),
        position,
        value,
    })
}
