//! Per-animal behavior state machine.
//!
//! Each frame, every live animal is evaluated once by [`update_animal`].
//! States are checked in priority order:
//!
//! 1. `Merging` is exclusive: an animal with a partner only closes on it.
//! 2. Fleeing a larger player interrupts anything else, including a hunt.
//! 3. The hunt cycle (`Hunting`, `Eating`, `Growing`) continues.
//! 4. Chasing a smaller player, with chase radius and speed attenuated for
//!    animals that vastly outsize the player.
//! 5. Otherwise the animal wanders, and in survival mode may start a hunt.
//!
//! After the state is decided the animal moves through
//! [`steering::advance`], so every state respects hazards and the arena.

use menagerie_types::{BehaviorState, DifficultyMode, EntityId, Effect, Vec2, turn_toward};
use menagerie_world::{Animal, Sighting, WorldState};
use rand::Rng;

use crate::config::AgentConfig;
use crate::speed::{self, SpeedProfile};
use crate::threat::size_ratio;
use crate::{hunting, merge, steering};

/// What behavior needs to know about the player, copied once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    /// Position.
    pub position: Vec2,
    /// Velocity from the last movement update.
    pub velocity: Vec2,
    /// Effective size.
    pub effective_size: f32,
    /// Whether the player is still in the game.
    pub alive: bool,
}

impl PlayerView {
    /// Copy the relevant player state out of the world.
    pub fn of(world: &WorldState) -> Self {
        Self {
            position: world.player.position,
            velocity: world.player.velocity,
            effective_size: world.player.effective_size(),
            alive: world.player.is_alive(),
        }
    }
}

/// Per-frame inputs shared by every animal update.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    /// Simulation time at the start of the frame.
    pub now: f64,
    /// Frame duration in seconds.
    pub dt: f32,
    /// Current frame number.
    pub frame: u64,
    /// Difficulty mode.
    pub mode: DifficultyMode,
    /// Player effective size over the largest animal's size.
    pub dominance: f32,
    /// The player.
    pub player: PlayerView,
    /// Tunables.
    pub config: &'a AgentConfig,
}

/// How an animal reacts to the player this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reaction {
    /// Run from a point (the player or its last sighting).
    Flee {
        /// What to run from.
        from: Vec2,
        /// Speed to run at.
        speed: f32,
    },
    /// Run toward the predicted player position.
    Chase {
        /// Aim point.
        aim: Vec2,
        /// Speed to chase at.
        speed: f32,
    },
    /// No reaction; wander.
    Ignore,
}

/// Chase radius, leash, and speed for an animal at `ratio` times the
/// player's size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaseEnvelope {
    /// Distance inside which a chase starts.
    pub radius: f32,
    /// Distance inside which an ongoing chase continues.
    pub leash: f32,
    /// Chase speed.
    pub speed: f32,
}

/// Compute the chase envelope for an animal with `profile` at `ratio`.
///
/// Attenuated predators (radius factor below one) keep chasing only inside
/// the attenuated radius; others keep chasing until they lose detection.
pub fn chase_envelope(profile: &SpeedProfile, ratio: f32, ctx: &FrameContext<'_>) -> ChaseEnvelope {
    let behavior = &ctx.config.behavior;
    let attenuation = behavior.chase_attenuation.lookup(ratio);
    let nominal = profile.detection_radius * behavior.chase_radius_factor;
    let radius = nominal * attenuation.radius;
    let leash = if attenuation.radius < 1.0 {
        radius
    } else {
        profile.detection_radius.max(radius)
    };
    ChaseEnvelope {
        radius,
        leash,
        speed: profile.chase * attenuation.speed,
    }
}

/// Decide how an animal reacts to the player. Records sightings as a side
/// effect so fleeing animals remember where the player was.
pub fn react_to_player(animal: &mut Animal, ctx: &FrameContext<'_>) -> Reaction {
    if !ctx.player.alive {
        return Reaction::Ignore;
    }
    let behavior = &ctx.config.behavior;
    let profile = speed::profile(animal.size_class);
    let distance = animal.position.distance(ctx.player.position);
    let detected = distance < profile.detection_radius;
    let ratio = size_ratio(animal.size(), ctx.player.effective_size);

    if ratio < 1.0 {
        let flee_radius = profile.detection_radius * behavior.flee_radius_factor;
        let already_fleeing = animal.state == BehaviorState::Fleeing;
        if detected && (distance < flee_radius || already_fleeing) {
            animal.last_sighting = Some(Sighting {
                position: ctx.player.position,
                at: ctx.now,
            });
            let proximity = if flee_radius > 0.0 {
                (1.0 - distance / flee_radius).clamp(0.0, 1.0)
            } else {
                0.0
            };
            return Reaction::Flee {
                from: ctx.player.position,
                speed: profile.flee * (1.0 + behavior.max_panic_bonus * proximity),
            };
        }
        if already_fleeing
            && let Some(sighting) = animal.last_sighting
            && ctx.now - sighting.at < behavior.flee_memory_secs
        {
            return Reaction::Flee {
                from: sighting.position,
                speed: profile.flee,
            };
        }
        return Reaction::Ignore;
    }

    if ratio > 1.0 {
        let envelope = chase_envelope(&profile, ratio, ctx);
        let chasing = animal.state == BehaviorState::Chasing;
        if distance < envelope.radius || (chasing && distance < envelope.leash) {
            let aim = ctx.player.position + ctx.player.velocity * behavior.predictive_lead_secs;
            return Reaction::Chase {
                aim,
                speed: envelope.speed,
            };
        }
    }

    Reaction::Ignore
}

/// Evaluate one animal for one frame. Returns an effect if the animal ate
/// prey or completed a merge.
///
/// Animals that are missing, dead, or were spawned this frame are skipped.
pub fn update_animal(
    world: &mut WorldState,
    id: EntityId,
    ctx: &FrameContext<'_>,
    rng: &mut impl Rng,
) -> Option<Effect> {
    let state = match world.get_alive(id) {
        Ok(animal) if animal.created_frame != ctx.frame => animal.state,
        Ok(_) | Err(_) => return None,
    };

    if state == BehaviorState::Merging {
        return merge::step_merging(world, id, ctx, rng);
    }

    let animal = world.get_alive_mut(id).ok()?;
    let reaction = react_to_player(animal, ctx);
    let behavior = &ctx.config.behavior;

    let effect = match reaction {
        Reaction::Flee { from, speed } => {
            if animal.state.is_hunt_cycle() {
                hunting::abandon(animal, ctx);
            }
            animal.state = BehaviorState::Fleeing;
            let away = (animal.position - from).heading();
            animal.heading = turn_toward(animal.heading, away, behavior.pursuit_turn_rate * ctx.dt);
            animal.speed = speed;
            None
        }
        _ if state.is_hunt_cycle() => hunting::step_hunt_cycle(world, id, ctx),
        Reaction::Chase { aim, speed } => {
            animal.state = BehaviorState::Chasing;
            let toward = (aim - animal.position).heading();
            animal.heading =
                turn_toward(animal.heading, toward, behavior.pursuit_turn_rate * ctx.dt);
            animal.speed = speed;
            None
        }
        Reaction::Ignore => {
            wander(animal, ctx, rng);
            if ctx.mode == DifficultyMode::Survival {
                hunting::try_start_hunt(world, id, ctx, rng);
            }
            None
        }
    };

    move_animal(world, id, ctx, rng);
    effect
}

/// Drop back to wandering: drift the heading and relax speed toward cruising.
fn wander(animal: &mut Animal, ctx: &FrameContext<'_>, rng: &mut impl Rng) {
    if animal.state != BehaviorState::Wandering {
        animal.state = BehaviorState::Wandering;
        animal.target = None;
    }
    animal.last_sighting = None;
    animal.heading = steering::wander_drift(animal.heading, &ctx.config.steering, ctx.dt, rng);
    let blend = (ctx.config.behavior.speed_decay_rate * ctx.dt).clamp(0.0, 1.0);
    animal.speed += (animal.base_speed - animal.speed) * blend;
}

/// Run terrain-aware motion for an animal that is still alive.
pub(crate) fn move_animal(
    world: &mut WorldState,
    id: EntityId,
    ctx: &FrameContext<'_>,
    rng: &mut impl Rng,
) {
    if let Ok((animal, terrain)) = world.animal_with_terrain(id) {
        steering::advance(animal, terrain, &ctx.config.steering, ctx.now, ctx.dt, rng);
    }
}
