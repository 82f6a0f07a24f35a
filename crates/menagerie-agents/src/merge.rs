//! Alliance merges: paired animals close on each other and combine.
//!
//! A merging animal ignores the player and every other rule. It heads
//! straight for its partner at chase speed scaled by how outmatched it is.
//! Once the pair is within `sum of sizes + merge_margin` the larger animal
//! (ties broken by the higher id) absorbs the smaller one.

use core::cmp::Ordering;

use menagerie_types::{EntityId, Effect, SizeClass, turn_toward};
use menagerie_world::{WorldError, WorldState, sizing};
use rand::Rng;

use crate::behavior::{FrameContext, move_animal};
use crate::speed;
use crate::threat::size_ratio;

/// Result of a completed merge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeOutcome {
    /// The animal that absorbed its partner.
    pub survivor: EntityId,
    /// The absorbed partner (now dead).
    pub absorbed: EntityId,
    /// Survivor size after the merge.
    pub new_size: f32,
    /// Survivor size class after the merge.
    pub new_class: SizeClass,
}

impl From<MergeOutcome> for Effect {
    fn from(outcome: MergeOutcome) -> Self {
        Self::Merged {
            survivor: outcome.survivor,
            absorbed: outcome.absorbed,
            new_size: outcome.new_size,
        }
    }
}

/// Advance a merging animal one frame.
pub fn step_merging(
    world: &mut WorldState,
    id: EntityId,
    ctx: &FrameContext<'_>,
    rng: &mut impl Rng,
) -> Option<Effect> {
    let (position, size, class, partner) = {
        let animal = world.get_alive(id).ok()?;
        (animal.position, animal.size(), animal.size_class, animal.partner)
    };

    let partner = partner.and_then(|p| match world.get_alive(p) {
        Ok(other) if other.partner == Some(id) => Some((p, other.position, other.size())),
        _ => None,
    });
    let Some((partner_id, partner_pos, partner_size)) = partner else {
        tracing::warn!(entity = %id, "merging without a live partner, releasing");
        world.clear_partner(id);
        return None;
    };

    let merge = &ctx.config.merge;
    if position.distance(partner_pos) <= size + partner_size + merge.merge_margin {
        return match resolve_merge(world, id, partner_id, ctx) {
            Ok(outcome) => Some(outcome.into()),
            Err(error) => {
                tracing::warn!(entity = %id, partner = %partner_id, %error, "merge failed, releasing pair");
                world.clear_partner(id);
                None
            }
        };
    }

    let outmatch = 1.0 / size_ratio(size, ctx.player.effective_size).max(f32::EPSILON);
    let panic = merge.panic_speed.lookup(outmatch);
    if let Ok(animal) = world.get_alive_mut(id) {
        let toward = (partner_pos - position).heading();
        animal.heading = turn_toward(animal.heading, toward, merge.merge_turn_rate * ctx.dt);
        animal.speed = speed::profile(class).chase * panic;
    }
    move_animal(world, id, ctx, rng);
    None
}

/// Combine two partners. The larger absorbs the smaller; sizes add up to a
/// cap of `player size * size_cap(dominance)` and values add.
pub fn resolve_merge(
    world: &mut WorldState,
    a: EntityId,
    b: EntityId,
    ctx: &FrameContext<'_>,
) -> Result<MergeOutcome, WorldError> {
    let first = world.get_alive(a)?;
    let second = world.get_alive(b)?;
    let (survivor, absorbed) = match first
        .size()
        .total_cmp(&second.size())
        .then(first.id.cmp(&second.id))
    {
        Ordering::Greater => (first, second),
        _ => (second, first),
    };
    let survivor_id = survivor.id;
    let absorbed_id = absorbed.id;
    let larger = survivor.size();
    let combined = survivor.size() + absorbed.size();
    let value = survivor.value + absorbed.value;
    let class = survivor
        .size_class
        .max(absorbed.size_class)
        .max(sizing::size_class_for_value(value))
        .promoted();

    let cap = ctx.player.effective_size * ctx.config.merge.size_cap.lookup(ctx.dominance);
    let target_size = combined.min(cap.max(larger));

    world.kill(absorbed_id)?;
    let survivor = world.get_alive_mut(survivor_id)?;
    survivor.value = value;
    survivor.set_size_class(class);
    survivor.set_size(target_size);
    survivor.reset_to_wandering();
    survivor.base_speed = speed::base_speed(survivor.size_class);
    let outcome = MergeOutcome {
        survivor: survivor_id,
        absorbed: absorbed_id,
        new_size: survivor.size(),
        new_class: survivor.size_class,
    };
    tracing::debug!(
        survivor = %survivor_id,
        absorbed = %absorbed_id,
        new_size = outcome.new_size,
        class = ?outcome.new_class,
        "merge complete"
    );
    Ok(outcome)
}
