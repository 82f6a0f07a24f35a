//! Shared fixtures for unit tests.

use menagerie_types::{DifficultyMode, EntityId, TransferKind, Vec2};
use menagerie_world::{
    AnimalParams, CapacityPolicy, HazardLayout, PlayerParams, WorldParams, WorldState,
};

use crate::behavior::{FrameContext, PlayerView};
use crate::config::AgentConfig;

/// An empty 200x200 world with no hazards and a size-1 player at the origin.
pub fn world() -> WorldState {
    let params = WorldParams {
        half_extent: 100.0,
        capacity: CapacityPolicy {
            max_animals: 500,
            eviction_batch: 100,
            eviction_threshold: 0.9,
        },
        hazards: HazardLayout {
            count: 0,
            min_radius: 1.0,
            max_radius: 2.0,
            keep_out_radius: 5.0,
        },
        player: PlayerParams {
            start_size: 1.0,
            max_size: 12.0,
            speed: 8.0,
            max_lives: 3,
        },
    };
    WorldState::with_hazards(&params, Vec::new())
}

/// Spawn an animal for `value` at `position` on frame 0.
pub fn spawn(world: &mut WorldState, value: f64, position: Vec2) -> EntityId {
    world
        .spawn_animal(
            AnimalParams {
                currency: TransferKind::Usdc,
                value,
                position,
                heading: 0.0,
                base_speed: 1.5,
            },
            0.0,
            0,
        )
        .id
}

/// Spawn an animal and force its size.
pub fn spawn_sized(world: &mut WorldState, value: f64, size: f32, position: Vec2) -> EntityId {
    let id = spawn(world, value, position);
    if let Ok(animal) = world.get_alive_mut(id) {
        animal.set_size(size);
    }
    id
}

/// A frame-1 context at `t = 1.0` reading the player from `world`.
pub fn ctx<'a>(world: &WorldState, config: &'a AgentConfig, mode: DifficultyMode) -> FrameContext<'a> {
    FrameContext {
        now: 1.0,
        dt: 0.016,
        frame: 1,
        mode,
        dominance: world.dominance_factor(),
        player: PlayerView::of(world),
        config,
    }
}
