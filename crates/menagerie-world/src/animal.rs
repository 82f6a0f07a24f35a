//! Animals: transfer-spawned actors with a behavior state.
//!
//! An [`Animal`] holds everything the behavior and steering code needs
//! between frames. Targets (prey, merge partner) are stored as ids and
//! resolved through the world each use, never as references, so removing an
//! animal can never leave a dangling pointer.

use menagerie_types::{BehaviorState, EntityId, SizeClass, TransferKind, Vec2};

use crate::sizing;

/// Everything needed to create an animal.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimalParams {
    /// Currency archetype.
    pub currency: TransferKind,
    /// Transfer value the animal was spawned from.
    pub value: f64,
    /// Starting position.
    pub position: Vec2,
    /// Starting heading in radians.
    pub heading: f32,
    /// Cruising speed for its size class.
    pub base_speed: f32,
}

/// Where and when a fleeing animal last saw the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    /// Player position at the time.
    pub position: Vec2,
    /// Simulation time of the sighting.
    pub at: f64,
}

/// A live (or just-killed) animal.
#[derive(Debug, Clone, PartialEq)]
pub struct Animal {
    /// Unique id, also the creation-order key.
    pub id: EntityId,
    /// Currency archetype.
    pub currency: TransferKind,
    /// Size class; fixes the growth ceiling and the speed profile.
    pub size_class: SizeClass,
    /// Transfer value; merges add partner values together.
    pub value: f64,
    /// Current size, always within `[MIN_SIZE, class ceiling]`.
    size: f32,
    /// Ground-plane position.
    pub position: Vec2,
    /// Height above the ground (non-zero while hopping).
    pub elevation: f32,
    /// Vertical speed of an active hop.
    pub vertical_velocity: f32,
    /// Heading in radians.
    pub heading: f32,
    /// Cruising speed for its size class.
    pub base_speed: f32,
    /// Current speed.
    pub speed: f32,
    /// Behavior state.
    pub state: BehaviorState,
    /// Prey being hunted (lookup reference).
    pub target: Option<EntityId>,
    /// Merge partner (lookup reference, always mutual).
    pub partner: Option<EntityId>,
    /// Simulation time of creation.
    pub created_at: f64,
    /// Frame of creation; animals are not evaluated on their first frame.
    pub created_frame: u64,
    /// Cleared when consumed or absorbed; dead animals are reaped the same frame.
    pub alive: bool,
    /// Last time the player was seen while fleeing.
    pub last_sighting: Option<Sighting>,
    /// Earliest time a new hunt may start.
    pub hunt_ready_at: f64,
    /// End of the current timed state (eating, growing).
    pub state_until: f64,
    /// Size the animal is growing toward during the growing state.
    pub growth_target: f32,
    /// Earliest time the next hop may trigger.
    pub hop_ready_at: f64,
}

impl Animal {
    /// Create an animal from spawn parameters.
    pub fn new(id: EntityId, params: AnimalParams, now: f64, frame: u64) -> Self {
        let size_class = sizing::size_class_for_value(params.value);
        let size = sizing::spawn_size_for_value(params.value);
        let base_speed = if params.base_speed.is_finite() {
            params.base_speed.max(0.0)
        } else {
            0.0
        };
        Self {
            id,
            currency: params.currency,
            size_class,
            value: params.value.max(0.0),
            size,
            position: params.position,
            elevation: 0.0,
            vertical_velocity: 0.0,
            heading: params.heading,
            base_speed,
            speed: base_speed,
            state: BehaviorState::Wandering,
            target: None,
            partner: None,
            created_at: now,
            created_frame: frame,
            alive: true,
            last_sighting: None,
            hunt_ready_at: now,
            state_until: now,
            growth_target: size,
            hop_ready_at: now,
        }
    }

    /// Current size.
    pub const fn size(&self) -> f32 {
        self.size
    }

    /// Collision radius (equal to size).
    pub const fn radius(&self) -> f32 {
        self.size
    }

    /// Growth ceiling for the current size class.
    pub const fn ceiling(&self) -> f32 {
        sizing::ceiling(self.size_class)
    }

    /// Set the size, clamped to `[MIN_SIZE, ceiling]`.
    pub fn set_size(&mut self, size: f32) {
        self.size = sizing::clamp_size(size, self.size_class);
    }

    /// Grow by `amount`, clamped to the ceiling. Returns the new size.
    pub fn grow(&mut self, amount: f32) -> f32 {
        self.set_size(self.size + amount.max(0.0));
        self.size
    }

    /// Move to a larger size class (merges only ever promote) and re-clamp.
    pub fn set_size_class(&mut self, class: SizeClass) {
        self.size_class = self.size_class.max(class);
        self.set_size(self.size);
    }

    /// Land the growth from a meal that was caught but has not finished
    /// growing in. No-op outside the eating and growing states.
    pub fn settle_growth(&mut self) {
        if matches!(self.state, BehaviorState::Eating | BehaviorState::Growing) {
            self.set_size(self.growth_target.max(self.size));
        }
    }

    /// Drop any hunt or merge and go back to roaming. Growth already earned
    /// from a meal is kept.
    pub fn reset_to_wandering(&mut self) {
        self.settle_growth();
        self.state = BehaviorState::Wandering;
        self.target = None;
        self.partner = None;
        self.growth_target = self.size;
    }

    /// Whether the animal currently has a merge partner assigned.
    pub const fn is_paired(&self) -> bool {
        self.partner.is_some()
    }
}
