//! The world context: every actor in one explicit, owned container.
//!
//! [`WorldState`] is created at simulation start and rebuilt on restart. It
//! owns the animals (keyed by [`EntityId`], so iteration order is creation
//! order and "oldest first" is simply the front of the map), the hazards,
//! the power-ups, and the player.
//!
//! Relations between animals (hunt targets, merge partners) are stored as
//! ids. Removing an animal releases every relation that pointed at it.

use std::collections::BTreeMap;

use menagerie_types::{BehaviorState, EntityId, PowerUpId, PowerUpKind, Vec2};
use rand::Rng;

use crate::animal::{Animal, AnimalParams};
use crate::arena::Arena;
use crate::error::WorldError;
use crate::hazard::{self, Hazard, HazardLayout};
use crate::player::{Player, PlayerParams};
use crate::powerup::PowerUp;
use crate::sizing::MIN_SIZE;

/// Population limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityPolicy {
    /// Hard ceiling on stored animals.
    pub max_animals: usize,
    /// How many of the oldest animals one eviction pass removes.
    pub eviction_batch: usize,
    /// Fraction of `max_animals` a spawn may not push the population past.
    pub eviction_threshold: f64,
}

impl CapacityPolicy {
    /// Population above which a spawn triggers a batch eviction.
    pub fn soft_cap(&self) -> usize {
        let ratio = self.eviction_threshold.clamp(0.0, 1.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let soft = ((self.max_animals as f64) * ratio + 1e-9).floor() as usize;
        soft.clamp(1, self.max_animals.max(1))
    }
}

/// Static parameters for building a world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldParams {
    /// Half the arena side length.
    pub half_extent: f32,
    /// Population limits.
    pub capacity: CapacityPolicy,
    /// Hazard scattering.
    pub hazards: HazardLayout,
    /// Player parameters.
    pub player: PlayerParams,
}

/// Result of spawning an animal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnOutcome {
    /// The new animal.
    pub id: EntityId,
    /// Animals evicted to make room, oldest first.
    pub evicted: Vec<EntityId>,
}

/// Read-only view of the static parts of the world, borrowed alongside a
/// mutable animal by [`WorldState::animal_with_terrain`].
#[derive(Debug, Clone, Copy)]
pub struct Terrain<'a> {
    /// Arena bounds.
    pub arena: &'a Arena,
    /// Static obstacles.
    pub hazards: &'a [Hazard],
}

/// The world context passed to every per-frame component.
#[derive(Debug, Clone)]
pub struct WorldState {
    arena: Arena,
    capacity: CapacityPolicy,
    animals: BTreeMap<EntityId, Animal>,
    hazards: Vec<Hazard>,
    power_ups: BTreeMap<PowerUpId, PowerUp>,
    /// The player.
    pub player: Player,
    next_entity: u64,
    next_power_up: u64,
}

impl WorldState {
    /// Build a fresh world: scattered hazards, no animals, player at center.
    pub fn new(params: &WorldParams, rng: &mut impl Rng) -> Self {
        let arena = Arena::new(params.half_extent);
        let hazards = hazard::scatter(&arena, &params.hazards, rng);
        Self::with_hazards(params, hazards)
    }

    /// Build a world with an explicit hazard set.
    pub fn with_hazards(params: &WorldParams, hazards: Vec<Hazard>) -> Self {
        let arena = Arena::new(params.half_extent);
        Self {
            arena,
            capacity: params.capacity,
            animals: BTreeMap::new(),
            hazards,
            power_ups: BTreeMap::new(),
            player: Player::new(params.player, arena.center()),
            next_entity: 0,
            next_power_up: 0,
        }
    }

    /// The arena bounds.
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// The population policy.
    pub const fn capacity(&self) -> &CapacityPolicy {
        &self.capacity
    }

    // -------------------------------------------------------------------
    // Animals
    // -------------------------------------------------------------------

    /// Create an animal, evicting the oldest batch first if the spawn would
    /// push the population past the soft cap.
    pub fn spawn_animal(&mut self, params: AnimalParams, now: f64, frame: u64) -> SpawnOutcome {
        let evicted = if self.animals.len() >= self.capacity.soft_cap() {
            self.evict_oldest(self.capacity.eviction_batch.max(1))
        } else {
            Vec::new()
        };

        self.next_entity = self.next_entity.saturating_add(1);
        let id = EntityId::from_raw(self.next_entity);
        let animal = Animal::new(id, params, now, frame);
        tracing::debug!(
            entity = %id,
            size = animal.size(),
            class = ?animal.size_class,
            "animal spawned"
        );
        self.animals.insert(id, animal);

        SpawnOutcome { id, evicted }
    }

    /// Remove up to `count` of the oldest animals. Returns their ids.
    pub fn evict_oldest(&mut self, count: usize) -> Vec<EntityId> {
        let oldest: Vec<EntityId> = self.animals.keys().take(count).copied().collect();
        for id in &oldest {
            self.remove(*id);
        }
        if !oldest.is_empty() {
            tracing::info!(
                evicted = oldest.len(),
                remaining = self.animals.len(),
                "population cap reached, evicted oldest animals"
            );
        }
        oldest
    }

    /// Remove an animal and release every relation pointing at it.
    pub fn remove(&mut self, id: EntityId) -> Option<Animal> {
        let removed = self.animals.remove(&id)?;
        for other in self.animals.values_mut() {
            if other.partner == Some(id) {
                tracing::debug!(entity = %other.id, partner = %id, "partner removed, releasing");
                other.reset_to_wandering();
            } else if other.target == Some(id) {
                other.target = None;
                if other.state == BehaviorState::Hunting {
                    other.state = BehaviorState::Wandering;
                }
            }
        }
        Some(removed)
    }

    /// Mark an animal as dead; it is skipped by every alive query and
    /// dropped by the next [`reap_dead`](Self::reap_dead).
    pub fn kill(&mut self, id: EntityId) -> Result<Animal, WorldError> {
        let animal = self.get_alive_mut(id)?;
        animal.alive = false;
        Ok(animal.clone())
    }

    /// Remove every dead animal. Returns the removed animals.
    pub fn reap_dead(&mut self) -> Vec<Animal> {
        let dead: Vec<EntityId> = self
            .animals
            .values()
            .filter(|a| !a.alive)
            .map(|a| a.id)
            .collect();
        dead.into_iter().filter_map(|id| self.remove(id)).collect()
    }

    /// Look up an animal, dead or alive.
    pub fn animal(&self, id: EntityId) -> Result<&Animal, WorldError> {
        self.animals.get(&id).ok_or(WorldError::EntityNotFound(id))
    }

    /// Look up a live animal.
    pub fn get_alive(&self, id: EntityId) -> Result<&Animal, WorldError> {
        let animal = self.animal(id)?;
        if animal.alive {
            Ok(animal)
        } else {
            Err(WorldError::EntityDead(id))
        }
    }

    /// Look up a live animal mutably.
    pub fn get_alive_mut(&mut self, id: EntityId) -> Result<&mut Animal, WorldError> {
        let animal = self
            .animals
            .get_mut(&id)
            .ok_or(WorldError::EntityNotFound(id))?;
        if animal.alive {
            Ok(animal)
        } else {
            Err(WorldError::EntityDead(id))
        }
    }

    /// Borrow a live animal mutably together with the arena and hazards.
    pub fn animal_with_terrain(
        &mut self,
        id: EntityId,
    ) -> Result<(&mut Animal, Terrain<'_>), WorldError> {
        let animal = self
            .animals
            .get_mut(&id)
            .ok_or(WorldError::EntityNotFound(id))?;
        if !animal.alive {
            return Err(WorldError::EntityDead(id));
        }
        let terrain = Terrain {
            arena: &self.arena,
            hazards: &self.hazards,
        };
        Ok((animal, terrain))
    }

    /// Borrow the player mutably together with the arena and hazards.
    pub fn player_with_terrain(&mut self) -> (&mut Player, Terrain<'_>) {
        let terrain = Terrain {
            arena: &self.arena,
            hazards: &self.hazards,
        };
        (&mut self.player, terrain)
    }

    /// Iterate over live animals in creation order.
    pub fn alive(&self) -> impl Iterator<Item = &Animal> {
        self.animals.values().filter(|a| a.alive)
    }

    /// Call `f` for every live animal in creation order.
    pub fn for_each_alive(&self, mut f: impl FnMut(&Animal)) {
        for animal in self.alive() {
            f(animal);
        }
    }

    /// Ids of every live animal. Per-frame passes iterate this copy so they
    /// can kill or remove animals without touching the map being traversed.
    pub fn alive_ids(&self) -> Vec<EntityId> {
        self.alive().map(|a| a.id).collect()
    }

    /// Number of live animals.
    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    /// Number of stored animals, including ones killed this frame.
    pub fn stored_count(&self) -> usize {
        self.animals.len()
    }

    /// Size of the largest live animal, if any.
    pub fn largest_animal_size(&self) -> Option<f32> {
        self.alive().map(Animal::size).reduce(f32::max)
    }

    /// Player effective size over the largest live animal's size. With no
    /// animals the player is measured against the smallest possible animal.
    pub fn dominance_factor(&self) -> f32 {
        let largest = self.largest_animal_size().unwrap_or(MIN_SIZE).max(MIN_SIZE);
        self.player.effective_size() / largest
    }

    // -------------------------------------------------------------------
    // Merge pairing
    // -------------------------------------------------------------------

    /// Pair two live, unpaired animals and put both into the merging state.
    pub fn set_partners(&mut self, a: EntityId, b: EntityId) -> Result<(), WorldError> {
        if a == b {
            return Err(WorldError::SelfPairing(a));
        }
        for id in [a, b] {
            let animal = self.get_alive(id)?;
            if let Some(partner) = animal.partner {
                return Err(WorldError::AlreadyPaired { entity: id, partner });
            }
        }
        for (id, partner) in [(a, b), (b, a)] {
            let animal = self.get_alive_mut(id)?;
            animal.partner = Some(partner);
            animal.target = None;
            animal.state = BehaviorState::Merging;
        }
        Ok(())
    }

    /// Break the pairing `id` belongs to, returning both sides to wandering.
    pub fn clear_partner(&mut self, id: EntityId) {
        let partner = self.animals.get_mut(&id).and_then(|a| {
            let partner = a.partner;
            a.reset_to_wandering();
            partner
        });
        if let Some(partner) = partner.and_then(|p| self.animals.get_mut(&p)) {
            partner.reset_to_wandering();
        }
    }

    /// Break every pairing. Returns how many animals were released.
    pub fn clear_all_partners(&mut self) -> usize {
        let mut released: usize = 0;
        for animal in self.animals.values_mut() {
            if animal.partner.is_some() || animal.state == BehaviorState::Merging {
                animal.reset_to_wandering();
                released = released.saturating_add(1);
            }
        }
        released
    }

    /// Reset every live animal whose pairing is broken (partner missing,
    /// dead, or not pointing back) or that is merging without a partner.
    /// Returns the healed ids.
    pub fn heal_pairings(&mut self) -> Vec<EntityId> {
        let broken: Vec<EntityId> = self
            .alive()
            .filter(|a| match a.partner {
                Some(partner) => !self
                    .get_alive(partner)
                    .is_ok_and(|p| p.partner == Some(a.id)),
                None => a.state == BehaviorState::Merging,
            })
            .map(|a| a.id)
            .collect();

        for id in &broken {
            if let Some(animal) = self.animals.get_mut(id) {
                tracing::warn!(entity = %id, partner = ?animal.partner, "healing broken merge pairing");
                animal.reset_to_wandering();
            }
        }
        broken
    }

    // -------------------------------------------------------------------
    // Hazards
    // -------------------------------------------------------------------

    /// All hazards.
    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    // -------------------------------------------------------------------
    // Power-ups
    // -------------------------------------------------------------------

    /// Place a power-up. Returns its id.
    pub fn add_power_up(
        &mut self,
        kind: PowerUpKind,
        position: Vec2,
        radius: f32,
        expires_at: f64,
    ) -> PowerUpId {
        self.next_power_up = self.next_power_up.saturating_add(1);
        let id = PowerUpId::from_raw(self.next_power_up);
        self.power_ups.insert(
            id,
            PowerUp {
                id,
                kind,
                position: self.arena.clamp(position),
                radius,
                expires_at,
            },
        );
        id
    }

    /// Remove a power-up (collected or expired).
    pub fn remove_power_up(&mut self, id: PowerUpId) -> Option<PowerUp> {
        self.power_ups.remove(&id)
    }

    /// Drop every expired power-up. Returns how many expired.
    pub fn expire_power_ups(&mut self, now: f64) -> usize {
        let before = self.power_ups.len();
        self.power_ups.retain(|_, p| !p.is_expired(now));
        before.saturating_sub(self.power_ups.len())
    }

    /// Iterate over active power-ups.
    pub fn power_ups(&self) -> impl Iterator<Item = &PowerUp> {
        self.power_ups.values()
    }

    /// Number of active power-ups.
    pub fn power_up_count(&self) -> usize {
        self.power_ups.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use menagerie_types::TransferKind;

    use super::*;

    fn params(max_animals: usize) -> WorldParams {
        WorldParams {
            half_extent: 50.0,
            capacity: CapacityPolicy {
                max_animals,
                eviction_batch: 3,
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
        }
    }

    fn animal(value: f64) -> AnimalParams {
        AnimalParams {
            currency: TransferKind::Dai,
            value,
            position: Vec2::new(1.0, 1.0),
            heading: 0.0,
            base_speed: 1.5,
        }
    }

    fn world(max_animals: usize) -> WorldState {
        WorldState::with_hazards(&params(max_animals), Vec::new())
    }

    #[test]
    fn soft_cap_is_fraction_of_max() {
        assert_eq!(params(100).capacity.soft_cap(), 90);
        assert_eq!(params(1).capacity.soft_cap(), 1);
    }

    #[test]
    fn spawn_past_soft_cap_evicts_oldest_batch() {
        let mut world = world(10);
        let mut ids = Vec::new();
        for _ in 0..9 {
            let outcome = world.spawn_animal(animal(10.0), 0.0, 0);
            assert!(outcome.evicted.is_empty());
            ids.push(outcome.id);
        }
        let outcome = world.spawn_animal(animal(10.0), 0.0, 1);
        assert_eq!(outcome.evicted, ids[..3].to_vec());
        assert_eq!(world.alive_count(), 7);
        assert!(world.animal(ids[0]).is_err());
    }

    #[test]
    fn population_never_exceeds_max() {
        let mut world = world(20);
        for frame in 0..200 {
            world.spawn_animal(animal(100.0), 0.0, frame);
            assert!(world.stored_count() <= 20);
        }
    }

    #[test]
    fn removing_an_animal_releases_its_partner() {
        let mut world = world(50);
        let a = world.spawn_animal(animal(10.0), 0.0, 0).id;
        let b = world.spawn_animal(animal(20.0), 0.0, 0).id;
        world.set_partners(a, b).unwrap();
        assert_eq!(world.animal(a).unwrap().state, BehaviorState::Merging);

        world.remove(b);
        let survivor = world.animal(a).unwrap();
        assert_eq!(survivor.state, BehaviorState::Wandering);
        assert!(survivor.partner.is_none());
    }

    #[test]
    fn pairing_is_exclusive() {
        let mut world = world(50);
        let a = world.spawn_animal(animal(10.0), 0.0, 0).id;
        let b = world.spawn_animal(animal(20.0), 0.0, 0).id;
        let c = world.spawn_animal(animal(30.0), 0.0, 0).id;
        world.set_partners(a, b).unwrap();
        assert_eq!(
            world.set_partners(c, a),
            Err(WorldError::AlreadyPaired { entity: a, partner: b })
        );
        assert_eq!(world.set_partners(c, c), Err(WorldError::SelfPairing(c)));
    }

    #[test]
    fn killed_animals_are_hidden_then_reaped() {
        let mut world = world(50);
        let a = world.spawn_animal(animal(10.0), 0.0, 0).id;
        let b = world.spawn_animal(animal(20.0), 0.0, 0).id;
        world.set_partners(a, b).unwrap();
        world.kill(b).unwrap();

        assert_eq!(world.alive_ids(), vec![a]);
        assert_eq!(world.get_alive(b), Err(WorldError::EntityDead(b)));

        let healed = world.heal_pairings();
        assert_eq!(healed, vec![a]);

        let reaped = world.reap_dead();
        assert_eq!(reaped.len(), 1);
        assert_eq!(world.stored_count(), 1);
    }

    #[test]
    fn heal_resets_merging_without_partner() {
        let mut world = world(50);
        let a = world.spawn_animal(animal(10.0), 0.0, 0).id;
        world.get_alive_mut(a).unwrap().state = BehaviorState::Merging;
        assert_eq!(world.heal_pairings(), vec![a]);
        assert_eq!(world.animal(a).unwrap().state, BehaviorState::Wandering);
    }

    #[test]
    fn dominance_compares_player_to_largest() {
        let mut world = world(10);
        assert!((world.dominance_factor() - 1.0 / MIN_SIZE).abs() < 1e-4);
        let id = world.spawn_animal(animal(5.0), 0.0, 0).id;
        let size = world.animal(id).unwrap().size();
        assert!((world.dominance_factor() - 1.0 / size).abs() < 1e-4);
    }

    #[test]
    fn terrain_borrow_reaches_hazards() {
        let mut world = world(10);
        let id = world.spawn_animal(animal(5.0), 0.0, 0).id;
        let (animal, terrain) = world.animal_with_terrain(id).unwrap();
        animal.position = terrain.arena.clamp(Vec2::new(500.0, 0.0));
        assert!(terrain.hazards.is_empty());
        assert!((world.animal(id).unwrap().position.x - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn power_ups_expire() {
        let mut world = world(10);
        world.add_power_up(PowerUpKind::Shield, Vec2::ZERO, 0.5, 5.0);
        world.add_power_up(PowerUpKind::ExtraLife, Vec2::ZERO, 0.5, 10.0);
        assert_eq!(world.expire_power_ups(6.0), 1);
        assert_eq!(world.power_up_count(), 1);
    }

    #[test]
    fn largest_animal_size_ignores_dead() {
        let mut world = world(10);
        let small = world.spawn_animal(animal(5.0), 0.0, 0).id;
        let big = world.spawn_animal(animal(1_000_000.0), 0.0, 0).id;
        world.kill(big).unwrap();
        let expected = world.animal(small).unwrap().size();
        assert!((world.largest_animal_size().unwrap() - expected).abs() < f32::EPSILON);
    }
}
