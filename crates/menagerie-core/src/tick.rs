//! Frame cycle: the ordered phases that drive the Menagerie simulation.
//!
//! The host calls [`Simulation::step`] once per rendered frame. Each frame
//! runs through these phases, in order:
//!
//! 1. **Clock** -- advance the frame clock by the (clamped) delta.
//! 2. **Timers** -- expire the size multiplier and stale power-ups, spawn a
//!    new power-up when its interval has elapsed.
//! 3. **Admission** -- if the feed is connected, let the spawn queue admit
//!    at most one animal (evicting the oldest batch first when the
//!    population is near its cap).
//! 4. **Behavior** -- evaluate every live animal once. Animals admitted this
//!    frame wait until the next one.
//! 5. **Player** -- move the player along its intent and collect touched
//!    power-ups.
//! 6. **Collision** -- resolve player-versus-animal contact.
//! 7. **Reap** -- drop animals that died this frame and update the score.
//! 8. **Difficulty** -- heal broken pairings, run post-merge re-pairing, and
//!    sample the population when due.
//!
//! When the player loses the last life the frame ends with a
//! [`Effect::GameOver`] and every later call to `step` is a no-op until
//! [`Simulation::restart`].
//!
//! Nothing here returns an error: per-animal failures are contained in the
//! agent logic and broken invariants are healed and logged.

use core::f32::consts::TAU;

use menagerie_agents::{
    AgentConfig, FrameContext, PlayerView, base_speed, classify_threat, resolve_player_contacts,
    steering, update_animal,
};
use menagerie_types::{
    ActorKind, Consumer, DifficultyMode, Effect, EntityId, EntitySnapshot, EvictionReason,
    PowerUpKind, ScoreSummary, TransferEvent, Vec2, WorldSnapshot,
};
use menagerie_world::{AnimalParams, WorldState, sizing};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::clock::SimClock;
use crate::config::SimulationConfig;
use crate::difficulty::DifficultyController;
use crate::spawn_queue::SpawnQueue;

/// Placement attempts before a new animal is allowed to appear close to
/// the player.
const SPAWN_PLACEMENT_ATTEMPTS: u32 = 8;

/// What happened in one call to [`Simulation::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Frame number after the step.
    pub frame: u64,
    /// Simulation time after the step.
    pub time: f64,
    /// Difficulty mode after the step.
    pub mode: DifficultyMode,
    /// Live animals after the step.
    pub alive: usize,
    /// Pending spawn queue entries.
    pub queued: usize,
    /// Effects produced this frame.
    pub effects: usize,
    /// Whether the game has ended.
    pub game_over: bool,
    /// Whether a frame actually ran. False for every step taken after game
    /// over, which leaves the world untouched.
    pub advanced: bool,
}

/// A complete, self-contained simulation instance.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    agents: AgentConfig,
    rng: SmallRng,
    clock: SimClock,
    world: WorldState,
    queue: SpawnQueue,
    difficulty: DifficultyController,
    effects: Vec<Effect>,
    score: ScoreSummary,
    feed_connected: bool,
    next_power_up_at: f64,
    power_up_rotation: usize,
    game_over: bool,
}

impl Simulation {
    /// Build a fresh simulation from configuration.
    pub fn new(config: SimulationConfig) -> Self {
        let mut rng = SmallRng::seed_from_u64(config.world.seed);
        let world = WorldState::new(&config.world_params(), &mut rng);
        Self::with_world(config, world, rng)
    }

    /// Build a simulation around an existing world (tests and replays
    /// supply their own hazard layout this way).
    pub fn with_world(config: SimulationConfig, world: WorldState, rng: SmallRng) -> Self {
        let agents = config.agent_config();
        let queue = SpawnQueue::new(&config.spawn);
        let difficulty = DifficultyController::new(&config.difficulty);
        let score = ScoreSummary {
            peak_size: world.player.effective_size(),
            ..ScoreSummary::default()
        };
        info!(
            seed = config.world.seed,
            half_extent = config.world.half_extent,
            hazards = world.hazards().len(),
            max_animals = config.world.max_animals,
            "simulation created"
        );
        Self {
            next_power_up_at: config.powerups.spawn_interval_secs,
            config,
            agents,
            rng,
            clock: SimClock::default(),
            world,
            queue,
            difficulty,
            effects: Vec::new(),
            score,
            feed_connected: true,
            power_up_rotation: 0,
            game_over: false,
        }
    }

    // -------------------------------------------------------------------
    // Host inputs
    // -------------------------------------------------------------------

    /// Queue a transfer for admission.
    pub fn enqueue_transfer(&mut self, event: TransferEvent) {
        self.queue.enqueue(event, self.clock.now());
    }

    /// Connect or disconnect the upstream feed. While disconnected nothing
    /// is admitted; animals already in the world are unaffected.
    pub fn set_feed_connected(&mut self, connected: bool) {
        if self.feed_connected != connected {
            info!(connected, queued = self.queue.len(), "transfer feed connection changed");
        }
        self.feed_connected = connected;
    }

    /// Set the player's movement intent. Longer vectors are normalised;
    /// non-finite input stops the player.
    pub fn set_player_intent(&mut self, intent: Vec2) {
        self.world.player.intent = if !intent.is_finite() {
            Vec2::ZERO
        } else if intent.length() > 1.0 {
            intent.normalized().unwrap_or(Vec2::ZERO)
        } else {
            intent
        };
    }

    // -------------------------------------------------------------------
    // Frame
    // -------------------------------------------------------------------

    /// Run one frame.
    pub fn step(&mut self, dt: f32) -> FrameReport {
        if self.game_over {
            return self.report(0, false);
        }

        let frame = self.clock.advance(dt);
        let now = self.clock.now();
        let dt = self.clock.last_dt();
        let mut effects = Vec::new();

        self.run_timers(now);
        if self.feed_connected {
            self.admit(now, frame, &mut effects);
        }

        let ctx = FrameContext {
            now,
            dt,
            frame,
            mode: self.difficulty.mode(),
            dominance: self.world.dominance_factor(),
            player: PlayerView::of(&self.world),
            config: &self.agents,
        };
        for id in self.world.alive_ids() {
            if let Some(effect) = update_animal(&mut self.world, id, &ctx, &mut self.rng) {
                effects.push(effect);
            }
        }

        if self.world.player.is_alive() {
            let (player, terrain) = self.world.player_with_terrain();
            steering::move_player(player, terrain, dt);
            self.collect_power_ups(now, &mut effects);
        }

        effects.extend(resolve_player_contacts(
            &mut self.world,
            &self.agents.collision,
            now,
            &mut self.rng,
        ));

        let reaped = self.world.reap_dead();
        self.record_score(&effects, now);

        let merges = effects
            .iter()
            .filter(|e| matches!(e, Effect::Merged { .. }))
            .count();
        effects.extend(
            self.difficulty
                .update(&mut self.world, &self.config.difficulty, now, merges),
        );

        if !self.world.player.is_alive() {
            self.game_over = true;
            info!(
                frame,
                value_consumed = self.score.value_consumed,
                entities_eaten = self.score.entities_eaten,
                peak_size = self.score.peak_size,
                survived = self.score.survival_seconds,
                "game over"
            );
            effects.push(Effect::GameOver { score: self.score });
        }

        if !reaped.is_empty() {
            debug!(frame, reaped = reaped.len(), "dead animals removed");
        }
        let produced = effects.len();
        self.effects.append(&mut effects);
        self.report(produced, true)
    }

    fn report(&self, effects: usize, advanced: bool) -> FrameReport {
        FrameReport {
            frame: self.clock.frame(),
            time: self.clock.now(),
            mode: self.difficulty.mode(),
            alive: self.world.alive_count(),
            queued: self.queue.len(),
            effects,
            game_over: self.game_over,
            advanced,
        }
    }

    /// Expire timed effects and place a new power-up when due.
    fn run_timers(&mut self, now: f64) {
        if self.world.player.expire_multiplier(now) {
            debug!("size boost expired");
        }
        self.world.expire_power_ups(now);

        let powerups = &self.config.powerups;
        if now < self.next_power_up_at {
            return;
        }
        self.next_power_up_at = now + powerups.spawn_interval_secs.max(0.0);
        if self.world.power_up_count() >= powerups.max_active {
            return;
        }
        let kind = self
            .power_up_rotation
            .checked_rem(PowerUpKind::ALL.len())
            .and_then(|slot| PowerUpKind::ALL.get(slot))
            .copied()
            .unwrap_or(PowerUpKind::SizeBoost);
        self.power_up_rotation = self.power_up_rotation.wrapping_add(1);
        let position = self
            .world
            .arena()
            .random_point(&mut self.rng, self.config.spawn.spawn_margin);
        let id = self
            .world
            .add_power_up(kind, position, powerups.radius, now + powerups.lifetime_secs);
        debug!(power_up = %id, ?kind, "power-up placed");
    }

    /// Admit at most one queued transfer.
    fn admit(&mut self, now: f64, frame: u64, effects: &mut Vec<Effect>) {
        let player_size = self.world.player.effective_size();
        let Some(pending) = self.queue.poll(now, player_size) else {
            return;
        };
        let value = pending.event.value_f64();
        let position = self.spawn_position();
        let params = AnimalParams {
            currency: pending.event.kind,
            value,
            position,
            heading: self.rng.random_range(0.0..TAU),
            base_speed: base_speed(sizing::size_class_for_value(value)),
        };
        let outcome = self.world.spawn_animal(params, now, frame);
        effects.extend(outcome.evicted.iter().map(|&id| Effect::Evicted {
            id,
            reason: EvictionReason::PopulationCap,
        }));
        if let Ok(animal) = self.world.get_alive(outcome.id) {
            effects.push(Effect::Spawned {
                id: outcome.id,
                position: animal.position,
                size: animal.size(),
            });
        }
        debug!(
            entity = %outcome.id,
            transfer = %pending.event.display_line(8),
            "transfer admitted"
        );
    }

    /// A random spawn point, preferring spots away from the player.
    fn spawn_position(&mut self) -> Vec2 {
        let margin = self.config.spawn.spawn_margin;
        let keep_out = self.config.world.spawn_keep_out_radius;
        let player = self.world.player.position;
        let arena = *self.world.arena();
        let mut position = arena.random_point(&mut self.rng, margin);
        for _ in 1..SPAWN_PLACEMENT_ATTEMPTS {
            if position.distance(player) > keep_out {
                break;
            }
            position = arena.random_point(&mut self.rng, margin);
        }
        position
    }

    /// Apply every power-up the player is touching.
    fn collect_power_ups(&mut self, now: f64, effects: &mut Vec<Effect>) {
        let position = self.world.player.position;
        let radius = self.world.player.radius();
        let touched: Vec<_> = self
            .world
            .power_ups()
            .filter(|p| p.touches(position, radius))
            .map(|p| (p.id, p.kind))
            .collect();

        let powerups = &self.config.powerups;
        for (id, kind) in touched {
            self.world.remove_power_up(id);
            let player = &mut self.world.player;
            match kind {
                PowerUpKind::SizeBoost => {
                    player.apply_multiplier(powerups.size_boost_multiplier, now + powerups.size_boost_secs);
                }
                PowerUpKind::Shield => player.grant_invulnerability(now + powerups.shield_secs),
                PowerUpKind::ExtraLife => player.add_life(),
            }
            info!(power_up = %id, ?kind, lives = player.lives(), "power-up collected");
            effects.push(Effect::PowerUpCollected { id, kind });
        }
    }

    fn record_score(&mut self, effects: &[Effect], now: f64) {
        for effect in effects {
            if let Effect::Consumed {
                consumer: Consumer::Player,
                value,
                ..
            } = effect
            {
                self.score.value_consumed += value;
                self.score.entities_eaten = self.score.entities_eaten.saturating_add(1);
            }
        }
        self.score.peak_size = self.score.peak_size.max(self.world.player.effective_size());
        self.score.survival_seconds = now;
    }

    // -------------------------------------------------------------------
    // Host outputs
    // -------------------------------------------------------------------

    /// Everything the renderer needs for the current frame.
    pub fn snapshot(&self) -> WorldSnapshot {
        let now = self.clock.now();
        let player_size = self.world.player.effective_size();
        let collision = &self.agents.collision;
        let entities = self
            .world
            .alive()
            .map(|animal| EntitySnapshot {
                id: animal.id,
                kind: ActorKind::Animal,
                currency: animal.currency,
                size_class: animal.size_class,
                position: animal.position,
                elevation: animal.elevation,
                heading: animal.heading,
                size: animal.size(),
                behavior_state: animal.state,
                threat: classify_threat(animal.size(), player_size, collision),
            })
            .collect();
        WorldSnapshot {
            frame: self.clock.frame(),
            time: now,
            mode: self.difficulty.mode(),
            player: self.world.player.snapshot(now),
            entities,
            hazards: self.world.hazards().iter().map(|h| h.snapshot()).collect(),
            power_ups: self.world.power_ups().map(|p| p.snapshot()).collect(),
        }
    }

    /// Take every effect produced since the last drain.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Cumulative score, pulled on demand.
    pub const fn score(&self) -> ScoreSummary {
        self.score
    }

    /// Throw the current game away and start over from configuration.
    ///
    /// The random stream continues, so the new world gets a fresh hazard
    /// layout. Animals that were alive are reported as evicted.
    pub fn restart(&mut self) {
        let cleared: Vec<EntityId> = self.world.alive_ids();
        self.world = WorldState::new(&self.config.world_params(), &mut self.rng);
        self.queue = SpawnQueue::new(&self.config.spawn);
        self.difficulty.reset(&self.config.difficulty);
        self.clock = SimClock::default();
        self.score = ScoreSummary {
            peak_size: self.world.player.effective_size(),
            ..ScoreSummary::default()
        };
        self.next_power_up_at = self.config.powerups.spawn_interval_secs;
        self.power_up_rotation = 0;
        self.game_over = false;
        self.effects.clear();
        self.effects.extend(cleared.iter().map(|&id| Effect::Evicted {
            id,
            reason: EvictionReason::Restart,
        }));
        info!(cleared = cleared.len(), "simulation restarted");
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    /// The world.
    pub const fn world(&self) -> &WorldState {
        &self.world
    }

    /// Mutable world access for hosts that script scenarios.
    pub const fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    /// The frame clock.
    pub const fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// The spawn queue.
    pub const fn queue(&self) -> &SpawnQueue {
        &self.queue
    }

    /// The difficulty controller.
    pub const fn difficulty(&self) -> &DifficultyController {
        &self.difficulty
    }

    /// Current difficulty mode.
    pub const fn mode(&self) -> DifficultyMode {
        self.difficulty.mode()
    }

    /// The configuration this simulation was built from.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Whether the upstream feed is connected.
    pub const fn feed_connected(&self) -> bool {
        self.feed_connected
    }

    /// Whether the game has ended.
    pub const fn is_game_over(&self) -> bool {
        self.game_over
    }
}
