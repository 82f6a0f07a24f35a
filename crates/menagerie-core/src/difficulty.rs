//! Difficulty controller: global mode switching and the alliance pairing
//! protocol.
//!
//! Every `sample_interval_secs` (once at least `min_population` animals are
//! alive) the controller measures the population against the player:
//!
//! - `edible_ratio`: fraction of animals smaller than `edible_size_factor`
//!   times the player.
//! - `smaller_ratio`: fraction strictly smaller than the player.
//! - `largest_size`: the largest live animal.
//!
//! | From            | To       | When                                                   |
//! |-----------------|----------|--------------------------------------------------------|
//! | normal/survival | alliance | `smaller_ratio >= 0.9` and `largest < 0.8 x player`     |
//! | alliance        | normal\* | `smaller_ratio < 0.72` or `largest > 0.9 x player`      |
//! | normal          | survival | `edible_ratio > 0.5`                                    |
//! | survival        | normal   | `edible_ratio < 0.35`                                   |
//!
//! \* Straight to survival if the same sample already qualifies for it.
//!
//! Entering alliance runs a pairing pass. After every completed merge the
//! controller counts "competitive" animals; if there are too few it
//! schedules another pass after a delay that shrinks as the player's
//! dominance grows.
//!
//! Broken pairings are healed every frame regardless of mode.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use menagerie_types::{DifficultyMode, Effect, EntityId};
use menagerie_world::{Animal, WorldState};

use crate::config::DifficultyConfig;

/// One population measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationSample {
    /// Live animals.
    pub population: usize,
    /// Fraction smaller than `edible_size_factor x player`.
    pub edible_ratio: f64,
    /// Fraction strictly smaller than the player.
    pub smaller_ratio: f64,
    /// Largest live animal size.
    pub largest_size: f32,
    /// Player effective size at sample time.
    pub player_size: f32,
    /// `player / largest` size.
    pub dominance: f32,
}

impl PopulationSample {
    /// Measure the live population. Returns `None` for an empty world.
    pub fn measure(world: &WorldState, config: &DifficultyConfig) -> Option<Self> {
        let player_size = world.player.effective_size();
        let edible_limit = player_size * config.edible_size_factor;
        let mut population: usize = 0;
        let mut edible: usize = 0;
        let mut smaller: usize = 0;
        let mut largest = f32::MIN;
        world.for_each_alive(|animal| {
            let size = animal.size();
            population = population.saturating_add(1);
            if size < edible_limit {
                edible = edible.saturating_add(1);
            }
            if size < player_size {
                smaller = smaller.saturating_add(1);
            }
            largest = largest.max(size);
        });
        if population == 0 {
            return None;
        }
        Some(Self {
            population,
            edible_ratio: edible as f64 / population as f64,
            smaller_ratio: smaller as f64 / population as f64,
            largest_size: largest,
            player_size,
            dominance: world.dominance_factor(),
        })
    }
}

/// Drives the process-wide [`DifficultyMode`].
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyController {
    mode: DifficultyMode,
    next_sample_at: f64,
    repair_at: Option<f64>,
    last_sample: Option<PopulationSample>,
    pairing_passes: u64,
}

impl DifficultyController {
    /// Start in normal mode with the first sample one interval away.
    pub fn new(config: &DifficultyConfig) -> Self {
        Self {
            mode: DifficultyMode::Normal,
            next_sample_at: config.sample_interval_secs.max(0.0),
            repair_at: None,
            last_sample: None,
            pairing_passes: 0,
        }
    }

    /// Current mode.
    pub const fn mode(&self) -> DifficultyMode {
        self.mode
    }

    /// The most recent population sample that met the minimum population.
    pub const fn last_sample(&self) -> Option<PopulationSample> {
        self.last_sample
    }

    /// When the next post-merge pairing pass is due, if one is scheduled.
    pub const fn pending_repair(&self) -> Option<f64> {
        self.repair_at
    }

    /// Pairing passes run so far.
    pub const fn pairing_passes(&self) -> u64 {
        self.pairing_passes
    }

    /// Per-frame update. `merges_completed` is the number of merges that
    /// finished this frame.
    pub fn update(
        &mut self,
        world: &mut WorldState,
        config: &DifficultyConfig,
        now: f64,
        merges_completed: usize,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();
        world.heal_pairings();

        if self.mode == DifficultyMode::Alliance {
            if merges_completed > 0 {
                self.after_merge(world, config, now);
            }
            if self.repair_at.is_some_and(|at| now >= at) {
                self.repair_at = None;
                effects.extend(self.run_pairing(world, config));
            }
        }

        if now >= self.next_sample_at {
            self.next_sample_at = now + config.sample_interval_secs.max(0.0);
            effects.extend(self.evaluate(world, config));
        }
        effects
    }

    /// Take a sample now and apply any mode transition it calls for.
    pub fn evaluate(&mut self, world: &mut WorldState, config: &DifficultyConfig) -> Vec<Effect> {
        let mut effects = Vec::new();
        let Some(sample) = PopulationSample::measure(world, config) else {
            return effects;
        };
        if sample.population < config.min_population {
            tracing::debug!(population = sample.population, "difficulty sample skipped");
            return effects;
        }
        self.last_sample = Some(sample);

        let alliance_wanted = sample.smaller_ratio >= config.alliance_enter_ratio
            && sample.largest_size < sample.player_size * config.alliance_enter_largest;

        match self.mode {
            DifficultyMode::Alliance => {
                let exit = sample.smaller_ratio < config.alliance_exit_ratio
                    || sample.largest_size > sample.player_size * config.alliance_exit_largest;
                if exit {
                    let released = world.clear_all_partners();
                    self.repair_at = None;
                    tracing::info!(released, "alliance over, releasing pairs");
                    let next = if sample.edible_ratio > config.survival_enter_ratio {
                        DifficultyMode::Survival
                    } else {
                        DifficultyMode::Normal
                    };
                    effects.extend(self.switch(next, &sample));
                } else if !world.alive().any(Animal::is_paired) && self.repair_at.is_none() {
                    effects.extend(self.run_pairing(world, config));
                }
            }
            DifficultyMode::Normal | DifficultyMode::Survival if alliance_wanted => {
                if eligible_count(world) >= 2 {
                    effects.extend(self.switch(DifficultyMode::Alliance, &sample));
                    effects.extend(self.run_pairing(world, config));
                } else {
                    tracing::debug!("alliance conditions met but fewer than two eligible animals");
                }
            }
            DifficultyMode::Normal => {
                if sample.edible_ratio > config.survival_enter_ratio {
                    effects.extend(self.switch(DifficultyMode::Survival, &sample));
                }
            }
            DifficultyMode::Survival => {
                if sample.edible_ratio < config.survival_exit_ratio {
                    effects.extend(self.switch(DifficultyMode::Normal, &sample));
                }
            }
        }
        effects
    }

    /// Forget the mode and timers (restart).
    pub fn reset(&mut self, config: &DifficultyConfig) {
        *self = Self::new(config);
    }

    fn switch(&mut self, to: DifficultyMode, sample: &PopulationSample) -> Option<Effect> {
        let from = self.mode;
        if from == to {
            return None;
        }
        self.mode = to;
        tracing::info!(
            from = ?from,
            to = ?to,
            population = sample.population,
            edible_ratio = sample.edible_ratio,
            smaller_ratio = sample.smaller_ratio,
            largest = sample.largest_size,
            player = sample.player_size,
            "difficulty mode changed"
        );
        Some(Effect::ModeChanged { from, to })
    }

    /// Count competitive animals after a merge and schedule another
    /// pairing pass if there are too few.
    fn after_merge(&mut self, world: &WorldState, config: &DifficultyConfig, now: f64) {
        let threshold = world.player.effective_size() * config.competitive_size_factor;
        let competitive = world.alive().filter(|a| a.size() > threshold).count();
        if competitive >= config.competitive_target {
            tracing::debug!(competitive, "enough competitive animals after merge");
            return;
        }
        let dominance = world.dominance_factor();
        let delay = config.repair_delay_secs.lookup(dominance).max(0.0);
        let at = now + delay;
        if self.repair_at.is_none_or(|scheduled| at < scheduled) {
            self.repair_at = Some(at);
        }
        tracing::debug!(competitive, dominance, delay, "re-pairing scheduled");
    }

    /// Run one pairing pass and count it.
    fn run_pairing(&mut self, world: &mut WorldState, config: &DifficultyConfig) -> Vec<Effect> {
        self.pairing_passes = self.pairing_passes.saturating_add(1);
        pair_animals(world, config)
    }
}

/// Live animals without a partner.
fn eligible_count(world: &WorldState) -> usize {
    world.alive().filter(|a| !a.is_paired()).count()
}

/// Partner score: weighted size similarity plus post-merge size relative to
/// the player (saturating at twice the player).
pub fn pair_score(a: f32, b: f32, player_size: f32, config: &DifficultyConfig) -> f32 {
    let larger = a.max(b);
    let similarity = if larger > 0.0 { a.min(b) / larger } else { 0.0 };
    let player = player_size.max(f32::EPSILON);
    let effectiveness = ((a + b) / player).clamp(0.0, 2.0) / 2.0;
    config.similarity_weight * similarity + config.effectiveness_weight * effectiveness
}

/// The pairing protocol.
///
/// Unpaired animals are sorted largest first. Each anchor looks at the next
/// `pairing_lookahead` unused candidates and takes the best-scoring one whose
/// combined size clears the dominance-relaxed minimum. At most
/// `pair_cap(dominance)` pairs are formed. If none clears the minimum the two
/// largest are paired anyway.
pub fn pair_animals(world: &mut WorldState, config: &DifficultyConfig) -> Vec<Effect> {
    let player_size = world.player.effective_size();
    let dominance = world.dominance_factor();
    let min_combined = player_size * config.min_combined_size.lookup(dominance);
    let cap = usize::try_from(config.pair_cap.lookup(dominance)).unwrap_or(usize::MAX);

    let mut candidates: Vec<(EntityId, f32)> = world
        .alive()
        .filter(|a| !a.is_paired())
        .map(|a| (a.id, a.size()))
        .collect();
    candidates.sort_by(by_size_desc);

    let mut used: BTreeSet<EntityId> = BTreeSet::new();
    let mut pairs: Vec<(EntityId, EntityId)> = Vec::new();
    for (index, &(anchor, anchor_size)) in candidates.iter().enumerate() {
        if pairs.len() >= cap {
            break;
        }
        if used.contains(&anchor) {
            continue;
        }
        let best = candidates
            .iter()
            .skip(index.saturating_add(1))
            .filter(|(id, _)| !used.contains(id))
            .take(config.pairing_lookahead.max(1))
            .filter(|&&(_, size)| anchor_size + size >= min_combined)
            .map(|&(id, size)| (id, pair_score(anchor_size, size, player_size, config)))
            .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)));
        if let Some((partner, _)) = best {
            used.insert(anchor);
            used.insert(partner);
            pairs.push((anchor, partner));
        }
    }

    let forced = pairs.is_empty() && cap > 0;
    if forced {
        let mut largest = candidates.iter().map(|&(id, _)| id);
        if let (Some(first), Some(second)) = (largest.next(), largest.next()) {
            pairs.push((first, second));
        }
    }

    let mut effects = Vec::with_capacity(pairs.len());
    for (first, second) in pairs {
        settle_growth(world, first);
        settle_growth(world, second);
        match world.set_partners(first, second) {
            Ok(()) => effects.push(Effect::Paired { first, second }),
            Err(error) => {
                tracing::warn!(%first, %second, %error, "pairing rejected");
            }
        }
    }
    tracing::info!(
        candidates = candidates.len(),
        pairs = effects.len(),
        forced,
        dominance,
        min_combined,
        cap,
        "pairing pass"
    );
    effects
}

/// Finish any in-progress growth before the animal is repurposed.
fn settle_growth(world: &mut WorldState, id: EntityId) {
    let Ok(animal) = world.get_alive_mut(id) else {
        return;
    };
    animal.settle_growth();
}

/// Candidate order: larger first, then lower id.
fn by_size_desc(a: &(EntityId, f32), b: &(EntityId, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}
