//! End-to-end scenarios driven through [`Simulation`] and [`SpawnQueue`].
//!
//! The scripted scenarios run in a hazard-free world so outcomes depend
//! only on the rules under test. The long run uses the full world with a
//! synthetic feed and checks invariants after every frame.

#![allow(clippy::unwrap_used)]

use menagerie_agents::{classify_threat, speed};
use menagerie_core::config::SpawnConfig;
use menagerie_core::runner::drive_frame;
use menagerie_core::{
    EndReason, JsonLinesSource, NoOpCallback, Simulation, SimulationConfig, SpawnQueue,
    StubTransferSource, TransferSource, run_headless,
};
use menagerie_types::{
    BehaviorState, Consumer, DifficultyMode, Effect, EntityId, SizeClass, TransferEvent, TransferKind,
    Vec2,
};
use menagerie_world::{AnimalParams, MIN_SIZE, WorldState};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

fn sim_with(config: SimulationConfig) -> Simulation {
    let world = WorldState::with_hazards(&config.world_params(), Vec::new());
    Simulation::with_world(config, world, SmallRng::seed_from_u64(11))
}

fn sim() -> Simulation {
    let mut config = SimulationConfig::default();
    config.world.hazard_count = 0;
    sim_with(config)
}

/// Place an animal directly, bypassing the queue. It is created on the
/// next frame so it does not act before that frame's collision pass.
fn place(sim: &mut Simulation, value: f64, size: f32, position: Vec2) -> EntityId {
    let frame = sim.clock().frame() + 1;
    let now = sim.clock().now();
    let world = sim.world_mut();
    let id = world
        .spawn_animal(
            AnimalParams {
                currency: TransferKind::Usdc,
                value,
                position,
                heading: 0.0,
                base_speed: 1.5,
            },
            now,
            frame,
        )
        .id;
    world.get_alive_mut(id).unwrap().set_size(size);
    id
}

#[test]
fn player_consumes_smaller_animal_on_contact() {
    let mut sim = sim();
    let value = 250.0;
    let id = place(&mut sim, value, 0.5, Vec2::ZERO);

    sim.step(0.016);

    assert!(sim.world().get_alive(id).is_err());
    let expected = 1.0 + (value + 1.0).log10() as f32 * 0.1;
    assert!((sim.world().player.natural_size() - expected).abs() < 1e-5);
    let effects = sim.drain_effects();
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::Consumed { id: eaten, consumer: Consumer::Player, .. } if *eaten == id
    )));
    assert_eq!(sim.score().entities_eaten, 1);
    assert!((sim.score().value_consumed - value).abs() < 1e-9);
}

#[test]
fn dominant_player_triggers_alliance_and_pairing() {
    let mut sim = sim();
    for i in 0..10_u8 {
        let size = 0.3 + f32::from(i) * 0.05;
        let x = 30.0 + f32::from(i) * 5.0;
        place(&mut sim, 50.0, size, Vec2::new(x, 0.0));
    }
    let largest = sim.world().largest_animal_size().unwrap();
    assert!(largest < 0.8 * sim.world().player.effective_size());

    // The first sample is taken once the sample interval has elapsed.
    for _ in 0..51 {
        sim.step(0.1);
    }

    assert_eq!(sim.mode(), DifficultyMode::Alliance);
    assert!(sim.difficulty().pairing_passes() >= 1);
    let effects = sim.drain_effects();
    assert!(effects.contains(&Effect::ModeChanged {
        from: DifficultyMode::Normal,
        to: DifficultyMode::Alliance,
    }));
    assert!(effects.iter().any(|e| matches!(e, Effect::Paired { .. })));
}

#[test]
fn queue_favours_smaller_spawns_in_admission_order() {
    let mut queue = SpawnQueue::new(&SpawnConfig {
        target_smaller_ratio: 0.7,
        ..SpawnConfig::default()
    });
    let player_size = 1.0;
    let mut rng = SmallRng::seed_from_u64(2024);
    for _ in 0..20 {
        let magnitude: f64 = rng.random_range(0.0..5.0);
        let amount = Decimal::from_f64_retain(10_f64.powf(magnitude) - 1.0)
            .unwrap()
            .round_dp(2);
        queue.enqueue(TransferEvent::new(TransferKind::Usdc, amount), 0.0);
    }
    let available_smaller = queue
        .pending()
        .filter(|p| p.is_smaller_than(player_size))
        .count();

    let mut admitted = Vec::new();
    let mut now = 0.0;
    while let Some(entry) = queue.poll(now, player_size) {
        admitted.push(entry.is_smaller_than(player_size));
        now += 1.0;
    }

    assert_eq!(admitted.len(), 20);
    let early_smaller = admitted.iter().take(10).filter(|&&s| s).count();
    assert!(
        early_smaller >= available_smaller.min(7),
        "{early_smaller} of the first 10 were smaller ({available_smaller} available)"
    );
}

#[test]
fn giant_predator_only_chases_at_close_range() {
    let behavior = SimulationConfig::default().behavior;
    let nominal =
        speed::profile(SizeClass::Colossal).detection_radius * behavior.chase_radius_factor;
    let limit = 0.15 * nominal;

    for start in [2.5_f32, 5.0, 8.0, 12.0, 16.0] {
        let mut sim = sim();
        let id = place(&mut sim, 1_000_000.0, 3.0, Vec2::new(start, 0.0));
        for _ in 0..200 {
            let before = sim
                .world()
                .get_alive(id)
                .unwrap()
                .position
                .distance(sim.world().player.position);
            let report = sim.step(0.05);
            if report.game_over {
                break;
            }
            let animal = sim.world().get_alive(id).unwrap();
            if animal.state == BehaviorState::Chasing {
                assert!(
                    before < limit + 1e-4,
                    "chasing from {before} (limit {limit}), start {start}"
                );
            }
        }
    }
}

fn replay_file(lines: usize) -> String {
    (0..lines)
        .map(|i| {
            format!(
                r#"{{"stablecoin":"DAI","amount":"{}.00","from":"0xa","to":"0xb","tx_hash":"0x{i:x}"}}"#,
                i % 9 + 1
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn replayed_feed_is_admitted_after_end_of_input() {
    let mut sim = sim();
    let input = replay_file(30);
    let mut source = JsonLinesSource::new(input.as_bytes(), 4);

    let mut frames = 0;
    while !(source.is_finished() && sim.queue().is_empty()) {
        let (report, _) = drive_frame(&mut sim, &mut source, 0.1).unwrap();
        assert!(sim.feed_connected());
        assert!(!report.game_over);
        frames += 1;
        assert!(frames < 1_000, "queue never drained");
    }

    let stats = sim.queue().stats();
    assert_eq!(stats.admitted, 30);
    assert_eq!(stats.dropped, 0);
}

#[test]
fn overflowing_replay_loses_only_dropped_entries() {
    let mut config = SimulationConfig::default();
    config.world.hazard_count = 0;
    config.spawn.max_queue_size = 10;
    let mut sim = sim_with(config);
    let input = replay_file(40);
    let mut source = JsonLinesSource::new(input.as_bytes(), 20);

    let result = run_headless(&mut sim, &mut source, 5_000, 0.1, &mut NoOpCallback).unwrap();

    assert_eq!(result.end_reason, EndReason::FeedExhausted);
    let stats = sim.queue().stats();
    assert!(stats.dropped > 0);
    assert_eq!(stats.admitted + stats.dropped, 40);
}

#[test]
fn long_run_keeps_world_invariants() {
    let mut config = SimulationConfig::default();
    config.world.hazard_count = 6;
    config.world.max_animals = 40;
    config.world.eviction_batch = 8;
    config.spawn.min_interval_ms = 100;
    config.spawn.max_queue_size = 25;
    let mut sim = Simulation::new(config.clone());
    let mut source = StubTransferSource::new(99, 20.0);
    sim.set_player_intent(Vec2::new(1.0, 0.3));

    for frame in 0..3_000_u32 {
        if frame % 200 == 0 {
            let turn = if frame % 400 == 0 { -1.0 } else { 1.0 };
            sim.set_player_intent(Vec2::new(turn, 0.5));
        }
        let mode_before = sim.mode();
        let (report, effects) = drive_frame(&mut sim, &mut source, 0.05).unwrap();
        let world = sim.world();

        assert!(report.queued <= config.spawn.max_queue_size);
        assert!(world.alive_count() <= config.world.max_animals);
        let player = &world.player;
        assert!(player.natural_size() <= config.player.max_size + 1e-5);
        assert!(world.arena().contains(player.position));

        for animal in world.alive() {
            assert!(animal.size().is_finite());
            assert!(animal.size() >= MIN_SIZE - 1e-6);
            assert!(animal.size() <= animal.ceiling() + 1e-5);
            if let Some(partner) = animal.partner {
                let other = world.get_alive(partner).unwrap();
                assert_eq!(other.partner, Some(animal.id), "pairing must be mutual");
            }
            if animal.state == BehaviorState::Merging {
                assert_eq!(sim.mode(), DifficultyMode::Alliance);
            }
            let threat = classify_threat(
                animal.size(),
                player.effective_size(),
                &sim.config().agent_config().collision,
            );
            let again = classify_threat(
                animal.size(),
                player.effective_size(),
                &sim.config().agent_config().collision,
            );
            assert_eq!(threat, again);
        }

        if effects.iter().any(|e| matches!(e, Effect::Paired { .. })) {
            assert!(
                mode_before == DifficultyMode::Alliance || sim.mode() == DifficultyMode::Alliance
            );
        }
        if report.game_over {
            break;
        }
    }
}
