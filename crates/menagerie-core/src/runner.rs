//! Headless simulation loop.
//!
//! [`run_headless`] drives a [`Simulation`] at a fixed delta without a
//! renderer, pulling transfers from any [`TransferSource`] each frame. It is
//! what replays and soak tests use; the engine binary drives the same
//! per-frame sequence ([`drive_frame`]) from a real-time interval instead.
//!
//! The loop ends when:
//!
//! - the frame limit is reached,
//! - the player loses the last life,
//! - a finished source has had its last queued event admitted, or
//! - the source disconnects. A disconnected feed admits nothing more, so
//!   whatever is still queued at that point stays unadmitted.

use tracing::info;

use menagerie_types::{Effect, ScoreSummary};

use crate::feed::{FeedError, TransferSource};
use crate::tick::{FrameReport, Simulation};

/// Errors that can occur during a headless run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The transfer source failed.
    #[error("feed error: {source}")]
    Feed {
        /// The underlying feed error.
        #[from]
        source: FeedError,
    },
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The requested number of frames ran.
    FrameLimit,
    /// The player ran out of lives.
    GameOver,
    /// The source finished and everything it delivered was admitted or
    /// dropped on overflow.
    FeedExhausted,
    /// The source disconnected.
    FeedDisconnected,
}

/// Result of a headless run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunResult {
    /// Frames executed.
    pub frames: u64,
    /// Why the run stopped.
    pub end_reason: EndReason,
    /// Score at the end of the run.
    pub final_score: ScoreSummary,
}

/// Callback invoked after each frame.
///
/// Receives the frame report and the effects the frame produced, in order.
pub trait FrameCallback {
    /// Called after a frame completes.
    fn on_frame(&mut self, report: &FrameReport, effects: &[Effect]);
}

/// A callback that ignores every frame.
pub struct NoOpCallback;

impl FrameCallback for NoOpCallback {
    fn on_frame(&mut self, _report: &FrameReport, _effects: &[Effect]) {}
}

/// Poll the source, feed the simulation, and run one frame.
///
/// Returns the frame report and the effects drained from the simulation.
///
/// # Errors
///
/// Returns [`FeedError`] if the source fails.
pub fn drive_frame(
    sim: &mut Simulation,
    source: &mut impl TransferSource,
    dt: f32,
) -> Result<(FrameReport, Vec<Effect>), FeedError> {
    for event in source.poll_transfers(sim.clock().now())? {
        sim.enqueue_transfer(event);
    }
    sim.set_feed_connected(source.is_connected());
    let report = sim.step(dt);
    Ok((report, sim.drain_effects()))
}

/// Run up to `max_frames` frames of `dt` seconds each.
///
/// # Errors
///
/// Returns [`RunnerError`] if the transfer source fails.
pub fn run_headless(
    sim: &mut Simulation,
    source: &mut impl TransferSource,
    max_frames: u64,
    dt: f32,
    callback: &mut impl FrameCallback,
) -> Result<RunResult, RunnerError> {
    info!(max_frames, dt, "headless run starting");

    let mut frames: u64 = 0;
    let end_reason = loop {
        if frames >= max_frames {
            break EndReason::FrameLimit;
        }
        let (report, effects) = drive_frame(sim, source, dt)?;
        frames = frames.saturating_add(1);
        callback.on_frame(&report, &effects);

        if report.game_over {
            break EndReason::GameOver;
        }
        if !source.is_connected() {
            break EndReason::FeedDisconnected;
        }
        if source.is_finished() && sim.queue().is_empty() {
            break EndReason::FeedExhausted;
        }
    };

    let final_score = sim.score();
    info!(
        frames,
        ?end_reason,
        unadmitted = sim.queue().len(),
        dropped = sim.queue().stats().dropped,
        value_consumed = final_score.value_consumed,
        entities_eaten = final_score.entities_eaten,
        peak_size = final_score.peak_size,
        "headless run finished"
    );
    Ok(RunResult {
        frames,
        end_reason,
        final_score,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use menagerie_types::{TransferEvent, TransferKind};
    use menagerie_world::WorldState;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use std::io::Cursor;

    use super::*;
    use crate::config::SimulationConfig;
    use crate::feed::{JsonLinesSource, StubTransferSource};

    fn sim() -> Simulation {
        let mut config = SimulationConfig::default();
        config.world.hazard_count = 0;
        let world = WorldState::with_hazards(&config.world_params(), Vec::new());
        Simulation::with_world(config, world, SmallRng::seed_from_u64(1))
    }

    struct Counting {
        frames: u64,
        spawned: usize,
    }

    impl FrameCallback for Counting {
        fn on_frame(&mut self, _report: &FrameReport, effects: &[Effect]) {
            self.frames += 1;
            self.spawned += effects
                .iter()
                .filter(|e| matches!(e, Effect::Spawned { .. }))
                .count();
        }
    }

    #[test]
    fn stops_at_frame_limit() {
        let mut sim = sim();
        let mut source = StubTransferSource::new(5, 1.0);
        let result = run_headless(&mut sim, &mut source, 30, 0.016, &mut NoOpCallback).unwrap();
        assert_eq!(result.frames, 30);
        assert_eq!(result.end_reason, EndReason::FrameLimit);
        assert_eq!(sim.clock().frame(), 30);
    }

    #[test]
    fn finished_feed_drains_its_queue_before_ending() {
        let mut sim = sim();
        // Everything arrives within two frames; admission then trails at
        // one entry per 0.8 s.
        let mut source = StubTransferSource::new(1, 100.0)
            .with_magnitude_range(0.0, 1.0)
            .with_limit(5);
        let mut callback = Counting { frames: 0, spawned: 0 };
        let result = run_headless(&mut sim, &mut source, 10_000, 0.1, &mut callback).unwrap();
        assert_eq!(result.end_reason, EndReason::FeedExhausted);
        assert_eq!(sim.queue().stats().admitted, 5);
        assert!(sim.queue().is_empty());
        assert_eq!(callback.spawned, 5);
        assert!(result.frames > 30);
    }

    #[test]
    fn replayed_lines_are_all_admitted() {
        let line = r#"{"stablecoin":"USDC","amount":"1.00","from":"0xa","to":"0xb"}"#;
        let input = format!("{line}\n").repeat(12);
        let mut source = JsonLinesSource::new(Cursor::new(input), 4);
        let mut sim = sim();
        let result = run_headless(&mut sim, &mut source, 10_000, 0.1, &mut NoOpCallback).unwrap();
        assert_eq!(result.end_reason, EndReason::FeedExhausted);
        let stats = sim.queue().stats();
        assert_eq!(stats.dropped, 0);
        assert_eq!(stats.admitted, 12);
    }

    #[test]
    fn disconnected_source_blocks_admission() {
        let mut sim = sim();
        let mut source = StubTransferSource::new(5, 50.0);
        drive_frame(&mut sim, &mut source, 0.1).unwrap();
        source.set_connected(false);
        for _ in 0..3 {
            sim.enqueue_transfer(TransferEvent::new(TransferKind::Usdc, Decimal::ONE));
        }
        drive_frame(&mut sim, &mut source, 0.1).unwrap();
        assert!(!sim.feed_connected());
        assert_eq!(sim.queue().stats().admitted, 0);

        let result = run_headless(&mut sim, &mut source, 100, 0.1, &mut NoOpCallback).unwrap();
        assert_eq!(result.end_reason, EndReason::FeedDisconnected);
        assert_eq!(result.frames, 1);
        assert_eq!(sim.queue().stats().admitted, 0);
        assert_eq!(sim.queue().len(), 3);
    }
}
