//! Frame clock, admission, difficulty, and orchestration for the Menagerie
//! simulation.
//!
//! This crate owns the frame cycle that turns stablecoin transfers into
//! animals and drives them: Clock, Timers, Admission, Behavior, Player,
//! Collision, Reap, and Difficulty.
//!
//! # Modules
//!
//! - [`clock`] -- Frame counter and simulation time with delta clamping.
//! - [`config`] -- Configuration loading from `menagerie-config.yaml` into
//!   strongly-typed structs.
//! - [`difficulty`] -- Population sampling, mode transitions, and alliance
//!   pairing.
//! - [`feed`] -- [`TransferSource`] trait, [`StubTransferSource`], and
//!   JSON-lines replay.
//! - [`runner`] -- Headless loop with frame callbacks.
//! - [`spawn_queue`] -- Rate-limited, size-balanced admission queue.
//! - [`tick`] -- The per-frame [`Simulation`] engine.
//!
//! [`TransferSource`]: feed::TransferSource
//! [`StubTransferSource`]: feed::StubTransferSource
//! [`Simulation`]: tick::Simulation

pub mod clock;
pub mod config;
pub mod difficulty;
pub mod feed;
pub mod runner;
pub mod spawn_queue;
pub mod tick;

pub use clock::SimClock;
pub use config::{ConfigError, SimulationConfig};
pub use difficulty::{DifficultyController, PopulationSample};
pub use feed::{FeedError, JsonLinesSource, StubTransferSource, TransferSource};
pub use runner::{EndReason, FrameCallback, NoOpCallback, RunResult, RunnerError, run_headless};
pub use spawn_queue::{PendingSpawn, QueueStats, SpawnQueue};
pub use tick::{FrameReport, Simulation};
