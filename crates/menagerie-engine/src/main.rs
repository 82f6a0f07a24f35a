//! Host binary for the Menagerie simulation.
//!
//! Wires a transfer feed into a [`Simulation`] and paces frames in real
//! time. Effects and periodic world snapshots are written to stdout as JSON
//! lines for a renderer to consume; logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Load `menagerie-config.yaml` (or the file named by `MENAGERIE_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Open the transfer feed: a JSON-lines replay file when one is passed as
//!    the first argument, otherwise the seeded synthetic stream
//! 4. Build the simulation
//! 5. Run the frame loop until Ctrl-C, game over, or the frame limit
//! 6. Log the final score
//!
//! [`Simulation`]: menagerie_core::Simulation

mod error;
mod host;
mod publisher;

use std::path::{Path, PathBuf};
use std::time::Duration;

use menagerie_core::config::LoggingConfig;
use menagerie_core::runner::drive_frame;
use menagerie_core::{FrameCallback, Simulation, SimulationConfig, TransferSource};
use tokio::time::MissedTickBehavior;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::host::{Feed, HostConfig};
use crate::publisher::{Publisher, snapshot_due};

/// Environment variable naming the config file.
const CONFIG_PATH_ENV_VAR: &str = "MENAGERIE_CONFIG";

/// Config file used when `MENAGERIE_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "menagerie-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the feed, or the signal handler
/// fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = std::env::var_os(CONFIG_PATH_ENV_VAR)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let loaded = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&loaded.simulation.logging);
    info!("menagerie-engine starting");
    if loaded.from_file {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    let LoadedConfig {
        simulation: config,
        host,
        ..
    } = loaded;

    // 3. Open the transfer feed.
    let feed_path = std::env::args_os().nth(1).map(PathBuf::from);
    let mut feed = Feed::open(feed_path.as_deref(), config.world.seed, &host)?;
    info!(
        feed = feed.kind(),
        path = ?feed_path,
        "Transfer feed opened"
    );

    // 4. Build the simulation.
    let mut sim = Simulation::new(config);
    let mut publisher = Publisher::new(std::io::stdout().lock());

    // 5. Run the frame loop.
    let mut interval = tokio::time::interval(Duration::from_millis(host.frame_interval_ms.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        frame_interval_ms = host.frame_interval_ms,
        max_frames = host.max_frames,
        "Entering frame loop"
    );

    let mut last_tick = interval.tick().await;
    let mut frames: u64 = 0;
    let mut feed_drained = false;
    let stop_reason = loop {
        tokio::select! {
            signal = &mut shutdown => {
                signal?;
                break "interrupted";
            }
            tick = interval.tick() => {
                let dt = tick.duration_since(last_tick).as_secs_f32();
                last_tick = tick;

                let (report, effects) = drive_frame(&mut sim, &mut feed, dt)?;
                frames = frames.saturating_add(1);
                publisher.on_frame(&report, &effects);
                if snapshot_due(&report, host.snapshot_every) {
                    publisher.publish_snapshot(&sim.snapshot());
                }
                if !feed_drained && feed.is_finished() && sim.queue().is_empty() {
                    feed_drained = true;
                    info!(frame = report.frame, "Transfer feed finished and fully admitted");
                }

                if report.game_over {
                    if !host.restart_on_game_over {
                        break "game over";
                    }
                    sim.restart();
                }
                if host.max_frames > 0 && frames >= host.max_frames {
                    break "frame limit";
                }
            }
        }
    };

    // 6. Log results.
    let score = sim.score();
    info!(
        reason = stop_reason,
        frames,
        value_consumed = score.value_consumed,
        entities_eaten = score.entities_eaten,
        peak_size = score.peak_size,
        survival_seconds = score.survival_seconds,
        lines_published = publisher.lines(),
        publish_failures = publisher.failures(),
        "menagerie-engine shutdown complete"
    );

    Ok(())
}

/// Simulation and host settings read from one file.
struct LoadedConfig {
    simulation: SimulationConfig,
    host: HostConfig,
    from_file: bool,
}

/// Load both config sections from `path`, falling back to defaults when
/// the file does not exist.
fn load_config(path: &Path) -> Result<LoadedConfig, EngineError> {
    if !path.exists() {
        let mut simulation = SimulationConfig::default();
        simulation.world.apply_env_overrides();
        return Ok(LoadedConfig {
            simulation,
            host: HostConfig::default(),
            from_file: false,
        });
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(LoadedConfig {
        simulation: SimulationConfig::parse(&contents)?,
        host: HostConfig::parse(&contents)?,
        from_file: true,
    })
}

/// Install the global subscriber. `RUST_LOG` wins over the config level.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
