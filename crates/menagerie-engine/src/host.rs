//! Host-side settings: frame pacing, feed selection, and output cadence.
//!
//! These live under the `host` key of `menagerie-config.yaml`, next to the
//! simulation sections. The simulation crates never see them.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use menagerie_core::{FeedError, JsonLinesSource, StubTransferSource, TransferSource};
use menagerie_types::TransferEvent;
use serde::Deserialize;

use crate::error::EngineError;

/// Settings for the host loop.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HostConfig {
    /// Target milliseconds between frames.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Stop after this many frames (0 runs until Ctrl-C or game over).
    #[serde(default)]
    pub max_frames: u64,

    /// Start a new game instead of exiting when the player dies.
    #[serde(default)]
    pub restart_on_game_over: bool,

    /// Emit a world snapshot every this many frames (0 disables snapshots).
    #[serde(default = "default_snapshot_every")]
    pub snapshot_every: u64,

    /// Synthetic transfers per simulated second when no replay file is given.
    #[serde(default = "default_stub_rate")]
    pub stub_rate_per_sec: f64,

    /// Smallest synthetic magnitude (`log10(value + 1)`).
    #[serde(default)]
    pub stub_min_magnitude: f64,

    /// Largest synthetic magnitude.
    #[serde(default = "default_stub_max_magnitude")]
    pub stub_max_magnitude: f64,

    /// Replay records delivered per frame.
    #[serde(default = "default_replay_per_frame")]
    pub replay_per_frame: usize,
}

const fn default_frame_interval_ms() -> u64 {
    16
}

const fn default_snapshot_every() -> u64 {
    30
}

const fn default_stub_rate() -> f64 {
    2.0
}

const fn default_stub_max_magnitude() -> f64 {
    5.0
}

const fn default_replay_per_frame() -> usize {
    4
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            max_frames: 0,
            restart_on_game_over: false,
            snapshot_every: default_snapshot_every(),
            stub_rate_per_sec: default_stub_rate(),
            stub_min_magnitude: 0.0,
            stub_max_magnitude: default_stub_max_magnitude(),
            replay_per_frame: default_replay_per_frame(),
        }
    }
}

impl HostConfig {
    /// Read the `host` section of a YAML document. A missing section gives
    /// defaults.
    pub fn parse(yaml: &str) -> Result<Self, EngineError> {
        let raw: serde_yml::Value =
            serde_yml::from_str(yaml).map_err(|e| EngineError::HostConfig {
                message: format!("failed to parse config YAML: {e}"),
            })?;
        match raw.get("host") {
            Some(section) => serde_yml::from_value(section.clone()).map_err(|e| {
                EngineError::HostConfig {
                    message: format!("failed to parse host section: {e}"),
                }
            }),
            None => Ok(Self::default()),
        }
    }
}

/// The transfer feed the engine was started with.
#[derive(Debug)]
pub enum Feed {
    /// Seeded synthetic stream.
    Stub(StubTransferSource),
    /// Recorded JSON-lines file.
    Replay(JsonLinesSource<BufReader<File>>),
}

impl Feed {
    /// Open `path` for replay, or build the synthetic stream when no path is
    /// given.
    pub fn open(path: Option<&Path>, seed: u64, config: &HostConfig) -> Result<Self, EngineError> {
        match path {
            Some(path) => {
                let file = File::open(path)?;
                Ok(Self::Replay(JsonLinesSource::new(
                    BufReader::new(file),
                    config.replay_per_frame,
                )))
            }
            None => Ok(Self::Stub(
                StubTransferSource::new(seed, config.stub_rate_per_sec)
                    .with_magnitude_range(config.stub_min_magnitude, config.stub_max_magnitude),
            )),
        }
    }

    /// Short name for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Stub(_) => "synthetic",
            Self::Replay(_) => "replay",
        }
    }
}

impl TransferSource for Feed {
    fn poll_transfers(&mut self, now: f64) -> Result<Vec<TransferEvent>, FeedError> {
        match self {
            Self::Stub(source) => source.poll_transfers(now),
            Self::Replay(source) => source.poll_transfers(now),
        }
    }

    fn is_connected(&self) -> bool {
        match self {
            Self::Stub(source) => source.is_connected(),
            Self::Replay(source) => source.is_connected(),
        }
    }

    fn is_finished(&self) -> bool {
        match self {
            Self::Stub(source) => source.is_finished(),
            Self::Replay(source) => source.is_finished(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_host_section_gives_defaults() {
        let config = HostConfig::parse("world:\n  seed: 3\n").unwrap();
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.frame_interval_ms, 16);
    }

    #[test]
    fn host_section_overrides_named_keys() {
        let yaml = "host:\n  max_frames: 600\n  restart_on_game_over: true\n";
        let config = HostConfig::parse(yaml).unwrap();
        assert_eq!(config.max_frames, 600);
        assert!(config.restart_on_game_over);
        assert_eq!(config.snapshot_every, 30);
    }

    #[test]
    fn bad_host_section_is_an_error() {
        let result = HostConfig::parse("host:\n  max_frames: lots\n");
        assert!(matches!(result, Err(EngineError::HostConfig { .. })));
    }

    #[test]
    fn missing_replay_file_is_an_io_error() {
        let result = Feed::open(
            Some(Path::new("/nonexistent/menagerie-feed.jsonl")),
            1,
            &HostConfig::default(),
        );
        assert!(matches!(result, Err(EngineError::Io { .. })));
    }

    #[test]
    fn no_path_selects_the_synthetic_stream() {
        let feed = Feed::open(None, 1, &HostConfig::default()).unwrap();
        assert_eq!(feed.kind(), "synthetic");
        assert!(feed.is_connected());
        assert!(!feed.is_finished());
    }
}
