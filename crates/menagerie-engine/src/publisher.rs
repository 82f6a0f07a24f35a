//! JSON-lines output for the rendering collaborator.
//!
//! Every effect and every periodic world snapshot becomes one line on the
//! output stream, tagged with `type`. Write failures are logged and the
//! frame loop carries on: a slow or closed consumer never stalls the
//! simulation.

use std::io::Write;

use menagerie_core::FrameCallback;
use menagerie_core::tick::FrameReport;
use menagerie_types::{Effect, WorldSnapshot};
use serde::Serialize;
use tracing::warn;

/// One output line.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Outbound<'a> {
    Effect { frame: u64, effect: &'a Effect },
    Snapshot(&'a WorldSnapshot),
}

/// Writes effects and snapshots as JSON lines.
pub struct Publisher<W> {
    out: W,
    lines: u64,
    failures: u64,
}

impl<W: Write> Publisher<W> {
    /// Publish to `out`.
    pub const fn new(out: W) -> Self {
        Self {
            out,
            lines: 0,
            failures: 0,
        }
    }

    /// Publish a world snapshot.
    pub fn publish_snapshot(&mut self, snapshot: &WorldSnapshot) {
        self.write(&Outbound::Snapshot(snapshot));
        self.flush();
    }

    /// Lines written so far.
    pub const fn lines(&self) -> u64 {
        self.lines
    }

    /// Lines that failed to write.
    pub const fn failures(&self) -> u64 {
        self.failures
    }

    fn write(&mut self, message: &Outbound<'_>) {
        let result = serde_json::to_writer(&mut self.out, message)
            .map_err(std::io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"));
        match result {
            Ok(()) => self.lines = self.lines.saturating_add(1),
            Err(error) => {
                self.failures = self.failures.saturating_add(1);
                if self.failures == 1 {
                    warn!(%error, "failed to publish frame output");
                }
            }
        }
    }

    fn flush(&mut self) {
        if let Err(error) = self.out.flush() {
            warn!(%error, "failed to flush frame output");
        }
    }
}

/// Whether a snapshot should follow this frame. Steps that did not advance
/// the world never publish, so a finished game is not re-sent every tick.
pub const fn snapshot_due(report: &FrameReport, every: u64) -> bool {
    if !report.advanced {
        return false;
    }
    match report.frame.checked_rem(every) {
        Some(rem) => rem == 0,
        None => false,
    }
}

impl<W: Write> FrameCallback for Publisher<W> {
    fn on_frame(&mut self, report: &FrameReport, effects: &[Effect]) {
        for effect in effects {
            self.write(&Outbound::Effect {
                frame: report.frame,
                effect,
            });
        }
        if !effects.is_empty() {
            self.flush();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use menagerie_types::{DifficultyMode, EntityId, Vec2};

    use super::*;

    fn report(frame: u64) -> FrameReport {
        FrameReport {
            frame,
            time: 0.5,
            mode: DifficultyMode::Normal,
            alive: 1,
            queued: 0,
            effects: 2,
            game_over: false,
            advanced: true,
        }
    }

    #[test]
    fn effects_become_tagged_lines() {
        let mut publisher = Publisher::new(Vec::new());
        let effects = [
            Effect::Spawned {
                id: EntityId::from_raw(4),
                position: Vec2::new(1.0, 2.0),
                size: 0.5,
            },
            Effect::ModeChanged {
                from: DifficultyMode::Normal,
                to: DifficultyMode::Survival,
            },
        ];
        publisher.on_frame(&report(7), &effects);
        assert_eq!(publisher.lines(), 2);

        let text = String::from_utf8(publisher.out.clone()).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "effect");
        assert_eq!(lines[0]["frame"], 7);
        assert_eq!(
            lines[1]["effect"],
            serde_json::to_value(&effects[1]).unwrap()
        );
    }

    #[test]
    fn write_failures_are_counted_not_raised() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut publisher = Publisher::new(Broken);
        let effects = [Effect::GameOver {
            score: menagerie_types::ScoreSummary::default(),
        }];
        publisher.on_frame(&report(1), &effects);
        publisher.on_frame(&report(2), &effects);
        assert_eq!(publisher.lines(), 0);
        assert_eq!(publisher.failures(), 2);
    }

    #[test]
    fn snapshots_follow_advancing_frames_only() {
        assert!(snapshot_due(&report(30), 30));
        assert!(!snapshot_due(&report(31), 30));
        assert!(!snapshot_due(&report(30), 0));

        let frozen = FrameReport {
            game_over: true,
            advanced: false,
            ..report(30)
        };
        assert!(!snapshot_due(&frozen, 30));
    }
}
