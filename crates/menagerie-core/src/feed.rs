//! Transfer source trait and implementations.
//!
//! The ingestion collaborator (network client, reconnection, decoding) lives
//! outside the simulation. The [`TransferSource`] trait is the seam: the host
//! polls it once per frame and feeds whatever arrived into
//! [`Simulation::enqueue_transfer`](crate::tick::Simulation::enqueue_transfer).
//!
//! - [`StubTransferSource`] produces a seeded synthetic stream with a
//!   configurable rate and log-uniform value distribution.
//! - [`JsonLinesSource`] reads newline-delimited [`RawTransfer`] JSON from any
//!   [`BufRead`], which is how recorded feeds are replayed.

use std::io::BufRead;

use menagerie_types::{RawTransfer, TransferEvent, TransferKind};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

/// Errors that can occur while reading a transfer feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The underlying reader failed.
    #[error("failed to read transfer feed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A line was not a valid transfer record.
    #[error("invalid transfer record on line {line}: {source}")]
    Decode {
        /// 1-based line number.
        line: usize,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

/// A source of transfer events.
///
/// Delivery is at-most-once with no ordering guarantee beyond arrival order.
/// Bursts and gaps are expected.
pub trait TransferSource {
    /// Collect every transfer that arrived since the last poll.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError`] if the source fails entirely. Individual bad
    /// records are skipped, not surfaced.
    fn poll_transfers(&mut self, now: f64) -> Result<Vec<TransferEvent>, FeedError>;

    /// Whether the link to the upstream feed is up. While it is down the
    /// simulation admits nothing.
    fn is_connected(&self) -> bool;

    /// Whether a finite source has delivered its last event. A finished
    /// source is still connected: what it already delivered keeps draining.
    fn is_finished(&self) -> bool {
        false
    }
}

/// Validate a raw record, logging every anomaly that had to be clamped.
pub fn validate(raw: RawTransfer) -> TransferEvent {
    let (event, anomalies) = TransferEvent::from_raw(raw);
    for anomaly in &anomalies {
        tracing::warn!(tx = %event.tx_ref, ?anomaly, "clamped transfer input");
    }
    event
}

/// Decode one JSON line into a raw record.
pub fn parse_line(line_number: usize, line: &str) -> Result<RawTransfer, FeedError> {
    serde_json::from_str(line).map_err(|source| FeedError::Decode {
        line: line_number,
        source,
    })
}

// ---------------------------------------------------------------------------
// Synthetic stream
// ---------------------------------------------------------------------------

const STUB_KINDS: [TransferKind; 3] = [TransferKind::Usdc, TransferKind::Usdt, TransferKind::Dai];

/// A seeded synthetic transfer stream.
///
/// Events arrive at `rate_per_sec` on average (accumulated against the
/// simulation clock, so the stream is frame-rate independent). Values are
/// log-uniform: `10^U(min_magnitude, max_magnitude) - 1`.
#[derive(Debug, Clone)]
pub struct StubTransferSource {
    rng: SmallRng,
    rate_per_sec: f64,
    min_magnitude: f64,
    max_magnitude: f64,
    last_poll: Option<f64>,
    owed: f64,
    remaining: Option<u64>,
    connected: bool,
    block: u64,
}

impl StubTransferSource {
    /// Create a stream of `rate_per_sec` events per simulated second.
    pub fn new(seed: u64, rate_per_sec: f64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            rate_per_sec: if rate_per_sec.is_finite() { rate_per_sec.max(0.0) } else { 0.0 },
            min_magnitude: 0.0,
            max_magnitude: 5.0,
            last_poll: None,
            owed: 0.0,
            remaining: None,
            connected: true,
            block: 19_000_000,
        }
    }

    /// Restrict values to `10^min - 1 ..= 10^max - 1`.
    #[must_use]
    pub fn with_magnitude_range(mut self, min: f64, max: f64) -> Self {
        let min = if min.is_finite() { min.max(0.0) } else { 0.0 };
        let max = if max.is_finite() { max.max(min) } else { min };
        self.min_magnitude = min;
        self.max_magnitude = max;
        self
    }

    /// Finish after `count` events.
    #[must_use]
    pub const fn with_limit(mut self, count: u64) -> Self {
        self.remaining = Some(count);
        self
    }

    /// Simulate the upstream link dropping or coming back.
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    fn next_event(&mut self) -> TransferEvent {
        let magnitude = if self.max_magnitude > self.min_magnitude {
            self.rng.random_range(self.min_magnitude..self.max_magnitude)
        } else {
            self.min_magnitude
        };
        let value = (10_f64.powf(magnitude) - 1.0).max(0.0);
        let amount = Decimal::from_f64_retain(value)
            .unwrap_or(Decimal::ZERO)
            .round_dp(2);
        let kind = STUB_KINDS
            .get(self.rng.random_range(0..STUB_KINDS.len()))
            .copied()
            .unwrap_or(TransferKind::Usdc);
        self.block = self.block.saturating_add(u64::from(self.rng.random_bool(0.1)));

        let mut event = TransferEvent::new(kind, amount);
        event.participant_a = format!("0x{:016x}", self.rng.random::<u64>());
        event.participant_b = format!("0x{:016x}", self.rng.random::<u64>());
        event.block_ref = self.block;
        event.tx_ref = format!("0x{:016x}", self.rng.random::<u64>());
        event
    }
}

impl TransferSource for StubTransferSource {
    fn poll_transfers(&mut self, now: f64) -> Result<Vec<TransferEvent>, FeedError> {
        let elapsed = self.last_poll.map_or(0.0, |last| (now - last).max(0.0));
        self.last_poll = Some(now);
        self.owed += elapsed * self.rate_per_sec;

        let mut events = Vec::new();
        if !self.connected {
            self.owed = 0.0;
            return Ok(Vec::new());
        }
        while self.owed >= 1.0 && !self.is_finished() {
            self.owed -= 1.0;
            if let Some(remaining) = self.remaining.as_mut() {
                *remaining = remaining.saturating_sub(1);
            }
            events.push(self.next_event());
        }
        Ok(events)
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn is_finished(&self) -> bool {
        self.remaining == Some(0)
    }
}

// ---------------------------------------------------------------------------
// Recorded stream
// ---------------------------------------------------------------------------

/// Reads newline-delimited [`RawTransfer`] JSON.
///
/// At most `per_poll` records are delivered per poll so a recorded file
/// replays as a stream instead of one giant burst. End of input finishes
/// the source; a read failure is returned as an error.
#[derive(Debug)]
pub struct JsonLinesSource<R> {
    reader: R,
    per_poll: usize,
    line_number: usize,
    exhausted: bool,
    skipped: usize,
}

impl<R: BufRead> JsonLinesSource<R> {
    /// Wrap a reader, delivering up to `per_poll` records each poll.
    pub fn new(reader: R, per_poll: usize) -> Self {
        Self {
            reader,
            per_poll: per_poll.max(1),
            line_number: 0,
            exhausted: false,
            skipped: 0,
        }
    }

    /// Lines skipped because they did not decode.
    pub const fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<R: BufRead> TransferSource for JsonLinesSource<R> {
    fn poll_transfers(&mut self, _now: f64) -> Result<Vec<TransferEvent>, FeedError> {
        let mut events = Vec::new();
        let mut line = String::new();
        while !self.exhausted && events.len() < self.per_poll {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                self.exhausted = true;
                tracing::info!(lines = self.line_number, skipped = self.skipped, "transfer feed exhausted");
                break;
            }
            self.line_number = self.line_number.saturating_add(1);
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match parse_line(self.line_number, trimmed) {
                Ok(raw) => events.push(validate(raw)),
                Err(error) => {
                    self.skipped = self.skipped.saturating_add(1);
                    tracing::warn!(%error, "skipping transfer record");
                }
            }
        }
        Ok(events)
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn is_finished(&self) -> bool {
        self.exhausted
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn stub_rate_follows_simulated_time() {
        let mut source = StubTransferSource::new(7, 2.0);
        assert!(source.poll_transfers(0.0).unwrap().is_empty());
        assert_eq!(source.poll_transfers(1.0).unwrap().len(), 2);
        assert_eq!(source.poll_transfers(1.25).unwrap().len(), 0);
        assert_eq!(source.poll_transfers(2.0).unwrap().len(), 2);
    }

    #[test]
    fn stub_values_stay_in_magnitude_range() {
        let mut source = StubTransferSource::new(3, 100.0).with_magnitude_range(2.0, 3.0);
        source.poll_transfers(0.0).unwrap();
        let events = source.poll_transfers(1.0).unwrap();
        assert_eq!(events.len(), 100);
        for event in events {
            let value = event.value_f64();
            assert!((98.0..=1_000.0).contains(&value), "value {value}");
            assert!(event.participant_a.starts_with("0x"));
        }
    }

    #[test]
    fn stub_limit_finishes_without_disconnecting() {
        let mut source = StubTransferSource::new(3, 10.0).with_limit(5);
        source.poll_transfers(0.0).unwrap();
        assert_eq!(source.poll_transfers(10.0).unwrap().len(), 5);
        assert!(source.is_finished());
        assert!(source.is_connected());
        assert!(source.poll_transfers(20.0).unwrap().is_empty());
    }

    #[test]
    fn disconnected_stub_delivers_nothing_and_forgets_the_backlog() {
        let mut source = StubTransferSource::new(3, 10.0);
        source.poll_transfers(0.0).unwrap();
        source.set_connected(false);
        assert!(source.poll_transfers(5.0).unwrap().is_empty());
        source.set_connected(true);
        assert_eq!(source.poll_transfers(5.5).unwrap().len(), 5);
    }

    #[test]
    fn json_lines_replay_in_batches_and_skip_garbage() {
        let input = concat!(
            r#"{"stablecoin":"USDC","amount":"100.50","from":"0xa","to":"0xb","block_number":1,"tx_hash":"0x1"}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"stablecoin":"DAI","amount":"-4"}"#,
            "\n",
            r#"{"stablecoin":"USDT","amount":"7"}"#,
            "\n",
        );
        let mut source = JsonLinesSource::new(Cursor::new(input), 2);

        let first = source.poll_transfers(0.0).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].kind, TransferKind::Usdc);
        assert_eq!(first[1].kind, TransferKind::Dai);
        assert_eq!(first[1].value, Decimal::ZERO);
        assert_eq!(source.skipped(), 1);
        assert!(!source.is_finished());

        let second = source.poll_transfers(0.1).unwrap();
        assert_eq!(second.len(), 1);
        assert!(source.is_finished());
        assert!(source.is_connected());
    }

    #[test]
    fn parse_line_reports_line_number() {
        let error = parse_line(12, "{").unwrap_err();
        assert!(matches!(error, FeedError::Decode { line: 12, .. }));
    }
}
