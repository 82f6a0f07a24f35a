//! Rate-limited admission of transfer events into the world.
//!
//! Events arrive in bursts and gaps; the queue smooths them into at most one
//! admission per `min_interval`. The frame loop is the only clock: the
//! queue never schedules anything itself, it simply refuses to admit again
//! until enough simulation time has passed since the last admission.
//!
//! Before each admission the pending entries are stably partitioned so the
//! kind the realized mix is short of (smaller or larger than the player)
//! moves to the front. Arrival order is preserved within each side.
//!
//! Overflow drops the oldest pending entry. Events are a best-effort stream,
//! so nothing is surfaced to the caller beyond the returned entry and a log
//! line.

use std::collections::VecDeque;

use menagerie_types::TransferEvent;
use menagerie_world::sizing;

use crate::config::SpawnConfig;

/// One pending transfer waiting for admission.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSpawn {
    /// The validated transfer.
    pub event: TransferEvent,
    /// Simulation time the event was enqueued.
    pub arrived_at: f64,
    /// Arrival sequence number.
    pub sequence: u64,
    /// Size the animal will spawn at.
    pub prospective_size: f32,
}

impl PendingSpawn {
    /// Whether the animal would spawn smaller than a player of `player_size`.
    pub fn is_smaller_than(&self, player_size: f32) -> bool {
        self.prospective_size < player_size
    }
}

/// Admission counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    /// Entries admitted so far.
    pub admitted: u64,
    /// Admitted entries that were smaller than the player at admission time.
    pub admitted_smaller: u64,
    /// Entries dropped on overflow.
    pub dropped: u64,
}

impl QueueStats {
    /// Realized smaller fraction, `None` before the first admission.
    pub fn smaller_ratio(&self) -> Option<f64> {
        (self.admitted > 0).then(|| self.admitted_smaller as f64 / self.admitted as f64)
    }
}

/// Bounded FIFO with rate limiting and size-mix rebalancing.
#[derive(Debug, Clone)]
pub struct SpawnQueue {
    entries: VecDeque<PendingSpawn>,
    max_len: usize,
    min_interval: f64,
    target_smaller_ratio: f64,
    last_admission: Option<f64>,
    next_sequence: u64,
    stats: QueueStats,
}

impl SpawnQueue {
    /// Create an empty queue.
    pub fn new(config: &SpawnConfig) -> Self {
        let max_len = config.max_queue_size.max(1);
        Self {
            entries: VecDeque::with_capacity(max_len),
            max_len,
            min_interval: config.min_interval_secs().max(0.0),
            target_smaller_ratio: config.target_smaller_ratio.clamp(0.0, 1.0),
            last_admission: None,
            next_sequence: 0,
            stats: QueueStats::default(),
        }
    }

    /// Append an event. Returns the dropped oldest entry if the queue was full.
    pub fn enqueue(&mut self, event: TransferEvent, now: f64) -> Option<PendingSpawn> {
        let dropped = if self.entries.len() >= self.max_len {
            self.entries.pop_front()
        } else {
            None
        };
        if let Some(old) = &dropped {
            self.stats.dropped = self.stats.dropped.saturating_add(1);
            tracing::warn!(
                sequence = old.sequence,
                queued = self.entries.len(),
                "spawn queue full, dropped oldest entry"
            );
        }

        let prospective_size = sizing::spawn_size_for_value(event.value_f64());
        self.entries.push_back(PendingSpawn {
            event,
            arrived_at: now,
            sequence: self.next_sequence,
            prospective_size,
        });
        self.next_sequence = self.next_sequence.saturating_add(1);
        dropped
    }

    /// Admit the next entry if the minimum interval has elapsed.
    ///
    /// The first admission is immediate. `player_size` is the player's
    /// current effective size.
    pub fn poll(&mut self, now: f64, player_size: f32) -> Option<PendingSpawn> {
        if !self.ready(now) || self.entries.is_empty() {
            return None;
        }
        self.rebalance(player_size);
        let entry = self.entries.pop_front()?;

        self.last_admission = Some(now);
        self.stats.admitted = self.stats.admitted.saturating_add(1);
        if entry.is_smaller_than(player_size) {
            self.stats.admitted_smaller = self.stats.admitted_smaller.saturating_add(1);
        }
        tracing::debug!(
            sequence = entry.sequence,
            size = entry.prospective_size,
            waited = now - entry.arrived_at,
            queued = self.entries.len(),
            "spawn admitted"
        );
        Some(entry)
    }

    /// Whether enough time has passed since the last admission.
    pub fn ready(&self, now: f64) -> bool {
        self.last_admission
            .is_none_or(|last| now - last >= self.min_interval)
    }

    /// Move the under-represented side of the size mix to the front.
    pub fn rebalance(&mut self, player_size: f32) {
        let prefer_smaller = self.prefers_smaller();
        if self
            .entries
            .front()
            .is_none_or(|front| front.is_smaller_than(player_size) == prefer_smaller)
        {
            return;
        }
        let (preferred, rest): (Vec<PendingSpawn>, Vec<PendingSpawn>) = self
            .entries
            .drain(..)
            .partition(|entry| entry.is_smaller_than(player_size) == prefer_smaller);
        self.entries.extend(preferred);
        self.entries.extend(rest);
    }

    /// Whether the next admission should be smaller than the player.
    pub fn prefers_smaller(&self) -> bool {
        self.stats
            .smaller_ratio()
            .is_none_or(|ratio| ratio < self.target_smaller_ratio)
    }

    /// Pending entry count.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pending entries in admission order.
    pub fn pending(&self) -> impl Iterator<Item = &PendingSpawn> {
        self.entries.iter()
    }

    /// Admission counters.
    pub const fn stats(&self) -> QueueStats {
        self.stats
    }

    /// Drop every pending entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use menagerie_types::TransferKind;
    use rust_decimal::Decimal;

    use super::*;

    fn event(value: i64) -> TransferEvent {
        TransferEvent::new(TransferKind::Usdc, Decimal::from(value))
    }

    fn queue(max: usize, ratio: f64) -> SpawnQueue {
        SpawnQueue::new(&SpawnConfig {
            max_queue_size: max,
            target_smaller_ratio: ratio,
            ..SpawnConfig::default()
        })
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut q = queue(3, 0.65);
        for value in 1..=3 {
            assert!(q.enqueue(event(value), 0.0).is_none());
        }
        let dropped = q.enqueue(event(4), 0.0).unwrap();
        assert_eq!(dropped.sequence, 0);
        assert_eq!(q.len(), 3);
        assert_eq!(q.stats().dropped, 1);
        assert_eq!(q.pending().next().unwrap().sequence, 1);
    }

    #[test]
    fn first_admission_is_immediate_then_rate_limited() {
        let mut q = queue(10, 0.65);
        q.enqueue(event(5), 0.0);
        q.enqueue(event(6), 0.0);
        assert!(q.poll(0.0, 1.0).is_some());
        assert!(q.poll(0.5, 1.0).is_none());
        assert!(q.poll(0.79, 1.0).is_none());
        assert!(q.poll(0.8, 1.0).is_some());
    }

    #[test]
    fn empty_queue_does_not_consume_the_interval() {
        let mut q = queue(10, 0.65);
        assert!(q.poll(0.0, 1.0).is_none());
        q.enqueue(event(5), 0.1);
        assert!(q.poll(0.1, 1.0).is_some());
    }

    #[test]
    fn rebalance_is_stable_within_each_side() {
        let mut q = queue(10, 0.65);
        // Large, small, large, small: nothing admitted yet, smaller preferred.
        q.enqueue(event(100_000), 0.0);
        q.enqueue(event(5), 0.0);
        q.enqueue(event(200_000), 0.0);
        q.enqueue(event(7), 0.0);
        q.rebalance(1.0);
        let order: Vec<u64> = q.pending().map(|e| e.sequence).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn admissions_alternate_toward_target() {
        let mut q = queue(50, 0.5);
        for _ in 0..5 {
            q.enqueue(event(5), 0.0);
            q.enqueue(event(100_000), 0.0);
        }
        let mut now = 0.0;
        let mut smaller = Vec::new();
        while let Some(entry) = q.poll(now, 1.0) {
            smaller.push(entry.is_smaller_than(1.0));
            now += 1.0;
        }
        assert_eq!(smaller.len(), 10);
        assert_eq!(
            smaller,
            vec![true, false, false, true, false, true, false, true, false, true]
        );
    }

    #[test]
    fn sustained_stream_converges_on_target_ratio() {
        let mut q = queue(200, 0.65);
        let mut now = 0.0;
        for step in 0..2_000_u32 {
            // Evenly mixed stream arriving twice as fast as admissions.
            q.enqueue(event(5), now);
            q.enqueue(event(1_000_000), now);
            if step % 2 == 0 {
                q.enqueue(event(9), now);
            }
            q.poll(now, 1.0);
            now += 1.0;
        }
        let ratio = q.stats().smaller_ratio().unwrap();
        assert!((ratio - 0.65).abs() < 0.1, "ratio {ratio}");
        assert!(q.len() <= 200);
    }
}
