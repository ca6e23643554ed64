//! Simulated game clock and scheduled wake-ups
//!
//! The clock counts game-internal seconds, not wall time: it only moves while
//! unpaused and is scaled by the current speed multiplier. All delayed
//! behavior (item expiry) is data in the [`TimeoutQueue`], checked each tick.

use serde::{Deserialize, Serialize};

/// Pausable simulated-seconds clock
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimClock {
    elapsed_seconds: f32,
    paused: bool,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by `dt * speed_factor` seconds. No-op while paused.
    ///
    /// Negative deltas are clamped to zero so the clock never runs backwards.
    pub fn advance(&mut self, dt: f32, speed_factor: f32) {
        if self.paused {
            return;
        }
        self.elapsed_seconds += dt.max(0.0) * speed_factor;
    }

    /// Pause the clock. Idempotent.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume the clock. Idempotent.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed_seconds
    }

    /// Reset to zero (new game)
    pub fn reset(&mut self) {
        self.elapsed_seconds = 0.0;
        self.paused = false;
    }
}

/// A pending wake-up owned by the [`TimeoutQueue`]
///
/// `wakeup_time` is fixed at registration and never recomputed; `seq` breaks
/// ties between entries scheduled for the same instant (first in, first out).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutEntry<T> {
    pub scheduled_at: f32,
    pub delay_seconds: f32,
    pub wakeup_time: f32,
    seq: u64,
    pub payload: T,
}

/// Pending wake-ups in ascending `wakeup_time` order
///
/// A sorted Vec is enough here: the number of concurrently pending effects is
/// single digits. Payloads are plain data dispatched by the caller at fire
/// time, which keeps the queue serializable with the rest of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutQueue<T> {
    entries: Vec<TimeoutEntry<T>>,
    next_seq: u64,
}

impl<T> Default for TimeoutQueue<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<T> TimeoutQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a wake-up `delay_seconds` after `now`. Returns an opaque
    /// handle identifying the entry; entries cannot be cancelled
    /// individually, only wholesale via [`clear`](Self::clear).
    pub fn schedule(&mut self, now: f32, delay_seconds: f32, payload: T) -> u64 {
        let entry = TimeoutEntry {
            scheduled_at: now,
            delay_seconds,
            wakeup_time: now + delay_seconds,
            seq: self.next_seq,
            payload,
        };
        self.next_seq += 1;

        // Insert after every entry with wakeup_time <= ours, so simultaneous
        // wake-ups keep registration order.
        let idx = self
            .entries
            .partition_point(|e| e.wakeup_time <= entry.wakeup_time);
        let handle = entry.seq;
        self.entries.insert(idx, entry);
        handle
    }

    /// Remove and return the earliest entry if its wake-up time has arrived
    pub fn pop_due(&mut self, now: f32) -> Option<TimeoutEntry<T>> {
        if self.entries.first()?.wakeup_time <= now {
            Some(self.entries.remove(0))
        } else {
            None
        }
    }

    /// Fire every due entry in order, handing `(wakeup_time, payload)` to the
    /// sink. Each entry fires at most once; entries keep their fixed wake-up
    /// time as the reported fire time even when the clock has moved past it.
    pub fn fire_due(&mut self, now: f32, mut sink: impl FnMut(f32, T)) {
        while let Some(entry) = self.pop_due(now) {
            sink(entry.wakeup_time, entry.payload);
        }
    }

    /// Discard all pending entries without firing them (level teardown)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest pending wake-up time, if any
    pub fn next_wakeup(&self) -> Option<f32> {
        self.entries.first().map(|e| e.wakeup_time)
    }
}
