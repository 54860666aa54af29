use parking_lot::Mutex;

use crate::util::now_millis;

/// Assigns implicit timestamps to the mutations of one table.
///
/// Each call returns `max(now_ms, last + 1)`, so two mutations of the same
/// table never share an implicit timestamp even within one millisecond.
#[derive(Debug, Default)]
pub struct TimestampOracle {
    last: Mutex<u64>,
}

impl TimestampOracle {
    pub fn new() -> Self {
        TimestampOracle::default()
    }

    pub fn next(&self) -> u64 {
        self.next_at(now_millis())
    }

    /// Same as `next` with a caller-supplied wall clock
    pub fn next_at(&self, now: u64) -> u64 {
        let mut last = self.last.lock();
        let ts = now.max(last.saturating_add(1));
        *last = ts;
        ts
    }

    /// Make sure later timestamps are greater than `timestamp`. Used when
    /// replaying a log written by a clock running ahead of ours.
    pub fn observe(&self, timestamp: u64) {
        let mut last = self.last.lock();
        if timestamp > *last {
            *last = timestamp;
        }
    }
}
