use std::{
    collections::BTreeSet,
    sync::atomic::{AtomicU64, Ordering},
};

use parking_lot::Mutex;

#[derive(Debug, Default)]
struct State {
    last_allocated: u64,
    in_flight: BTreeSet<u64>,
}

/// Sequence numbers of one table.
///
/// A writer allocates a ticket before applying a mutation and drops it once
/// the mutation is fully in the MemTable. The published sequence is the
/// largest sequence below which every mutation has finished; readers use it
/// as their snapshot.
#[derive(Debug, Default)]
pub struct SequenceTracker {
    state: Mutex<State>,
    published: AtomicU64,
}

impl SequenceTracker {
    /// Tracker whose next sequence is `last + 1`
    pub fn new(last: u64) -> Self {
        SequenceTracker {
            state: Mutex::new(State {
                last_allocated: last,
                in_flight: BTreeSet::new(),
            }),
            published: AtomicU64::new(last),
        }
    }

    pub fn allocate(&self) -> SequenceTicket<'_> {
        let mut state = self.state.lock();
        state.last_allocated += 1;
        let sequence = state.last_allocated;
        state.in_flight.insert(sequence);
        SequenceTicket {
            tracker: self,
            sequence,
        }
    }

    /// Snapshot sequence for a new read
    #[inline]
    pub fn visible(&self) -> u64 {
        self.published.load(Ordering::Acquire)
    }

    pub fn last_allocated(&self) -> u64 {
        self.state.lock().last_allocated
    }

    fn finish(&self, sequence: u64) {
        let mut state = self.state.lock();
        state.in_flight.remove(&sequence);
        let published = match state.in_flight.first() {
            Some(oldest) => oldest - 1,
            None => state.last_allocated,
        };
        self.published.store(published, Ordering::Release);
    }
}

/// An allocated sequence number; publishes on drop.
///
/// Dropping without applying the mutation (an error path) publishes an empty
/// sequence, which is harmless.
#[derive(Debug)]
pub struct SequenceTicket<'a> {
    tracker: &'a SequenceTracker,
    sequence: u64,
}

impl SequenceTicket<'_> {
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl Drop for SequenceTicket<'_> {
    fn drop(&mut self) {
        self.tracker.finish(self.sequence);
    }
}
