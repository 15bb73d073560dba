//! Shared live buffer.
//!
//! A fixed ring of the most recent chunks addressed by an ever-increasing
//! sequence number. Slot `seq % capacity` holds chunk `seq` for as long as it
//! is one of the last `capacity` appends; anything older reads as
//! [`ReadResult::Evicted`]. Sequence numbers are never reused, `clear` only
//! raises the readable floor to the current write position.
//!
//! One writer (the active ingest attempt) and any number of listener sessions
//! share the buffer. Both sides hold the lock just long enough to move a
//! [`Bytes`] handle in or out. "New data" is published through a
//! `tokio::sync::watch` channel carrying the write position, so a session that
//! starts waiting after a notification still sees it.

use bytes::Bytes;
use parking_lot::RwLock;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadResult {
    Chunk(Bytes),
    /// The position has not been written yet.
    NotYetAvailable,
    /// The position fell out of the retention window or was cleared.
    Evicted,
}

struct Ring {
    slots: Vec<Option<Bytes>>,
    /// Sequence number the next append receives.
    next: u64,
    /// Positions below this were discarded by `clear`.
    floor: u64,
}

impl Ring {
    fn oldest(&self) -> u64 {
        let window = self.slots.len() as u64;
        self.floor.max(self.next.saturating_sub(window))
    }

    fn slot(&self, position: u64) -> usize {
        (position % self.slots.len() as u64) as usize
    }
}

pub struct LiveBuffer {
    ring: RwLock<Ring>,
    notifier: watch::Sender<u64>,
}

impl LiveBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (notifier, _) = watch::channel(0);
        Self {
            ring: RwLock::new(Ring {
                slots: vec![None; capacity],
                next: 0,
                floor: 0,
            }),
            notifier,
        }
    }

    pub fn capacity(&self) -> usize {
        self.ring.read().slots.len()
    }

    /// Stores `chunk` at the write position and returns its sequence number,
    /// overwriting the oldest entry once the ring is full. Does not notify.
    pub fn append(&self, chunk: Bytes) -> u64 {
        let mut ring = self.ring.write();
        let position = ring.next;
        let slot = ring.slot(position);
        ring.slots[slot] = Some(chunk);
        ring.next += 1;
        position
    }

    pub fn read(&self, position: u64) -> ReadResult {
        let ring = self.ring.read();
        if position >= ring.next {
            return ReadResult::NotYetAvailable;
        }
        if position < ring.oldest() {
            return ReadResult::Evicted;
        }
        match &ring.slots[ring.slot(position)] {
            Some(chunk) => ReadResult::Chunk(chunk.clone()),
            None => ReadResult::Evicted,
        }
    }

    /// Number of chunks that can currently be read.
    pub fn len(&self) -> usize {
        let ring = self.ring.read();
        (ring.next - ring.oldest()) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of chunks ever appended.
    pub fn write_position(&self) -> u64 {
        self.ring.read().next
    }

    pub fn oldest_position(&self) -> u64 {
        self.ring.read().oldest()
    }

    /// Where a newly joining reader starts: `lookback` chunks behind the live
    /// edge, never before the oldest readable chunk.
    pub fn live_join_position(&self, lookback: u64) -> u64 {
        let ring = self.ring.read();
        ring.oldest().max(ring.next.saturating_sub(lookback))
    }

    /// Drops every stored chunk. Previously valid positions read as
    /// `Evicted` afterwards; the sequence counter keeps counting.
    pub fn clear(&self) {
        {
            let mut ring = self.ring.write();
            ring.slots.iter_mut().for_each(|slot| *slot = None);
            ring.floor = ring.next;
        }
        self.notify();
    }

    /// Publishes the current write position to every subscriber.
    pub fn notify(&self) {
        let position = self.write_position();
        self.notifier.send_replace(position);
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notifier.subscribe()
    }
}
