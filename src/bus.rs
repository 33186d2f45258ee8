//! Single-slot snapshot mailbox shared by the poll and server threads.
//!
//! [`StateBus`] holds exactly one most-recent snapshot plus a wake signal.
//! Publishing replaces the slot and wakes every waiter; waiting returns
//! whatever is newest at wake-up. Intermediate publishes are silently
//! skipped (last-value-wins): a slow consumer never receives a backlog,
//! which bounds both memory and latency for a live control signal.
//!
//! The critical section is a reference swap and a counter bump. No I/O
//! and no serialization ever happen under the lock, so neither side can
//! stall the other for more than a pointer assignment.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::snapshot::Snapshot;

struct Slot {
    /// Publish counter; 0 means nothing has been published yet.
    seq: u64,
    latest: Arc<Snapshot>,
    closed: bool,
}

pub struct StateBus {
    slot: Mutex<Slot>,
    wake: Condvar,
}

impl StateBus {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                seq: 0,
                latest: Arc::new(Snapshot::disconnected()),
                closed: false,
            }),
            wake: Condvar::new(),
        }
    }

    /// Replace the held snapshot and wake all waiting consumers.
    pub fn publish(&self, snapshot: Snapshot) {
        let mut slot = self.slot.lock();
        slot.seq += 1;
        slot.latest = Arc::new(snapshot);
        drop(slot);
        self.wake.notify_all();
    }

    /// Sequence number of the most recent publish.
    ///
    /// A fresh consumer session starts from here so it only observes
    /// snapshots published after it attached.
    pub fn seq(&self) -> u64 {
        self.slot.lock().seq
    }

    /// Block until a snapshot newer than `seen` is available, then return
    /// it with its sequence number.
    ///
    /// Always returns the newest snapshot, even if several publishes
    /// happened while the caller was asleep. Returns `None` once the bus
    /// has been closed; an unseen final snapshot is still delivered before
    /// the closure is reported.
    pub fn wait_newer(&self, seen: u64) -> Option<(u64, Arc<Snapshot>)> {
        let mut slot = self.slot.lock();
        loop {
            if slot.seq > seen {
                return Some((slot.seq, Arc::clone(&slot.latest)));
            }
            if slot.closed {
                return None;
            }
            self.wake.wait(&mut slot);
        }
    }

    /// Close the bus and drain every waiter with `None`.
    pub fn close(&self) {
        self.slot.lock().closed = true;
        self.wake.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.slot.lock().closed
    }
}

impl Default for StateBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn stick_snapshot(lx: f32) -> Snapshot {
        Snapshot {
            connected: true,
            sticks: crate::snapshot::Sticks {
                lx,
                ..Default::default()
            },
            ..Snapshot::default()
        }
    }

    #[test]
    fn sleeping_consumer_wakes_to_the_latest_only() {
        let bus = StateBus::new();
        for i in 1..=5 {
            bus.publish(stick_snapshot(i as f32 / 10.0));
        }
        let (seq, snap) = bus.wait_newer(0).unwrap();
        assert_eq!(seq, 5);
        assert_eq!(snap.sticks.lx, 0.5);
        // Nothing newer than 5: seq is stable until the next publish.
        assert_eq!(bus.seq(), 5);
    }

    #[test]
    fn wait_blocks_until_a_newer_publish() {
        let bus = Arc::new(StateBus::new());
        bus.publish(stick_snapshot(0.1));

        let waiter = {
            let bus = Arc::clone(&bus);
            std::thread::spawn(move || bus.wait_newer(1))
        };
        std::thread::sleep(Duration::from_millis(50));
        assert!(!waiter.is_finished(), "waiter must sleep until a publish");

        bus.publish(stick_snapshot(0.2));
        let (seq, snap) = waiter.join().unwrap().unwrap();
        assert_eq!(seq, 2);
        assert_eq!(snap.sticks.lx, 0.2);
    }

    #[test]
    fn observed_sequences_increase_without_duplication() {
        let bus = Arc::new(StateBus::new());
        let consumer = {
            let bus = Arc::clone(&bus);
            std::thread::spawn(move || {
                let mut seen = 0;
                let mut seqs = Vec::new();
                while let Some((seq, _)) = bus.wait_newer(seen) {
                    seen = seq;
                    seqs.push(seq);
                }
                seqs
            })
        };
        for i in 1..=100 {
            bus.publish(stick_snapshot(i as f32 / 200.0));
        }
        // A pending newer snapshot is still delivered after close, so the
        // consumer always drains to the final sequence.
        bus.close();
        let seqs = consumer.join().unwrap();
        assert!(!seqs.is_empty());
        // Skip-ahead only: strictly increasing, never repeated, never reordered.
        assert!(seqs.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(*seqs.last().unwrap(), 100);
    }

    #[test]
    fn close_unblocks_parked_waiters() {
        let bus = Arc::new(StateBus::new());
        let waiter = {
            let bus = Arc::clone(&bus);
            std::thread::spawn(move || bus.wait_newer(0))
        };
        std::thread::sleep(Duration::from_millis(20));
        bus.close();
        assert!(waiter.join().unwrap().is_none());
        assert!(bus.is_closed());
    }

    #[test]
    fn publish_count_stays_single_slot() {
        let bus = StateBus::new();
        for i in 0..1000 {
            bus.publish(stick_snapshot((i % 10) as f32 / 10.0));
        }
        assert_eq!(bus.seq(), 1000);
        // Only the newest snapshot is retained.
        let (_, snap) = bus.wait_newer(999).unwrap();
        assert_eq!(snap.sticks.lx, 0.9);
    }
}
