//! Timestamp-ordered event queue.

use std::collections::BTreeMap;
use synfire_messages::Message;
use synfire_types::{GlobalIndex, SimTime};

/// Total ordering key for pending deliveries.
///
/// Ties at one timestamp break by priority (spikes before heartbeats,
/// since heartbeats are idempotent bookkeeping and spikes are not),
/// then destination, then insertion sequence, so delivery order is
/// fully deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventKey {
    /// Delivery time.
    pub time: SimTime,
    /// Message priority at equal timestamps.
    pub priority: u8,
    /// Receiving entity.
    pub dest: GlobalIndex,
    /// Insertion sequence, the final tie-break.
    pub seq: u64,
}

/// Pending deliveries in timestamp order.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: BTreeMap<EventKey, Message>,
    next_seq: u64,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a message for delivery.
    pub fn push(&mut self, time: SimTime, dest: GlobalIndex, message: Message) {
        let key = EventKey {
            time,
            priority: message.priority(),
            dest,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.events.insert(key, message);
    }

    /// Remove and return the earliest delivery.
    pub fn pop(&mut self) -> Option<(EventKey, Message)> {
        self.events.pop_first()
    }

    /// Timestamp of the earliest pending delivery.
    pub fn next_time(&self) -> Option<SimTime> {
        self.events.keys().next().map(|key| key.time)
    }

    /// Number of pending deliveries.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synfire_messages::{Heartbeat, SpikeContext};
    use synfire_types::{AxonId, LocalId};

    fn spike() -> Message {
        Message::AxonOut(SpikeContext {
            rnd_call_count: 0,
            sender: LocalId(0),
            voltage: 1,
            last_active: SimTime::ZERO,
            last_leak: SimTime::ZERO,
            axon: AxonId(0),
        })
    }

    fn heartbeat() -> Message {
        Message::NeuronHeartbeat(Heartbeat::new(0, LocalId(0)))
    }

    #[test]
    fn test_pops_in_time_order() {
        let mut queue = EventQueue::new();
        queue.push(SimTime(2.0), GlobalIndex(0), spike());
        queue.push(SimTime(1.0), GlobalIndex(0), spike());
        queue.push(SimTime(3.0), GlobalIndex(0), spike());

        let times: Vec<f64> = std::iter::from_fn(|| queue.pop())
            .map(|(key, _)| key.time.0)
            .collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_spike_beats_heartbeat_at_equal_time() {
        let mut queue = EventQueue::new();
        queue.push(SimTime(1.0), GlobalIndex(0), heartbeat());
        queue.push(SimTime(1.0), GlobalIndex(0), spike());

        let (_, first) = queue.pop().expect("two events queued");
        assert!(first.is_spike(), "spike delivered before heartbeat");
        let (_, second) = queue.pop().expect("one event left");
        assert!(!second.is_spike());
    }

    #[test]
    fn test_insertion_order_breaks_remaining_ties() {
        let mut queue = EventQueue::new();
        queue.push(SimTime(1.0), GlobalIndex(0), spike());
        queue.push(SimTime(1.0), GlobalIndex(0), spike());

        let (a, _) = queue.pop().expect("first");
        let (b, _) = queue.pop().expect("second");
        assert!(a.seq < b.seq);
    }
}
