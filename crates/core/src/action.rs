//! Actions returned by entity state machines.

use synfire_messages::Message;
use synfire_types::{EntityId, SimTime};

/// A scheduling request from an entity to the kernel.
///
/// Entities only describe what should happen; the kernel resolves
/// destinations through the mapping codec and performs delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Deliver `message` to `dest` after `delay` simulated time.
    Send {
        /// Receiving entity.
        dest: EntityId,
        /// Strictly positive offset from the current time.
        delay: SimTime,
        /// The message to deliver.
        message: Message,
    },

    /// Deliver `message` back to the emitting entity after `delay`.
    ///
    /// Used for self-scheduled wakeups (the next heartbeat, the next
    /// spontaneous generator event) without a mapping lookup.
    Wake {
        /// Strictly positive offset from the current time.
        delay: SimTime,
        /// The message to deliver back to the sender.
        message: Message,
    },
}

impl Action {
    /// The message this action schedules.
    pub fn message(&self) -> &Message {
        match self {
            Action::Send { message, .. } | Action::Wake { message, .. } => message,
        }
    }

    /// The delivery offset this action requests.
    pub fn delay(&self) -> SimTime {
        match self {
            Action::Send { delay, .. } | Action::Wake { delay, .. } => *delay,
        }
    }
}
