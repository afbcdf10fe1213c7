//! Heartbeat payload.

use serde::{Deserialize, Serialize};
use synfire_types::LocalId;

/// Clock-synchronization payload: no spike content, just enough to keep
/// the big-tick schedule alive and auditable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heartbeat {
    /// Random draws the sender had consumed when this was sent.
    pub rnd_call_count: u64,

    /// Sender's id within its core.
    pub sender: LocalId,
}

impl Heartbeat {
    /// Create a heartbeat payload.
    pub fn new(rnd_call_count: u64, sender: LocalId) -> Self {
        Self {
            rnd_call_count,
            sender,
        }
    }
}
