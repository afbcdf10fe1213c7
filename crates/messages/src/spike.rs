//! Spike payload.

use serde::{Deserialize, Serialize};
use synfire_types::{AxonId, LocalId, SimTime};

/// Full sending-neuron context carried by every spike message.
///
/// Receivers complete their own leak and threshold arithmetic from these
/// fields alone; no follow-up query to the sender is ever needed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpikeContext {
    /// Random draws the sender had consumed when this was sent.
    pub rnd_call_count: u64,

    /// Sender's id within its core.
    pub sender: LocalId,

    /// Sender's membrane voltage at send time.
    pub voltage: i32,

    /// When the sender last processed any event.
    pub last_active: SimTime,

    /// When the sender last applied leak.
    pub last_leak: SimTime,

    /// Key the receiving neuron uses to look up the applied weight.
    pub axon: AxonId,
}

impl SpikeContext {
    /// Re-key this context for relay through a different axon,
    /// preserving the originating neuron's state.
    pub fn via_axon(mut self, axon: AxonId) -> Self {
        self.axon = axon;
        self
    }
}
