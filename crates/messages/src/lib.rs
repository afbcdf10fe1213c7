//! Inter-entity messages for the simulation core.
//!
//! Six kinds, in two groups: spike-carrying (`AxonOut`, `SynapseOut`,
//! `NeuronOut`) and clock-synchronization heartbeats (`AxonHeartbeat`,
//! `NeuronHeartbeat`, `GenHeartbeat`). A message is immutable once sent;
//! the receiving state machine consumes it exactly once and copies any
//! fields it needs to retain.

mod heartbeat;
mod spike;

pub use heartbeat::Heartbeat;
pub use spike::SpikeContext;

use serde::{Deserialize, Serialize};

/// A timestamped message between entities.
///
/// Spike messages carry the full sending-neuron context so the receiver
/// can finish its leak/threshold computation without a round trip.
/// Heartbeats carry no spike payload; they only keep the big-tick
/// schedule alive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// Spike relayed by an axon toward a neuron.
    AxonOut(SpikeContext),
    /// Spike fanned out by a synapse toward its destinations.
    SynapseOut(SpikeContext),
    /// Spike fired by a neuron toward a downstream axon.
    NeuronOut(SpikeContext),
    /// Axon big-tick synchronization.
    AxonHeartbeat(Heartbeat),
    /// Neuron big-tick synchronization.
    NeuronHeartbeat(Heartbeat),
    /// Generator big-tick wakeup.
    GenHeartbeat(Heartbeat),
}

impl Message {
    /// Get a human-readable name for this message kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            Message::AxonOut(_) => "AxonOut",
            Message::SynapseOut(_) => "SynapseOut",
            Message::NeuronOut(_) => "NeuronOut",
            Message::AxonHeartbeat(_) => "AxonHeartbeat",
            Message::NeuronHeartbeat(_) => "NeuronHeartbeat",
            Message::GenHeartbeat(_) => "GenHeartbeat",
        }
    }

    /// Whether this message carries a spike payload.
    pub fn is_spike(&self) -> bool {
        matches!(
            self,
            Message::AxonOut(_) | Message::SynapseOut(_) | Message::NeuronOut(_)
        )
    }

    /// Delivery priority at equal timestamps: spikes before heartbeats.
    ///
    /// Heartbeats are idempotent bookkeeping; spikes are not, so a spike
    /// landing exactly on a big-tick boundary is processed first.
    pub fn priority(&self) -> u8 {
        if self.is_spike() {
            0
        } else {
            1
        }
    }

    /// The sender's cumulative random-draw count at send time.
    ///
    /// Monotonically non-decreasing per sender; used to audit replay
    /// determinism under the kernel's rollback discipline.
    pub fn rnd_call_count(&self) -> u64 {
        match self {
            Message::AxonOut(ctx) | Message::SynapseOut(ctx) | Message::NeuronOut(ctx) => {
                ctx.rnd_call_count
            }
            Message::AxonHeartbeat(hb)
            | Message::NeuronHeartbeat(hb)
            | Message::GenHeartbeat(hb) => hb.rnd_call_count,
        }
    }

    /// The spike payload, if this is a spike-carrying message.
    pub fn spike(&self) -> Option<&SpikeContext> {
        match self {
            Message::AxonOut(ctx) | Message::SynapseOut(ctx) | Message::NeuronOut(ctx) => {
                Some(ctx)
            }
            _ => None,
        }
    }
}
