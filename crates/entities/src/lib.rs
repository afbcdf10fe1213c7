//! Entity state machines for the spiking-network core.
//!
//! The four kinds form a closed set: [`Neuron`] integrates weighted
//! input against a threshold, [`Synapse`] fans spikes out to a fixed
//! destination list, [`Axon`] relays between them, and [`Generator`]
//! synthesizes spontaneous benchmark input. [`Entity`] is the tagged
//! union the kernel dispatches through.
//!
//! Every transition is a pure function of (state, message, stream
//! position): no global state, no I/O, no hidden counters. That purity
//! is what lets an optimistic kernel replay or undo a delivery safely.

mod axon;
mod entity;
mod generator;
mod neuron;
mod synapse;

pub use axon::Axon;
pub use entity::Entity;
pub use generator::{Generator, SpikeGenerator};
pub use neuron::Neuron;
pub use synapse::Synapse;

#[cfg(test)]
pub(crate) mod test_util {
    use synfire_core::EntityRng;

    /// Stream that always yields the same value, for exercising state
    /// transitions at a known draw.
    pub struct FixedRng {
        value: f64,
        draws: u64,
    }

    impl FixedRng {
        pub fn new(value: f64) -> Self {
            Self { value, draws: 0 }
        }
    }

    impl EntityRng for FixedRng {
        fn next_uniform(&mut self) -> f64 {
            self.draws += 1;
            self.value
        }

        fn draw_count(&self) -> u64 {
            self.draws
        }
    }
}
