//! The closed entity union.

use crate::{Axon, Generator, Neuron, Synapse};
use synfire_core::{Action, EntityError, EntityRng, EntityStateMachine};
use synfire_messages::Message;
use synfire_types::{EntityKind, LocalId, SimTime};

/// Any simulated entity. One variant per kind; each variant owns its
/// state in full, and dispatch is a single match on the tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    /// Integrate-and-fire neuron.
    Neuron(Neuron),
    /// Fan-out synapse.
    Synapse(Synapse),
    /// Relay axon.
    Axon(Axon),
    /// Spontaneous input generator.
    Generator(Generator),
}

impl Entity {
    /// Borrow the neuron state, if this is a neuron.
    pub fn as_neuron(&self) -> Option<&Neuron> {
        match self {
            Entity::Neuron(n) => Some(n),
            _ => None,
        }
    }

    /// Borrow the synapse state, if this is a synapse.
    pub fn as_synapse(&self) -> Option<&Synapse> {
        match self {
            Entity::Synapse(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the axon state, if this is an axon.
    pub fn as_axon(&self) -> Option<&Axon> {
        match self {
            Entity::Axon(a) => Some(a),
            _ => None,
        }
    }

    /// Borrow the generator state, if this is a generator.
    pub fn as_generator(&self) -> Option<&Generator> {
        match self {
            Entity::Generator(g) => Some(g),
            _ => None,
        }
    }
}

impl EntityStateMachine for Entity {
    fn handle(
        &mut self,
        now: SimTime,
        message: Message,
        rng: &mut dyn EntityRng,
    ) -> Result<Vec<Action>, EntityError> {
        match self {
            Entity::Neuron(n) => n.handle(now, message, rng),
            Entity::Synapse(s) => s.handle(now, message, rng),
            Entity::Axon(a) => a.handle(now, message, rng),
            Entity::Generator(g) => g.handle(now, message, rng),
        }
    }

    fn on_init(&mut self, rng: &mut dyn EntityRng) -> Vec<Action> {
        match self {
            Entity::Neuron(n) => n.on_init(rng),
            Entity::Synapse(s) => s.on_init(rng),
            Entity::Axon(a) => a.on_init(rng),
            Entity::Generator(g) => g.on_init(rng),
        }
    }

    fn kind(&self) -> EntityKind {
        match self {
            Entity::Neuron(_) => EntityKind::Neuron,
            Entity::Synapse(_) => EntityKind::Synapse,
            Entity::Axon(_) => EntityKind::Axon,
            Entity::Generator(_) => EntityKind::Generator,
        }
    }

    fn local(&self) -> LocalId {
        match self {
            Entity::Neuron(n) => n.local(),
            Entity::Synapse(s) => s.local(),
            Entity::Axon(a) => a.local(),
            Entity::Generator(g) => g.local(),
        }
    }
}
