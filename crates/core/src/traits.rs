//! The entity state-machine trait.

use crate::{Action, EntityError, EntityRng};
use synfire_messages::Message;
use synfire_types::{EntityKind, LocalId, SimTime};

/// A simulated entity that processes timestamped messages.
///
/// Every entity kind (neuron, synapse, axon, generator) implements this
/// trait. The kernel delivers messages addressed to the entity in
/// non-decreasing timestamp order and executes the returned actions;
/// the entity never performs delivery itself.
///
/// # Guarantees
///
/// - **Synchronous**: `handle` never blocks; waiting for the next wakeup
///   is expressed as a returned delay, not a call.
/// - **Deterministic**: given the same state, message, and random-stream
///   position, `handle` always produces the same new state and actions.
///   This is what makes replay after an optimistic rollback safe.
/// - **No I/O**: all side effects go through the returned actions.
/// - **One random stream**: all draws come from the `rng` argument, which
///   the kernel keys to this entity alone. Draw order is part of the
///   deterministic contract.
pub trait EntityStateMachine {
    /// Process one delivered message at time `now`, returning the
    /// messages to schedule.
    ///
    /// Addressing failures are fatal: a message this core cannot route
    /// would silently desynchronize the simulation if dropped.
    fn handle(
        &mut self,
        now: SimTime,
        message: Message,
        rng: &mut dyn EntityRng,
    ) -> Result<Vec<Action>, EntityError>;

    /// Called once at setup, before any delivery, to schedule the
    /// entity's initial wakeups (its first heartbeat, and for enabled
    /// generators the first spontaneous event).
    fn on_init(&mut self, rng: &mut dyn EntityRng) -> Vec<Action>;

    /// Which kind of entity this is.
    fn kind(&self) -> EntityKind;

    /// The entity's id within its core.
    fn local(&self) -> LocalId;
}
