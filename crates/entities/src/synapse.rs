//! Synapse fan-out.

use crate::SpikeGenerator;
use std::sync::Arc;
use synfire_core::{Action, EntityError, EntityRng, EntityStateMachine};
use synfire_messages::{Heartbeat, Message, SpikeContext};
use synfire_timing::{next_big_tick, next_event_time};
use synfire_types::{CoreId, EntityId, EntityKind, LocalId, SimConfig, SimTime};
use tracing::trace;

/// Fan-out stage: replicates each upstream spike to a fixed list of
/// destinations.
///
/// The destination list is set at construction and never resized during
/// the run. A synapse may carry an attached [`SpikeGenerator`], in which
/// case it also originates spontaneous spikes at big-tick intervals with
/// no upstream input at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Synapse {
    config: Arc<SimConfig>,
    local: LocalId,

    /// Core that owns this synapse.
    core: CoreId,

    /// Ordered destinations, fixed at construction.
    dests: Vec<EntityId>,

    /// Spontaneous-input sub-state, when this synapse doubles as a
    /// load source.
    generator: Option<SpikeGenerator>,

    last_active: SimTime,
}

impl Synapse {
    /// Create a synapse with its fixed destination list.
    pub fn new(config: Arc<SimConfig>, local: LocalId, core: CoreId, dests: Vec<EntityId>) -> Self {
        Self {
            config,
            local,
            core,
            dests,
            generator: None,
            last_active: SimTime::ZERO,
        }
    }

    /// Attach generator sub-state so this synapse originates
    /// spontaneous input.
    pub fn with_generator(mut self, generator: SpikeGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    /// The core that owns this synapse.
    pub fn core(&self) -> CoreId {
        self.core
    }

    /// The fixed destination list.
    pub fn dests(&self) -> &[EntityId] {
        &self.dests
    }

    /// When this synapse last processed any event.
    pub fn last_active(&self) -> SimTime {
        self.last_active
    }

    /// Replicate an upstream spike to every destination, preserving the
    /// originating neuron's voltage and timestamps for downstream
    /// weight/threshold logic.
    fn fan_out(&mut self, now: SimTime, ctx: SpikeContext, rng: &mut dyn EntityRng) -> Vec<Action> {
        self.last_active = now;
        trace!(synapse = %self.local, dests = self.dests.len(), "fanning out spike");

        let mut actions = Vec::with_capacity(self.dests.len());
        for dest in &self.dests {
            let delay = next_event_time(&self.config, rng);
            let mut forwarded = ctx;
            forwarded.rnd_call_count = rng.draw_count();
            forwarded.sender = self.local;
            actions.push(Action::Send {
                dest: *dest,
                delay,
                message: Message::SynapseOut(forwarded),
            });
        }
        actions
    }

    /// Generator big tick: maybe originate spontaneous spikes, then
    /// keep the schedule alive.
    fn on_gen_heartbeat(
        &mut self,
        now: SimTime,
        rng: &mut dyn EntityRng,
    ) -> Result<Vec<Action>, EntityError> {
        let Some(generator) = self.generator.as_mut() else {
            return Err(EntityError::UnexpectedMessage {
                kind: EntityKind::Synapse.name(),
                message: "GenHeartbeat",
            });
        };
        self.last_active = now;

        let fired = generator.poll(&self.dests, rng);
        let mut actions = Vec::with_capacity(fired.len() + 1);
        for dest in fired {
            let delay = next_event_time(&self.config, rng);
            actions.push(Action::Send {
                dest,
                delay,
                message: Message::SynapseOut(SpikeContext {
                    rnd_call_count: rng.draw_count(),
                    sender: self.local,
                    voltage: 0,
                    last_active: now,
                    last_leak: now,
                    axon: synfire_types::AxonId(self.local.0),
                }),
            });
        }
        actions.push(Action::Wake {
            delay: next_big_tick(&self.config, now) - now,
            message: Message::GenHeartbeat(Heartbeat::new(rng.draw_count(), self.local)),
        });
        Ok(actions)
    }
}

impl EntityStateMachine for Synapse {
    fn handle(
        &mut self,
        now: SimTime,
        message: Message,
        rng: &mut dyn EntityRng,
    ) -> Result<Vec<Action>, EntityError> {
        match message {
            Message::AxonOut(ctx) | Message::NeuronOut(ctx) => Ok(self.fan_out(now, ctx, rng)),
            Message::GenHeartbeat(_) => self.on_gen_heartbeat(now, rng),
            other => Err(EntityError::UnexpectedMessage {
                kind: EntityKind::Synapse.name(),
                message: other.type_name(),
            }),
        }
    }

    fn on_init(&mut self, rng: &mut dyn EntityRng) -> Vec<Action> {
        match &self.generator {
            Some(generator) if generator.enabled() && !self.dests.is_empty() => {
                vec![Action::Wake {
                    delay: next_big_tick(&self.config, SimTime::ZERO),
                    message: Message::GenHeartbeat(Heartbeat::new(rng.draw_count(), self.local)),
                }]
            }
            _ => Vec::new(),
        }
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Synapse
    }

    fn local(&self) -> LocalId {
        self.local
    }
}
