//! Axon relay.

use std::sync::Arc;
use synfire_core::{Action, EntityError, EntityRng, EntityStateMachine};
use synfire_messages::{Heartbeat, Message, SpikeContext};
use synfire_timing::{next_big_tick, next_event_time};
use synfire_types::{AxonId, EntityId, EntityKind, LocalId, SimConfig, SimTime};
use tracing::trace;

/// Stateless signal relay between neurons and synapses.
///
/// Forwards every upstream spike to its target neurons, re-keyed with
/// its own axon id so the receiver can look up the right weight. Keeps
/// no state beyond identity, routing membership, and the last-active
/// bookkeeping its heartbeat needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Axon {
    config: Arc<SimConfig>,
    local: LocalId,

    /// Weight-lookup key stamped onto every relayed spike.
    id: AxonId,

    /// Neurons this axon feeds. Fixed at construction.
    targets: Vec<EntityId>,

    last_active: SimTime,
}

impl Axon {
    /// Create an axon relaying to the given neurons.
    pub fn new(config: Arc<SimConfig>, local: LocalId, id: AxonId, targets: Vec<EntityId>) -> Self {
        Self {
            config,
            local,
            id,
            targets,
            last_active: SimTime::ZERO,
        }
    }

    /// The weight-lookup key this axon stamps onto relayed spikes.
    pub fn id(&self) -> AxonId {
        self.id
    }

    /// When this axon last relayed or heartbeat.
    pub fn last_active(&self) -> SimTime {
        self.last_active
    }

    fn relay(
        &mut self,
        now: SimTime,
        ctx: SpikeContext,
        rng: &mut dyn EntityRng,
    ) -> Vec<Action> {
        self.last_active = now;
        trace!(axon = %self.id, targets = self.targets.len(), "relaying spike");

        let mut actions = Vec::with_capacity(self.targets.len());
        for dest in &self.targets {
            let delay = next_event_time(&self.config, rng);
            let mut forwarded = ctx.via_axon(self.id);
            forwarded.rnd_call_count = rng.draw_count();
            forwarded.sender = self.local;
            actions.push(Action::Send {
                dest: *dest,
                delay,
                message: Message::AxonOut(forwarded),
            });
        }
        actions
    }

    fn on_heartbeat(&mut self, now: SimTime, rng: &mut dyn EntityRng) -> Vec<Action> {
        self.last_active = now;
        vec![Action::Wake {
            delay: next_big_tick(&self.config, now) - now,
            message: Message::AxonHeartbeat(Heartbeat::new(rng.draw_count(), self.local)),
        }]
    }
}

impl EntityStateMachine for Axon {
    fn handle(
        &mut self,
        now: SimTime,
        message: Message,
        rng: &mut dyn EntityRng,
    ) -> Result<Vec<Action>, EntityError> {
        match message {
            Message::NeuronOut(ctx) | Message::SynapseOut(ctx) => Ok(self.relay(now, ctx, rng)),
            Message::AxonHeartbeat(_) => Ok(self.on_heartbeat(now, rng)),
            other => Err(EntityError::UnexpectedMessage {
                kind: EntityKind::Axon.name(),
                message: other.type_name(),
            }),
        }
    }

    fn on_init(&mut self, rng: &mut dyn EntityRng) -> Vec<Action> {
        vec![Action::Wake {
            delay: next_big_tick(&self.config, SimTime::ZERO),
            message: Message::AxonHeartbeat(Heartbeat::new(rng.draw_count(), self.local)),
        }]
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Axon
    }

    fn local(&self) -> LocalId {
        self.local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::FixedRng;
    use synfire_types::CoreId;

    fn config() -> Arc<SimConfig> {
        Arc::new(SimConfig::new(1, 1, 1, 1).with_grid(1, 1))
    }

    fn spike() -> SpikeContext {
        SpikeContext {
            rnd_call_count: 3,
            sender: LocalId(9),
            voltage: 250,
            last_active: SimTime(0.4),
            last_leak: SimTime(0.2),
            axon: AxonId(99),
        }
    }

    #[test]
    fn test_relay_rekeys_with_own_axon_id() {
        let target = EntityId::new(CoreId(0), LocalId(2));
        let mut axon = Axon::new(config(), LocalId(0), AxonId(5), vec![target]);
        let mut rng = FixedRng::new(0.5);

        let actions = axon
            .handle(SimTime(0.5), Message::NeuronOut(spike()), &mut rng)
            .expect("relayed");

        assert_eq!(actions.len(), 1);
        match &actions[0] {
            Action::Send { dest, message, .. } => {
                assert_eq!(*dest, target);
                let ctx = message.spike().expect("spike payload");
                assert_eq!(ctx.axon, AxonId(5), "relay re-keys for weight lookup");
                assert_eq!(ctx.voltage, 250, "neuron context preserved");
                assert_eq!(ctx.last_leak, SimTime(0.2));
            }
            other => panic!("expected Send, got {other:?}"),
        }
        assert_eq!(axon.last_active(), SimTime(0.5));
    }

    #[test]
    fn test_axon_rejects_axon_out() {
        let mut axon = Axon::new(config(), LocalId(0), AxonId(0), Vec::new());
        let mut rng = FixedRng::new(0.5);

        let err = axon
            .handle(SimTime(0.1), Message::AxonOut(spike()), &mut rng)
            .expect_err("axons do not consume their own output kind");
        assert!(matches!(err, EntityError::UnexpectedMessage { .. }));
    }

    #[test]
    fn test_heartbeat_keeps_schedule_alive() {
        let mut axon = Axon::new(config(), LocalId(1), AxonId(1), Vec::new());
        let mut rng = FixedRng::new(0.5);

        let actions = axon.on_init(&mut rng);
        assert_eq!(actions[0].delay(), SimTime(1.0));

        let actions = axon
            .handle(
                SimTime(1.0),
                Message::AxonHeartbeat(Heartbeat::new(0, LocalId(1))),
                &mut rng,
            )
            .expect("heartbeat handled");
        assert_eq!(actions[0].delay(), SimTime(1.0));
        assert!(matches!(
            actions[0].message(),
            Message::AxonHeartbeat(_)
        ));
    }
}
