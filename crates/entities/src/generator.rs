//! Spontaneous input generation.

use std::sync::Arc;
use synfire_core::{Action, EntityError, EntityRng, EntityStateMachine};
use synfire_messages::{Heartbeat, Message, SpikeContext};
use synfire_timing::{next_big_tick, next_event_time, MIN_DELTA};
use synfire_types::{
    AxonId, EntityId, EntityKind, GenSelection, GeneratorConfig, LocalId, SimConfig, SimTime,
};
use tracing::trace;

/// The firing decision and destination selection shared by standalone
/// generators and generator-equipped synapses.
///
/// Each big-tick poll consumes exactly one draw for the fire decision;
/// under random selection a firing poll consumes one further draw per
/// selected destination. The draw pattern is fixed per outcome, which
/// keeps replayed polls on the same stream positions.
#[derive(Debug, Clone, PartialEq)]
pub struct SpikeGenerator {
    params: GeneratorConfig,

    /// Round-robin cursor over the target list.
    cursor: usize,
}

impl SpikeGenerator {
    /// Create generator sub-state from the configured parameters.
    pub fn new(params: GeneratorConfig) -> Self {
        Self { params, cursor: 0 }
    }

    /// Whether this generator produces output at all.
    pub fn enabled(&self) -> bool {
        self.params.enabled
    }

    /// Decide whether to fire this big tick and pick the destinations.
    ///
    /// Returns the destinations to spike, empty when the probability
    /// draw declines. The fire draw is consumed unconditionally.
    pub fn poll(&mut self, targets: &[EntityId], rng: &mut dyn EntityRng) -> Vec<EntityId> {
        let u = rng.next_uniform();
        if !self.params.enabled || targets.is_empty() || u >= self.params.probability {
            return Vec::new();
        }

        let fan_out = (self.params.outbound as usize).min(targets.len());
        let mut selected = Vec::with_capacity(fan_out);
        match self.params.selection {
            GenSelection::RoundRobin => {
                for _ in 0..fan_out {
                    selected.push(targets[self.cursor % targets.len()]);
                    self.cursor = (self.cursor + 1) % targets.len();
                }
            }
            GenSelection::Random => {
                for _ in 0..fan_out {
                    let pick = (rng.next_uniform() * targets.len() as f64) as usize;
                    selected.push(targets[pick.min(targets.len() - 1)]);
                }
            }
        }
        selected
    }

    /// Scale applied to the delivery offsets of generated spikes.
    pub fn interval_scale(&self) -> f64 {
        self.params.scale
    }
}

/// Standalone input generator.
///
/// Synthesizes benchmark load with no upstream network: at every big
/// tick it may spike a selection of its targets, as if an external
/// sensor array were driving the core's axons.
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    config: Arc<SimConfig>,
    local: LocalId,
    gen: SpikeGenerator,

    /// Axons this generator can drive. Fixed at construction.
    targets: Vec<EntityId>,

    last_active: SimTime,
}

impl Generator {
    /// Create a generator driving the given targets.
    pub fn new(config: Arc<SimConfig>, local: LocalId, targets: Vec<EntityId>) -> Self {
        let gen = SpikeGenerator::new(config.generator.clone());
        Self {
            config,
            local,
            gen,
            targets,
            last_active: SimTime::ZERO,
        }
    }

    /// When this generator last woke.
    pub fn last_active(&self) -> SimTime {
        self.last_active
    }

    fn on_heartbeat(&mut self, now: SimTime, rng: &mut dyn EntityRng) -> Vec<Action> {
        self.last_active = now;
        let fired = self.gen.poll(&self.targets, rng);
        trace!(generator = %self.local, spikes = fired.len(), "generator tick");

        let mut actions = Vec::with_capacity(fired.len() + 1);
        for dest in fired {
            let delay = next_event_time(&self.config, rng);
            let scaled = SimTime((delay.0 * self.gen.interval_scale()).max(MIN_DELTA));
            actions.push(Action::Send {
                dest,
                delay: scaled,
                message: Message::SynapseOut(SpikeContext {
                    rnd_call_count: rng.draw_count(),
                    sender: self.local,
                    voltage: 0,
                    last_active: now,
                    last_leak: now,
                    axon: AxonId(self.local.0),
                }),
            });
        }
        actions.push(Action::Wake {
            delay: next_big_tick(&self.config, now) - now,
            message: Message::GenHeartbeat(Heartbeat::new(rng.draw_count(), self.local)),
        });
        actions
    }
}

impl EntityStateMachine for Generator {
    fn handle(
        &mut self,
        now: SimTime,
        message: Message,
        rng: &mut dyn EntityRng,
    ) -> Result<Vec<Action>, EntityError> {
        match message {
            Message::GenHeartbeat(_) => Ok(self.on_heartbeat(now, rng)),
            other => Err(EntityError::UnexpectedMessage {
                kind: EntityKind::Generator.name(),
                message: other.type_name(),
            }),
        }
    }

    fn on_init(&mut self, rng: &mut dyn EntityRng) -> Vec<Action> {
        if !self.gen.enabled() || self.targets.is_empty() {
            return Vec::new();
        }
        vec![Action::Wake {
            delay: next_big_tick(&self.config, SimTime::ZERO),
            message: Message::GenHeartbeat(Heartbeat::new(rng.draw_count(), self.local)),
        }]
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Generator
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

    fn targets(n: u32) -> Vec<EntityId> {
        (0..n)
            .map(|i| EntityId::new(CoreId(0), LocalId(i)))
            .collect()
    }

    fn params(probability: f64) -> GeneratorConfig {
        GeneratorConfig {
            enabled: true,
            probability,
            outbound: 2,
            selection: GenSelection::RoundRobin,
            scale: 1.0,
        }
    }

    #[test]
    fn test_poll_respects_probability() {
        let mut gen = SpikeGenerator::new(params(0.3));
        let targets = targets(4);

        // Draw 0.5 >= 0.3: declined, but the draw is still consumed.
        let mut rng = FixedRng::new(0.5);
        assert!(gen.poll(&targets, &mut rng).is_empty());
        assert_eq!(rng.draw_count(), 1);

        // Draw 0.1 < 0.3: fires the configured fan-out.
        let mut rng = FixedRng::new(0.1);
        assert_eq!(gen.poll(&targets, &mut rng).len(), 2);
    }

    #[test]
    fn test_round_robin_cycles_through_targets() {
        let mut gen = SpikeGenerator::new(params(1.0));
        let targets = targets(3);
        let mut rng = FixedRng::new(0.0);

        let first = gen.poll(&targets, &mut rng);
        let second = gen.poll(&targets, &mut rng);
        assert_eq!(first, vec![targets[0], targets[1]]);
        assert_eq!(second, vec![targets[2], targets[0]]);
    }

    #[test]
    fn test_disabled_generator_emits_nothing() {
        let mut params = params(1.0);
        params.enabled = false;
        let mut gen = SpikeGenerator::new(params);
        let mut rng = FixedRng::new(0.0);
        assert!(gen.poll(&targets(4), &mut rng).is_empty());
    }

    #[test]
    fn test_generator_entity_spikes_and_reschedules() {
        let mut config = SimConfig::new(1, 1, 1, 1).with_grid(1, 1);
        config.generator = params(1.0);
        let config = Arc::new(config);
        let mut gen = Generator::new(config, LocalId(3), targets(2));
        let mut rng = FixedRng::new(0.4);

        let init = gen.on_init(&mut rng);
        assert_eq!(init.len(), 1, "enabled generator schedules its heartbeat");

        let actions = gen
            .handle(
                SimTime(1.0),
                Message::GenHeartbeat(Heartbeat::new(0, LocalId(3))),
                &mut rng,
            )
            .expect("heartbeat handled");

        // Two spikes plus the next heartbeat.
        assert_eq!(actions.len(), 3);
        assert!(actions[..2]
            .iter()
            .all(|a| matches!(a.message(), Message::SynapseOut(_))));
        assert!(matches!(actions[2].message(), Message::GenHeartbeat(_)));
    }

    #[test]
    fn test_disabled_generator_entity_schedules_nothing() {
        let config = Arc::new(SimConfig::new(1, 1, 1, 1).with_grid(1, 1));
        let mut gen = Generator::new(config, LocalId(0), targets(2));
        let mut rng = FixedRng::new(0.5);
        assert!(gen.on_init(&mut rng).is_empty());
    }
}
