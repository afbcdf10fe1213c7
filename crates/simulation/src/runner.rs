//! The simulation runner.

use crate::event_queue::EventQueue;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use synfire_core::{Action, EntityError, EntityRng, EntityStateMachine};
use synfire_entities::{Axon, Entity, Generator, Neuron, Synapse};
use synfire_messages::Message;
use synfire_types::{
    AddressingError, AxonId, ConfigError, EntityId, EntityKind, GlobalIndex, Mapping, SimConfig,
    SimTime,
};
use tracing::{info, trace};

/// Errors surfaced by the runner.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// Configuration rejected before the run started.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An identifier failed to resolve through the mapping codec.
    #[error(transparent)]
    Addressing(#[from] AddressingError),

    /// An entity rejected a delivery.
    #[error(transparent)]
    Entity(#[from] EntityError),
}

/// Counters accumulated over a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimulationStats {
    /// Messages delivered to entities.
    pub deliveries: u64,
    /// Spike-carrying deliveries.
    pub spikes_delivered: u64,
    /// Heartbeat deliveries.
    pub heartbeats_delivered: u64,
    /// Messages scheduled by entities.
    pub messages_sent: u64,
    /// `NeuronOut` messages scheduled, i.e. threshold crossings
    /// weighted by fan-out.
    pub neuron_out_sent: u64,
}

/// One entity's private deterministic random stream.
struct EntityStream {
    rng: ChaCha8Rng,
    draws: u64,
}

impl EntityStream {
    fn new(master_seed: u64, index: GlobalIndex) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(master_seed.wrapping_add(index.0)),
            draws: 0,
        }
    }
}

impl EntityRng for EntityStream {
    fn next_uniform(&mut self) -> f64 {
        self.draws += 1;
        self.rng.gen::<f64>()
    }

    fn draw_count(&self) -> u64 {
        self.draws
    }
}

/// Deterministic, single-process event kernel.
///
/// Builds the fixed entity population from the configuration, delivers
/// messages in strict (time, priority, destination, sequence) order,
/// and executes the actions entities return. Entities live for the
/// whole run; only messages come and go.
///
/// # Default wiring
///
/// Construction wires a simple ring so activity can propagate out of
/// the box: each neuron signals one axon on the next core, each axon
/// relays into one neuron of its own core, each synapse fans out to one
/// axon of its core, and each generator targets all axons of its core.
/// Neuron weights are drawn uniformly within the configured bounds from
/// the neuron's own stream; thresholds start at the midpoint of the
/// threshold bounds. Tests that need exact parameters replace
/// individual entities with [`SimulationRunner::set_entity`].
pub struct SimulationRunner {
    config: Arc<SimConfig>,
    mapping: Mapping,
    entities: Vec<Entity>,
    streams: Vec<EntityStream>,
    queue: EventQueue,
    now: SimTime,
    stats: SimulationStats,
}

impl SimulationRunner {
    /// Build the population and schedule every entity's initial wakeups.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        let mapping = Mapping::new(&config)?;
        let config = Arc::new(config);
        let total = mapping.total_entities() as usize;

        let mut streams: Vec<EntityStream> = (0..total)
            .map(|i| EntityStream::new(config.seed, GlobalIndex(i as u64)))
            .collect();

        let mut entities: Vec<Option<Entity>> = (0..total).map(|_| None).collect();
        for core in 0..mapping.cores() {
            for kind in [
                EntityKind::Axon,
                EntityKind::Synapse,
                EntityKind::Neuron,
                EntityKind::Generator,
            ] {
                for nth in 0..config.count_of(kind) {
                    let local = mapping.local_of_kind(kind, nth)?;
                    let id = EntityId::new(synfire_types::CoreId(core), local);
                    let index = mapping.decode_from_core(id)?;
                    let stream = &mut streams[index.0 as usize];
                    let entity = build_entity(&config, &mapping, id, kind, nth, stream)?;
                    entities[index.0 as usize] = Some(entity);
                }
            }
        }
        let entities: Vec<Entity> = entities
            .into_iter()
            .map(|e| e.expect("every index constructed exactly once"))
            .collect();

        let mut runner = Self {
            config: Arc::clone(&config),
            mapping,
            entities,
            streams,
            queue: EventQueue::new(),
            now: SimTime::ZERO,
            stats: SimulationStats::default(),
        };

        for index in 0..total {
            let actions = runner.entities[index].on_init(&mut runner.streams[index]);
            runner.execute_actions(GlobalIndex(index as u64), actions)?;
        }

        info!(
            entities = total,
            cores = runner.mapping.cores(),
            "simulation initialized"
        );
        Ok(runner)
    }

    /// The shared configuration.
    pub fn config(&self) -> Arc<SimConfig> {
        Arc::clone(&self.config)
    }

    /// The mapping codec for this run.
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// Current simulated time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> SimulationStats {
        self.stats
    }

    /// Borrow an entity by flat index.
    pub fn entity(&self, index: GlobalIndex) -> Option<&Entity> {
        self.entities.get(index.0 as usize)
    }

    /// Replace an entity before (or between) deliveries.
    ///
    /// The replacement must be the same kind as the original:
    /// already-scheduled wakeups are addressed by index and will be
    /// delivered to the new entity.
    pub fn set_entity(&mut self, index: GlobalIndex, entity: Entity) -> Result<(), SimError> {
        let slot = self
            .entities
            .get_mut(index.0 as usize)
            .ok_or(AddressingError::IndexOutOfRange {
                index: index.0,
                total: self.mapping.total_entities(),
            })?;
        *slot = entity;
        Ok(())
    }

    /// Schedule an externally injected message, e.g. benchmark input.
    pub fn inject(
        &mut self,
        dest: EntityId,
        delay: SimTime,
        message: Message,
    ) -> Result<(), SimError> {
        let index = self.mapping.decode_from_core(dest)?;
        self.queue.push(self.now + delay, index, message);
        Ok(())
    }

    /// Total clamp events absorbed by all neurons, for calibration.
    pub fn clamp_events(&self) -> u64 {
        self.entities
            .iter()
            .filter_map(|e| e.as_neuron())
            .map(|n| n.clamp_events())
            .sum()
    }

    /// Deliver the next pending message. Returns `false` when the
    /// queue is empty.
    pub fn step(&mut self) -> Result<bool, SimError> {
        let Some((key, message)) = self.queue.pop() else {
            return Ok(false);
        };
        self.now = key.time;
        self.stats.deliveries += 1;
        if message.is_spike() {
            self.stats.spikes_delivered += 1;
        } else {
            self.stats.heartbeats_delivered += 1;
        }
        trace!(dest = %key.dest, at = %key.time, kind = message.type_name(), "delivering");

        let index = key.dest.0 as usize;
        let actions =
            self.entities[index].handle(key.time, message, &mut self.streams[index])?;
        self.execute_actions(key.dest, actions)?;
        Ok(true)
    }

    /// Deliver every message with a timestamp at or before `until`.
    pub fn run_until(&mut self, until: SimTime) -> Result<(), SimError> {
        while let Some(next) = self.queue.next_time() {
            if next > until {
                break;
            }
            self.step()?;
        }
        Ok(())
    }

    fn execute_actions(
        &mut self,
        origin: GlobalIndex,
        actions: Vec<Action>,
    ) -> Result<(), SimError> {
        for action in actions {
            match action {
                Action::Send {
                    dest,
                    delay,
                    message,
                } => {
                    let target = self.mapping.decode_from_core(dest)?;
                    if matches!(message, Message::NeuronOut(_)) {
                        self.stats.neuron_out_sent += 1;
                    }
                    self.stats.messages_sent += 1;
                    self.queue.push(self.now + delay, target, message);
                }
                Action::Wake { delay, message } => {
                    self.stats.messages_sent += 1;
                    self.queue.push(self.now + delay, origin, message);
                }
            }
        }
        Ok(())
    }
}

/// Construct one default-wired entity.
fn build_entity(
    config: &Arc<SimConfig>,
    mapping: &Mapping,
    id: EntityId,
    kind: EntityKind,
    nth: u32,
    stream: &mut EntityStream,
) -> Result<Entity, SimError> {
    let core = id.core;
    let next_core = synfire_types::CoreId((core.0 + 1) % mapping.cores());
    let entity = match kind {
        EntityKind::Neuron => {
            let threshold = (config.threshold_min + config.threshold_max) / 2;
            let span = (config.weight_max - config.weight_min) as f64 + 1.0;
            let weights: Vec<i32> = (0..config.axons_per_core)
                .map(|_| {
                    let draw = config.weight_min as f64 + stream.next_uniform() * span;
                    (draw.floor() as i32).min(config.weight_max)
                })
                .collect();
            let outputs = if config.axons_per_core > 0 {
                let axon_local =
                    mapping.local_of_kind(EntityKind::Axon, nth % config.axons_per_core)?;
                vec![EntityId::new(next_core, axon_local)]
            } else {
                Vec::new()
            };
            Entity::Neuron(Neuron::new(
                Arc::clone(config),
                id.local,
                threshold,
                weights,
                outputs,
            ))
        }
        EntityKind::Synapse => {
            let dests = if config.axons_per_core > 0 {
                let axon_local =
                    mapping.local_of_kind(EntityKind::Axon, nth % config.axons_per_core)?;
                vec![EntityId::new(core, axon_local)]
            } else {
                Vec::new()
            };
            Entity::Synapse(Synapse::new(Arc::clone(config), id.local, core, dests))
        }
        EntityKind::Axon => {
            let targets = if config.neurons_per_core > 0 {
                let neuron_local =
                    mapping.local_of_kind(EntityKind::Neuron, nth % config.neurons_per_core)?;
                vec![EntityId::new(core, neuron_local)]
            } else {
                Vec::new()
            };
            Entity::Axon(Axon::new(
                Arc::clone(config),
                id.local,
                AxonId(nth),
                targets,
            ))
        }
        EntityKind::Generator => {
            let targets: Vec<EntityId> = (0..config.axons_per_core)
                .map(|i| {
                    mapping
                        .local_of_kind(EntityKind::Axon, i)
                        .map(|local| EntityId::new(core, local))
                })
                .collect::<Result<_, _>>()?;
            Entity::Generator(Generator::new(Arc::clone(config), id.local, targets))
        }
    };
    Ok(entity)
}
