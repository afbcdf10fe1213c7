//! Leaky integrate-and-fire neuron.

use std::sync::Arc;
use synfire_core::{Action, EntityError, EntityRng, EntityStateMachine};
use synfire_messages::{Heartbeat, Message, SpikeContext};
use synfire_timing::{elapsed_big_ticks, next_big_tick, next_event_time};
use synfire_types::{
    AddressingError, AxonId, EntityId, EntityKind, LocalId, ResetMode, SimConfig, SimTime,
};
use tracing::debug;

/// Membrane state and routing for one neuron.
///
/// Voltage decays exponentially per elapsed big tick, accumulates the
/// per-axon weight of each incoming spike, and fires to every registered
/// downstream axon when its magnitude reaches the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct Neuron {
    config: Arc<SimConfig>,
    local: LocalId,

    /// Membrane potential. Always read through the leak adjustment;
    /// the stored value is only current as of `last_leak`.
    voltage: i32,

    /// Firing threshold magnitude, clamped into the configured bounds.
    threshold: u32,

    /// Reversal indicator: an inhibitory neuron fires on a negative
    /// excursion. Folded into the sign of the effective threshold.
    reversal: bool,

    last_active: SimTime,
    last_leak: SimTime,

    /// Per-axon weight row, indexed by the axon id carried in each
    /// incoming spike. Fixed at construction.
    weights: Vec<i32>,

    /// Downstream axons signalled on every fire. Fixed at construction.
    outputs: Vec<EntityId>,

    /// Voltages or weights that landed outside the configured bounds
    /// and were clamped. Saturation is expected behavior; the count is
    /// kept for calibration.
    clamp_events: u64,
}

impl Neuron {
    /// Create a neuron with its weight row and downstream axon list.
    pub fn new(
        config: Arc<SimConfig>,
        local: LocalId,
        threshold: u32,
        weights: Vec<i32>,
        outputs: Vec<EntityId>,
    ) -> Self {
        let clamped = threshold.clamp(config.threshold_min, config.threshold_max);
        if clamped != threshold {
            debug!(neuron = %local, threshold, clamped, "threshold clamped");
        }
        Self {
            config,
            local,
            voltage: 0,
            threshold: clamped,
            reversal: false,
            last_active: SimTime::ZERO,
            last_leak: SimTime::ZERO,
            weights,
            outputs,
            clamp_events: u64::from(clamped != threshold),
        }
    }

    /// Mark this neuron as inhibitory: it fires on a negative excursion.
    pub fn with_reversal(mut self) -> Self {
        self.reversal = true;
        self
    }

    /// The leak-adjusted membrane voltage as of `now`.
    ///
    /// The stored value is never read directly across a leak boundary;
    /// this re-derives it from the elapsed big ticks.
    pub fn voltage_at(&self, now: SimTime) -> i32 {
        let ticks = elapsed_big_ticks(&self.config, self.last_leak, now);
        if ticks == 0 || self.config.leak_lambda >= 1.0 {
            self.voltage
        } else {
            (self.voltage as f64 * self.config.leak_lambda.powi(ticks as i32)).trunc() as i32
        }
    }

    /// How many clamp events this neuron has absorbed.
    pub fn clamp_events(&self) -> u64 {
        self.clamp_events
    }

    /// When this neuron last processed any event.
    pub fn last_active(&self) -> SimTime {
        self.last_active
    }

    /// The effective threshold with the reversal sign folded in.
    fn signed_threshold(&self) -> i32 {
        if self.reversal {
            -(self.threshold as i32)
        } else {
            self.threshold as i32
        }
    }

    /// Fold the pending leak into the stored voltage.
    fn apply_leak(&mut self, now: SimTime) {
        self.voltage = self.voltage_at(now);
        self.last_leak = now;
    }

    /// Weight for an incoming axon key, clamped into the configured
    /// bounds. An axon id outside the weight row is an addressing
    /// failure, never a silent zero.
    fn weight_for(&mut self, axon: AxonId) -> Result<i32, EntityError> {
        let raw = *self
            .weights
            .get(axon.0 as usize)
            .ok_or(AddressingError::UnknownAxon(axon))?;
        let clamped = raw.clamp(self.config.weight_min, self.config.weight_max);
        if clamped != raw {
            self.clamp_events += 1;
            debug!(neuron = %self.local, %axon, raw, clamped, "weight clamped");
        }
        Ok(clamped)
    }

    /// Integrate one spike: leak, add the axon's weight, clamp, and
    /// fire if the threshold magnitude is reached.
    fn on_spike(
        &mut self,
        now: SimTime,
        ctx: SpikeContext,
        rng: &mut dyn EntityRng,
    ) -> Result<Vec<Action>, EntityError> {
        self.apply_leak(now);
        let weight = self.weight_for(ctx.axon)?;

        let bound = self.config.threshold_max as i64;
        let summed = self.voltage as i64 + weight as i64;
        let clamped = summed.clamp(-bound, bound);
        if clamped != summed {
            self.clamp_events += 1;
            debug!(neuron = %self.local, summed, clamped, "voltage clamped");
        }
        self.voltage = clamped as i32;
        self.last_active = now;

        let threshold = self.signed_threshold();
        if self.voltage.unsigned_abs() < threshold.unsigned_abs() {
            return Ok(Vec::new());
        }

        debug!(neuron = %self.local, voltage = self.voltage, threshold, "fired");
        self.reset();

        let mut actions = Vec::with_capacity(self.outputs.len());
        for dest in &self.outputs {
            let delay = next_event_time(&self.config, rng);
            actions.push(Action::Send {
                dest: *dest,
                delay,
                message: Message::NeuronOut(SpikeContext {
                    rnd_call_count: rng.draw_count(),
                    sender: self.local,
                    voltage: self.voltage,
                    last_active: self.last_active,
                    last_leak: self.last_leak,
                    axon: AxonId(self.local.0),
                }),
            });
        }
        Ok(actions)
    }

    /// Apply the configured post-fire reset rule.
    ///
    /// The fire test is magnitude-based, so the subtractive reset must
    /// follow the sign of the crossing voltage, not the reversal flag:
    /// a negative excursion resets upward, toward rest.
    fn reset(&mut self) {
        match self.config.reset_mode {
            ResetMode::Zero => self.voltage = 0,
            ResetMode::SubtractThreshold => {
                self.voltage -= self.voltage.signum() * self.threshold as i32;
            }
            ResetMode::Saturate => {}
        }
    }

    /// Big-tick boundary: fold in leak and schedule the next boundary.
    fn on_heartbeat(&mut self, now: SimTime, rng: &mut dyn EntityRng) -> Vec<Action> {
        self.apply_leak(now);
        self.last_active = now;
        vec![Action::Wake {
            delay: next_big_tick(&self.config, now) - now,
            message: Message::NeuronHeartbeat(Heartbeat::new(rng.draw_count(), self.local)),
        }]
    }
}

impl EntityStateMachine for Neuron {
    fn handle(
        &mut self,
        now: SimTime,
        message: Message,
        rng: &mut dyn EntityRng,
    ) -> Result<Vec<Action>, EntityError> {
        match message {
            Message::AxonOut(ctx) | Message::SynapseOut(ctx) => self.on_spike(now, ctx, rng),
            Message::NeuronHeartbeat(_) => Ok(self.on_heartbeat(now, rng)),
            other => Err(EntityError::UnexpectedMessage {
                kind: EntityKind::Neuron.name(),
                message: other.type_name(),
            }),
        }
    }

    fn on_init(&mut self, rng: &mut dyn EntityRng) -> Vec<Action> {
        vec![Action::Wake {
            delay: next_big_tick(&self.config, SimTime::ZERO),
            message: Message::NeuronHeartbeat(Heartbeat::new(rng.draw_count(), self.local)),
        }]
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Neuron
    }

    fn local(&self) -> LocalId {
        self.local
    }
}
