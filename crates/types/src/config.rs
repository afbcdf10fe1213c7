//! Process-wide simulation configuration.
//!
//! Built once at startup, validated, and passed by shared reference from
//! then on. No component mutates configuration after initialization.

use crate::{ConfigError, EntityKind, MapStrategy};
use serde::{Deserialize, Serialize};

/// Selector for the stochastic next-event-time distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeDistribution {
    /// Uniform draw across the little-tick band.
    #[default]
    Uniform,
    /// Normal-shaped draw centered mid-band.
    NormBased,
    /// Exponential inter-event gaps.
    Exp,
    /// Two-point draw: short or long offset by a probability comparison.
    Bin,
}

/// Post-fire membrane reset rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResetMode {
    /// Hard reset to zero after a fire.
    #[default]
    Zero,
    /// Subtract the (signed) threshold, preserving overshoot.
    SubtractThreshold,
    /// Leave the clamped voltage in place.
    Saturate,
}

/// How a generator picks the destinations of a spontaneous spike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GenSelection {
    /// Cycle through the target list in order.
    #[default]
    RoundRobin,
    /// Pick targets with the generator's own random stream.
    Random,
}

/// Spontaneous-input generator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Whether generators produce any output at all.
    pub enabled: bool,

    /// Probability that a generator fires at a given big tick.
    pub probability: f64,

    /// How many destinations receive each spontaneous spike.
    pub outbound: u32,

    /// Destination selection mode.
    pub selection: GenSelection,

    /// Scale applied to generator inter-event intervals.
    pub scale: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            probability: 0.5,
            outbound: 1,
            selection: GenSelection::default(),
            scale: 1.0,
        }
    }
}

/// Configuration for a simulation run.
///
/// The entity population is fixed by the per-core counts times the core
/// count; entities are never created or destroyed mid-run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Neurons per compute core.
    pub neurons_per_core: u32,

    /// Synapses per compute core.
    pub synapses_per_core: u32,

    /// Axons per compute core.
    pub axons_per_core: u32,

    /// Standalone input generators per compute core.
    pub generators_per_core: u32,

    /// Number of compute cores in the simulation.
    pub cores: u32,

    /// Entity-to-core mapping strategy.
    pub mapping: MapStrategy,

    /// Core grid width (used by scatter mapping and generator targeting).
    pub grid_width: u16,

    /// Core grid height.
    pub grid_height: u16,

    /// Entities per mapping group: the unit the hosting kernel assigns
    /// to one logical process. Validated here (must divide the core
    /// size) and passed through to the kernel; within-core placement
    /// does not depend on it.
    pub entities_per_group: u32,

    /// Smallest threshold a neuron may be configured with.
    pub threshold_min: u32,

    /// Largest threshold a neuron may be configured with. Voltages are
    /// clamped to `[-threshold_max, threshold_max]`.
    pub threshold_max: u32,

    /// Smallest applicable synapse weight.
    pub weight_min: i32,

    /// Largest applicable synapse weight.
    pub weight_max: i32,

    /// Spacing of the big-tick synchronization boundaries. One unit of
    /// simulated time per master-clock cycle.
    pub big_tick_period: f64,

    /// Tolerance below a big tick within which a timestamp counts as
    /// having reached the boundary. Absorbs float jitter accumulated
    /// over many little-tick steps.
    pub big_tick_err: f64,

    /// Fine time resolution of spike-driven events.
    pub little_tick: f64,

    /// Scale applied to every stochastic event-time draw.
    pub clock_random_adj: f64,

    /// Distribution used for stochastic event timing.
    pub clock_rnd_mode: TimeDistribution,

    /// Probability of the short offset under [`TimeDistribution::Bin`].
    pub bin_probability: f64,

    /// Per-big-tick exponential leak factor in `(0, 1]`; `1.0` disables
    /// leak entirely.
    pub leak_lambda: f64,

    /// Post-fire membrane reset rule.
    pub reset_mode: ResetMode,

    /// Spontaneous-input generator parameters.
    pub generator: GeneratorConfig,

    /// Master seed for the per-entity random streams.
    pub seed: u64,
}

impl SimConfig {
    /// Create a configuration for the given population shape. All other
    /// parameters start at their defaults.
    pub fn new(cores: u32, neurons: u32, synapses: u32, axons: u32) -> Self {
        Self {
            neurons_per_core: neurons,
            synapses_per_core: synapses,
            axons_per_core: axons,
            generators_per_core: 0,
            cores,
            mapping: MapStrategy::Linear,
            grid_width: cores.max(1) as u16,
            grid_height: 1,
            entities_per_group: 1,
            threshold_min: 1,
            threshold_max: 1024,
            weight_min: -128,
            weight_max: 127,
            big_tick_period: 1.0,
            big_tick_err: 1.0e-6,
            little_tick: 0.001,
            clock_random_adj: 1.0,
            clock_rnd_mode: TimeDistribution::default(),
            bin_probability: 0.5,
            leak_lambda: 1.0,
            reset_mode: ResetMode::default(),
            generator: GeneratorConfig::default(),
            seed: 12345,
        }
    }

    /// Set the mapping strategy.
    pub fn with_mapping(mut self, mapping: MapStrategy) -> Self {
        self.mapping = mapping;
        self
    }

    /// Set the core grid dimensions.
    pub fn with_grid(mut self, width: u16, height: u16) -> Self {
        self.grid_width = width;
        self.grid_height = height;
        self
    }

    /// Set the threshold bounds.
    pub fn with_thresholds(mut self, min: u32, max: u32) -> Self {
        self.threshold_min = min;
        self.threshold_max = max;
        self
    }

    /// Set the synapse weight bounds.
    pub fn with_weights(mut self, min: i32, max: i32) -> Self {
        self.weight_min = min;
        self.weight_max = max;
        self
    }

    /// Set the per-big-tick leak factor.
    pub fn with_leak(mut self, lambda: f64) -> Self {
        self.leak_lambda = lambda;
        self
    }

    /// Set the post-fire reset rule.
    pub fn with_reset(mut self, mode: ResetMode) -> Self {
        self.reset_mode = mode;
        self
    }

    /// Set the event-timing distribution.
    pub fn with_clock_mode(mut self, mode: TimeDistribution) -> Self {
        self.clock_rnd_mode = mode;
        self
    }

    /// Set the generator parameters.
    pub fn with_generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }

    /// Set the master seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Entities of every kind hosted by one core.
    pub fn core_size(&self) -> u32 {
        self.neurons_per_core + self.synapses_per_core + self.axons_per_core
            + self.generators_per_core
    }

    /// Total entity population across all cores.
    pub fn total_entities(&self) -> u64 {
        self.core_size() as u64 * self.cores as u64
    }

    /// Per-core count for one entity kind.
    pub fn count_of(&self, kind: EntityKind) -> u32 {
        match kind {
            EntityKind::Neuron => self.neurons_per_core,
            EntityKind::Synapse => self.synapses_per_core,
            EntityKind::Axon => self.axons_per_core,
            EntityKind::Generator => self.generators_per_core,
        }
    }

    /// Validate the configuration. Any failure here aborts the run
    /// before simulation starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.core_size() == 0 {
            return Err(ConfigError::EmptyCore);
        }
        if self.grid_width as u32 * self.grid_height as u32 != self.cores {
            return Err(ConfigError::GridMismatch {
                width: self.grid_width,
                height: self.grid_height,
                cores: self.cores,
            });
        }
        if self.entities_per_group == 0 || self.core_size() % self.entities_per_group != 0 {
            return Err(ConfigError::GroupMismatch {
                group: self.entities_per_group,
                core_size: self.core_size(),
            });
        }
        if self.threshold_min > self.threshold_max {
            return Err(ConfigError::ThresholdBounds {
                min: self.threshold_min,
                max: self.threshold_max,
            });
        }
        if self.weight_min > self.weight_max {
            return Err(ConfigError::WeightBounds {
                min: self.weight_min,
                max: self.weight_max,
            });
        }
        if !(self.big_tick_err >= 0.0 && self.big_tick_err < self.big_tick_period) {
            return Err(ConfigError::TickTolerance {
                tolerance: self.big_tick_err,
                period: self.big_tick_period,
            });
        }
        if !(self.leak_lambda > 0.0 && self.leak_lambda <= 1.0) {
            return Err(ConfigError::LeakLambda(self.leak_lambda));
        }
        if !(0.0..=1.0).contains(&self.bin_probability) {
            return Err(ConfigError::Probability {
                name: "bin_probability",
                value: self.bin_probability,
            });
        }
        if !(0.0..=1.0).contains(&self.generator.probability) {
            return Err(ConfigError::Probability {
                name: "generator.probability",
                value: self.generator.probability,
            });
        }
        if let MapStrategy::CustomLinear(order) = &self.mapping {
            for (i, kind) in order.iter().enumerate() {
                if order[..i].contains(kind) {
                    return Err(ConfigError::DuplicateKind(*kind));
                }
            }
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new(16, 256, 256, 256).with_grid(4, 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_grid_must_cover_cores() {
        let config = SimConfig::new(16, 8, 8, 8).with_grid(3, 3);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GridMismatch { .. })
        ));
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let config = SimConfig::new(1, 1, 1, 1)
            .with_grid(1, 1)
            .with_thresholds(1000, 100);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdBounds { .. })
        ));
    }

    #[test]
    fn test_duplicate_custom_order_rejected() {
        let order = [
            EntityKind::Neuron,
            EntityKind::Neuron,
            EntityKind::Axon,
            EntityKind::Generator,
        ];
        let config = SimConfig::new(1, 1, 1, 1)
            .with_grid(1, 1)
            .with_mapping(MapStrategy::CustomLinear(order));
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateKind(EntityKind::Neuron))
        );
    }

    #[test]
    fn test_leak_lambda_range() {
        let config = SimConfig::new(1, 1, 1, 1).with_grid(1, 1).with_leak(0.0);
        assert_eq!(config.validate(), Err(ConfigError::LeakLambda(0.0)));
        let config = SimConfig::new(1, 1, 1, 1).with_grid(1, 1).with_leak(1.0);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_population_arithmetic() {
        let config = SimConfig::new(4, 10, 20, 30).with_grid(2, 2);
        assert_eq!(config.core_size(), 60);
        assert_eq!(config.total_entities(), 240);
        assert_eq!(config.count_of(EntityKind::Synapse), 20);
    }
}
