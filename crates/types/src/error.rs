//! Error types for configuration and entity addressing.

use crate::{EntityId, EntityKind, LocalId};
use thiserror::Error;

/// Errors detected while validating the process-wide configuration.
///
/// All of these are fatal before the simulation starts; none can occur
/// once a validated configuration is in use.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The core grid does not cover the configured core count exactly.
    #[error("grid {width}x{height} does not cover {cores} cores exactly")]
    GridMismatch {
        /// Grid width in cores.
        width: u16,
        /// Grid height in cores.
        height: u16,
        /// Configured core count.
        cores: u32,
    },

    /// A core was configured with no entities at all.
    #[error("core size is zero (no entities per core configured)")]
    EmptyCore,

    /// The mapping-group size does not divide the per-core entity count.
    #[error("mapping-group size {group} does not divide core size {core_size}")]
    GroupMismatch {
        /// Entities per mapping group.
        group: u32,
        /// Entities per core.
        core_size: u32,
    },

    /// Threshold bounds are inverted.
    #[error("threshold bounds inverted: min {min} > max {max}")]
    ThresholdBounds {
        /// Configured minimum.
        min: u32,
        /// Configured maximum.
        max: u32,
    },

    /// Weight bounds are inverted.
    #[error("weight bounds inverted: min {min} > max {max}")]
    WeightBounds {
        /// Configured minimum.
        min: i32,
        /// Configured maximum.
        max: i32,
    },

    /// The big-tick tolerance must stay well inside one period.
    #[error("big-tick tolerance {tolerance} must be smaller than the period {period}")]
    TickTolerance {
        /// Configured tolerance.
        tolerance: f64,
        /// Big-tick period.
        period: f64,
    },

    /// Leak rate outside the meaningful range.
    #[error("leak lambda {0} must be in (0, 1]")]
    LeakLambda(f64),

    /// A probability parameter outside `[0, 1]`.
    #[error("probability {value} for {name} must be in [0, 1]")]
    Probability {
        /// Which parameter was out of range.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A custom linear block ordering repeats an entity kind.
    #[error("custom linear block ordering repeats kind {0}")]
    DuplicateKind(EntityKind),
}

/// Errors resolving entity identifiers through the mapping codec.
///
/// Addressing failures are fatal at the point of occurrence: a message
/// that cannot be delivered would silently desynchronize the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressingError {
    /// A flat entity index outside the configured population.
    #[error("entity index {index} outside [0, {total})")]
    IndexOutOfRange {
        /// The rejected index.
        index: u64,
        /// Total configured entity count.
        total: u64,
    },

    /// A (core, position) pair that no entity occupies.
    #[error("no entity at {0}")]
    UnknownPosition(EntityId),

    /// A within-core position outside every per-kind entity block. The
    /// block layout is identical on all cores, so no core is implied.
    #[error("no entity block covers {0}")]
    UnknownLocal(LocalId),

    /// An axon key with no weight table entry on the receiving neuron.
    #[error("axon {0} has no weight entry on the receiving neuron")]
    UnknownAxon(crate::AxonId),
}
