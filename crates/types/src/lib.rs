//! Core types for the Synfire spiking-network simulation core.
//!
//! This crate defines the vocabulary shared by every other crate in the
//! workspace: strongly-typed identifiers, the totally-ordered simulated
//! timestamp, the immutable process-wide configuration, and the identity
//! and mapping codec that assigns entities to compute cores.

mod config;
mod error;
mod identifiers;
mod mapping;
mod time;

pub use config::{GenSelection, GeneratorConfig, ResetMode, SimConfig, TimeDistribution};
pub use error::{AddressingError, ConfigError};
pub use identifiers::{AxonId, CoreId, EntityId, EntityKind, GlobalIndex, GridCoord, LocalId};
pub use mapping::{MapStrategy, Mapping};
pub use time::SimTime;
