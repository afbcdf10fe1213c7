//! Deterministic simulation kernel.
//!
//! This crate provides a fully deterministic, single-process environment
//! for exercising the entity state machines end to end. Given the same
//! configuration and seed, it produces identical results every run.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  SimulationRunner                       │
//! │                                                         │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     Event Queue (BTreeMap<EventKey, Message>)      │ │
//! │  │     Ordered by: time, priority, dest, sequence     │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │                             │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     entities: Vec<Entity>, one ChaCha stream each  │ │
//! │  │     Each consumes deliveries sequentially          │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │                             │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     Actions → resolve via mapping, schedule        │ │
//! │  └────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The production collaborator this stands in for is an optimistic
//! parallel discrete-event kernel with rollback. This runner is
//! conservative (strict global timestamp order), which the state
//! machines cannot tell apart: they are pure transition functions, and
//! purity is exactly what the optimistic kernel would rely on.

mod event_queue;
mod runner;

pub use event_queue::{EventKey, EventQueue};
pub use runner::{SimError, SimulationRunner, SimulationStats};
