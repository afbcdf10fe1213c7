//! Contracts between the simulation kernel and the entity state machines.
//!
//! The kernel delivers messages and owns scheduling, rollback, and the
//! per-entity random streams; entities are pure synchronous transition
//! functions that answer with [`Action`]s. This crate defines that seam.

mod action;
mod error;
mod rng;
mod traits;

pub use action::Action;
pub use error::EntityError;
pub use rng::EntityRng;
pub use traits::EntityStateMachine;
