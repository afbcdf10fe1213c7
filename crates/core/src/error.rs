//! Error type for entity state transitions.

use synfire_types::AddressingError;
use thiserror::Error;

/// Errors raised while an entity processes a delivered message.
///
/// All of these are fatal to the run: by the time a message reaches a
/// state machine, anything unresolvable means the configuration and the
/// live population no longer agree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntityError {
    /// A destination or weight key failed to resolve.
    #[error(transparent)]
    Addressing(#[from] AddressingError),

    /// A message kind this entity never consumes.
    #[error("{kind} cannot process {message}")]
    UnexpectedMessage {
        /// Receiving entity kind.
        kind: &'static str,
        /// Offending message kind.
        message: &'static str,
    },
}
