//! Domain-specific identifier types.
//!
//! An entity's address is the explicit pair of fields on [`EntityId`],
//! never a packed wide integer; only the mapping codec performs index
//! arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Compute-core identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct CoreId(pub u32);

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Core({})", self.0)
    }
}

/// Index of an entity within its compute core.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct LocalId(pub u32);

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Local({})", self.0)
    }
}

/// Axon identifier, used by a receiving neuron as the key for its
/// per-axon weight lookup.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct AxonId(pub u32);

impl fmt::Display for AxonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Axon({})", self.0)
    }
}

/// Flat index of an entity across the whole simulation, in `[0, total)`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct GlobalIndex(pub u64);

impl GlobalIndex {
    /// Get the raw index value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for GlobalIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Canonical addressable key for any entity: which core it lives on and
/// where it sits within that core.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct EntityId {
    /// Owning compute core.
    pub core: CoreId,
    /// Position within the core's entity block.
    pub local: LocalId,
}

impl EntityId {
    /// Create a new entity id from its parts.
    pub fn new(core: CoreId, local: LocalId) -> Self {
        Self { core, local }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.core, self.local)
    }
}

/// Position of a compute core in the 2D core grid.
///
/// Only meaningful under topology-aware strategies (scatter mapping,
/// generator input selection).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct GridCoord {
    /// Column in the core grid.
    pub x: u16,
    /// Row in the core grid.
    pub y: u16,
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid({},{})", self.x, self.y)
    }
}

/// The closed set of entity kinds. Each simulated object is exactly one of
/// these for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// Integrate-and-fire neuron with leak.
    Neuron,
    /// Fan-out relay with a fixed destination list.
    Synapse,
    /// Stateless signal relay, keyed for weight lookup.
    Axon,
    /// Spontaneous input source for benchmark load.
    Generator,
}

impl EntityKind {
    /// All kinds, in the default per-core block declaration order.
    pub const BLOCK_ORDER: [EntityKind; 4] = [
        EntityKind::Axon,
        EntityKind::Synapse,
        EntityKind::Neuron,
        EntityKind::Generator,
    ];

    /// Get a human-readable name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Neuron => "neuron",
            EntityKind::Synapse => "synapse",
            EntityKind::Axon => "axon",
            EntityKind::Generator => "generator",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_display() {
        let id = EntityId::new(CoreId(3), LocalId(17));
        assert_eq!(id.to_string(), "Core(3):Local(17)");
    }

    #[test]
    fn test_entity_id_ordering_is_core_major() {
        let a = EntityId::new(CoreId(0), LocalId(9));
        let b = EntityId::new(CoreId(1), LocalId(0));
        assert!(a < b);
    }

    #[test]
    fn test_block_order_covers_all_kinds() {
        let order = EntityKind::BLOCK_ORDER;
        for kind in [
            EntityKind::Neuron,
            EntityKind::Synapse,
            EntityKind::Axon,
            EntityKind::Generator,
        ] {
            assert!(order.contains(&kind));
        }
    }
}
