//! Identity and mapping codec.
//!
//! Assigns the flat entity population to compute cores and recovers flat
//! indices from (core, position) pairs. Called on every message send, so
//! every resolution here is O(1) arithmetic with no allocation.

use crate::{
    AddressingError, ConfigError, CoreId, EntityId, EntityKind, GlobalIndex, GridCoord, LocalId,
    SimConfig,
};
use serde::{Deserialize, Serialize};

/// Entity-to-core placement policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MapStrategy {
    /// Contiguous blocks of indices per core, kinds in declaration order.
    #[default]
    Linear,
    /// Round-robin across the core grid: adjacent indices land on
    /// different cores to spread hot spots.
    Scatter,
    /// Linear placement with a caller-supplied per-kind block ordering,
    /// e.g. to colocate the kinds with the most edges.
    CustomLinear([EntityKind; 4]),
}

/// A validated mapping over a fixed entity population.
///
/// Construction checks the grid/core invariants once; all lookups after
/// that are pure and infallible for in-range inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    strategy: MapStrategy,
    cores: u32,
    core_size: u32,
    grid_width: u16,
    grid_height: u16,
    /// Per-kind block ordering within a core.
    block_order: [EntityKind; 4],
    /// Per-kind counts, indexed in `block_order` order.
    block_counts: [u32; 4],
}

impl Mapping {
    /// Build a mapping from a validated configuration.
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let block_order = match config.mapping {
            MapStrategy::CustomLinear(order) => order,
            _ => EntityKind::BLOCK_ORDER,
        };
        let block_counts = block_order.map(|kind| config.count_of(kind));

        Ok(Self {
            strategy: config.mapping,
            cores: config.cores,
            core_size: config.core_size(),
            grid_width: config.grid_width,
            grid_height: config.grid_height,
            block_order,
            block_counts,
        })
    }

    /// Total entity population covered by this mapping.
    pub fn total_entities(&self) -> u64 {
        self.core_size as u64 * self.cores as u64
    }

    /// Entities of every kind on one core.
    pub fn core_size(&self) -> u32 {
        self.core_size
    }

    /// Number of compute cores.
    pub fn cores(&self) -> u32 {
        self.cores
    }

    /// Resolve a flat entity index to its (core, position) assignment.
    pub fn map_to_core(&self, index: GlobalIndex) -> Result<EntityId, AddressingError> {
        let total = self.total_entities();
        if index.0 >= total {
            return Err(AddressingError::IndexOutOfRange {
                index: index.0,
                total,
            });
        }
        let (core, local) = match self.strategy {
            MapStrategy::Linear | MapStrategy::CustomLinear(_) => (
                (index.0 / self.core_size as u64) as u32,
                (index.0 % self.core_size as u64) as u32,
            ),
            MapStrategy::Scatter => (
                (index.0 % self.cores as u64) as u32,
                (index.0 / self.cores as u64) as u32,
            ),
        };
        Ok(EntityId::new(CoreId(core), LocalId(local)))
    }

    /// Recover the flat entity index from a (core, position) assignment.
    pub fn decode_from_core(&self, id: EntityId) -> Result<GlobalIndex, AddressingError> {
        if id.core.0 >= self.cores || id.local.0 >= self.core_size {
            return Err(AddressingError::UnknownPosition(id));
        }
        let index = match self.strategy {
            MapStrategy::Linear | MapStrategy::CustomLinear(_) => {
                id.core.0 as u64 * self.core_size as u64 + id.local.0 as u64
            }
            MapStrategy::Scatter => id.local.0 as u64 * self.cores as u64 + id.core.0 as u64,
        };
        Ok(GlobalIndex(index))
    }

    /// Position of a core in the 2D grid.
    pub fn grid_coord(&self, core: CoreId) -> GridCoord {
        GridCoord {
            x: (core.0 % self.grid_width as u32) as u16,
            y: (core.0 / self.grid_width as u32) as u16,
        }
    }

    /// Core occupying a 2D grid position.
    pub fn core_at(&self, coord: GridCoord) -> CoreId {
        CoreId(coord.y as u32 * self.grid_width as u32 + coord.x as u32)
    }

    /// Which kind of entity occupies a within-core position.
    pub fn kind_of_local(&self, local: LocalId) -> Result<EntityKind, AddressingError> {
        let mut offset = local.0;
        for (kind, count) in self.block_order.iter().zip(self.block_counts) {
            if offset < count {
                return Ok(*kind);
            }
            offset -= count;
        }
        Err(AddressingError::UnknownLocal(local))
    }

    /// Within-core position of the `nth` entity of a kind.
    pub fn local_of_kind(&self, kind: EntityKind, nth: u32) -> Result<LocalId, AddressingError> {
        let mut base = 0;
        for (block_kind, count) in self.block_order.iter().zip(self.block_counts) {
            if *block_kind == kind {
                if nth >= count {
                    return Err(AddressingError::UnknownLocal(LocalId(base + nth)));
                }
                return Ok(LocalId(base + nth));
            }
            base += count;
        }
        unreachable!("block order covers every kind");
    }
}
