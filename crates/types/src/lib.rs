//! Core types for node-local NUMA memory assignment state.
//!
//! - [`NumaNodeMap`] - the node's memory topology
//! - [`Block`] - the unit of memory assignment
//! - [`ContainerMemoryAssignments`] / [`PodMemoryAssignments`] - who holds which blocks
//! - [`StateSnapshot`] - all of the above at one point in logical time

mod assignments;
mod identifiers;
mod memory;
mod snapshot;
mod topology;

pub use assignments::{ContainerMemoryAssignments, ContainerTable, PodMemoryAssignments, PodTable};
pub use identifiers::{ContainerName, NumaNodeId, PodUid};
pub use memory::{Block, MemoryTable, MemoryType, MemoryTypeError};
pub use snapshot::StateSnapshot;
pub use topology::{NumaNodeMap, NumaNodeState};
