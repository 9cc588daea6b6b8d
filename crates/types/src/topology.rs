//! NUMA memory topology of the node.

use crate::{MemoryTable, MemoryType, NumaNodeId};
use im::OrdMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Memory state of a single NUMA node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NumaNodeState {
    /// Number of blocks currently served from this node.
    pub number_of_assignments: usize,

    /// Capacity accounting per memory type.
    pub memory_map: BTreeMap<MemoryType, MemoryTable>,

    /// NUMA nodes this node is grouped with for cross-NUMA assignments.
    ///
    /// Always contains the node itself once the node is in use.
    pub cells: Vec<NumaNodeId>,
}

impl NumaNodeState {
    /// Create a node state grouped with the given cells and no memory yet.
    pub fn new(cells: Vec<NumaNodeId>) -> Self {
        Self {
            number_of_assignments: 0,
            memory_map: BTreeMap::new(),
            cells,
        }
    }

    /// Add (or replace) the capacity table for a memory type.
    pub fn with_memory(mut self, memory_type: MemoryType, table: MemoryTable) -> Self {
        self.memory_map.insert(memory_type, table);
        self
    }

    /// Get the capacity table for a memory type.
    pub fn table(&self, memory_type: MemoryType) -> Option<&MemoryTable> {
        self.memory_map.get(&memory_type)
    }

    /// Free bytes of the given memory type (0 if the node has none).
    pub fn free(&self, memory_type: MemoryType) -> u64 {
        self.table(memory_type).map(|t| t.free).unwrap_or(0)
    }

    /// Check if any memory type on this node has bytes assigned.
    pub fn has_reserved_memory(&self) -> bool {
        self.memory_map.values().any(|t| t.reserved > 0)
    }
}

/// Memory topology of the node: NUMA node → node state.
///
/// Backed by a persistent map, so cloning is cheap and a clone never shares
/// mutable state with the original.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumaNodeMap(OrdMap<NumaNodeId, NumaNodeState>);

impl NumaNodeMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the state of a NUMA node.
    pub fn get(&self, node: NumaNodeId) -> Option<&NumaNodeState> {
        self.0.get(&node)
    }

    /// Insert or replace the state of a NUMA node, returning the previous one.
    pub fn insert(&mut self, node: NumaNodeId, state: NumaNodeState) -> Option<NumaNodeState> {
        self.0.insert(node, state)
    }

    /// Remove a NUMA node.
    pub fn remove(&mut self, node: NumaNodeId) -> Option<NumaNodeState> {
        self.0.remove(&node)
    }

    /// Iterate over nodes in ascending ID order.
    pub fn iter(&self) -> impl Iterator<Item = (&NumaNodeId, &NumaNodeState)> {
        self.0.iter()
    }

    /// NUMA node IDs in ascending order.
    pub fn node_ids(&self) -> Vec<NumaNodeId> {
        self.0.keys().copied().collect()
    }

    /// Total free bytes of a memory type across all nodes.
    pub fn free(&self, memory_type: MemoryType) -> u64 {
        self.0.values().map(|state| state.free(memory_type)).sum()
    }

    /// Number of NUMA nodes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(NumaNodeId, NumaNodeState)> for NumaNodeMap {
    fn from_iter<I: IntoIterator<Item = (NumaNodeId, NumaNodeState)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
