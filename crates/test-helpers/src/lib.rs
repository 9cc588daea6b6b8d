//! Fixtures for memory state tests.

use memstate_types::{Block, MemoryTable, MemoryType, NumaNodeId, NumaNodeMap, NumaNodeState};

/// One gibibyte.
pub const GIB: u64 = 1 << 30;

const HUGEPAGE_2MI: u64 = 2 << 20;

/// Regular memory block of `size` bytes on a single NUMA node.
pub fn block(node: u32, size: u64) -> Block {
    Block::new(vec![NumaNodeId(node)], MemoryType::Memory, size)
}

/// Block of `pages` 2Mi huge pages on a single NUMA node.
pub fn hugepages_block(node: u32, pages: u64) -> Block {
    Block::new(
        vec![NumaNodeId(node)],
        MemoryType::HUGEPAGES_2MI,
        pages * HUGEPAGE_2MI,
    )
}

/// Node state with `total` bytes of regular memory, all free.
pub fn node_state(node: u32, total: u64) -> NumaNodeState {
    NumaNodeState::new(vec![NumaNodeId(node)])
        .with_memory(MemoryType::Memory, MemoryTable::new(total, 0))
}

/// Topology with NUMA node 0 holding `total` bytes of free memory.
pub fn single_node_map(total: u64) -> NumaNodeMap {
    [(NumaNodeId(0), node_state(0, total))].into_iter().collect()
}

/// Topology with NUMA nodes 0 and 1, each holding `per_node` bytes.
pub fn two_node_map(per_node: u64) -> NumaNodeMap {
    (0..2)
        .map(|node| (NumaNodeId(node), node_state(node, per_node)))
        .collect()
}
