//! Point-in-time capture of the whole memory state.

use crate::{ContainerMemoryAssignments, NumaNodeMap, PodMemoryAssignments};
use serde::{Deserialize, Serialize};

/// All memory state tables captured at one point in logical time.
///
/// This is what a checkpoint writer persists and what is replayed into the
/// state store at start-up.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// NUMA memory topology.
    pub machine_state: NumaNodeMap,

    /// Container-level assignments.
    pub assignments: ContainerMemoryAssignments,

    /// Pod-level assignments.
    #[serde(default)]
    pub pod_assignments: PodMemoryAssignments,
}

impl StateSnapshot {
    /// Check if no table holds any entry.
    pub fn is_empty(&self) -> bool {
        self.machine_state.is_empty()
            && self.assignments.is_empty()
            && self.pod_assignments.is_empty()
    }
}
