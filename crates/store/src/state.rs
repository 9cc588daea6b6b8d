//! In-memory memory state store.

use crate::StateConfig;
use memstate_core::{State, StateReader, StateWriter};
use memstate_types::{
    Block, ContainerMemoryAssignments, ContainerName, NumaNodeMap, PodMemoryAssignments, PodUid,
    StateSnapshot,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// The tables guarded together by one lock.
#[derive(Debug, Clone, Default)]
struct Tables {
    machine_state: NumaNodeMap,
    assignments: ContainerMemoryAssignments,
    pod_assignments: PodMemoryAssignments,
}

/// Node-local record of which memory blocks are assigned to which pods and
/// containers, plus the node's NUMA memory topology.
///
/// One reader/writer lock guards all tables as a unit: `get_*` and
/// `snapshot` take shared access, everything else takes exclusive access.
/// Tables are persistent maps, so reads hand out O(1) copies that share no
/// mutable state with the store.
///
/// Construct one per node agent and share it as `Arc<dyn State>`.
#[derive(Debug)]
pub struct MemoryState {
    config: StateConfig,
    tables: RwLock<Tables>,
}

impl MemoryState {
    /// Create an empty state store.
    pub fn new(config: StateConfig) -> Self {
        info!(
            pod_level_resource_managers = config.pod_level_resource_managers,
            "Initializing new in-memory state store"
        );
        Self {
            config,
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Create a state store shared as `Arc<dyn State>`.
    pub fn into_arc(self) -> Arc<dyn State> {
        Arc::new(self)
    }

    /// Get the store configuration.
    pub fn config(&self) -> &StateConfig {
        &self.config
    }
}

impl Default for MemoryState {
    fn default() -> Self {
        Self::new(StateConfig::default())
    }
}

impl StateReader for MemoryState {
    fn get_machine_state(&self) -> NumaNodeMap {
        self.tables.read().machine_state.clone()
    }

    fn get_memory_blocks(&self, pod: &PodUid, container: &ContainerName) -> Option<Vec<Block>> {
        self.tables
            .read()
            .assignments
            .blocks(pod, container)
            .map(<[Block]>::to_vec)
    }

    fn get_memory_assignments(&self) -> ContainerMemoryAssignments {
        self.tables.read().assignments.clone()
    }

    fn get_pod_memory_blocks(&self, pod: &PodUid) -> Option<Vec<Block>> {
        self.tables
            .read()
            .pod_assignments
            .blocks(pod)
            .map(<[Block]>::to_vec)
    }

    fn get_pod_memory_assignments(&self) -> PodMemoryAssignments {
        self.tables.read().pod_assignments.clone()
    }

    fn snapshot(&self) -> StateSnapshot {
        let tables = self.tables.read();
        StateSnapshot {
            machine_state: tables.machine_state.clone(),
            assignments: tables.assignments.clone(),
            pod_assignments: tables.pod_assignments.clone(),
        }
    }
}

impl StateWriter for MemoryState {
    fn set_machine_state(&self, machine_state: NumaNodeMap) {
        let numa_nodes = machine_state.len();
        self.tables.write().machine_state = machine_state;
        info!(numa_nodes, "Updated machine memory state");
    }

    fn set_memory_blocks(&self, pod: &PodUid, container: &ContainerName, blocks: Vec<Block>) {
        let num_blocks = blocks.len();
        self.tables
            .write()
            .assignments
            .set_blocks(pod.clone(), container.clone(), blocks);
        info!(
            pod_uid = %pod,
            container_name = %container,
            num_blocks,
            "Updated memory state"
        );
    }

    fn set_memory_assignments(&self, assignments: ContainerMemoryAssignments) {
        let logged = assignments.clone();
        self.tables.write().assignments = assignments;
        trace!(
            pods = logged.len(),
            assignments = ?logged,
            "Updated memory assignments"
        );
    }

    fn set_pod_memory_blocks(&self, pod: &PodUid, blocks: Vec<Block>) {
        let num_blocks = blocks.len();
        self.tables
            .write()
            .pod_assignments
            .set_blocks(pod.clone(), blocks);
        info!(pod_uid = %pod, num_blocks, "Updated pod memory state");
    }

    fn delete(&self, pod: &PodUid, container: &ContainerName) {
        let removed = self
            .tables
            .write()
            .assignments
            .remove_container(pod, container);
        if removed.is_some() {
            debug!(
                pod_uid = %pod,
                container_name = %container,
                "Deleted memory assignment"
            );
        }
    }

    fn delete_pod(&self, pod: &PodUid) {
        let (had_containers, had_pod_blocks) = {
            let mut tables = self.tables.write();
            (
                tables.assignments.remove_pod(pod),
                tables.pod_assignments.remove(pod).is_some(),
            )
        };
        if had_containers || had_pod_blocks {
            debug!(pod_uid = %pod, "Deleted pod memory assignment");
        }
    }

    fn clear_state(&self) {
        let preserve_pods = self.config.preserves_pod_assignments_on_clear();
        {
            let mut tables = self.tables.write();
            tables.machine_state = NumaNodeMap::new();
            tables.assignments = ContainerMemoryAssignments::new();
            if !preserve_pods {
                tables.pod_assignments = PodMemoryAssignments::new();
            }
        }
        debug!(preserved_pod_assignments = preserve_pods, "Cleared state");
    }

    fn restore(&self, snapshot: StateSnapshot) {
        let logged = snapshot.clone();
        *self.tables.write() = Tables {
            machine_state: snapshot.machine_state,
            assignments: snapshot.assignments,
            pod_assignments: snapshot.pod_assignments,
        };
        info!(
            numa_nodes = logged.machine_state.len(),
            pods = logged.assignments.len(),
            pod_level_pods = logged.pod_assignments.len(),
            "Restored memory state"
        );
        trace!(snapshot = ?logged, "Restored memory state tables");
    }
}
