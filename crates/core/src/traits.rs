//! Call contract of the memory state store.

use memstate_types::{
    Block, ContainerMemoryAssignments, ContainerName, NumaNodeMap, PodMemoryAssignments, PodUid,
    StateSnapshot,
};

/// Read side of the memory state.
///
/// Every method returns an owned value. Nothing a caller does with it can
/// reach the store's own tables.
///
/// # Guarantees
///
/// - **Infallible**: a missing entry is `None` or an empty table, never an error
/// - **Consistent**: a read observes either all or none of any concurrent write
pub trait StateReader {
    /// Get the NUMA memory topology. Empty if never set.
    fn get_machine_state(&self) -> NumaNodeMap;

    /// Get the blocks assigned to a container.
    fn get_memory_blocks(&self, pod: &PodUid, container: &ContainerName) -> Option<Vec<Block>>;

    /// Get every container-level assignment.
    fn get_memory_assignments(&self) -> ContainerMemoryAssignments;

    /// Get the blocks assigned to a pod at pod level.
    fn get_pod_memory_blocks(&self, pod: &PodUid) -> Option<Vec<Block>>;

    /// Get every pod-level assignment.
    fn get_pod_memory_assignments(&self) -> PodMemoryAssignments;

    /// Get all tables under a single read.
    fn snapshot(&self) -> StateSnapshot;
}

/// Write side of the memory state.
///
/// Every method takes ownership of what it stores, replaces wholesale, and
/// is idempotent where it removes.
pub trait StateWriter {
    /// Replace the NUMA memory topology.
    fn set_machine_state(&self, machine_state: NumaNodeMap);

    /// Replace the blocks of a container. Empty `blocks` removes the entry.
    fn set_memory_blocks(&self, pod: &PodUid, container: &ContainerName, blocks: Vec<Block>);

    /// Replace every container-level assignment.
    fn set_memory_assignments(&self, assignments: ContainerMemoryAssignments);

    /// Replace the pod-level blocks of a pod. Empty `blocks` removes the entry.
    fn set_pod_memory_blocks(&self, pod: &PodUid, blocks: Vec<Block>);

    /// Remove a container's assignment, and its pod entry if it was the last one.
    fn delete(&self, pod: &PodUid, container: &ContainerName);

    /// Remove a pod's container-level and pod-level assignments together.
    fn delete_pod(&self, pod: &PodUid);

    /// Reset the topology and the assignment tables.
    ///
    /// Pod-level assignments are kept when the store is configured to
    /// preserve them.
    fn clear_state(&self);

    /// Replace all tables with a snapshot in one step.
    fn restore(&self, snapshot: StateSnapshot);
}

/// A complete memory state store, shareable across threads.
///
/// # Example
///
/// ```ignore
/// let state: Arc<dyn State> = MemoryState::new(StateConfig::default()).into_arc();
///
/// // Allocation policy: read, decide, commit.
/// let machine = state.get_machine_state();
/// let blocks = policy.place(&machine, &state.get_memory_assignments(), &request);
/// state.set_memory_blocks(&pod, &container, blocks);
///
/// // Termination handler.
/// state.delete_pod(&pod);
/// ```
pub trait State: StateReader + StateWriter + Send + Sync {}

impl<T> State for T where T: StateReader + StateWriter + Send + Sync {}
