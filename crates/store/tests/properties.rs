//! End-to-end behaviour of the memory state store through `Arc<dyn State>`.

use memstate_store::{MemoryState, State, StateConfig, StateReader, StateWriter};
use memstate_test_helpers::{block, hugepages_block, single_node_map, two_node_map, GIB};
use memstate_types::{Block, ContainerName, MemoryType, NumaNodeId, PodUid, StateSnapshot};
use std::sync::Arc;

fn pod(uid: &str) -> PodUid {
    PodUid::from(uid)
}

fn ctr(name: &str) -> ContainerName {
    ContainerName::from(name)
}

fn populated(config: StateConfig) -> Arc<dyn State> {
    let state = MemoryState::new(config).into_arc();
    state.set_machine_state(two_node_map(16 * GIB));
    state.set_memory_blocks(&pod("a"), &ctr("c1"), vec![block(0, GIB)]);
    state.set_memory_blocks(&pod("a"), &ctr("c2"), vec![block(1, 2 * GIB)]);
    state.set_memory_blocks(&pod("b"), &ctr("c1"), vec![hugepages_block(0, 4), block(0, GIB)]);
    state.set_pod_memory_blocks(&pod("a"), vec![block(0, 4 * GIB)]);
    state
}

#[test]
fn example_scenario() {
    let state = MemoryState::default().into_arc();
    state.set_machine_state(single_node_map(8 * GIB));
    state.set_memory_blocks(&pod("pod-A"), &ctr("c1"), vec![block(0, 2 * GIB)]);

    assert_eq!(
        state.get_memory_blocks(&pod("pod-A"), &ctr("c1")),
        Some(vec![block(0, 2 * GIB)])
    );

    state.delete(&pod("pod-A"), &ctr("c1"));

    assert!(!state.get_memory_assignments().contains_pod(&pod("pod-A")));
    let machine = state.get_machine_state();
    assert_eq!(machine.node_ids(), vec![NumaNodeId(0)]);
    assert_eq!(machine.free(MemoryType::Memory), 8 * GIB);
}

#[test]
fn mutating_every_read_leaves_state_unchanged() {
    let state = populated(StateConfig::default());
    let before = state.snapshot();

    let mut machine = state.get_machine_state();
    machine.remove(NumaNodeId(1));
    let mut assignments = state.get_memory_assignments();
    assignments.set_blocks(pod("a"), ctr("c1"), vec![block(1, 1)]);
    assignments.remove_pod(&pod("b"));
    let mut pod_assignments = state.get_pod_memory_assignments();
    pod_assignments.remove(&pod("a"));
    let mut snapshot = state.snapshot();
    snapshot.machine_state = single_node_map(GIB);
    assert_ne!(snapshot.machine_state, before.machine_state);
    if let Some(mut blocks) = state.get_memory_blocks(&pod("b"), &ctr("c1")) {
        blocks.reverse();
        blocks[0].numa_affinity.push(NumaNodeId(7));
    }

    assert_eq!(state.snapshot(), before);
}

#[test]
fn pod_blocks_are_replaced_not_appended() {
    let state = MemoryState::default().into_arc();

    state.set_pod_memory_blocks(&pod("p"), vec![block(0, 1), block(1, 2)]);
    state.set_pod_memory_blocks(&pod("p"), vec![block(1, 3)]);

    assert_eq!(state.get_pod_memory_blocks(&pod("p")), Some(vec![block(1, 3)]));
    assert_eq!(state.get_pod_memory_assignments().len(), 1);
}

#[test]
fn json_checkpoint_of_any_stored_block_restores() {
    let state = populated(StateConfig::default());
    for (i, page_size) in [1, 4096, 3 << 20, (2 << 20) + 1].into_iter().enumerate() {
        let memory_type = MemoryType::hugepages(page_size).unwrap();
        let blocks = vec![Block::new(vec![NumaNodeId(1)], memory_type, page_size * 8)];
        state.set_memory_blocks(&pod("huge"), &ctr(&format!("c{i}")), blocks.clone());
        state.set_pod_memory_blocks(&pod("huge"), blocks);
    }
    let checkpoint = state.snapshot();

    let json = serde_json::to_string(&checkpoint).unwrap();
    let decoded: StateSnapshot = serde_json::from_str(&json).unwrap();
    let restarted = MemoryState::default().into_arc();
    restarted.restore(decoded);

    assert_eq!(restarted.snapshot(), checkpoint);
}

#[test]
fn block_order_is_preserved() {
    let state = MemoryState::default().into_arc();
    let blocks = vec![block(1, 3), hugepages_block(0, 1), block(0, 2)];

    state.set_memory_blocks(&pod("p"), &ctr("c"), blocks.clone());
    state.set_pod_memory_blocks(&pod("p"), blocks.clone());

    assert_eq!(state.get_memory_blocks(&pod("p"), &ctr("c")), Some(blocks.clone()));
    assert_eq!(state.get_pod_memory_blocks(&pod("p")), Some(blocks));
}

#[test]
fn deleting_last_container_removes_pod_key() {
    let state = populated(StateConfig::default());

    state.delete(&pod("b"), &ctr("c1"));
    state.delete(&pod("a"), &ctr("c1"));

    let assignments = state.get_memory_assignments();
    assert!(!assignments.contains_pod(&pod("b")));
    assert_eq!(assignments.containers(&pod("a")), vec![ctr("c2")]);
    // Pod-level blocks have their own lifecycle.
    assert!(state.get_pod_memory_blocks(&pod("a")).is_some());
}

#[test]
fn deletes_are_idempotent() {
    let state = populated(StateConfig::default());

    state.delete(&pod("a"), &ctr("c1"));
    state.delete_pod(&pod("b"));
    let once = state.snapshot();

    state.delete(&pod("a"), &ctr("c1"));
    state.delete_pod(&pod("b"));

    assert_eq!(state.snapshot(), once);
}

#[test]
fn clear_state_with_pod_level_managers_enabled_clears_everything() {
    let state = populated(StateConfig::with_pod_level_resource_managers(true));

    state.clear_state();

    assert_eq!(state.snapshot(), StateSnapshot::default());
}

#[test]
fn clear_state_with_pod_level_managers_disabled_keeps_pod_blocks() {
    let state = populated(StateConfig::with_pod_level_resource_managers(false));
    let pod_assignments = state.get_pod_memory_assignments();

    state.clear_state();

    assert!(state.get_machine_state().is_empty());
    assert!(state.get_memory_assignments().is_empty());
    assert_eq!(state.get_pod_memory_assignments(), pod_assignments);
}

#[test]
fn config_from_toml_drives_clear_state() {
    let config = StateConfig::from_toml_str("pod_level_resource_managers = true").unwrap();
    let state = populated(config);

    state.clear_state();

    assert!(state.get_pod_memory_assignments().is_empty());
}

#[test]
fn full_table_set_round_trips() {
    let state = populated(StateConfig::default());
    let before = state.snapshot();

    state.set_memory_assignments(state.get_memory_assignments());
    state.set_machine_state(state.get_machine_state());

    assert_eq!(state.snapshot(), before);
}

#[test]
fn restore_replays_checkpoint_into_fresh_store() {
    let original = populated(StateConfig::default());
    let checkpoint = original.snapshot();

    let restarted = MemoryState::default().into_arc();
    restarted.restore(checkpoint.clone());

    assert_eq!(restarted.snapshot(), checkpoint);
    assert_eq!(
        restarted.get_memory_blocks(&pod("b"), &ctr("c1")),
        original.get_memory_blocks(&pod("b"), &ctr("c1"))
    );
}
