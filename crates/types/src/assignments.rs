//! Container- and pod-level memory assignment tables.
//!
//! Both tables are persistent maps: cloning is O(1) and mutating a clone
//! copies only the touched path, so a table handed out by the state store is
//! a fully independent value.

use crate::{Block, ContainerName, PodUid};
use im::OrdMap;
use serde::{Deserialize, Serialize};

/// Raw layout of [`ContainerMemoryAssignments`].
pub type ContainerTable = OrdMap<PodUid, OrdMap<ContainerName, Vec<Block>>>;

/// Raw layout of [`PodMemoryAssignments`].
pub type PodTable = OrdMap<PodUid, Vec<Block>>;

/// Memory blocks assigned per container: pod → container → blocks.
///
/// A container is present only while it holds at least one block, and a pod
/// only while at least one of its containers is present. Every mutator
/// maintains this; tables built from raw maps are pruned on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "ContainerTable", into = "ContainerTable")]
pub struct ContainerMemoryAssignments {
    pods: ContainerTable,
}

impl ContainerMemoryAssignments {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the blocks assigned to a container.
    pub fn blocks(&self, pod: &PodUid, container: &ContainerName) -> Option<&[Block]> {
        self.pods
            .get(pod)
            .and_then(|containers| containers.get(container))
            .map(Vec::as_slice)
    }

    /// Replace the blocks of a container, returning the previous ones.
    ///
    /// An empty `blocks` removes the container, and the pod with it if that
    /// was its last container.
    pub fn set_blocks(
        &mut self,
        pod: PodUid,
        container: ContainerName,
        blocks: Vec<Block>,
    ) -> Option<Vec<Block>> {
        if blocks.is_empty() {
            return self.remove_container(&pod, &container);
        }

        let mut containers = self.pods.get(&pod).cloned().unwrap_or_default();
        let previous = containers.insert(container, blocks);
        self.pods.insert(pod, containers);
        previous
    }

    /// Remove a container, returning its blocks.
    ///
    /// Drops the pod entry when it has no containers left.
    pub fn remove_container(
        &mut self,
        pod: &PodUid,
        container: &ContainerName,
    ) -> Option<Vec<Block>> {
        let mut containers = self.pods.get(pod)?.clone();
        let removed = containers.remove(container)?;

        if containers.is_empty() {
            self.pods.remove(pod);
        } else {
            self.pods.insert(pod.clone(), containers);
        }
        Some(removed)
    }

    /// Remove every container of a pod. Returns true if the pod was present.
    pub fn remove_pod(&mut self, pod: &PodUid) -> bool {
        self.pods.remove(pod).is_some()
    }

    /// Check if a pod has any container assignments.
    pub fn contains_pod(&self, pod: &PodUid) -> bool {
        self.pods.contains_key(pod)
    }

    /// Names of the containers of a pod that hold blocks.
    pub fn containers(&self, pod: &PodUid) -> Vec<ContainerName> {
        self.pods
            .get(pod)
            .map(|containers| containers.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Pods with container assignments, in ascending UID order.
    pub fn pods(&self) -> impl Iterator<Item = &PodUid> {
        self.pods.keys()
    }

    /// Iterate over every `(pod, container, blocks)` entry.
    pub fn iter(&self) -> impl Iterator<Item = (&PodUid, &ContainerName, &[Block])> {
        self.pods.iter().flat_map(|(pod, containers)| {
            containers
                .iter()
                .map(move |(container, blocks)| (pod, container, blocks.as_slice()))
        })
    }

    /// Number of pods with container assignments.
    pub fn len(&self) -> usize {
        self.pods.len()
    }

    /// Total number of containers with assignments.
    pub fn container_count(&self) -> usize {
        self.pods.values().map(OrdMap::len).sum()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.pods.is_empty()
    }
}

impl From<ContainerTable> for ContainerMemoryAssignments {
    fn from(raw: ContainerTable) -> Self {
        let pods = raw
            .into_iter()
            .filter_map(|(pod, containers)| {
                let containers: OrdMap<ContainerName, Vec<Block>> = containers
                    .into_iter()
                    .filter(|(_, blocks)| !blocks.is_empty())
                    .collect();
                (!containers.is_empty()).then_some((pod, containers))
            })
            .collect();
        Self { pods }
    }
}

impl From<ContainerMemoryAssignments> for ContainerTable {
    fn from(assignments: ContainerMemoryAssignments) -> Self {
        assignments.pods
    }
}

impl FromIterator<(PodUid, ContainerName, Vec<Block>)> for ContainerMemoryAssignments {
    fn from_iter<I: IntoIterator<Item = (PodUid, ContainerName, Vec<Block>)>>(iter: I) -> Self {
        let mut assignments = Self::new();
        for (pod, container, blocks) in iter {
            assignments.set_blocks(pod, container, blocks);
        }
        assignments
    }
}

/// Memory blocks assigned at pod granularity: pod → blocks.
///
/// Independent of [`ContainerMemoryAssignments`]. A pod is present only while
/// it holds at least one block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "PodTable", into = "PodTable")]
pub struct PodMemoryAssignments {
    pods: PodTable,
}

impl PodMemoryAssignments {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the blocks assigned to a pod.
    pub fn blocks(&self, pod: &PodUid) -> Option<&[Block]> {
        self.pods.get(pod).map(Vec::as_slice)
    }

    /// Replace the blocks of a pod, returning the previous ones.
    ///
    /// An empty `blocks` removes the pod.
    pub fn set_blocks(&mut self, pod: PodUid, blocks: Vec<Block>) -> Option<Vec<Block>> {
        if blocks.is_empty() {
            return self.remove(&pod);
        }
        self.pods.insert(pod, blocks)
    }

    /// Remove a pod, returning its blocks.
    pub fn remove(&mut self, pod: &PodUid) -> Option<Vec<Block>> {
        self.pods.remove(pod)
    }

    /// Check if a pod has pod-level assignments.
    pub fn contains_pod(&self, pod: &PodUid) -> bool {
        self.pods.contains_key(pod)
    }

    /// Iterate over `(pod, blocks)` in ascending UID order.
    pub fn iter(&self) -> impl Iterator<Item = (&PodUid, &[Block])> {
        self.pods.iter().map(|(pod, blocks)| (pod, blocks.as_slice()))
    }

    /// Number of pods with pod-level assignments.
    pub fn len(&self) -> usize {
        self.pods.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.pods.is_empty()
    }
}

impl From<PodTable> for PodMemoryAssignments {
    fn from(raw: PodTable) -> Self {
        let pods = raw
            .into_iter()
            .filter(|(_, blocks)| !blocks.is_empty())
            .collect();
        Self { pods }
    }
}

impl From<PodMemoryAssignments> for PodTable {
    fn from(assignments: PodMemoryAssignments) -> Self {
        assignments.pods
    }
}

impl FromIterator<(PodUid, Vec<Block>)> for PodMemoryAssignments {
    fn from_iter<I: IntoIterator<Item = (PodUid, Vec<Block>)>>(iter: I) -> Self {
        let mut assignments = Self::new();
        for (pod, blocks) in iter {
            assignments.set_blocks(pod, blocks);
        }
        assignments
    }
}
