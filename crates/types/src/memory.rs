//! Memory resource classes, capacity tables and assignment blocks.

use crate::NumaNodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

const KIB: u64 = 1 << 10;
const MIB: u64 = 1 << 20;
const GIB: u64 = 1 << 30;

const MEMORY_RESOURCE: &str = "memory";
const HUGEPAGES_PREFIX: &str = "hugepages-";

/// Errors that can occur when parsing a memory resource name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryTypeError {
    /// The name is neither `memory` nor `hugepages-<size>`.
    #[error("unknown memory resource {0:?}")]
    UnknownResource(String),

    /// The huge page size could not be parsed.
    #[error("invalid huge page size {0:?}")]
    InvalidPageSize(String),
}

/// The memory class a block is carved from.
///
/// Renders as the kubelet resource name: `memory`, `hugepages-2Mi`,
/// `hugepages-1Gi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MemoryType {
    /// Regular memory.
    Memory,

    /// Pre-allocated huge pages of the given page size.
    HugePages {
        /// Page size in bytes.
        page_size: NonZeroU64,
    },
}

const fn page_size(bytes: u64) -> NonZeroU64 {
    match NonZeroU64::new(bytes) {
        Some(size) => size,
        None => panic!("huge page size must be non-zero"),
    }
}

impl MemoryType {
    /// 2 MiB huge pages.
    pub const HUGEPAGES_2MI: Self = MemoryType::HugePages {
        page_size: page_size(2 * MIB),
    };

    /// 1 GiB huge pages.
    pub const HUGEPAGES_1GI: Self = MemoryType::HugePages {
        page_size: page_size(GIB),
    };

    /// Huge pages of `page_size` bytes, or `None` for a zero size.
    pub fn hugepages(page_size: u64) -> Option<Self> {
        NonZeroU64::new(page_size).map(|page_size| MemoryType::HugePages { page_size })
    }

    /// Check if this is a huge page class.
    pub fn is_hugepages(&self) -> bool {
        matches!(self, MemoryType::HugePages { .. })
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MemoryType::Memory => f.write_str(MEMORY_RESOURCE),
            MemoryType::HugePages { page_size } => {
                let page_size = page_size.get();
                write!(f, "{HUGEPAGES_PREFIX}")?;
                if page_size % GIB == 0 {
                    write!(f, "{}Gi", page_size / GIB)
                } else if page_size % MIB == 0 {
                    write!(f, "{}Mi", page_size / MIB)
                } else if page_size % KIB == 0 {
                    write!(f, "{}Ki", page_size / KIB)
                } else {
                    write!(f, "{page_size}")
                }
            }
        }
    }
}

impl FromStr for MemoryType {
    type Err = MemoryTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == MEMORY_RESOURCE {
            return Ok(MemoryType::Memory);
        }

        let size = s
            .strip_prefix(HUGEPAGES_PREFIX)
            .ok_or_else(|| MemoryTypeError::UnknownResource(s.to_owned()))?;

        let digits_end = size
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(size.len());
        let (number, suffix) = size.split_at(digits_end);

        let invalid = || MemoryTypeError::InvalidPageSize(size.to_owned());
        let number: u64 = number.parse().map_err(|_| invalid())?;
        let multiplier = match suffix {
            "" => 1,
            "Ki" => KIB,
            "Mi" => MIB,
            "Gi" => GIB,
            _ => return Err(invalid()),
        };
        number
            .checked_mul(multiplier)
            .and_then(MemoryType::hugepages)
            .ok_or_else(invalid)
    }
}

impl TryFrom<String> for MemoryType {
    type Error = MemoryTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MemoryType> for String {
    fn from(value: MemoryType) -> Self {
        value.to_string()
    }
}

/// Capacity accounting of one memory type on one NUMA node, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryTable {
    /// Total memory of this type on the node.
    pub total_mem_size: u64,

    /// Memory held back for the system and the node agent.
    pub system_reserved: u64,

    /// Memory available to workloads (`total_mem_size - system_reserved`).
    pub allocatable: u64,

    /// Memory currently assigned to workloads.
    pub reserved: u64,

    /// Memory still free for assignment.
    pub free: u64,
}

impl MemoryTable {
    /// Create a table with nothing assigned yet.
    pub fn new(total_mem_size: u64, system_reserved: u64) -> Self {
        let allocatable = total_mem_size.saturating_sub(system_reserved);
        Self {
            total_mem_size,
            system_reserved,
            allocatable,
            reserved: 0,
            free: allocatable,
        }
    }
}

/// A unit of memory assignment.
///
/// Blocks are opaque to the state store: they are kept exactly as the
/// allocation policy produced them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    /// NUMA nodes the block may be served from, in policy order.
    pub numa_affinity: Vec<NumaNodeId>,

    /// Memory class of the block.
    #[serde(rename = "type")]
    pub memory_type: MemoryType,

    /// Size in bytes.
    pub size: u64,
}

impl Block {
    /// Create a new block.
    pub fn new(numa_affinity: Vec<NumaNodeId>, memory_type: MemoryType, size: u64) -> Self {
        Self {
            numa_affinity,
            memory_type,
            size,
        }
    }
}
