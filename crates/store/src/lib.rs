//! In-memory NUMA memory assignment state for a single node.
//!
//! This crate provides [`MemoryState`], the single source of truth the
//! memory allocation policy consults before every placement decision.
//!
//! # Tables
//!
//! | table | key | value |
//! |---|---|---|
//! | machine state | NUMA node | capacity per memory type |
//! | container assignments | pod → container | blocks |
//! | pod assignments | pod | blocks |
//!
//! # Flow
//!
//! ```text
//!  allocation policy            checkpoint reader/writer     topology refresh
//!        │  get_* / snapshot          │ snapshot / restore          │ set_machine_state
//!        ▼                            ▼                             ▼
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │ MemoryState                                                          │
//! │   RwLock<{ machine_state, assignments, pod_assignments }>            │
//! │   reads: shared lock, O(1) persistent copies out                     │
//! │   writes: exclusive lock, owned values in, wholesale replace         │
//! └──────────────────────────────────────────────────────────────────────┘
//!        ▲
//!        │  set_* on commit, delete / delete_pod on termination
//!  allocation policy
//! ```
//!
//! # Components
//!
//! - [`MemoryState`] - the store
//! - [`StateConfig`] - feature toggles, loadable from TOML

mod config;
mod state;

pub use config::{ConfigError, StateConfig};
pub use memstate_core::{State, StateReader, StateWriter};
pub use state::MemoryState;
