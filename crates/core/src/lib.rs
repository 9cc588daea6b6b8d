//! Core traits for node-local memory state.
//!
//! The allocation policy, checkpoint writer/reader and topology refresh
//! handlers all talk to the memory state through these traits:
//!
//! - [`StateReader`] - snapshots of the topology and assignment tables
//! - [`StateWriter`] - wholesale replacement and idempotent deletion
//! - [`State`] - both, shareable as `Arc<dyn State>`

mod traits;

pub use traits::{State, StateReader, StateWriter};
