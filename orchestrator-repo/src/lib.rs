//! # Orchestrator Repository
//!
//! Adapters for the payment orchestrator:
//! - `memory` - an in-memory [`OperationStore`](orchestrator_types::OperationStore)
//! - `loader` - reads the provider catalogue and operation snapshots from JSON files

pub mod loader;
pub mod memory;

pub use loader::{load_catalog, load_operation, parse_catalog, parse_operation};
pub use memory::InMemoryOperationStore;
