//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The orchestration service depends on these traits, not concrete implementations.

mod gateway;
mod operation_store;

pub use gateway::{AttemptMetadata, GatewayClient, GatewayResponse};
pub use operation_store::OperationStore;
