//! # Orchestrator Types
//!
//! Domain types, the provider catalogue and port traits for the payment
//! orchestrator. This crate has no IO dependencies: only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate is the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (providers, methods, operations, transactions)
//! - `catalog` - The validated, immutable provider catalogue
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto` - Configuration document and attempt requests
//! - `error` - Domain and application error types

pub mod catalog;
pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use catalog::Catalog;
pub use domain::*;
pub use dto::*;
pub use error::{AppError, ConfigError, DomainError, GatewayError, RepoError, RoutingError};
pub use ports::{AttemptMetadata, GatewayClient, GatewayResponse, OperationStore};
